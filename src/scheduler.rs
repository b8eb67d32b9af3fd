//! Delivery scheduler — the pipeline's control loop.
//!
//! One `tick()` per control-loop pass. Two independent timers gate the
//! two halves of the pipeline:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        tick(now)                           │
//! │                                                            │
//! │  GPS drain (every tick, non-blocking)                      │
//! │      │                                                     │
//! │      ▼                                                     │
//! │  measurement due? ──▶ Acquisition ──▶ enqueue              │
//! │      │                                                     │
//! │      ▼                                                     │
//! │  delivery due + queue non-empty?                           │
//! │      ──▶ peek ──▶ Sink.deliver ──▶ dequeue on confirm      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! In the default mode both halves run unconditionally each tick — they
//! are independent, not mutually exclusive. With toggle mode enabled the
//! [`ModeController`] picks one half per tick instead.
//!
//! A failed delivery leaves the reading at the queue head *and* resets
//! the delivery timer: the retry waits one full sending period rather
//! than hammering a sink that just refused. An asynchronous sink
//! (`Submitted`) latches an awaiting-ack flag that parks delivery
//! entirely until [`on_delivery_event`](DeliveryScheduler::on_delivery_event)
//! resolves the in-flight reading.

use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::{IndicatorPort, MeasurePort, ToggleInputPort, TransmitEvent};
use crate::config::SystemConfig;
use crate::mode::ModeController;
use crate::queue::ReadingQueue;
use crate::reading::Reading;
use crate::sink::{DeliveryStatus, Sink};

/// What the scheduler spent the last tick doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Measuring,
    Delivering,
}

/// All mutable pipeline state, owned by the scheduler. Nothing here is
/// global: acquisition and the sink see exactly the pieces they're
/// handed.
pub struct PipelineContext {
    pub queue: ReadingQueue,
    /// The rolling snapshot acquisition writes into. GPS fields keep
    /// their last-known-good values across measurement cycles.
    pub current: Reading,
}

pub struct DeliveryScheduler {
    ctx: PipelineContext,
    mode: ModeController,
    measurement_wait_ms: u64,
    sending_wait_ms: u64,
    idle_poll_ms: u64,
    queue_timeout: Duration,
    toggle_mode: bool,
    /// `None` primes the timer: the first due-check fires immediately.
    last_measurement_ms: Option<u64>,
    last_sending_ms: Option<u64>,
    awaiting_ack: bool,
    phase: Phase,
}

impl DeliveryScheduler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            ctx: PipelineContext {
                queue: ReadingQueue::new(config.queue_capacity),
                current: Reading::new(config.unit_count()),
            },
            mode: ModeController::new(),
            measurement_wait_ms: u64::from(config.measurement_wait_period_ms),
            sending_wait_ms: u64::from(config.sending_wait_period_ms),
            idle_poll_ms: u64::from(config.idle_poll_ms),
            queue_timeout: Duration::from_millis(u64::from(config.queue_op_timeout_ms)),
            toggle_mode: config.toggle_mode,
            last_measurement_ms: None,
            last_sending_ms: None,
            awaiting_ack: false,
            phase: Phase::Idle,
        }
    }

    /// Run one control cycle. Returns the delay in milliseconds until
    /// the caller should tick again.
    pub fn tick(
        &mut self,
        now_ms: u64,
        acq: &mut impl MeasurePort,
        sink: &mut impl Sink,
        controls: &mut (impl ToggleInputPort + IndicatorPort),
    ) -> u64 {
        self.phase = Phase::Idle;

        // GPS bytes accumulate regardless of what else this tick does.
        acq.drain_gps(&mut self.ctx.current);

        if self.toggle_mode {
            if !self.mode.send_mode() {
                self.mode.poll(controls);
            }
            if self.mode.send_mode() {
                self.deliver_if_due(now_ms, sink);
                if self.ctx.queue.is_empty() && !self.awaiting_ack {
                    // Queue drained — fall back to measuring.
                    self.mode.set(false, controls);
                }
            } else {
                self.measure_if_due(now_ms, acq);
            }
        } else {
            self.measure_if_due(now_ms, acq);
            self.deliver_if_due(now_ms, sink);
        }

        self.idle_poll_ms
    }

    /// Resolve an in-flight asynchronous delivery.
    pub fn on_delivery_event(&mut self, event: TransmitEvent) {
        if !self.awaiting_ack {
            debug!("deliver: spurious radio event ignored");
            return;
        }
        self.awaiting_ack = false;
        match event {
            TransmitEvent::Acked => {
                info!("deliver: ack received");
                self.confirm_head();
            }
            TransmitEvent::NotAcked => {
                warn!("deliver: no ack, reading retained for retry");
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending_count(&self) -> usize {
        self.ctx.queue.pending_count()
    }

    pub fn send_mode(&self) -> bool {
        self.mode.send_mode()
    }

    /// The rolling measurement snapshot (for a display adapter).
    pub fn current(&self) -> &Reading {
        &self.ctx.current
    }

    // ── Internal ──────────────────────────────────────────────

    fn measure_if_due(&mut self, now_ms: u64, acq: &mut impl MeasurePort) {
        match self.last_measurement_ms {
            Some(last) if now_ms.saturating_sub(last) < self.measurement_wait_ms => {
                let remaining =
                    (self.measurement_wait_ms - now_ms.saturating_sub(last)) / 1000;
                debug!("measure: next in {remaining}s");
                return;
            }
            _ => {}
        }
        self.last_measurement_ms = Some(now_ms);
        self.phase = Phase::Measuring;

        info!("measure: starting iteration");
        acq.measure(&mut self.ctx.current);

        if self
            .ctx
            .queue
            .enqueue(self.ctx.current.clone(), self.queue_timeout)
        {
            info!(
                "queue: buffered reading (pending {}, free {})",
                self.ctx.queue.pending_count(),
                self.ctx.queue.free_count()
            );
        } else {
            // Losing a reading beats stalling the loop behind a full queue.
            warn!("queue: full, reading dropped");
        }
    }

    fn deliver_if_due(&mut self, now_ms: u64, sink: &mut impl Sink) {
        if self.awaiting_ack {
            debug!("deliver: awaiting ack for in-flight reading");
            return;
        }
        if let Some(last) = self.last_sending_ms {
            if now_ms.saturating_sub(last) < self.sending_wait_ms {
                return;
            }
        }
        let Some(reading) = self.ctx.queue.peek(self.queue_timeout) else {
            return;
        };

        // The timer resets on every attempt, success or not: a failed
        // delivery waits out a full sending period before the retry.
        self.last_sending_ms = Some(now_ms);
        self.phase = Phase::Delivering;

        match sink.deliver(&reading) {
            DeliveryStatus::Confirmed => self.confirm_head(),
            DeliveryStatus::Submitted => {
                info!("deliver: submitted, awaiting completion event");
                self.awaiting_ack = true;
            }
            DeliveryStatus::Failed => {
                warn!(
                    "deliver: failed, retrying in {}ms",
                    self.sending_wait_ms
                );
            }
        }
    }

    fn confirm_head(&mut self) {
        if self.ctx.queue.dequeue(self.queue_timeout).is_some() {
            info!(
                "queue: removed delivered reading (pending {}, free {})",
                self.ctx.queue.pending_count(),
                self.ctx.queue.free_count()
            );
        } else {
            warn!("queue: confirmed delivery but queue was empty");
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
