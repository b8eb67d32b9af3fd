//! Delivery sinks — where confirmed readings go.
//!
//! Exactly one sink is constructed per deployment, chosen from
//! [`SinkMode`](crate::config::SinkMode) at startup: the SD-card CSV
//! logger or the LoRa uplink. Both expose the same one-method contract;
//! the asymmetry is in the answer. The persist sink knows the outcome
//! synchronously; the transmit sink only hands the payload to the modem
//! and reports [`DeliveryStatus::Submitted`] — the real outcome arrives
//! later as a [`TransmitEvent`](crate::app::ports::TransmitEvent) that the
//! main loop feeds back into the scheduler.

pub mod persist;
pub mod record;
pub mod transmit;

use crate::reading::Reading;

/// Result of handing one reading to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The reading is durably delivered — safe to dequeue now.
    Confirmed,
    /// The reading is in flight; keep it at the queue head until the
    /// completion event arrives.
    Submitted,
    /// Delivery failed — keep the reading for the next delivery cycle.
    Failed,
}

/// Common capability of both delivery destinations.
pub trait Sink {
    fn deliver(&mut self, reading: &Reading) -> DeliveryStatus;
}
