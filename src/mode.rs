//! Measure/drain toggle mode.
//!
//! Deployments with the toggle button run in one of two phases: measuring
//! (default) or draining the queue. A button edge flips the phase; once
//! the queue is empty the scheduler reverts to measuring on its own. The
//! indicator LED mirrors the latch so the operator can see which phase is
//! active.
//!
//! Debounce is the classic prior-state comparison: a press only counts on
//! the released→pressed edge, so holding the button toggles exactly once.

use log::info;

use crate::app::ports::{IndicatorPort, ToggleInputPort};

pub struct ModeController {
    send_mode: bool,
    was_pressed: bool,
}

impl ModeController {
    pub fn new() -> Self {
        Self {
            send_mode: false,
            was_pressed: false,
        }
    }

    /// Sample the button once and flip the latch on a press edge.
    ///
    /// `controls` satisfies both ports — the button and its indicator are
    /// one piece of hardware from the controller's point of view.
    pub fn poll(&mut self, controls: &mut (impl ToggleInputPort + IndicatorPort)) {
        let pressed = controls.is_pressed();
        if pressed && !self.was_pressed {
            let next = !self.send_mode;
            self.set(next, controls);
        }
        self.was_pressed = pressed;
    }

    /// Force the latch (used by the scheduler to revert once the queue
    /// has drained).
    pub fn set(&mut self, on: bool, indicator: &mut impl IndicatorPort) {
        self.send_mode = on;
        indicator.set_send_mode(on);
        info!(
            "mode: {}",
            if on { "draining queue" } else { "measuring" }
        );
    }

    pub fn send_mode(&self) -> bool {
        self.send_mode
    }
}

/// Stand-in controls for deployments without the toggle hardware.
pub struct InertControls;

impl ToggleInputPort for InertControls {
    fn is_pressed(&mut self) -> bool {
        false
    }
}

impl IndicatorPort for InertControls {
    fn set_send_mode(&mut self, _on: bool) {}
}
