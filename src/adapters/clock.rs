//! ESP32 clock adapter.
//!
//! Wraps `esp_timer_get_time()` (microsecond monotonic) for the
//! scheduler's timers and the FreeRTOS tick delay for the gas sampling
//! loop. Delaying through FreeRTOS rather than busy-waiting lets the
//! idle task feed the watchdog during the long sampling window.

use crate::app::ports::ClockPort;

pub struct EspClock;

impl EspClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for EspClock {
    fn now_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
    }

    fn delay_ms(&self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }
}
