//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Acquisition / DeliveryScheduler (domain)
//! ```
//!
//! Driven adapters (sensor buses, the GPS UART, SD storage, the LoRa modem,
//! the toggle button and its LED) implement these traits. The domain side
//! consumes them via generics, so the pipeline never touches hardware
//! directly and every contract can be exercised with a mock on the host.

use crate::error::StorageError;
use crate::reading::Reading;

// ───────────────────────────────────────────────────────────────
// Device ports (driven adapters: hardware → acquisition)
// ───────────────────────────────────────────────────────────────

/// SHT31-class temperature/humidity sensor.
///
/// `read_temperature` returns NaN when the bus transaction or CRC fails —
/// the acquisition layer owns the retry policy, not the adapter.
pub trait ClimateSensorPort {
    fn read_temperature(&mut self) -> f32;
    fn read_humidity(&mut self) -> f32;
}

/// One barometer event: everything the BMP180 derives from a single
/// pressure conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureSample {
    pub temperature_c: f32,
    pub pressure_hpa: f32,
    pub altitude_m: f32,
}

/// BMP180-class barometric sensor. `None` means "no pressure reading
/// available this cycle" and is not an error.
pub trait PressureSensorPort {
    fn try_read(&mut self) -> Option<PressureSample>;
}

/// Bank of differential ADCs wired to the NO2 electrode pairs, one unit
/// per installed sensor.
pub trait GasAdcPort {
    /// Number of physically installed units.
    fn unit_count(&self) -> usize;

    /// One raw differential sample per electrode: `(working, auxiliary)`
    /// ADC counts for the given unit.
    fn read_pair(&mut self, unit: usize) -> (i16, i16);
}

/// Non-blocking byte source for the GPS UART. Returns the number of bytes
/// placed in `buf`; zero when the receive buffer is drained.
pub trait GpsUartPort {
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

/// Monotonic time and the inter-sample delay used by the gas loop.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
    fn delay_ms(&self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Measurement port (acquisition → scheduler boundary)
// ───────────────────────────────────────────────────────────────

/// What the scheduler needs from the measurement side. Implemented by
/// [`Acquisition`](crate::acquisition::Acquisition) over the device ports
/// above; tests substitute a recording mock.
pub trait MeasurePort {
    /// Run one full measurement iteration into `data`. Blocking — the gas
    /// sampling loop takes `gas_sample_count × gas_sample_delay_ms`.
    fn measure(&mut self, data: &mut Reading);

    /// Drain buffered GPS bytes into `data`. Non-blocking, callable every
    /// tick.
    fn drain_gps(&mut self, data: &mut Reading);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: persist sink ↔ SD card)
// ───────────────────────────────────────────────────────────────

/// Append-only file storage for the persist sink. Mounting the backing
/// medium happens in the adapter's constructor; a mount failure is fatal
/// to persist-mode startup.
pub trait StoragePort {
    /// Whether `path` already exists.
    fn exists(&mut self, path: &str) -> bool;

    /// Append `data` to `path`, creating the file if needed.
    fn append(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Entire file contents (maintenance/readback).
    fn read_all(&mut self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete `path`. `Ok` even if it didn't exist.
    fn remove(&mut self, path: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: transmit sink ↔ LoRa modem)
// ───────────────────────────────────────────────────────────────

/// Completion event for a previously submitted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitEvent {
    /// The network acknowledged the uplink.
    Acked,
    /// Transmission completed without an acknowledgment.
    NotAcked,
}

/// Outbound LoRa link. `submit` only hands the payload to the modem's
/// queue; the result arrives later through `poll_event`, which the main
/// loop forwards to
/// [`DeliveryScheduler::on_delivery_event`](crate::scheduler::DeliveryScheduler::on_delivery_event).
pub trait RadioPort {
    fn submit(&mut self, payload: &[u8]);
    fn poll_event(&mut self) -> Option<TransmitEvent>;
}

// ───────────────────────────────────────────────────────────────
// Toggle-mode controls
// ───────────────────────────────────────────────────────────────

/// Raw level of the mode toggle button. Debounce lives in
/// [`ModeController`](crate::mode::ModeController), not in the adapter.
pub trait ToggleInputPort {
    /// `true` while the button is held down.
    fn is_pressed(&mut self) -> bool;
}

/// Output mirroring the send-mode latch (an LED on the reference board).
pub trait IndicatorPort {
    fn set_send_mode(&mut self, on: bool);
}
