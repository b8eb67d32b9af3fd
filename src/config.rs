//! System configuration parameters
//!
//! All tunable parameters for the measurement node, including the
//! per-deployment sensor-unit calibration table and the sink selection.
//! Values can be overridden from a JSON blob on the SD card or baked in
//! at provisioning time.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationProfile;

/// Delivery destination, chosen once at startup. Deployments are either
/// offline (SD card logger) or online (LoRa uplink), never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinkMode {
    /// Append CSV records to a log file on the SD card.
    Persist { log_path: heapless::String<64> },
    /// Uplink packed records over the LoRa modem.
    Transmit,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Cadence ---
    /// Minimum time between two measurements (milliseconds)
    pub measurement_wait_period_ms: u32,
    /// Minimum time between two delivery attempts (milliseconds)
    pub sending_wait_period_ms: u32,
    /// Idle poll granularity of the control loop (milliseconds)
    pub idle_poll_ms: u32,

    // --- Queue ---
    /// Maximum number of buffered readings
    pub queue_capacity: usize,
    /// Bounded wait for enqueue/peek/dequeue (milliseconds)
    pub queue_op_timeout_ms: u32,

    // --- Gas sampling ---
    /// Differential samples averaged per electrode pair
    pub gas_sample_count: u32,
    /// Delay between consecutive samples (milliseconds)
    pub gas_sample_delay_ms: u32,
    /// ADC counts to millivolts (ADS1115 at gain 4: 0.03125 mV/count)
    pub adc_mv_per_count: f32,
    /// Averaged electrode values above this don't fit the wire format
    pub gas_max_mv: f32,
    /// Electrode millivolts are multiplied by this before truncation
    /// into the packed uplink record
    pub gas_wire_scale: f32,

    // --- Sensor units ---
    /// One calibration profile per installed NO2 sensor unit, in
    /// gas-channel order
    pub sensor_units: heapless::Vec<CalibrationProfile, 2>,

    // --- Delivery ---
    /// Where confirmed readings go
    pub sink: SinkMode,
    /// Button-driven measure/drain toggle mode
    pub toggle_mode: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut sensor_units = heapless::Vec::new();
        // Alphasense zero values and sensitivities as shipped with the
        // two installed NO2-B43F units.
        let _ = sensor_units.push(CalibrationProfile {
            serial_number: 202_310_057,
            we_zero_electronic: 231,
            we_zero_total: 225,
            ae_zero_electronic: 238,
            ae_zero_total: 234,
            sensitivity: 0.258,
        });
        let _ = sensor_units.push(CalibrationProfile {
            serial_number: 202_310_055,
            we_zero_electronic: 238,
            we_zero_total: 233,
            ae_zero_electronic: 235,
            ae_zero_total: 220,
            sensitivity: 0.280,
        });

        let mut log_path = heapless::String::new();
        let _ = log_path.push_str("/no2-data.csv");

        Self {
            // Cadence
            measurement_wait_period_ms: 10 * 60 * 1000,
            sending_wait_period_ms: 15 * 1000,
            idle_poll_ms: 1000,

            // Queue
            queue_capacity: 1000,
            queue_op_timeout_ms: 100,

            // Gas sampling
            gas_sample_count: 30,
            gas_sample_delay_ms: 1000,
            adc_mv_per_count: 0.03125,
            gas_max_mv: 999.0,
            gas_wire_scale: 10.0,

            sensor_units,

            sink: SinkMode::Persist { log_path },
            toggle_mode: false,
        }
    }
}

impl SystemConfig {
    /// Number of installed NO2 sensor units (gas channels per reading).
    pub fn unit_count(&self) -> usize {
        self.sensor_units.len()
    }
}
