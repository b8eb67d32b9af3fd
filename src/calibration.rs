//! Electrochemical NO2 sensor calibration.
//!
//! Each Alphasense sensor unit ships with a calibration sheet listing its
//! clean-air zero offsets and sensitivity. [`estimate_ppb`] is the simple
//! concentration algorithm from the datasheet: subtract the zero offsets
//! from both electrodes, clamp at zero, difference the corrected values,
//! and divide by the sensitivity.

use serde::{Deserialize, Serialize};

/// Per-unit calibration constants, as printed on the sensor's sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    pub serial_number: u32,
    /// Working electrode electronic zero (mV)
    pub we_zero_electronic: u8,
    /// Working electrode total zero (mV)
    pub we_zero_total: u8,
    /// Auxiliary electrode electronic zero (mV)
    pub ae_zero_electronic: u8,
    /// Auxiliary electrode total zero (mV)
    pub ae_zero_total: u8,
    /// mV per ppb
    pub sensitivity: f32,
}

/// Estimate the NO2 concentration in ppb from raw electrode voltages.
///
/// Pure arithmetic, never fails: negative intermediate values clamp to
/// zero before the division. `sensitivity > 0` is a configuration
/// invariant, not checked here.
pub fn estimate_ppb(profile: &CalibrationProfile, we_mv: f32, ae_mv: f32) -> f32 {
    let corrected_we = (we_mv - f32::from(profile.we_zero_total)).max(0.0);
    let corrected_ae = (ae_mv - f32::from(profile.ae_zero_total)).max(0.0);
    let net = (corrected_we - corrected_ae).max(0.0);
    net / profile.sensitivity
}
