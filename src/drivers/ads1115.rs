//! ADS1115 16-bit differential ADC driver (single-shot).
//!
//! The NO2 front-end wires each sensor unit's working electrode pair to
//! AIN0/AIN1 and its auxiliary pair to AIN2/AIN3 of one converter. Both
//! channels are read at gain 4 (±1.024 V full scale, 0.03125 mV per
//! count) — the electrode outputs sit in the low hundreds of millivolts.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

/// Conversion time at the default 128 SPS data rate, plus margin.
const CONVERSION_DELAY_US: u32 = 8800;

/// Differential input pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffChannel {
    /// AIN0 − AIN1 (working electrode)
    A0A1,
    /// AIN2 − AIN3 (auxiliary electrode)
    A2A3,
}

pub struct Ads1115<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: I2c> Ads1115<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// One single-shot differential conversion.
    pub fn read_differential(
        &mut self,
        channel: DiffChannel,
        delay: &mut impl DelayNs,
    ) -> Result<i16, I2C::Error> {
        let config = config_word(channel);
        self.i2c
            .write(self.addr, &[REG_CONFIG, (config >> 8) as u8, config as u8])?;
        delay.delay_us(CONVERSION_DELAY_US);

        let mut buf = [0u8; 2];
        self.i2c.write_read(self.addr, &[REG_CONVERSION], &mut buf)?;
        Ok(i16::from_be_bytes(buf))
    }
}

/// Build the config register: start single-shot, the given mux, PGA
/// ±1.024 V, 128 SPS, comparator disabled.
fn config_word(channel: DiffChannel) -> u16 {
    const OS_SINGLE: u16 = 0x8000;
    const PGA_1_024V: u16 = 0x0600;
    const MODE_SINGLE: u16 = 0x0100;
    const DR_128SPS: u16 = 0x0080;
    const COMP_DISABLE: u16 = 0x0003;

    let mux = match channel {
        DiffChannel::A0A1 => 0x0000,
        DiffChannel::A2A3 => 0x3000,
    };
    OS_SINGLE | mux | PGA_1_024V | MODE_SINGLE | DR_128SPS | COMP_DISABLE
}
