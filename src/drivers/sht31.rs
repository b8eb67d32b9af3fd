//! SHT31 temperature/humidity driver (single-shot, high repeatability).
//!
//! One measurement command per read, no clock stretching; the caller
//! supplies the inter-phase delay. Both words are CRC-8 checked (the
//! Sensirion polynomial) before conversion.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Single-shot measurement, high repeatability, no clock stretching.
const CMD_MEASURE: [u8; 2] = [0x24, 0x00];
/// Internal heater control — used once at init to burn off condensation.
const CMD_HEATER_ON: [u8; 2] = [0x30, 0x6D];
const CMD_HEATER_OFF: [u8; 2] = [0x30, 0x66];
/// Measurement duration at high repeatability (datasheet max 15 ms).
const MEASURE_DELAY_MS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sht31Error<E> {
    I2c(E),
    /// A data word failed its CRC-8 check.
    Crc,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sht31Sample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct Sht31<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: I2c> Sht31<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Pulse the internal heater to drive off condensation after a cold
    /// start. Blocks for the heating window.
    pub fn heater_pulse(&mut self, delay: &mut impl DelayNs) -> Result<(), Sht31Error<I2C::Error>> {
        self.i2c
            .write(self.addr, &CMD_HEATER_ON)
            .map_err(Sht31Error::I2c)?;
        delay.delay_ms(2000);
        self.i2c
            .write(self.addr, &CMD_HEATER_OFF)
            .map_err(Sht31Error::I2c)
    }

    /// One blocking measurement of both temperature and humidity.
    pub fn measure(&mut self, delay: &mut impl DelayNs) -> Result<Sht31Sample, Sht31Error<I2C::Error>> {
        self.i2c
            .write(self.addr, &CMD_MEASURE)
            .map_err(Sht31Error::I2c)?;
        delay.delay_ms(MEASURE_DELAY_MS);

        let mut buf = [0u8; 6];
        self.i2c.read(self.addr, &mut buf).map_err(Sht31Error::I2c)?;

        let raw_t = word_checked(&buf[0..3]).ok_or(Sht31Error::Crc)?;
        let raw_h = word_checked(&buf[3..6]).ok_or(Sht31Error::Crc)?;

        Ok(Sht31Sample {
            temperature_c: convert_temperature(raw_t),
            humidity_pct: convert_humidity(raw_h),
        })
    }
}

/// Validate a `[msb, lsb, crc]` group and return the 16-bit word.
fn word_checked(group: &[u8]) -> Option<u16> {
    if crc8(&group[0..2]) != group[2] {
        return None;
    }
    Some(u16::from_be_bytes([group[0], group[1]]))
}

/// Sensirion CRC-8: polynomial 0x31, init 0xFF.
fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

fn convert_temperature(raw: u16) -> f32 {
    -45.0 + 175.0 * f32::from(raw) / 65535.0
}

fn convert_humidity(raw: u16) -> f32 {
    100.0 * f32::from(raw) / 65535.0
}
