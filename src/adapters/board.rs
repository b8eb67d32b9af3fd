//! Board wiring — the sensor stack, GPS UART, and toggle controls.
//!
//! Owns the shared I2C bus and hands each chip driver its own
//! `RefCellDevice` view. Bus errors never propagate past this layer:
//! they map onto the port contracts (NaN temperature, absent pressure
//! sample, zero ADC counts) and a warning log line.

use core::cell::RefCell;

use embedded_hal_bus::i2c::RefCellDevice;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, Input, Output, PinDriver};
use esp_idf_hal::i2c::I2cDriver;
use esp_idf_hal::uart::UartDriver;
use log::warn;

use crate::app::ports::{
    ClimateSensorPort, GasAdcPort, GpsUartPort, IndicatorPort, PressureSample,
    PressureSensorPort, ToggleInputPort,
};
use crate::drivers::ads1115::{Ads1115, DiffChannel};
use crate::drivers::bmp180::{pressure_to_altitude, Bmp180, SEA_LEVEL_HPA};
use crate::drivers::sht31::Sht31;
use crate::pins;

type BusDevice = RefCellDevice<'static, I2cDriver<'static>>;

// ───────────────────────────────────────────────────────────────
// Climate (SHT31)
// ───────────────────────────────────────────────────────────────

pub struct ClimateAdapter {
    sht: Sht31<BusDevice>,
    /// Humidity from the most recent measurement; the port reads
    /// temperature first, humidity second.
    last_humidity: f32,
}

impl ClimateAdapter {
    pub fn new(bus: &'static RefCell<I2cDriver<'static>>) -> Self {
        let mut sht = Sht31::new(RefCellDevice::new(bus), pins::SHT31_I2C_ADDR);
        // Burn off condensation from storage/transport.
        if let Err(e) = sht.heater_pulse(&mut FreeRtos) {
            warn!("measure: SHT31 heater pulse failed: {e:?}");
        }
        Self {
            sht,
            last_humidity: f32::NAN,
        }
    }
}

impl ClimateSensorPort for ClimateAdapter {
    fn read_temperature(&mut self) -> f32 {
        match self.sht.measure(&mut FreeRtos) {
            Ok(sample) => {
                self.last_humidity = sample.humidity_pct;
                sample.temperature_c
            }
            Err(e) => {
                warn!("measure: SHT31 read failed: {e:?}");
                f32::NAN
            }
        }
    }

    fn read_humidity(&mut self) -> f32 {
        self.last_humidity
    }
}

// ───────────────────────────────────────────────────────────────
// Barometer (BMP180)
// ───────────────────────────────────────────────────────────────

pub struct BarometerAdapter {
    bmp: Option<Bmp180<BusDevice>>,
}

impl BarometerAdapter {
    pub fn new(bus: &'static RefCell<I2cDriver<'static>>) -> Self {
        let bmp = match Bmp180::new(RefCellDevice::new(bus), pins::BMP180_I2C_ADDR, 0) {
            Ok(b) => Some(b),
            Err(e) => {
                warn!("measure: BMP180 init failed: {e:?}, barometer disabled");
                None
            }
        };
        Self { bmp }
    }
}

impl PressureSensorPort for BarometerAdapter {
    fn try_read(&mut self) -> Option<PressureSample> {
        let sample = self.bmp.as_mut()?.read(&mut FreeRtos).ok()?;
        Some(PressureSample {
            temperature_c: sample.temperature_c,
            pressure_hpa: sample.pressure_hpa,
            altitude_m: pressure_to_altitude(SEA_LEVEL_HPA, sample.pressure_hpa),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Gas ADC bank (one ADS1115 per sensor unit)
// ───────────────────────────────────────────────────────────────

pub struct GasAdcBank {
    converters: Vec<Ads1115<BusDevice>>,
}

impl GasAdcBank {
    pub fn new(bus: &'static RefCell<I2cDriver<'static>>, units: usize) -> Self {
        let converters = pins::ADS1115_I2C_ADDRS
            .iter()
            .take(units)
            .map(|&addr| Ads1115::new(RefCellDevice::new(bus), addr))
            .collect();
        Self { converters }
    }
}

impl GasAdcPort for GasAdcBank {
    fn unit_count(&self) -> usize {
        self.converters.len()
    }

    fn read_pair(&mut self, unit: usize) -> (i16, i16) {
        let adc = &mut self.converters[unit];
        let we = adc.read_differential(DiffChannel::A0A1, &mut FreeRtos);
        let ae = adc.read_differential(DiffChannel::A2A3, &mut FreeRtos);
        match (we, ae) {
            (Ok(we), Ok(ae)) => (we, ae),
            _ => {
                warn!("measure: ADS1115 unit {unit} read failed");
                (0, 0)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// GPS UART
// ───────────────────────────────────────────────────────────────

pub struct GpsUartAdapter {
    uart: UartDriver<'static>,
}

impl GpsUartAdapter {
    pub fn new(uart: UartDriver<'static>) -> Self {
        Self { uart }
    }
}

impl GpsUartPort for GpsUartAdapter {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        // NON_BLOCK: return whatever is already buffered.
        self.uart.read(buf, 0).unwrap_or(0)
    }
}

// ───────────────────────────────────────────────────────────────
// Toggle button + indicator LED
// ───────────────────────────────────────────────────────────────

pub struct ToggleControls {
    button: PinDriver<'static, AnyIOPin, Input>,
    led: PinDriver<'static, AnyIOPin, Output>,
}

impl ToggleControls {
    pub fn new(
        button: PinDriver<'static, AnyIOPin, Input>,
        led: PinDriver<'static, AnyIOPin, Output>,
    ) -> Self {
        Self { button, led }
    }
}

impl ToggleInputPort for ToggleControls {
    fn is_pressed(&mut self) -> bool {
        // Active-low with external pull-up.
        self.button.is_low()
    }
}

impl IndicatorPort for ToggleControls {
    fn set_send_mode(&mut self, on: bool) {
        let result = if on {
            self.led.set_high()
        } else {
            self.led.set_low()
        };
        if result.is_err() {
            warn!("mode: indicator LED write failed");
        }
    }
}
