//! Measurement acquisition — one iteration of the full sensor stack.
//!
//! [`Acquisition`] owns the device ports and the per-unit calibration
//! profiles, and produces one fully populated [`Reading`] per call:
//!
//! 1. climate (SHT31): blocking read, one immediate retry on a NaN
//!    temperature, the result is recorded as-is either way
//! 2. barometer (BMP180): event read, silently skipped when the driver
//!    has no pressure sample this cycle
//! 3. gas (per unit): average a fixed number of differential ADC sample
//!    pairs at a fixed spacing, convert to millivolts, and apply a hard
//!    range gate before running the calibration
//!
//! The gas loop is the one long-blocking operation in the firmware
//! (sample count × sample delay, tens of seconds). GPS draining is
//! decoupled from all of this and runs on every scheduler tick.

use log::{info, warn};

use crate::app::ports::{
    ClimateSensorPort, ClockPort, GasAdcPort, GpsUartPort, MeasurePort, PressureSensorPort,
};
use crate::calibration::{estimate_ppb, CalibrationProfile};
use crate::config::SystemConfig;
use crate::gps::GpsReceiver;
use crate::reading::Reading;

pub struct Acquisition<C, P, A, U, K> {
    climate: C,
    barometer: P,
    adc: A,
    gps_uart: U,
    clock: K,
    gps: GpsReceiver,
    profiles: heapless::Vec<CalibrationProfile, { crate::reading::MAX_GAS_UNITS }>,
    sample_count: u32,
    sample_delay_ms: u32,
    mv_per_count: f32,
    max_mv: f32,
}

impl<C, P, A, U, K> Acquisition<C, P, A, U, K>
where
    C: ClimateSensorPort,
    P: PressureSensorPort,
    A: GasAdcPort,
    U: GpsUartPort,
    K: ClockPort,
{
    pub fn new(config: &SystemConfig, climate: C, barometer: P, adc: A, gps_uart: U, clock: K) -> Self {
        Self {
            climate,
            barometer,
            adc,
            gps_uart,
            clock,
            gps: GpsReceiver::new(),
            profiles: config.sensor_units.clone(),
            sample_count: config.gas_sample_count,
            sample_delay_ms: config.gas_sample_delay_ms,
            mv_per_count: config.adc_mv_per_count,
            max_mv: config.gas_max_mv,
        }
    }

    fn read_climate(&mut self, data: &mut Reading) {
        let mut temperature = self.climate.read_temperature();
        if temperature.is_nan() {
            warn!("measure: climate temperature NaN, retrying once");
            temperature = self.climate.read_temperature();
        }
        let humidity = self.climate.read_humidity();

        data.climate.temperature_c = temperature;
        data.climate.humidity_pct = humidity;
        info!("measure: SHT31 t={temperature:.2}C rh={humidity:.2}%");
    }

    fn read_barometer(&mut self, data: &mut Reading) {
        // Absence is not an error: the previous cycle's values stand.
        if let Some(sample) = self.barometer.try_read() {
            data.barometer.temperature_c = sample.temperature_c;
            data.barometer.pressure_hpa = sample.pressure_hpa;
            data.barometer.altitude_m = sample.altitude_m;
            info!(
                "measure: BMP180 t={:.2}C p={:.2}hPa alt={:.1}m",
                sample.temperature_c, sample.pressure_hpa, sample.altitude_m
            );
        }
    }

    fn read_gas(&mut self, data: &mut Reading) {
        let units = self
            .adc
            .unit_count()
            .min(self.profiles.len())
            .min(data.gas.len());

        for unit in 0..units {
            let mut acc_we: i64 = 0;
            let mut acc_ae: i64 = 0;
            for _ in 0..self.sample_count {
                let (we, ae) = self.adc.read_pair(unit);
                acc_we += i64::from(we);
                acc_ae += i64::from(ae);
                self.clock.delay_ms(self.sample_delay_ms);
            }

            let we_mv = (acc_we as f32 / self.sample_count as f32) * self.mv_per_count;
            let ae_mv = (acc_ae as f32 / self.sample_count as f32) * self.mv_per_count;

            let channel = &mut data.gas[unit];
            if we_mv < 0.0 || we_mv > self.max_mv || ae_mv < 0.0 || ae_mv > self.max_mv {
                // Values outside the wire-format range are dropped for the
                // whole cycle, not retried.
                channel.working_mv = 0.0;
                channel.auxiliary_mv = 0.0;
                channel.concentration_ppb = 0.0;
                warn!("measure: gas unit {unit} out of range we={we_mv:.1} ae={ae_mv:.1}, skipped");
            } else {
                let ppb = estimate_ppb(&self.profiles[unit], we_mv, ae_mv);
                channel.working_mv = we_mv;
                channel.auxiliary_mv = ae_mv;
                channel.concentration_ppb = ppb;
                info!("measure: gas unit {unit} we={we_mv:.1} ae={ae_mv:.1} ppb={ppb:.1}");
            }
        }
    }
}

impl<C, P, A, U, K> MeasurePort for Acquisition<C, P, A, U, K>
where
    C: ClimateSensorPort,
    P: PressureSensorPort,
    A: GasAdcPort,
    U: GpsUartPort,
    K: ClockPort,
{
    fn measure(&mut self, data: &mut Reading) {
        self.read_climate(data);
        self.read_barometer(data);
        self.read_gas(data);
    }

    fn drain_gps(&mut self, data: &mut Reading) {
        self.gps.drain(&mut self.gps_uart, data);
    }
}
