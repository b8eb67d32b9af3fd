//! NO2 measurement node — main entry point.
//!
//! Hexagonal architecture around a cooperative tick loop:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                      │
//! │                                                                │
//! │  ClimateAdapter  BarometerAdapter  GasAdcBank  GpsUartAdapter  │
//! │  SdStorage / LoraModem   ToggleControls   EspClock             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Acquisition ─▶ ReadingQueue ─▶ DeliveryScheduler      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop ticks the scheduler, sleeps for whatever delay the scheduler
//! returns, and (in transmit deployments) forwards modem completion
//! events back into it. A storage-init failure in persist mode parks the
//! node in an idle halt — deliberately alive but inert, so the fault is
//! observable over the serial log.

use std::cell::RefCell;

use anyhow::Result;
use log::{error, info};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, IOPin, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_hal::units::Hertz;

use no2node::acquisition::Acquisition;
use no2node::adapters::board::{
    BarometerAdapter, ClimateAdapter, GasAdcBank, GpsUartAdapter, ToggleControls,
};
use no2node::adapters::clock::EspClock;
use no2node::adapters::lora_modem::LoraModem;
use no2node::adapters::sd_storage::SdStorage;
use no2node::app::ports::{ClockPort, IndicatorPort, MeasurePort, ToggleInputPort};
use no2node::config::{SinkMode, SystemConfig};
use no2node::pins;
use no2node::scheduler::DeliveryScheduler;
use no2node::sink::persist::PersistSink;
use no2node::sink::transmit::TransmitSink;
use no2node::sink::Sink;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("NO2 node v{} starting", env!("CARGO_PKG_VERSION"));

    // Deployment parameters are baked at provisioning time.
    let config = SystemConfig::default();
    info!(
        "config: {} sensor unit(s), measure every {}s, deliver every {}s",
        config.unit_count(),
        config.measurement_wait_period_ms / 1000,
        config.sending_wait_period_ms / 1000,
    );

    let peripherals = Peripherals::take()?;

    // ── I2C sensor bus (SHT31 + BMP180 + ADS1115 bank) ────────
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(100_000)),
    )?;
    let bus: &'static RefCell<I2cDriver<'static>> = Box::leak(Box::new(RefCell::new(i2c)));

    let climate = ClimateAdapter::new(bus);
    let barometer = BarometerAdapter::new(bus);
    let adc = GasAdcBank::new(bus, config.unit_count());

    // ── GPS on UART1 ──────────────────────────────────────────
    let gps_uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio16,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(Hertz(pins::GPS_BAUD)),
    )?;
    let gps = GpsUartAdapter::new(gps_uart);

    let mut acquisition =
        Acquisition::new(&config, climate, barometer, adc, gps, EspClock::new());

    // ── Toggle button + indicator LED ─────────────────────────
    let mut button = PinDriver::input(peripherals.pins.gpio0.downgrade())?;
    button.set_pull(Pull::Up)?;
    let led = PinDriver::output(peripherals.pins.gpio25.downgrade())?;
    let mut controls = ToggleControls::new(button, led);

    let mut scheduler = DeliveryScheduler::new(&config);
    let clock = EspClock::new();

    // ── Sink selection and the main loop ──────────────────────
    match &config.sink {
        SinkMode::Persist { log_path } => {
            let spi = SpiDriver::new(
                peripherals.spi2,
                peripherals.pins.gpio5,
                peripherals.pins.gpio27,
                Some(peripherals.pins.gpio19),
                &SpiDriverConfig::new(),
            )?;
            let spi_device = SpiDeviceDriver::new(
                spi,
                Some(peripherals.pins.gpio23),
                &SpiConfig::new().baudrate(Hertz(20_000_000)),
            )?;

            let storage = match SdStorage::mount(spi_device) {
                Ok(s) => s,
                Err(e) => {
                    error!("storage: {e} — halting");
                    halt();
                }
            };
            let mut sink = PersistSink::new(storage, log_path, config.unit_count());
            if let Err(e) = sink.init() {
                error!("storage: {e} — halting");
                halt();
            }

            info!("deliver: persist sink ready at {log_path}");
            run(&mut scheduler, &mut acquisition, &mut sink, &mut controls, &clock);
        }
        SinkMode::Transmit => {
            let modem_uart = UartDriver::new(
                peripherals.uart2,
                peripherals.pins.gpio12,
                peripherals.pins.gpio13,
                Option::<AnyIOPin>::None,
                Option::<AnyIOPin>::None,
                &UartConfig::new().baudrate(Hertz(pins::LORA_BAUD)),
            )?;
            let mut sink = TransmitSink::new(LoraModem::new(modem_uart), config.gas_wire_scale);

            info!("deliver: transmit sink ready");
            loop {
                let next_ms = scheduler.tick(
                    clock.now_ms(),
                    &mut acquisition,
                    &mut sink,
                    &mut controls,
                );
                if let Some(event) = sink.poll_event() {
                    scheduler.on_delivery_event(event);
                }
                FreeRtos::delay_ms(next_ms as u32);
            }
        }
    }
}

/// Synchronous-sink loop: tick, sleep, repeat.
fn run(
    scheduler: &mut DeliveryScheduler,
    acquisition: &mut impl MeasurePort,
    sink: &mut impl Sink,
    controls: &mut (impl ToggleInputPort + IndicatorPort),
    clock: &EspClock,
) -> ! {
    loop {
        let next_ms = scheduler.tick(clock.now_ms(), acquisition, sink, controls);
        FreeRtos::delay_ms(next_ms as u32);
    }
}

/// Deliberate dead-end for fatal init errors: stay alive for the serial
/// log, schedule nothing.
fn halt() -> ! {
    loop {
        FreeRtos::delay_ms(1000);
    }
}
