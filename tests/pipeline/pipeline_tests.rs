//! End-to-end pipeline tests: acquisition → queue → scheduler → sink.
//!
//! These run the real scheduler against the real queue and sinks, with
//! only the hardware ports mocked.

use crate::mock_ports::{
    InstantClock, MemoryStorage, MockAdc, MockBarometer, MockClimate, MockGpsUart, MockRadio,
};

use no2node::acquisition::Acquisition;
use no2node::app::ports::{
    IndicatorPort, PressureSample, StoragePort, ToggleInputPort, TransmitEvent,
};
use no2node::config::SystemConfig;
use no2node::mode::InertControls;
use no2node::scheduler::DeliveryScheduler;
use no2node::sink::persist::PersistSink;
use no2node::sink::transmit::TransmitSink;

type TestAcquisition = Acquisition<MockClimate, MockBarometer, MockAdc, MockGpsUart, InstantClock>;

const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
const RMC: &[u8] = b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";

/// Short periods and a two-sample gas loop keep the tests instant.
fn fast_config() -> SystemConfig {
    let mut c = SystemConfig::default();
    c.measurement_wait_period_ms = 100;
    c.sending_wait_period_ms = 100;
    c.queue_op_timeout_ms = 5;
    c.gas_sample_count = 2;
    c.gas_sample_delay_ms = 0;
    c
}

/// Acquisition over healthy mocks: 22.4 °C / 32 %RH, 955.25 hPa,
/// electrodes 300/250 mV (unit 0) and 280/240 mV (unit 1).
fn acquisition(config: &SystemConfig, gps: MockGpsUart) -> TestAcquisition {
    Acquisition::new(
        config,
        MockClimate {
            temperature: 22.4,
            humidity: 32.0,
        },
        MockBarometer(Some(PressureSample {
            temperature_c: 19.0,
            pressure_hpa: 955.25,
            altitude_m: 498.0,
        })),
        MockAdc::from_millivolts(&[(300.0, 250.0), (280.0, 240.0)]),
        gps,
        InstantClock,
    )
}

fn persist_sink(storage: MemoryStorage, config: &SystemConfig) -> PersistSink<MemoryStorage> {
    let mut sink = PersistSink::new(storage, "/no2-data.csv", config.unit_count());
    sink.init().unwrap();
    sink
}

fn log_text(sink: &mut PersistSink<MemoryStorage>) -> String {
    String::from_utf8(sink.storage_mut().read_all("/no2-data.csv").unwrap()).unwrap()
}

// ── Persist deployment ────────────────────────────────────────

#[test]
fn measurement_lands_in_csv_log() {
    let config = fast_config();
    let mut acq = acquisition(&config, MockGpsUart::with_sentences(&[GGA, RMC]));
    let mut sink = persist_sink(MemoryStorage::new(), &config);
    let mut sched = DeliveryScheduler::new(&config);

    // One tick: GPS drain + measure + deliver (both timers primed).
    sched.tick(0, &mut acq, &mut sink, &mut InertControls);
    assert_eq!(sched.pending_count(), 0, "reading delivered and dequeued");

    let text = log_text(&mut sink);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2, "header + one record");
    assert!(lines[0].starts_with("date,time,latitude"));

    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields.len(), 11);
    // GPS date/time from the RMC sentence.
    assert!(fields[0].ends_with("-03-23"), "got {}", fields[0]);
    assert_eq!(fields[1], "12:35:19");
    // Position from the GGA sentence.
    assert!(fields[2].starts_with("48.117"));
    assert!(fields[3].starts_with("11.516"));
    // Climate, humidity, pressure.
    assert_eq!(fields[4], "22.400000");
    assert_eq!(fields[5], "32.000000");
    assert_eq!(fields[6], "955.250000");
    // Electrode pairs, auxiliary first.
    assert_eq!(fields[7], "250.000000");
    assert_eq!(fields[8], "300.000000");
    assert_eq!(fields[9], "240.000000");
    assert_eq!(fields[10], "280.000000");

    // The concentration estimate rode along in the snapshot.
    let ppb = sched.current().gas[0].concentration_ppb;
    assert!((ppb - 228.68).abs() < 0.2, "got {ppb}");
}

#[test]
fn no_fix_writes_sentinel_date() {
    let config = fast_config();
    let mut acq = acquisition(&config, MockGpsUart::empty());
    let mut sink = persist_sink(MemoryStorage::new(), &config);
    let mut sched = DeliveryScheduler::new(&config);

    sched.tick(0, &mut acq, &mut sink, &mut InertControls);

    let text = log_text(&mut sink);
    let record = text.lines().nth(1).unwrap();
    assert!(record.starts_with("9999-99-99,99:99:99,"));
}

#[test]
fn failed_append_keeps_reading_until_storage_recovers() {
    let mut config = fast_config();
    // One measurement only; the test is about the delivery retry.
    config.measurement_wait_period_ms = 1_000_000;
    let mut acq = acquisition(&config, MockGpsUart::empty());
    let mut sink = persist_sink(MemoryStorage::new(), &config);
    let mut sched = DeliveryScheduler::new(&config);

    // Storage is failing when the first delivery comes due.
    sink.storage_mut().fail_writes = true;
    sched.tick(0, &mut acq, &mut sink, &mut InertControls);
    assert_eq!(sched.pending_count(), 1, "failed reading stays at the head");

    // Not retried inside the sending period.
    sched.tick(50, &mut acq, &mut sink, &mut InertControls);
    assert_eq!(sched.pending_count(), 1);

    // Still failing at the next period: another attempt, still queued.
    sched.tick(100, &mut acq, &mut sink, &mut InertControls);
    assert_eq!(sched.pending_count(), 1);

    // Storage recovers: the retained reading goes out.
    sink.storage_mut().fail_writes = false;
    sched.tick(200, &mut acq, &mut sink, &mut InertControls);
    assert_eq!(sched.pending_count(), 0);

    let text = log_text(&mut sink);
    assert_eq!(text.lines().count(), 2, "header + the one record");
}

// ── Transmit deployment ───────────────────────────────────────

#[test]
fn uplink_confirms_only_after_ack() {
    let config = fast_config();
    let mut acq = acquisition(&config, MockGpsUart::empty());
    let mut sink = TransmitSink::new(MockRadio::new(), config.gas_wire_scale);
    let mut sched = DeliveryScheduler::new(&config);

    sched.tick(0, &mut acq, &mut sink, &mut InertControls);
    assert_eq!(sink.radio_mut().submitted.len(), 1);
    assert_eq!(
        sched.pending_count(),
        1,
        "submitted reading stays queued until the ack"
    );
    // Dual-channel packed record: 33 header chars + 2 × 8.
    assert_eq!(sink.radio_mut().submitted[0].len(), 49);

    // Radio completes with an ack; the main loop forwards it.
    sink.radio_mut().events.push(TransmitEvent::Acked);
    let event = sink.poll_event().unwrap();
    sched.on_delivery_event(event);
    assert_eq!(sched.pending_count(), 0);
}

#[test]
fn unacked_uplink_is_resubmitted_next_period() {
    let config = fast_config();
    let mut acq = acquisition(&config, MockGpsUart::empty());
    let mut sink = TransmitSink::new(MockRadio::new(), config.gas_wire_scale);
    let mut sched = DeliveryScheduler::new(&config);

    sched.tick(0, &mut acq, &mut sink, &mut InertControls);
    sched.on_delivery_event(TransmitEvent::NotAcked);
    assert_eq!(sched.pending_count(), 1);

    // Wait out the sending period without measuring again.
    sched.tick(50, &mut acq, &mut sink, &mut InertControls);
    assert_eq!(sink.radio_mut().submitted.len(), 1);
    sched.tick(199, &mut acq, &mut sink, &mut InertControls);

    assert_eq!(sink.radio_mut().submitted.len(), 2);
    let submitted = sink.radio_mut().submitted.clone();
    assert_eq!(
        submitted[0], submitted[1],
        "the same record goes out again"
    );
}

// ── Toggle deployment ─────────────────────────────────────────

struct ButtonAndLed {
    pressed: bool,
    led_on: bool,
}

impl ToggleInputPort for ButtonAndLed {
    fn is_pressed(&mut self) -> bool {
        self.pressed
    }
}

impl IndicatorPort for ButtonAndLed {
    fn set_send_mode(&mut self, on: bool) {
        self.led_on = on;
    }
}

#[test]
fn toggle_deployment_drains_then_resumes_measuring() {
    let mut config = fast_config();
    config.toggle_mode = true;
    let mut acq = acquisition(&config, MockGpsUart::empty());
    let mut sink = persist_sink(MemoryStorage::new(), &config);
    let mut sched = DeliveryScheduler::new(&config);
    let mut controls = ButtonAndLed {
        pressed: false,
        led_on: false,
    };

    // Two measurement ticks, nothing delivered.
    sched.tick(0, &mut acq, &mut sink, &mut controls);
    sched.tick(100, &mut acq, &mut sink, &mut controls);
    assert_eq!(sched.pending_count(), 2);
    assert_eq!(log_text(&mut sink).lines().count(), 1, "only the header");

    // Press: drain one reading per due tick.
    controls.pressed = true;
    sched.tick(200, &mut acq, &mut sink, &mut controls);
    controls.pressed = false;
    assert!(sched.send_mode());
    assert!(controls.led_on);

    sched.tick(300, &mut acq, &mut sink, &mut controls);
    assert_eq!(sched.pending_count(), 0);
    assert!(!sched.send_mode(), "auto-reverted after draining");
    assert!(!controls.led_on);
    assert_eq!(log_text(&mut sink).lines().count(), 3);

    // Back to measuring.
    sched.tick(400, &mut acq, &mut sink, &mut controls);
    assert_eq!(sched.pending_count(), 1);
}
