//! Wire/record formats for delivered readings.
//!
//! Two serializations of the same [`Reading`]:
//!
//! - a CSV line for the SD-card log, human-readable, six decimal places
//!   per float (one line per delivery, header written once per file)
//! - a fixed-width positional ASCII record for the LoRa uplink, built for
//!   a hard airtime byte budget: every field zero-padded to its width,
//!   latitude/longitude ×10000 truncated to integer, electrode voltages
//!   scaled and truncated
//!
//! Field widths and scaling are load-bearing: the downstream decoder
//! slices the uplink record by position. Change nothing here without
//! changing the decoder in lock-step.

use core::fmt::Write as _;

use crate::reading::Reading;

/// Capacity for the packed uplink record: 21 header chars + 12 per
/// gas channel pair leaves headroom for sign spill on unset sentinels.
pub const PACKED_CAP: usize = 96;

/// CSV header matching [`csv_record`]'s column order for `units`
/// gas channels.
pub fn csv_header(units: usize) -> String {
    let mut line = String::from("date,time,latitude,longitude,temperature,humidity,pressure");
    for unit in 0..units {
        let _ = write!(line, ",ae{unit},we{unit}");
    }
    line.push('\n');
    line
}

/// One CSV log line.
pub fn csv_record(reading: &Reading) -> String {
    let ts = &reading.timestamp;
    let mut line = String::new();
    let _ = write!(
        line,
        "{:4}-{:02}-{:02},{:02}:{:02}:{:02},{:.6},{:.6},{:.6},{:.6},{:.6}",
        ts.year,
        ts.month,
        ts.day,
        ts.hour,
        ts.minute,
        ts.second,
        reading.position.latitude,
        reading.position.longitude,
        reading.climate.temperature_c,
        reading.climate.humidity_pct,
        reading.barometer.pressure_hpa,
    );
    for channel in &reading.gas {
        let _ = write!(line, ",{:.6},{:.6}", channel.auxiliary_mv, channel.working_mv);
    }
    line.push('\n');
    line
}

/// The packed fixed-width uplink record.
///
/// `wire_scale` is the deployment's electrode scaling factor (×10 for the
/// reference deployment).
pub fn packed_record(reading: &Reading, wire_scale: f32) -> heapless::String<PACKED_CAP> {
    let ts = &reading.timestamp;
    let year = if ts.year > 2000 { ts.year - 2000 } else { ts.year };

    let mut record: heapless::String<PACKED_CAP> = heapless::String::new();
    let _ = write!(
        record,
        "{:+03.0}{:02.0}{:04.0}{:02}{:02}{:02}{:02}{:02}{:02}{:06}{:06}",
        reading.climate.temperature_c,
        reading.climate.humidity_pct,
        reading.barometer.pressure_hpa,
        year,
        ts.month,
        ts.day,
        ts.hour,
        ts.minute,
        ts.second,
        (reading.position.latitude * 10_000.0) as i64,
        (reading.position.longitude * 10_000.0) as i64,
    );
    for channel in &reading.gas {
        let _ = write!(
            record,
            "{:04}{:04}",
            (channel.auxiliary_mv * wire_scale) as i64,
            (channel.working_mv * wire_scale) as i64,
        );
    }
    record
}
