//! GPS receiver — NMEA byte stream to timestamp/position updates.
//!
//! Feeds every buffered UART byte through the `nmea0183` parser and merges
//! parsed sentences into the current [`Reading`]:
//!
//! - **GGA**: latitude, longitude, altitude, satellite count
//! - **RMC**: UTC date/time, speed, course over ground
//! - **VTG**: speed and course (backup source)
//!
//! Only the fields a valid sentence actually carries are written; anything
//! else keeps its last-known-good value (or its unset sentinel before the
//! first fix). Draining is non-blocking and safe to call every tick.

use nmea0183::{ParseResult, Parser};

use crate::app::ports::GpsUartPort;
use crate::reading::Reading;

/// Knots to metres per second.
const KNOT_MS: f64 = 0.514_444;

pub struct GpsReceiver {
    parser: Parser,
}

impl GpsReceiver {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    /// Drain all currently buffered bytes from `uart` into `data`.
    pub fn drain(&mut self, uart: &mut impl GpsUartPort, data: &mut Reading) {
        let mut buf = [0u8; 64];
        loop {
            let n = uart.read(&mut buf);
            if n == 0 {
                return;
            }
            for &byte in &buf[..n] {
                if let Some(Ok(sentence)) = self.parser.parse_from_byte(byte) {
                    Self::apply(&sentence, data);
                }
            }
        }
    }

    fn apply(sentence: &ParseResult, data: &mut Reading) {
        match sentence {
            ParseResult::GGA(Some(gga)) => {
                data.position.latitude = gga.latitude.as_f64();
                data.position.longitude = gga.longitude.as_f64();
                data.position.altitude = f64::from(gga.altitude.meters);
                data.position.satellites = u32::from(gga.sat_in_use);
            }
            ParseResult::RMC(Some(rmc)) => {
                data.timestamp.year = rmc.datetime.date.year;
                data.timestamp.month = rmc.datetime.date.month;
                data.timestamp.day = rmc.datetime.date.day;
                data.timestamp.hour = rmc.datetime.time.hours;
                data.timestamp.minute = rmc.datetime.time.minutes;
                data.timestamp.second = rmc.datetime.time.seconds as u8;
                data.position.speed = f64::from(rmc.speed.as_knots()) * KNOT_MS;
                if let Some(course) = &rmc.course {
                    data.position.course = f64::from(course.degrees);
                }
            }
            ParseResult::VTG(Some(vtg)) => {
                data.position.speed = f64::from(vtg.speed.as_knots()) * KNOT_MS;
                if let Some(course) = &vtg.course {
                    data.position.course = f64::from(course.degrees);
                }
            }
            _ => {}
        }
    }
}
