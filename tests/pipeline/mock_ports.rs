//! Mock port adapters for integration tests.
//!
//! Everything records enough state for tests to assert on the full
//! pipeline behaviour without real peripherals.

use std::collections::HashMap;

use no2node::app::ports::{
    ClimateSensorPort, ClockPort, GasAdcPort, GpsUartPort, PressureSample, PressureSensorPort,
    RadioPort, StoragePort, TransmitEvent,
};
use no2node::error::StorageError;

// ── Sensor-side mocks ─────────────────────────────────────────

pub struct MockClimate {
    pub temperature: f32,
    pub humidity: f32,
}

impl ClimateSensorPort for MockClimate {
    fn read_temperature(&mut self) -> f32 {
        self.temperature
    }

    fn read_humidity(&mut self) -> f32 {
        self.humidity
    }
}

pub struct MockBarometer(pub Option<PressureSample>);

impl PressureSensorPort for MockBarometer {
    fn try_read(&mut self) -> Option<PressureSample> {
        self.0
    }
}

/// Fixed differential counts per unit, `(working, auxiliary)`.
pub struct MockAdc(pub Vec<(i16, i16)>);

impl MockAdc {
    /// Counts that average to the given electrode millivolts at the
    /// default 0.03125 mV/count multiplier.
    pub fn from_millivolts(pairs: &[(f32, f32)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|&(we, ae)| ((we / 0.03125) as i16, (ae / 0.03125) as i16))
                .collect(),
        )
    }
}

impl GasAdcPort for MockAdc {
    fn unit_count(&self) -> usize {
        self.0.len()
    }

    fn read_pair(&mut self, unit: usize) -> (i16, i16) {
        self.0[unit]
    }
}

/// GPS UART preloaded with NMEA bytes; drains once.
pub struct MockGpsUart {
    data: Vec<u8>,
    pos: usize,
}

impl MockGpsUart {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            pos: 0,
        }
    }

    pub fn with_sentences(sentences: &[&[u8]]) -> Self {
        let mut data = Vec::new();
        for s in sentences {
            data.extend_from_slice(s);
        }
        Self { data, pos: 0 }
    }
}

impl GpsUartPort for MockGpsUart {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = (self.data.len() - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        n
    }
}

/// No real time passes in tests.
pub struct InstantClock;

impl ClockPort for InstantClock {
    fn now_ms(&self) -> u64 {
        0
    }

    fn delay_ms(&self, _ms: u32) {}
}

// ── Delivery-side mocks ───────────────────────────────────────

/// In-memory storage backend with a controllable failure switch.
pub struct MemoryStorage {
    pub files: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            fail_writes: false,
        }
    }
}

impl StoragePort for MemoryStorage {
    fn exists(&mut self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn append(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteFailed);
        }
        self.files
            .entry(path.to_string())
            .or_default()
            .extend_from_slice(data);
        Ok(())
    }

    fn read_all(&mut self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.files.get(path).cloned().ok_or(StorageError::NotFound)
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        self.files.remove(path);
        Ok(())
    }
}

/// Radio that records submissions and serves scripted completion events.
pub struct MockRadio {
    pub submitted: Vec<Vec<u8>>,
    pub events: Vec<TransmitEvent>,
}

impl MockRadio {
    pub fn new() -> Self {
        Self {
            submitted: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl RadioPort for MockRadio {
    fn submit(&mut self, payload: &[u8]) {
        self.submitted.push(payload.to_vec());
    }

    fn poll_event(&mut self) -> Option<TransmitEvent> {
        if self.events.is_empty() {
            None
        } else {
            Some(self.events.remove(0))
        }
    }
}
