//! SD-card CSV logger sink.
//!
//! Appends one [`csv_record`] line per confirmed delivery to a single
//! append-only log file. The header is written exactly once, when the
//! file does not yet exist. Confirmation is synchronous: the storage
//! backend either accepted the write or it didn't.

use log::{info, warn};

use crate::app::ports::StoragePort;
use crate::error::{Error, Result};
use crate::reading::Reading;

use super::record::{csv_header, csv_record};
use super::{DeliveryStatus, Sink};

pub struct PersistSink<S: StoragePort> {
    storage: S,
    path: heapless::String<64>,
    units: usize,
}

impl<S: StoragePort> PersistSink<S> {
    pub fn new(storage: S, path: &str, units: usize) -> Self {
        let mut owned = heapless::String::new();
        let _ = owned.push_str(path);
        Self {
            storage,
            path: owned,
            units,
        }
    }

    /// Write the CSV header if the log file doesn't exist yet.
    ///
    /// Failing here is fatal to persist-mode startup — the caller halts
    /// rather than measuring into a log it can never write.
    pub fn init(&mut self) -> Result<()> {
        if self.storage.exists(&self.path) {
            info!("storage: appending to existing {}", self.path);
            return Ok(());
        }
        info!("storage: creating {} with csv header", self.path);
        self.storage
            .append(&self.path, csv_header(self.units).as_bytes())
            .map_err(Error::Storage)
    }

    /// Access to the storage backend for maintenance (readback, wipe).
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<S: StoragePort> Sink for PersistSink<S> {
    fn deliver(&mut self, reading: &Reading) -> DeliveryStatus {
        let line = csv_record(reading);
        match self.storage.append(&self.path, line.as_bytes()) {
            Ok(()) => {
                info!("deliver: appended {} bytes to {}", line.len(), self.path);
                DeliveryStatus::Confirmed
            }
            Err(e) => {
                warn!("deliver: append to {} failed: {e}", self.path);
                DeliveryStatus::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use std::collections::HashMap;

    /// In-memory storage backend.
    struct MemoryStorage {
        files: HashMap<String, Vec<u8>>,
        fail_writes: bool,
    }

    impl MemoryStorage {
        fn new() -> Self {
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

        fn append(&mut self, path: &str, data: &[u8]) -> std::result::Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::WriteFailed);
            }
            self.files
                .entry(path.to_string())
                .or_default()
                .extend_from_slice(data);
            Ok(())
        }

        fn read_all(&mut self, path: &str) -> std::result::Result<Vec<u8>, StorageError> {
            self.files.get(path).cloned().ok_or(StorageError::NotFound)
        }

        fn remove(&mut self, path: &str) -> std::result::Result<(), StorageError> {
            self.files.remove(path);
            Ok(())
        }
    }

    fn reading() -> Reading {
        let mut r = Reading::new(2);
        r.climate.temperature_c = 20.0;
        r
    }

    #[test]
    fn init_writes_header_once() {
        let mut sink = PersistSink::new(MemoryStorage::new(), "/no2-data.csv", 2);
        sink.init().unwrap();
        sink.init().unwrap();

        let contents = sink.storage_mut().read_all("/no2-data.csv").unwrap();
        let text = String::from_utf8(contents).unwrap();
        assert_eq!(text.matches("date,time").count(), 1);
        assert!(text.starts_with("date,time,latitude,longitude"));
    }

    #[test]
    fn init_skips_header_for_existing_file() {
        let mut storage = MemoryStorage::new();
        storage
            .append("/no2-data.csv", b"date,time,...\nold,row\n")
            .unwrap();
        let mut sink = PersistSink::new(storage, "/no2-data.csv", 2);
        sink.init().unwrap();

        let text =
            String::from_utf8(sink.storage_mut().read_all("/no2-data.csv").unwrap()).unwrap();
        assert_eq!(text.matches("date,time").count(), 1);
    }

    #[test]
    fn deliver_appends_one_line() {
        let mut sink = PersistSink::new(MemoryStorage::new(), "/no2-data.csv", 2);
        sink.init().unwrap();

        assert_eq!(sink.deliver(&reading()), DeliveryStatus::Confirmed);
        assert_eq!(sink.deliver(&reading()), DeliveryStatus::Confirmed);

        let text =
            String::from_utf8(sink.storage_mut().read_all("/no2-data.csv").unwrap()).unwrap();
        assert_eq!(text.lines().count(), 3); // header + 2 records
    }

    #[test]
    fn write_failure_reports_failed() {
        let mut sink = PersistSink::new(MemoryStorage::new(), "/no2-data.csv", 2);
        sink.init().unwrap();
        sink.storage_mut().fail_writes = true;

        assert_eq!(sink.deliver(&reading()), DeliveryStatus::Failed);
    }

    #[test]
    fn init_failure_is_an_error() {
        let mut storage = MemoryStorage::new();
        storage.fail_writes = true;
        let mut sink = PersistSink::new(storage, "/no2-data.csv", 2);
        assert!(sink.init().is_err());
    }
}
