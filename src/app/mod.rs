//! Application core — pure domain logic, zero I/O.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping the acquisition/delivery pipeline fully testable
//! without real peripherals.

pub mod ports;
