//! Sensor bus drivers, generic over `embedded-hal` 1.0 traits.
//!
//! Each driver speaks one chip's register protocol and nothing else;
//! the ESP-IDF adapters instantiate them with the real I2C bus and map
//! their typed errors onto the port contracts.

pub mod ads1115;
pub mod bmp180;
pub mod sht31;
