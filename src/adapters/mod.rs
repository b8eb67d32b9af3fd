//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements                         | Connects to              |
//! |--------------|------------------------------------|--------------------------|
//! | `board`      | ClimateSensorPort, PressureSensorPort, GasAdcPort, GpsUartPort, ToggleInputPort, IndicatorPort | ESP32 I2C / UART / GPIO |
//! | `clock`      | ClockPort                          | esp_timer + FreeRTOS     |
//! | `sd_storage` | StoragePort                        | SD card over SPI         |
//! | `lora_modem` | RadioPort                          | LoRaWAN AT modem on UART |
//!
//! Everything here is ESP-IDF-only; host-target tests substitute mocks
//! for the same port traits.

#[cfg(target_os = "espidf")]
pub mod board;
#[cfg(target_os = "espidf")]
pub mod clock;
#[cfg(target_os = "espidf")]
pub mod lora_modem;
#[cfg(target_os = "espidf")]
pub mod sd_storage;
