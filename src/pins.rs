//! GPIO / peripheral pin assignments for the Heltec ESP32 LoRa board.
//!
//! Single source of truth — every adapter references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// I2C bus (SHT31, BMP180, both ADS1115 converters)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;

/// SHT31 temperature/humidity sensor, default address strap.
pub const SHT31_I2C_ADDR: u8 = 0x44;
/// BMP180 barometric pressure sensor (fixed address).
pub const BMP180_I2C_ADDR: u8 = 0x77;
/// ADS1115 differential ADC, one per NO2 sensor unit.
/// Unit 0 has ADDR tied to GND, unit 1 to VDD.
pub const ADS1115_I2C_ADDRS: [u8; 2] = [0x48, 0x49];

// ---------------------------------------------------------------------------
// GPS (UART1, NEO-6M at 9600 baud)
// ---------------------------------------------------------------------------

pub const GPS_UART_TX_GPIO: i32 = 17;
pub const GPS_UART_RX_GPIO: i32 = 16;
pub const GPS_BAUD: u32 = 9600;

// ---------------------------------------------------------------------------
// SD card (SPI, persist deployments only)
// ---------------------------------------------------------------------------

pub const SD_SPI_SCK_GPIO: i32 = 5;
pub const SD_SPI_MOSI_GPIO: i32 = 27;
pub const SD_SPI_MISO_GPIO: i32 = 19;
pub const SD_SPI_CS_GPIO: i32 = 23;

// ---------------------------------------------------------------------------
// LoRa modem (UART2, transmit deployments only)
// ---------------------------------------------------------------------------

pub const LORA_UART_TX_GPIO: i32 = 12;
pub const LORA_UART_RX_GPIO: i32 = 13;
pub const LORA_BAUD: u32 = 57_600;

// ---------------------------------------------------------------------------
// Toggle-mode controls
// ---------------------------------------------------------------------------

/// Momentary push-button (active-low, external pull-up) that flips
/// between measure-only and drain-queue mode.
pub const BUTTON_GPIO: i32 = 0;
/// Indicator LED mirroring the send-mode latch.
pub const LED_GPIO: i32 = 25;
