//! LoRaWAN AT-modem adapter (RN2483-class module on UART).
//!
//! The modem owns join/session state and the MAC entirely; this adapter
//! only hex-encodes payloads into `mac tx` commands and classifies the
//! modem's asynchronous response lines into [`TransmitEvent`]s.
//!
//! Protocol per uplink:
//!
//! ```text
//! → mac tx cnf 1 <hex payload>
//! ← ok                      (command accepted, radio busy now)
//! ← mac_tx_ok | mac_err     (seconds later, after the RX windows)
//! ```

use core::fmt::Write as _;

use esp_idf_hal::uart::UartDriver;
use log::{info, warn};

use crate::app::ports::{RadioPort, TransmitEvent};

/// LoRaWAN port number for data uplinks.
const UPLINK_PORT: u8 = 1;

pub struct LoraModem {
    uart: UartDriver<'static>,
    line: heapless::Vec<u8, 96>,
}

impl LoraModem {
    pub fn new(uart: UartDriver<'static>) -> Self {
        Self {
            uart,
            line: heapless::Vec::new(),
        }
    }

    fn send_line(&mut self, command: &str) {
        if self.uart.write(command.as_bytes()).is_err() || self.uart.write(b"\r\n").is_err() {
            warn!("deliver: modem UART write failed");
        }
    }

    /// Pull one complete response line from the UART, if available.
    fn poll_line(&mut self) -> Option<heapless::String<96>> {
        let mut byte = [0u8; 1];
        while let Ok(1) = self.uart.read(&mut byte, 0) {
            match byte[0] {
                b'\r' => {}
                b'\n' => {
                    let mut line = heapless::String::new();
                    for &b in &self.line {
                        let _ = line.push(b as char);
                    }
                    self.line.clear();
                    if !line.is_empty() {
                        return Some(line);
                    }
                }
                b => {
                    if self.line.push(b).is_err() {
                        // Overlong garbage line; start over.
                        self.line.clear();
                    }
                }
            }
        }
        None
    }
}

impl RadioPort for LoraModem {
    fn submit(&mut self, payload: &[u8]) {
        let mut command: heapless::String<224> = heapless::String::new();
        let _ = write!(command, "mac tx cnf {UPLINK_PORT} ");
        for &byte in payload {
            let _ = write!(command, "{byte:02X}");
        }
        self.send_line(&command);
        info!("deliver: uplink of {} bytes submitted", payload.len());
    }

    fn poll_event(&mut self) -> Option<TransmitEvent> {
        while let Some(line) = self.poll_line() {
            match line.as_str() {
                // Immediate command echo — not the outcome yet.
                "ok" => {}
                "mac_tx_ok" => return Some(TransmitEvent::Acked),
                "mac_err" | "invalid_data_len" | "not_joined" | "busy" => {
                    warn!("deliver: modem reported '{line}'");
                    return Some(TransmitEvent::NotAcked);
                }
                other => info!("deliver: modem: {other}"),
            }
        }
        None
    }
}
