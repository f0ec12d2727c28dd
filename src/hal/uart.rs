//! ESP-IDF UART transports.
//!
//! `UartConsole` carries the interactive terminal, `UartLogPort` the
//! TX-only diagnostic log.

use esp_idf_svc::hal::delay::{BLOCK, NON_BLOCK};
use esp_idf_svc::hal::uart::{UartDriver, UartTxDriver};

use super::ByteIo;

/// Terminal transport on a full-duplex UART.
pub struct UartConsole<'d> {
    uart: UartDriver<'d>,
    /// Byte pulled in by `rx_ready`, handed out by the next `read_byte`.
    peeked: Option<u8>,
}

impl<'d> UartConsole<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart, peeked: None }
    }
}

impl ByteIo for UartConsole<'_> {
    fn rx_ready(&mut self) -> bool {
        if self.peeked.is_some() {
            return true;
        }
        let mut buf = [0u8; 1];
        match self.uart.read(&mut buf, NON_BLOCK) {
            Ok(1) => {
                self.peeked = Some(buf[0]);
                true
            }
            _ => false,
        }
    }

    fn read_byte(&mut self) -> u8 {
        if let Some(b) = self.peeked.take() {
            return b;
        }
        let mut buf = [0u8; 1];
        loop {
            if let Ok(1) = self.uart.read(&mut buf, BLOCK) {
                return buf[0];
            }
        }
    }

    fn write_byte(&mut self, byte: u8) {
        let _ = self.uart.write(&[byte]);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let _ = self.uart.write(bytes);
    }

    fn tx_empty(&mut self) -> bool {
        self.uart.wait_tx_done(NON_BLOCK).is_ok()
    }

    fn flush(&mut self) {
        let _ = self.uart.wait_tx_done(BLOCK);
    }
}

/// TX-only diagnostic port fed by `log_drain`.
pub struct UartLogPort<'d> {
    uart: UartTxDriver<'d>,
}

impl<'d> UartLogPort<'d> {
    pub fn new(uart: UartTxDriver<'d>) -> Self {
        Self { uart }
    }
}

impl ByteIo for UartLogPort<'_> {
    fn rx_ready(&mut self) -> bool {
        false
    }

    fn read_byte(&mut self) -> u8 {
        0
    }

    fn write_byte(&mut self, byte: u8) {
        let _ = self.uart.write(&[byte]);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let _ = self.uart.write(bytes);
    }
}
