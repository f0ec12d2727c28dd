//! Log output on the diagnostic port.
//!
//! Formats entries from a [`LogStream`] and writes them to any
//! [`ByteIo`]. Firmware points this at a secondary UART; the host build
//! writes to stderr.
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32 GPIO17 (TX) ──────▶ USB-UART RX
//!                            └─▶ PC Serial Monitor
//! ```

use crate::hal::ByteIo;
use crate::logging::{LogEntry, LogStream};

/// Diagnostic port configuration.
///
/// The TX pin is handed to `init_log_uart` as a peripheral.
pub struct LogDrainConfig {
    pub baud_rate: u32,
}

impl Default for LogDrainConfig {
    fn default() -> Self {
        Self { baud_rate: 115200 }
    }
}

/// Format log entry.
///
/// Format: `[timestamp_us] LEVEL: message\r\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    crate::logging::format_to_buffer(
        buf,
        format_args!(
            "[{:10}] {}: {}\r\n",
            entry.timestamp_us,
            entry.level.as_str(),
            entry.message()
        ),
    )
}

/// Write every queued entry to `out`, then a drop report if any were lost.
///
/// Returns the number of entries written.
pub fn drain_into<const N: usize>(stream: &LogStream<N>, out: &mut dyn ByteIo) -> usize {
    let mut format_buf = [0u8; 128];
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut format_buf);
        out.write_bytes(&format_buf[..len]);
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let len = crate::logging::format_to_buffer(
            &mut format_buf,
            format_args!("[WARN] Dropped: {}\r\n", dropped),
        );
        out.write_bytes(&format_buf[..len]);
        stream.reset_dropped();
    }

    count
}

/// Open the diagnostic UART, TX only.
#[cfg(target_os = "espidf")]
pub fn init_log_uart<'d>(
    uart: impl esp_idf_svc::hal::peripheral::Peripheral<P = esp_idf_svc::hal::uart::UART1> + 'd,
    tx_pin: impl esp_idf_svc::hal::peripheral::Peripheral<P = impl esp_idf_svc::hal::gpio::OutputPin>
        + 'd,
    config: &LogDrainConfig,
) -> Result<esp_idf_svc::hal::uart::UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    use esp_idf_svc::hal::{gpio, uart};

    let uart_config =
        uart::config::Config::default().baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    uart::UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    struct Sink(Vec<u8>);

    impl ByteIo for Sink {
        fn rx_ready(&mut self) -> bool {
            false
        }
        fn read_byte(&mut self) -> u8 {
            0
        }
        fn write_byte(&mut self, byte: u8) {
            self.0.push(byte);
        }
    }

    #[test]
    fn test_format_log_entry() {
        let mut entry = LogEntry {
            timestamp_us: 1234567,
            level: LogLevel::Info,
            ..LogEntry::default()
        };
        entry.msg[..11].copy_from_slice(b"mode -> SPI");
        entry.len = 11;

        let mut buf = [0u8; 128];
        let len = format_log_entry(&entry, &mut buf);

        let formatted = core::str::from_utf8(&buf[..len]).unwrap();
        assert_eq!(formatted, "[   1234567] INFO: mode -> SPI\r\n");
    }

    #[test]
    fn test_format_truncated_message() {
        let mut entry = LogEntry {
            timestamp_us: 999,
            level: LogLevel::Error,
            ..LogEntry::default()
        };
        entry.msg[..10].copy_from_slice(b"TEST12345X");
        entry.len = 5;

        let mut buf = [0u8; 128];
        let len = format_log_entry(&entry, &mut buf);

        let formatted = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(formatted.contains("ERROR"));
        assert!(formatted.contains("TEST1"));
        assert!(!formatted.contains('X'));
    }

    #[test]
    fn test_drain_into_reports_drops() {
        let stream = LogStream::<2>::new();
        stream.push(1, LogLevel::Info, b"one");
        stream.push(2, LogLevel::Info, b"two");
        stream.push(3, LogLevel::Info, b"three");

        let mut sink = Sink(Vec::new());
        assert_eq!(drain_into(&stream, &mut sink), 2);

        let text = String::from_utf8(sink.0).unwrap();
        assert!(text.contains("INFO: one"));
        assert!(text.contains("INFO: two"));
        assert!(text.ends_with("[WARN] Dropped: 1\r\n"));
        assert_eq!(stream.dropped(), 0);
    }
}
