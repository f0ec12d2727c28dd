//! Hardware Abstraction Layer for the console.
//!
//! Thin traits over the serial transport and the board.
//! Business logic stays in `console`, HAL is just I/O.

#[cfg(target_os = "espidf")]
pub mod uart;

/// Byte-oriented terminal transport.
pub trait ByteIo {
    /// A received byte is waiting.
    fn rx_ready(&mut self) -> bool;

    /// Read one byte, blocking until one arrives.
    fn read_byte(&mut self) -> u8;

    /// Queue one byte for transmission.
    fn write_byte(&mut self, byte: u8);

    /// Queue a run of bytes.
    fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }

    /// Transmit path is idle.
    fn tx_empty(&mut self) -> bool {
        true
    }

    /// Report and clear a receiver overrun.
    fn take_comms_error(&mut self) -> bool {
        false
    }

    /// Block until everything queued has left the wire.
    fn flush(&mut self) {
        while !self.tx_empty() {}
    }
}

/// ADC inputs the console reads directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcChannel {
    Rail3v3,
    Rail5v,
    Vpullup,
    Probe,
}

/// Bus pins shown in the pin-state table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pin {
    Aux,
    Clk,
    Mosi,
    Cs,
    Miso,
}

impl Pin {
    pub const ALL: [Pin; 5] = [Pin::Aux, Pin::Clk, Pin::Mosi, Pin::Cs, Pin::Miso];
}

/// Direction and level of one pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinState {
    pub input: bool,
    pub high: bool,
}

/// On-board pull-up source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullupVoltage {
    Off,
    V3v3,
    V5,
}

/// Identification strings and registers shown by `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// e.g. "Bus Pirate v3.5"
    pub hardware: &'static str,
    /// Bootloader version, if the board has one.
    pub bootloader: Option<(u8, u8)>,
    pub device_id: u16,
    pub revision: u16,
    /// MCU part and silicon revision, e.g. "24FJ64GA002 B8".
    pub chip: &'static str,
    /// Configuration words.
    pub config_words: [u16; 2],
}

/// Board services consumed by the console.
///
/// Instruments that live outside the console (frequency counter, PWM,
/// servo, probes, self test) default to doing nothing.
pub trait Hardware {
    /// Return all pins and peripherals to their power-on state.
    fn reinit(&mut self);

    fn set_vreg(&mut self, on: bool);
    fn vreg_enabled(&mut self) -> bool;

    fn set_pullups(&mut self, on: bool);
    fn pullups_enabled(&mut self) -> bool;

    fn set_pullup_voltage(&mut self, voltage: PullupVoltage);

    /// Sample one channel, in millivolts.
    fn read_millivolts(&mut self, channel: AdcChannel) -> u32;

    fn set_aux(&mut self, role: crate::config::AuxRole, high: bool);
    fn read_aux(&mut self, role: crate::config::AuxRole) -> bool;

    fn pin_state(&mut self, pin: Pin) -> PinState;

    fn delay_us(&mut self, us: u32);
    fn delay_ms(&mut self, ms: u32);

    /// Microseconds since boot, for log timestamps.
    fn now_us(&mut self) -> i64;

    fn set_mode_led(&mut self, on: bool);

    /// Apply a terminal speed choice; `brg` is the raw divisor for choice 9.
    fn set_terminal_speed(&mut self, speed: u8, brg: Option<u16>);

    fn device_info(&mut self) -> DeviceInfo;

    /// Hand the transport to the binary bit-bang protocol until it exits.
    fn enter_binary_mode(&mut self, io: &mut dyn ByteIo);

    /// Hand the transport to the SUMP logic analyzer until it exits.
    fn enter_sump_mode(&mut self, _io: &mut dyn ByteIo) {}

    /// Software reset. Never returns.
    fn reset(&mut self) -> !;

    /// Jump to the bootloader. Never returns.
    fn jump_to_bootloader(&mut self) -> !;

    fn self_test(&mut self, _io: &mut dyn ByteIo) {}
    fn measure_frequency(&mut self, _io: &mut dyn ByteIo) {}
    fn pwm(&mut self, _io: &mut dyn ByteIo) {}
    fn servo(&mut self, _io: &mut dyn ByteIo) {}
    fn voltmeter(&mut self, _io: &mut dyn ByteIo) {}
}
