//! Bus protocol capability table
//!
//! Every bus mode (HiZ, 1-Wire, UART, I2C, SPI, ...) is one [`Protocol`]
//! implementation. The console only knows the active table index and
//! forwards primitives to it; it never depends on a concrete bus.

use crate::config::ModeConfig;
use crate::console::term::TermWrite;
use crate::hal::ByteIo;

/// Printed by primitives a protocol does not support.
pub const NO_EFFECT: &str = "ERROR: command has no effect here";

fn no_effect(io: &mut dyn ByteIo) {
    io.put_line(NO_EFFECT);
}

/// One bus mode.
///
/// Only `name` is required. Primitives default to printing
/// [`NO_EFFECT`]; lifecycle hooks default to doing nothing.
pub trait Protocol {
    /// Shown in the prompt and the mode menu.
    fn name(&self) -> &'static str;

    /// Configure after a switch into this mode. May prompt the user and
    /// adjust the freshly reset mode configuration.
    fn setup(&mut self, _mode: &mut ModeConfig, _io: &mut dyn ByteIo) {}

    /// Release pins and peripherals before leaving the mode or powering down.
    fn cleanup(&mut self, _io: &mut dyn ByteIo) {}

    /// Connect the pins once the supplies are up.
    fn get_ready(&mut self, _io: &mut dyn ByteIo) {}

    fn start(&mut self, io: &mut dyn ByteIo) {
        no_effect(io);
    }

    fn start_with_read(&mut self, io: &mut dyn ByteIo) {
        no_effect(io);
    }

    fn stop(&mut self, io: &mut dyn ByteIo) {
        no_effect(io);
    }

    fn stop_from_read(&mut self, io: &mut dyn ByteIo) {
        no_effect(io);
    }

    /// Write one value, returning whatever was clocked back.
    fn send(&mut self, _value: u32, io: &mut dyn ByteIo) -> u32 {
        no_effect(io);
        0
    }

    fn read(&mut self, io: &mut dyn ByteIo) -> u32 {
        no_effect(io);
        0
    }

    fn clock_high(&mut self, io: &mut dyn ByteIo) {
        no_effect(io);
    }

    fn clock_low(&mut self, io: &mut dyn ByteIo) {
        no_effect(io);
    }

    fn clock_pulse(&mut self, io: &mut dyn ByteIo) {
        no_effect(io);
    }

    fn data_high(&mut self, io: &mut dyn ByteIo) {
        no_effect(io);
    }

    fn data_low(&mut self, io: &mut dyn ByteIo) {
        no_effect(io);
    }

    fn data_state(&mut self, io: &mut dyn ByteIo) -> bool {
        no_effect(io);
        false
    }

    fn read_bit(&mut self, io: &mut dyn ByteIo) -> bool {
        no_effect(io);
        false
    }

    /// Background work while the console waits for a key.
    ///
    /// Returns true if anything was printed, so the prompt gets redrawn.
    fn periodic_update(&mut self, _io: &mut dyn ByteIo) -> bool {
        false
    }

    /// Protocol macro `(n)`.
    fn run_macro(&mut self, _n: u32, io: &mut dyn ByteIo) {
        no_effect(io);
    }

    /// Extra lines for the `i` status screen.
    fn print_settings(&mut self, _io: &mut dyn ByteIo) {}

    /// Labels for CLK, MOSI, CS and MISO in the pin table.
    fn print_pins_state(&mut self, io: &mut dyn ByteIo) {
        io.put_str("-\t-\t-\t-");
    }
}

/// The inert high-impedance mode, always entry 0 of the table.
#[derive(Debug, Default, Clone, Copy)]
pub struct HiZ;

impl Protocol for HiZ {
    fn name(&self) -> &'static str {
        "HiZ"
    }
}

/// Protocols indexed by bus mode.
pub trait ProtocolTable {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn protocol(&self, index: usize) -> &dyn Protocol;

    fn protocol_mut(&mut self, index: usize) -> &mut dyn Protocol;

    /// Names in table order.
    fn names(&self) -> Names<'_, Self>
    where
        Self: Sized,
    {
        Names { table: self, next: 0 }
    }
}

impl<'a, const N: usize> ProtocolTable for [&'a mut dyn Protocol; N] {
    fn len(&self) -> usize {
        N
    }

    fn protocol(&self, index: usize) -> &dyn Protocol {
        &*self[index]
    }

    fn protocol_mut(&mut self, index: usize) -> &mut dyn Protocol {
        &mut *self[index]
    }
}

/// Iterator over protocol names.
pub struct Names<'a, T> {
    table: &'a T,
    next: usize,
}

impl<'a, T: ProtocolTable> Iterator for Names<'a, T> {
    type Item = &'static str;

    fn next(&mut self) -> Option<&'static str> {
        if self.next >= self.table.len() {
            return None;
        }
        let name = self.table.protocol(self.next).name();
        self.next += 1;
        Some(name)
    }
}
