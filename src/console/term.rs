//! Terminal output helpers
//!
//! Formatting on top of any [`ByteIo`] without heap allocation.

use core::fmt::{self, Write};

use crate::config::{DisplayMode, BELL};
use crate::hal::ByteIo;

/// Adapter so `write!` can target a byte transport.
pub struct Term<'a, T: ?Sized> {
    io: &'a mut T,
}

impl<'a, T: ByteIo + ?Sized> Term<'a, T> {
    pub fn new(io: &'a mut T) -> Self {
        Self { io }
    }
}

impl<T: ByteIo + ?Sized> Write for Term<'_, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.io.write_bytes(s.as_bytes());
        Ok(())
    }
}

/// Output conveniences available on every transport.
pub trait TermWrite: ByteIo {
    fn put_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    fn put_line(&mut self, s: &str) {
        self.put_str(s);
        self.newline();
    }

    fn put_fmt(&mut self, args: fmt::Arguments<'_>) {
        let _ = Term::new(self).write_fmt(args);
    }

    fn newline(&mut self) {
        self.write_bytes(b"\r\n");
    }

    fn bell(&mut self) {
        self.write_byte(BELL);
    }

    fn put_dec(&mut self, value: u32) {
        self.put_fmt(format_args!("{}", value));
    }

    /// `0x` and two hex digits.
    fn put_hex8(&mut self, value: u32) {
        self.put_fmt(format_args!("0x{:02X}", value & 0xFF));
    }

    /// `0x` and four hex digits.
    fn put_hex16(&mut self, value: u32) {
        self.put_fmt(format_args!("0x{:04X}", value & 0xFFFF));
    }

    /// `0b` and the low `bits` bits, most significant first.
    fn put_bin(&mut self, value: u32, bits: u8) {
        self.put_str("0b");
        for i in (0..u32::from(bits.clamp(1, 32))).rev() {
            self.write_byte(if value & (1 << i) != 0 { b'1' } else { b'0' });
        }
    }

    /// A bus value in the given display mode.
    fn put_value(&mut self, value: u32, display: DisplayMode, numbits: u8, int16: bool) {
        match display {
            DisplayMode::Hex if int16 => self.put_hex16(value),
            DisplayMode::Hex => self.put_hex8(value),
            DisplayMode::Dec if int16 => self.put_dec(value & 0xFFFF),
            DisplayMode::Dec => self.put_dec(value & 0xFF),
            DisplayMode::Bin => self.put_bin(value, numbits),
            DisplayMode::Raw => {
                if int16 {
                    self.write_byte((value >> 8) as u8);
                }
                self.write_byte(value as u8);
            }
        }
    }

    /// Millivolts as `V.VV`.
    fn put_volts(&mut self, millivolts: u32) {
        self.put_fmt(format_args!("{}.{:02}", millivolts / 1000, (millivolts % 1000) / 10));
    }

    /// Pin or bit level as `1` / `0`.
    fn put_state(&mut self, high: bool) {
        self.write_byte(if high { b'1' } else { b'0' });
    }

    fn cursor_left(&mut self, n: usize) {
        match n {
            0 => {}
            1 => self.put_str("\x1B[D"),
            _ => self.put_fmt(format_args!("\x1B[{}D", n)),
        }
    }

    fn cursor_right(&mut self, n: usize) {
        match n {
            0 => {}
            1 => self.put_str("\x1B[C"),
            _ => self.put_fmt(format_args!("\x1B[{}C", n)),
        }
    }

    /// Erase the current line and return to column 0.
    fn clear_line(&mut self) {
        self.put_str("\x1B[2K\r");
    }
}

impl<T: ByteIo + ?Sized> TermWrite for T {}
