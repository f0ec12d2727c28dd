//! Interactive menu prompts
//!
//! Blocking sub-dialogs used when a command is given without its
//! argument. They read straight from the transport, bypassing the line
//! editor.

use super::term::TermWrite;
use crate::config::{PROMPT_INT_DIGITS, PROMPT_LONG_DIGITS};
use crate::hal::ByteIo;

/// Ask for a small number.
///
/// Shows `(default)>` (or `(x)>` for a negative default). Returns
/// `None` when the user aborts with `x` and `allow_exit` is set; empty
/// input yields `default`. Out-of-range answers re-prompt.
pub fn get_number(
    io: &mut dyn ByteIo,
    default: i32,
    min: i32,
    max: i32,
    allow_exit: bool,
) -> Option<i32> {
    prompt::<PROMPT_INT_DIGITS>(io, default.into(), min.into(), max.into(), allow_exit)
        .map(|v| v as i32)
}

/// Like [`get_number`] with room for ten digits.
pub fn get_long(
    io: &mut dyn ByteIo,
    default: i64,
    min: i64,
    max: i64,
    allow_exit: bool,
) -> Option<i64> {
    prompt::<PROMPT_LONG_DIGITS>(io, default, min, max, allow_exit)
}

/// Ask `Are you sure? `; true on `y` or `Y`.
pub fn confirm(io: &mut dyn ByteIo) -> bool {
    io.put_str("Are you sure? ");
    let c = io.read_byte();
    io.write_byte(c);
    io.newline();
    matches!(c, b'y' | b'Y')
}

fn prompt<const DIGITS: usize>(
    io: &mut dyn ByteIo,
    default: i64,
    min: i64,
    max: i64,
    allow_exit: bool,
) -> Option<i64> {
    loop {
        io.put_str("\r\n(");
        if default < 0 {
            io.put_str("x");
        } else {
            io.put_fmt(format_args!("{}", default));
        }
        io.put_str(")>");

        let mut buf = [0u8; DIGITS];
        let mut len = 0;
        let mut negative = false;

        loop {
            match io.read_byte() {
                0x08 => {
                    if len > 0 {
                        len -= 1;
                        io.put_str("\x08 \x08");
                    } else if negative {
                        negative = false;
                        io.put_str("\x08 \x08");
                    } else {
                        io.bell();
                    }
                }
                b'\r' | b'\n' => break,
                b'-' if len == 0 && !negative => {
                    io.write_byte(b'-');
                    negative = true;
                }
                b'x' if allow_exit => return None,
                c @ b'0'..=b'9' if len < DIGITS => {
                    io.write_byte(c);
                    buf[len] = c;
                    len += 1;
                }
                _ => io.bell(),
            }
        }
        io.newline();

        if len == 0 {
            return Some(default);
        }

        let value = buf[..len]
            .iter()
            .fold(0i64, |acc, &c| acc * 10 + i64::from(c - b'0'));

        if (min..=max).contains(&value) {
            return Some(if negative { -value } else { value });
        }

        io.put_str("\r\nInvalid choice, try again\r\n");
    }
}
