//! Numeric lexer
//!
//! Reads integer literals and argument suffixes at the ring's consume
//! cursor. Successful reads advance past what they used; failures leave
//! the cursor on the offending byte so the dispatcher can report it.
//!
//! Literal forms:
//!
//! ```text
//! [1-9][0-9]*        decimal
//! 0                  zero
//! 0[bB][01]*         binary
//! 0[xX][0-9a-fA-F]*  hex
//! 0[0-9]+            decimal, leading zero ignored
//! ```
//!
//! Values wrap silently at 32 bits.

use super::ring::CommandRing;
use super::ConsoleError;
use crate::config::DisplayMode;

/// Accumulate digits of `radix` starting `*i` bytes past the cursor.
fn digits<const N: usize>(ring: &CommandRing<N>, i: &mut usize, radix: u32) -> u32 {
    let mut number: u32 = 0;
    while let Some(d) = char::from(ring.peek_at(*i)).to_digit(radix) {
        number = number.wrapping_mul(radix).wrapping_add(d);
        *i += 1;
    }
    number
}

/// Parse an integer literal at the cursor.
pub fn get_int<const N: usize>(ring: &mut CommandRing<N>) -> Result<u32, ConsoleError> {
    let mut i = 0;

    let number = match ring.peek() {
        b'1'..=b'9' => digits(ring, &mut i, 10),
        b'0' => {
            i = 1;
            match ring.peek_at(1) {
                b'b' | b'B' => {
                    i = 2;
                    digits(ring, &mut i, 2)
                }
                b'x' | b'X' => {
                    i = 2;
                    digits(ring, &mut i, 16)
                }
                b'0'..=b'9' => digits(ring, &mut i, 10),
                _ => 0,
            }
        }
        _ => return Err(ConsoleError::InvalidValue),
    };

    ring.advance_by(i);
    Ok(number)
}

/// `:<int>` repeat suffix; 1 when absent.
pub fn get_repeat<const N: usize>(ring: &mut CommandRing<N>) -> Result<u32, ConsoleError> {
    if ring.peek() == b':' {
        ring.advance();
        return get_int(ring);
    }
    Ok(1)
}

/// `;<int>` bit-width suffix; 0 when absent.
pub fn get_numbits<const N: usize>(ring: &mut CommandRing<N>) -> Result<u32, ConsoleError> {
    if ring.peek() == b';' {
        ring.advance();
        return get_int(ring);
    }
    Ok(0)
}

/// One-shot display override right after `r`.
pub fn read_format<const N: usize>(ring: &mut CommandRing<N>) -> Option<DisplayMode> {
    let mode = DisplayMode::from_suffix(ring.peek())?;
    ring.advance();
    Some(mode)
}

/// Skip spaces between a command and its argument.
pub fn skip_spaces<const N: usize>(ring: &mut CommandRing<N>) {
    while ring.peek() == b' ' {
        ring.advance();
    }
}
