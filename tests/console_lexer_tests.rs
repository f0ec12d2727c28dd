//! Numeric lexer tests

use buspirate_console::config::DisplayMode;
use buspirate_console::console::lexer::{get_int, get_numbits, get_repeat, read_format, skip_spaces};
use buspirate_console::console::{CommandRing, ConsoleError};

fn line(text: &str) -> CommandRing<64> {
    line_at(0, text)
}

fn line_at(start: usize, text: &str) -> CommandRing<64> {
    let mut ring = CommandRing::new();
    ring.reset_to(start);
    for b in text.bytes() {
        ring.push(b);
    }
    ring.commit();
    ring
}

#[test]
fn test_bare_prefix_is_zero() {
    let mut ring = line("0x]");
    assert_eq!(get_int(&mut ring), Ok(0));
    assert_eq!(ring.peek(), b']');

    let mut ring = line("0B");
    assert_eq!(get_int(&mut ring), Ok(0));
    assert_eq!(ring.peek(), 0);
}

#[test]
fn test_binary_stops_at_non_binary_digit() {
    let mut ring = line("0b1012");
    assert_eq!(get_int(&mut ring), Ok(5));
    assert_eq!(ring.peek(), b'2');
}

#[test]
fn test_hex_mixed_case() {
    let mut ring = line("0xDeAdBeEf");
    assert_eq!(get_int(&mut ring), Ok(0xDEAD_BEEF));
    assert!(ring.peek() == 0);
}

#[test]
fn test_decimal_sequence() {
    let mut ring = line("12 34,0x56");

    assert_eq!(get_int(&mut ring), Ok(12));
    skip_spaces(&mut ring);
    assert_eq!(get_int(&mut ring), Ok(34));
    assert_eq!(ring.take(), b',');
    assert_eq!(get_int(&mut ring), Ok(0x56));
}

#[test]
fn test_literal_across_wrap() {
    let mut ring = line_at(60, "0x1234");
    assert_eq!(get_int(&mut ring), Ok(0x1234));
    assert_eq!(ring.start(), 2);
}

#[test]
fn test_u32_max_and_wrap() {
    assert_eq!(get_int(&mut line("4294967295")), Ok(u32::MAX));
    assert_eq!(get_int(&mut line("0x1FFFFFFFF")), Ok(u32::MAX));
}

#[test]
fn test_non_digit_is_invalid() {
    for text in ["x", ":", "-1", " 1"] {
        let mut ring = line(text);
        assert_eq!(get_int(&mut ring), Err(ConsoleError::InvalidValue), "{text:?}");
        assert_eq!(ring.start(), 0);
    }
}

#[test]
fn test_full_read_suffix() {
    let mut ring = line("b:4;12]");

    assert_eq!(read_format(&mut ring), Some(DisplayMode::Bin));
    assert_eq!(get_repeat(&mut ring), Ok(4));
    assert_eq!(get_numbits(&mut ring), Ok(12));
    assert_eq!(ring.peek(), b']');
}

#[test]
fn test_numbits_without_literal_is_error() {
    let mut ring = line(";]");
    assert_eq!(get_numbits(&mut ring), Err(ConsoleError::InvalidValue));
    assert_eq!(ring.peek(), b']');
}

#[test]
fn test_read_format_letters() {
    for (c, mode) in [
        ("x", DisplayMode::Hex),
        ("d", DisplayMode::Dec),
        ("b", DisplayMode::Bin),
        ("w", DisplayMode::Raw),
    ] {
        assert_eq!(read_format(&mut line(c)), Some(mode));
    }
    assert_eq!(read_format(&mut line("h")), None);
}

#[test]
fn test_every_16_bit_value_in_each_base() {
    for value in 0..=0xFFFFu32 {
        for text in [
            format!("{value}"),
            format!("0x{value:X}"),
            format!("0b{value:b}"),
        ] {
            let mut ring = line(&text);
            assert_eq!(get_int(&mut ring), Ok(value), "{text}");
            assert_eq!(ring.peek(), 0, "{text}");
        }
    }
}
