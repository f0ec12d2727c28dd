//! Line editor tests

mod common;

use buspirate_console::console::{CommandRing, Edit, LineEditor};
use common::ScriptIo;

struct Session {
    editor: LineEditor,
    ring: CommandRing<64>,
    io: ScriptIo,
}

impl Session {
    fn new() -> Self {
        Self {
            editor: LineEditor::new(),
            ring: CommandRing::new(),
            io: ScriptIo::new(),
        }
    }

    fn feed(&mut self, bytes: &[u8]) -> Edit {
        let mut last = Edit::Pending;
        for &b in bytes {
            last = self.editor.feed(b, &mut self.ring, &mut self.io, "HiZ");
        }
        last
    }

    fn live(&self) -> Vec<u8> {
        self.ring.live().collect()
    }

    /// Commit `line` and start a fresh one after it.
    fn enter(&mut self, line: &[u8]) {
        self.feed(line);
        assert_eq!(self.feed(b"\r"), Edit::LineReady);
        let next = self.ring.end();
        self.ring.reset_to(next);
        self.editor.begin_line(&self.ring);
    }
}

const LEFT: &[u8] = b"\x1B[D";
const RIGHT: &[u8] = b"\x1B[C";
const UP: &[u8] = b"\x1B[A";
const DOWN: &[u8] = b"\x1B[B";
const HOME: &[u8] = b"\x1B[1~";
const END: &[u8] = b"\x1B[4~";

#[test]
fn test_typing_echoes_and_stores() {
    let mut s = Session::new();
    assert_eq!(s.feed(b"[0x55]"), Edit::Pending);

    assert_eq!(s.live(), b"[0x55]");
    assert_eq!(s.io.take_output(), "[0x55]");
    assert_eq!(s.editor.cursor(), s.ring.end());
    assert_eq!(s.ring.get(s.ring.end()), 0);
}

#[test]
fn test_insert_then_backspace_restores_line() {
    let mut s = Session::new();
    s.feed(b"abc");
    s.feed(LEFT);
    s.feed(LEFT);
    s.feed(b"X");

    assert_eq!(s.live(), b"aXbc");
    assert_eq!(s.editor.cursor(), 2);

    s.feed(b"\x08");
    assert_eq!(s.live(), b"abc");
    assert_eq!(s.editor.cursor(), 1);
    assert_eq!(s.ring.get(s.ring.end()), 0);
}

#[test]
fn test_backspace_at_end() {
    let mut s = Session::new();
    s.feed(b"ab");
    s.io.take_output();

    s.feed(b"\x08");
    assert_eq!(s.live(), b"a");
    assert_eq!(s.io.take_output(), "\x08 \x08");
}

#[test]
fn test_delete_under_cursor() {
    let mut s = Session::new();
    s.feed(b"abc");
    s.feed(HOME);
    s.feed(RIGHT);
    s.feed(b"\x7F");

    assert_eq!(s.live(), b"ac");
    assert_eq!(s.editor.cursor(), 1);
}

#[test]
fn test_delete_at_end_rings_bell() {
    let mut s = Session::new();
    s.feed(b"ab");
    s.feed(b"\x04");

    assert_eq!(s.live(), b"ab");
    assert_eq!(s.io.bells(), 1);
}

#[test]
fn test_cursor_limits_ring_bell() {
    let mut s = Session::new();
    s.feed(RIGHT);
    s.feed(LEFT);
    s.feed(HOME);
    s.feed(END);
    assert_eq!(s.io.bells(), 4);

    s.feed(b"ab");
    s.feed(b"\x01");
    assert_eq!(s.editor.cursor(), s.ring.start());
    s.feed(b"\x05");
    assert_eq!(s.editor.cursor(), s.ring.end());
    assert_eq!(s.io.bells(), 4);
}

#[test]
fn test_home_end_sequences() {
    let mut s = Session::new();
    s.feed(b"abc");
    s.feed(HOME);
    s.feed(b"Z");
    assert_eq!(s.live(), b"Zabc");

    s.feed(END);
    s.feed(b"!");
    assert_eq!(s.live(), b"Zabc!");
}

#[test]
fn test_unknown_escape_is_dropped() {
    let mut s = Session::new();
    s.feed(b"\x1BO");
    s.feed(b"\x1B[Z");
    s.feed(b"\x1B[1x");
    assert!(s.live().is_empty());

    s.feed(b"a");
    assert_eq!(s.live(), b"a");
}

#[test]
fn test_control_byte_rings_bell() {
    let mut s = Session::new();
    s.feed(b"\x03");
    assert!(s.live().is_empty());
    assert_eq!(s.io.bells(), 1);
}

#[test]
fn test_full_ring_refuses_insert() {
    let mut editor = LineEditor::new();
    let mut ring = CommandRing::<8>::new();
    let mut io = ScriptIo::new();

    for b in b"123456" {
        editor.feed(*b, &mut ring, &mut io, "HiZ");
    }
    assert!(ring.is_full());

    assert!(!editor.insert(b'7', &mut ring, &mut io));
    assert_eq!(io.bells(), 1);
    assert_eq!(ring.live().collect::<Vec<_>>(), b"123456");

    assert_eq!(editor.feed(b'8', &mut ring, &mut io, "HiZ"), Edit::Overflow);
    assert_eq!(io.bells(), 2);

    assert_eq!(editor.feed(b'\r', &mut ring, &mut io, "HiZ"), Edit::LineReady);
    assert_eq!(ring.live().collect::<Vec<_>>(), b"123456\0");
}

#[test]
fn test_submit_commits_line() {
    let mut s = Session::new();
    s.feed(b"r:2");
    assert_eq!(s.feed(b"\r"), Edit::LineReady);

    assert_eq!(s.ring.live().collect::<Vec<_>>(), b"r:2\0");
    assert!(s.io.take_output().ends_with("\r\n"));
}

#[test]
fn test_twenty_nuls_enter_binary_mode() {
    let mut s = Session::new();
    for _ in 0..19 {
        assert_eq!(s.feed(&[0]), Edit::Pending);
    }
    assert_eq!(s.feed(&[0]), Edit::BinaryMode);

    // Counter starts over afterwards
    assert_eq!(s.feed(&[0]), Edit::Pending);
}

#[test]
fn test_typed_key_resets_nul_run() {
    let mut s = Session::new();
    for _ in 0..15 {
        s.feed(&[0]);
    }
    s.feed(b"a");
    for _ in 0..15 {
        assert_eq!(s.feed(&[0]), Edit::Pending);
    }
}

#[test]
fn test_nuls_then_left_enter_sump_mode() {
    let mut s = Session::new();
    s.feed(&[0; 5]);
    assert_eq!(s.feed(&[0x02]), Edit::SumpMode);

    let mut s = Session::new();
    s.feed(&[0; 5]);
    assert_eq!(s.feed(LEFT), Edit::SumpMode);
}

#[test]
fn test_short_nul_run_keeps_left_arrow() {
    let mut s = Session::new();
    s.feed(b"ab");
    s.feed(&[0; 4]);
    assert_eq!(s.feed(&[0x02]), Edit::Pending);
    assert_eq!(s.editor.cursor(), 1);
}

#[test]
fn test_history_walk() {
    let mut s = Session::new();
    s.enter(b"A");
    s.enter(b"B");
    s.enter(b"C");
    s.io.take_output();

    s.feed(UP);
    assert_eq!(s.live(), b"C");
    assert_eq!(s.io.take_output(), "\x1B[2K\rHiZ>C");

    s.feed(UP);
    assert_eq!(s.live(), b"B");
    s.feed(UP);
    assert_eq!(s.live(), b"A");
    assert_eq!(s.editor.history_position(), 3);

    s.io.take_output();
    s.feed(UP);
    assert_eq!(s.live(), b"A");
    assert_eq!(s.io.bells(), 1);

    s.feed(DOWN);
    assert_eq!(s.live(), b"B");
    s.feed(DOWN);
    assert_eq!(s.live(), b"C");
    s.feed(DOWN);
    assert!(s.live().is_empty());
    assert_eq!(s.editor.history_position(), 0);

    s.io.take_output();
    s.feed(DOWN);
    assert_eq!(s.io.bells(), 1);
}

#[test]
fn test_recalled_line_is_editable() {
    let mut s = Session::new();
    s.enter(b"0x10");
    s.feed(&[0x10]);
    s.feed(b"\x08");
    s.feed(b"1");

    assert_eq!(s.live(), b"0x11");
    assert_eq!(s.feed(b"\r"), Edit::LineReady);
}

#[test]
fn test_redraw_restores_cursor() {
    let mut s = Session::new();
    s.feed(b"abc");
    s.feed(LEFT);
    s.io.take_output();

    s.editor.redraw(&s.ring, &mut s.io, "SPI");
    assert_eq!(s.io.take_output(), "SPI>abc\x1B[D");
}
