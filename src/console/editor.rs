//! Line editor
//!
//! Turns raw keystrokes into committed lines inside the command ring.
//! The live line is `[start, end)`; the edit cursor moves within it and
//! `end` always carries a NUL while editing.

use super::history::{History, Recall};
use super::ring::CommandRing;
use super::term::TermWrite;
use crate::config::{BINARY_MODE_NULS, SUMP_MODE_NULS};
use crate::hal::ByteIo;

/// Outcome of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Keep reading.
    Pending,
    /// A line was committed and is waiting at `[start, end)`.
    LineReady,
    /// The NUL run reached the binary-mode threshold.
    BinaryMode,
    /// Left arrow after a short NUL run.
    SumpMode,
    /// A printable byte was refused because the ring is full.
    Overflow,
}

/// Decoded editing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Insert(u8),
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Submit,
    Nul,
    Invalid,
}

impl Key {
    fn from_byte(byte: u8) -> Self {
        match byte {
            0x08 => Key::Backspace,
            0x04 | 0x7F => Key::Delete,
            0x02 => Key::Left,
            0x06 => Key::Right,
            0x10 => Key::Up,
            0x0E => Key::Down,
            0x01 => Key::Home,
            0x05 => Key::End,
            b'\r' | b'\n' => Key::Submit,
            0x00 => Key::Nul,
            0x20..=0x7E => Key::Insert(byte),
            _ => Key::Invalid,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum EscapeState {
    Normal,
    Escape,      // Got ESC
    Bracket,     // Got ESC [
    Tilde(Key),  // Got ESC [ 1 or ESC [ 4
}

/// Editing state for the live line.
pub struct LineEditor {
    /// Insertion point, in `[start, end]`.
    cursor: usize,
    history: History,
    nul_count: u8,
    escape_state: EscapeState,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            cursor: 0,
            history: History::new(),
            nul_count: 0,
            escape_state: EscapeState::Normal,
        }
    }

    /// Edit cursor position in the ring
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// History entries back currently shown
    pub fn history_position(&self) -> usize {
        self.history.position()
    }

    /// Sync with a freshly emptied ring.
    pub fn begin_line<const N: usize>(&mut self, ring: &CommandRing<N>) {
        self.cursor = ring.end();
        self.history.reset_nav();
        self.escape_state = EscapeState::Normal;
    }

    /// Process one input byte.
    pub fn feed<const N: usize>(
        &mut self,
        byte: u8,
        ring: &mut CommandRing<N>,
        io: &mut dyn ByteIo,
        prompt: &str,
    ) -> Edit {
        let key = match self.escape_state {
            EscapeState::Normal => {
                if byte == 0x1B {
                    self.escape_state = EscapeState::Escape;
                    return Edit::Pending;
                }
                Key::from_byte(byte)
            }
            EscapeState::Escape => {
                self.escape_state = if byte == b'[' {
                    EscapeState::Bracket
                } else {
                    EscapeState::Normal
                };
                return Edit::Pending;
            }
            EscapeState::Bracket => {
                self.escape_state = EscapeState::Normal;
                match byte {
                    b'A' => Key::Up,
                    b'B' => Key::Down,
                    b'C' => Key::Right,
                    b'D' => Key::Left,
                    b'1' => {
                        self.escape_state = EscapeState::Tilde(Key::Home);
                        return Edit::Pending;
                    }
                    b'4' => {
                        self.escape_state = EscapeState::Tilde(Key::End);
                        return Edit::Pending;
                    }
                    _ => return Edit::Pending,
                }
            }
            EscapeState::Tilde(key) => {
                self.escape_state = EscapeState::Normal;
                if byte != b'~' {
                    return Edit::Pending;
                }
                key
            }
        };

        self.apply(key, ring, io, prompt)
    }

    fn apply<const N: usize>(
        &mut self,
        key: Key,
        ring: &mut CommandRing<N>,
        io: &mut dyn ByteIo,
        prompt: &str,
    ) -> Edit {
        if key == Key::Nul {
            self.nul_count += 1;
            if self.nul_count >= BINARY_MODE_NULS {
                self.nul_count = 0;
                return Edit::BinaryMode;
            }
            return Edit::Pending;
        }

        let nuls = core::mem::take(&mut self.nul_count);

        match key {
            Key::Insert(c) => {
                if !self.insert(c, ring, io) {
                    return Edit::Overflow;
                }
            }
            Key::Backspace => self.backspace(ring, io),
            Key::Delete => self.delete(ring, io),
            Key::Left if nuls >= SUMP_MODE_NULS => return Edit::SumpMode,
            Key::Left => {
                if self.cursor != ring.start() {
                    self.cursor = ring.prev(self.cursor);
                    io.cursor_left(1);
                } else {
                    io.bell();
                }
            }
            Key::Right => {
                if self.cursor != ring.end() {
                    self.cursor = ring.next(self.cursor);
                    io.cursor_right(1);
                } else {
                    io.bell();
                }
            }
            Key::Home => {
                if self.cursor != ring.start() {
                    io.cursor_left(ring.distance(ring.start(), self.cursor));
                    self.cursor = ring.start();
                } else {
                    io.bell();
                }
            }
            Key::End => {
                if self.cursor != ring.end() {
                    io.cursor_right(ring.distance(self.cursor, ring.end()));
                    self.cursor = ring.end();
                } else {
                    io.bell();
                }
            }
            Key::Up => {
                let recall = self.history.get_prev(ring);
                self.show_recall(recall, ring, io, prompt);
            }
            Key::Down => {
                let recall = self.history.get_next(ring);
                self.show_recall(recall, ring, io, prompt);
            }
            Key::Submit => {
                ring.commit();
                self.history.reset_nav();
                self.cursor = ring.end();
                io.newline();
                return Edit::LineReady;
            }
            Key::Invalid => io.bell(),
            Key::Nul => {}
        }

        Edit::Pending
    }

    /// Insert a printable byte at the cursor, echoing it.
    ///
    /// Returns false (after a bell) when the ring is full.
    pub fn insert<const N: usize>(
        &mut self,
        c: u8,
        ring: &mut CommandRing<N>,
        io: &mut dyn ByteIo,
    ) -> bool {
        if ring.is_full() {
            io.bell();
            return false;
        }

        let end = ring.end();
        if self.cursor == end {
            io.write_byte(c);
            ring.set(end, c);
            ring.set_end(ring.next(end));
            ring.set(ring.end(), 0);
            self.cursor = ring.end();
            return true;
        }

        io.cursor_right(ring.distance(self.cursor, end));

        // Shift [cursor, end] right one, redrawing from the tail back.
        let stop = ring.prev(self.cursor);
        let mut t = end;
        while t != stop {
            let b = ring.get(t);
            ring.set(ring.next(t), b);
            if b != 0 {
                io.write_byte(b);
                io.put_str("\x1B[2D");
            }
            t = ring.prev(t);
        }

        io.write_byte(c);
        ring.set(self.cursor, c);
        self.cursor = ring.next(self.cursor);
        ring.set_end(ring.next(end));
        true
    }

    fn backspace<const N: usize>(&mut self, ring: &mut CommandRing<N>, io: &mut dyn ByteIo) {
        if self.cursor == ring.start() {
            io.bell();
            return;
        }

        if self.cursor == ring.end() {
            let end = ring.prev(ring.end());
            ring.set_end(end);
            ring.set(end, 0);
            self.cursor = end;
            io.put_str("\x08 \x08");
            return;
        }

        self.cursor = ring.prev(self.cursor);
        io.cursor_left(1);
        self.close_gap(ring, io);
    }

    fn delete<const N: usize>(&mut self, ring: &mut CommandRing<N>, io: &mut dyn ByteIo) {
        if self.cursor == ring.end() {
            io.bell();
            return;
        }
        self.close_gap(ring, io);
    }

    /// Remove the byte under the cursor, redraw the tail and put the
    /// terminal cursor back.
    fn close_gap<const N: usize>(&mut self, ring: &mut CommandRing<N>, io: &mut dyn ByteIo) {
        let mut moved = 0;
        let mut t = self.cursor;
        while t != ring.end() {
            let b = ring.get(ring.next(t));
            ring.set(t, b);
            io.write_byte(if b != 0 { b } else { b' ' });
            moved += 1;
            t = ring.next(t);
        }
        ring.set_end(ring.prev(ring.end()));
        io.cursor_left(moved);
    }

    fn show_recall<const N: usize>(
        &mut self,
        recall: Recall,
        ring: &mut CommandRing<N>,
        io: &mut dyn ByteIo,
        prompt: &str,
    ) {
        match recall {
            Recall::Entry { from, to } => {
                ring.discard_live();
                let len = ring.distance(from, to);
                for i in 0..len {
                    let b = ring.get(from.wrapping_add(i));
                    if !ring.push(b) {
                        io.bell();
                        break;
                    }
                }
                ring.set(ring.end(), 0);
                self.cursor = ring.end();

                io.clear_line();
                io.put_str(prompt);
                io.put_str(">");
                for b in ring.live() {
                    io.write_byte(b);
                }
            }
            Recall::Live => {
                ring.discard_live();
                self.cursor = ring.end();

                io.clear_line();
                io.put_str(prompt);
                io.put_str(">");
            }
            Recall::Exhausted => io.bell(),
        }
    }

    /// Reprint the prompt and the live line after background output.
    pub fn redraw<const N: usize>(&self, ring: &CommandRing<N>, io: &mut dyn ByteIo, prompt: &str) {
        io.put_str(prompt);
        io.put_str(">");
        for b in ring.live() {
            io.write_byte(b);
        }
        io.cursor_left(ring.distance(self.cursor, ring.end()));
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}
