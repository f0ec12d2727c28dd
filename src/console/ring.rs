//! Command ring buffer
//!
//! Fixed-capacity circular byte store shared by the line editor, the
//! history scanner and the dispatcher. Committed lines sit back to back,
//! each terminated by NUL, oldest first.
//!
//! ```text
//!        start            end
//!          v               v
//! ... A \0 B \0 [live line] \0 ... older entries ...
//! ```
//!
//! All index arithmetic wraps through `MASK`, so `start` and `end` are
//! always inside `[0, N)`.

use crate::config::CMD_BUFFER_SIZE;

/// Circular command store.
pub struct CommandRing<const N: usize = CMD_BUFFER_SIZE> {
    buf: [u8; N],
    /// Consume cursor (first byte of the live line while editing).
    start: usize,
    /// Write cursor (one past the last byte of the live line).
    end: usize,
}

impl<const N: usize> CommandRing<N> {
    const MASK: usize = N - 1;

    /// Create an empty, zero-filled ring.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Command ring size must be power of 2");

        Self {
            buf: [0u8; N],
            start: 0,
            end: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn wrap(&self, idx: usize) -> usize {
        idx & Self::MASK
    }

    #[inline]
    pub fn next(&self, idx: usize) -> usize {
        idx.wrapping_add(1) & Self::MASK
    }

    #[inline]
    pub fn prev(&self, idx: usize) -> usize {
        idx.wrapping_sub(1) & Self::MASK
    }

    /// Forward distance from `from` to `to`.
    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> usize {
        to.wrapping_sub(from) & Self::MASK
    }

    #[inline]
    pub fn get(&self, idx: usize) -> u8 {
        self.buf[idx & Self::MASK]
    }

    #[inline]
    pub fn set(&mut self, idx: usize, byte: u8) {
        self.buf[idx & Self::MASK] = byte;
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn set_start(&mut self, idx: usize) {
        self.start = idx & Self::MASK;
    }

    pub fn set_end(&mut self, idx: usize) {
        self.end = idx & Self::MASK;
    }

    /// No room left for one more byte plus the line's NUL terminator, so
    /// a line holds at most `N - 2` bytes and `commit` never lands on
    /// `start`.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.next(self.next(self.end)) == self.start
    }

    /// Nothing left between `start` and `end`.
    #[inline]
    pub fn is_drained(&self) -> bool {
        self.start == self.end
    }

    /// Bytes between `start` and `end`.
    #[inline]
    pub fn pending(&self) -> usize {
        self.distance(self.start, self.end)
    }

    /// Byte at the consume cursor.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.get(self.start)
    }

    /// Byte `n` positions past the consume cursor.
    #[inline]
    pub fn peek_at(&self, n: usize) -> u8 {
        self.get(self.start.wrapping_add(n))
    }

    /// Consume one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.start = self.next(self.start);
    }

    /// Consume `n` bytes.
    pub fn advance_by(&mut self, n: usize) {
        self.start = self.wrap(self.start.wrapping_add(n));
    }

    /// Consume one byte and return it.
    pub fn take(&mut self) -> u8 {
        let b = self.peek();
        self.advance();
        b
    }

    /// Append at `end`; returns false when the ring is full and nothing
    /// was written.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.buf[self.end] = byte;
        self.end = self.next(self.end);
        true
    }

    /// Commit the live line: NUL at `end`, then step past it.
    pub fn commit(&mut self) {
        self.buf[self.end] = 0;
        self.end = self.next(self.end);
    }

    /// Empty the parse window, keeping the backing bytes for history.
    pub fn reset_to(&mut self, idx: usize) {
        self.start = idx & Self::MASK;
        self.end = self.start;
    }

    /// Zero the live line and pull `end` back to `start`.
    pub fn discard_live(&mut self) {
        while self.end != self.start {
            self.buf[self.end] = 0;
            self.end = self.prev(self.end);
        }
        self.buf[self.end] = 0;
    }

    /// Iterate the bytes in `[from, to)` in ring order.
    pub fn bytes(&self, from: usize, to: usize) -> impl ExactSizeIterator<Item = u8> + '_ {
        let len = self.distance(from, to);
        (0..len).map(move |i| self.get(from.wrapping_add(i)))
    }

    /// The live line `[start, end)`.
    pub fn live(&self) -> impl ExactSizeIterator<Item = u8> + '_ {
        self.bytes(self.start, self.end)
    }
}

impl<const N: usize> Default for CommandRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
