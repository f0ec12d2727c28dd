//! User macro bank
//!
//! Static allocation, `USER_MACRO_COUNT` slots of `USER_MACRO_LEN` bytes,
//! NUL-terminated. Slots are numbered from 1 as typed at the prompt.

use super::ConsoleError;
use crate::config::{USER_MACRO_COUNT, USER_MACRO_LEN};

/// Longest macro body (one byte is kept for the terminator).
pub const MAX_MACRO_BODY: usize = USER_MACRO_LEN - 1;

/// Fixed bank of recorded command strings.
pub struct MacroStore {
    slots: [[u8; USER_MACRO_LEN]; USER_MACRO_COUNT],
    /// Slot waiting to be replayed into the editor.
    pending: Option<usize>,
}

impl MacroStore {
    /// Create with every slot empty
    pub const fn new() -> Self {
        Self {
            slots: [[0u8; USER_MACRO_LEN]; USER_MACRO_COUNT],
            pending: None,
        }
    }

    /// Number of slots
    pub const fn count(&self) -> usize {
        USER_MACRO_COUNT
    }

    /// Empty every slot and drop any pending replay
    pub fn clear(&mut self) {
        self.slots = [[0u8; USER_MACRO_LEN]; USER_MACRO_COUNT];
        self.pending = None;
    }

    fn index(slot: u32) -> Result<usize, ConsoleError> {
        match slot as usize {
            n @ 1..=USER_MACRO_COUNT => Ok(n - 1),
            _ => Err(ConsoleError::OutOfRange),
        }
    }

    /// Overwrite `slot` with `body`.
    ///
    /// Nothing changes when the slot number or length is rejected.
    pub fn define(
        &mut self,
        slot: u32,
        body: impl ExactSizeIterator<Item = u8>,
    ) -> Result<(), ConsoleError> {
        let idx = Self::index(slot)?;
        if body.len() > MAX_MACRO_BODY {
            return Err(ConsoleError::MacroTooLong);
        }

        let dst = &mut self.slots[idx];
        dst.fill(0);
        for (d, b) in dst.iter_mut().zip(body) {
            *d = b;
        }
        Ok(())
    }

    /// Contents of `slot`, without the terminator.
    pub fn get(&self, slot: u32) -> Result<&[u8], ConsoleError> {
        let raw = &self.slots[Self::index(slot)?];
        let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(&raw[..len])
    }

    /// Queue `slot` for replay at the next editing pass.
    pub fn schedule(&mut self, slot: u32) -> Result<(), ConsoleError> {
        Self::index(slot)?;
        self.pending = Some(slot as usize);
        Ok(())
    }

    /// Slot queued for replay, consumed on read.
    pub fn take_pending(&mut self) -> Option<u32> {
        self.pending.take().map(|s| s as u32)
    }

    /// `(slot, contents)` for every slot, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> + '_ {
        (1..=USER_MACRO_COUNT as u32).filter_map(move |s| self.get(s).ok().map(|b| (s, b)))
    }
}

impl Default for MacroStore {
    fn default() -> Self {
        Self::new()
    }
}
