//! Command history over the command ring
//!
//! No separate storage: committed lines stay in the ring after they run,
//! NUL-separated, until wraparound overwrites them. Navigation scans
//! backward from the live line.

use super::ring::CommandRing;

/// Result of a history step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall {
    /// Show the entry occupying `[from, to)`.
    Entry { from: usize, to: usize },
    /// Back to an empty live line.
    Live,
    /// Nothing further in that direction.
    Exhausted,
}

/// History navigation state (the `histcnt` cursor).
pub struct History {
    /// Entries back from the live line (0 = live editing).
    nav_pos: usize,
}

impl History {
    /// Create at the live line
    pub const fn new() -> Self {
        Self { nav_pos: 0 }
    }

    /// Entries back currently displayed
    pub fn position(&self) -> usize {
        self.nav_pos
    }

    /// Reset navigation (call on submit)
    pub fn reset_nav(&mut self) {
        self.nav_pos = 0;
    }

    /// Get previous (older) command
    pub fn get_prev<const N: usize>(&mut self, ring: &CommandRing<N>) -> Recall {
        match find_entry(ring, self.nav_pos + 1) {
            Some((from, to)) => {
                self.nav_pos += 1;
                Recall::Entry { from, to }
            }
            None => Recall::Exhausted,
        }
    }

    /// Get next (newer) command
    pub fn get_next<const N: usize>(&mut self, ring: &CommandRing<N>) -> Recall {
        match self.nav_pos {
            0 => Recall::Exhausted,
            1 => {
                self.nav_pos = 0;
                Recall::Live
            }
            n => match find_entry(ring, n - 1) {
                Some((from, to)) => {
                    self.nav_pos -= 1;
                    Recall::Entry { from, to }
                }
                None => Recall::Exhausted,
            },
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// Locate committed entry `n` (1 = most recent) behind the live line.
///
/// Returns `[from, to)`, `to` being the entry's NUL. The scan never
/// enters the live line `[start, end]`; an entry whose beginning has been
/// overwritten counts as unavailable.
pub fn find_entry<const N: usize>(ring: &CommandRing<N>, n: usize) -> Option<(usize, usize)> {
    if n == 0 {
        return None;
    }

    let mut found = 0;
    let mut t = ring.prev(ring.start());

    while t != ring.end() {
        if ring.get(t) == 0 && ring.get(ring.prev(t)) != 0 {
            found += 1;
            if found == n {
                let mut r = ring.prev(t);
                while r != ring.end() {
                    if ring.get(r) == 0 {
                        return Some((ring.next(r), t));
                    }
                    r = ring.prev(r);
                }
                return None;
            }
        }
        t = ring.prev(t);
    }

    None
}

/// Start positions of every entry in the ring, newest first, beginning
/// with the line that starts at `origin`.
pub struct EntryStarts<'a, const N: usize> {
    ring: &'a CommandRing<N>,
    origin: usize,
    pos: usize,
    done: bool,
}

impl<'a, const N: usize> EntryStarts<'a, N> {
    pub fn new(ring: &'a CommandRing<N>, origin: usize) -> Self {
        Self {
            ring,
            origin,
            pos: ring.prev(origin),
            done: false,
        }
    }
}

impl<const N: usize> Iterator for EntryStarts<'_, N> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while !self.done {
            let j = self.pos;
            self.pos = self.ring.prev(j);
            if self.pos == self.origin {
                self.done = true;
            }

            let first = self.ring.next(j);
            if self.ring.get(j) == 0 && self.ring.get(first) != 0 {
                return Some(first);
            }
        }
        None
    }
}

/// Bytes of the entry starting at `from`, up to its NUL.
pub fn entry_bytes<const N: usize>(
    ring: &CommandRing<N>,
    from: usize,
) -> impl Iterator<Item = u8> + '_ {
    (0..ring.capacity())
        .map(move |i| ring.get(from.wrapping_add(i)))
        .take_while(|&b| b != 0)
}
