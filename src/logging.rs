//! Non-blocking diagnostic logging for the console.
//!
//! # Architecture
//!
//! ```text
//! Console loop           LogStream            Diagnostic port
//! ────────────           ─────────            ───────────────
//!
//! con_log!() ─────────▶ [L0][L1][L2] ──────▶ UART TX / stderr
//! non-blocking            lock-free           drained at leisure
//!                         ring buffer
//! ```
//!
//! # Rules
//!
//! - Logging never writes to the terminal transport; user-visible text
//!   goes through `ByteIo` only
//! - Pushing never blocks; messages are dropped when the ring is full
//! - Messages longer than `MAX_MSG_LEN` are truncated

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 80;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 32;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    /// Label used by the drain.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// One queued message.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct LogEntry {
    /// Board time in microseconds.
    pub timestamp_us: i64,
    pub level: LogLevel,
    pub len: u8,
    /// Only `..len` is meaningful.
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    /// Message text, or a placeholder if truncation split a UTF-8 sequence.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self {
            timestamp_us: 0,
            level: LogLevel::Info,
            len: 0,
            msg: [0; MAX_MSG_LEN],
        }
    }
}

/// Fixed ring of log entries.
///
/// Any context may push; whoever owns the diagnostic port drains. A push
/// into a full ring is counted in `dropped` and discarded.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: each push owns the slot it claimed with fetch_add; only the
// drain side reads slots, and only behind `write_idx`.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Empty stream; `N` must be a power of two.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry {
                timestamp_us: 0,
                level: LogLevel::Info,
                len: 0,
                msg: [0; MAX_MSG_LEN],
            }; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue `msg`, cut to `MAX_MSG_LEN` bytes. False if it was dropped.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let write = self.write_idx.fetch_add(1, Ordering::AcqRel);
        let read = self.read_idx.load(Ordering::Acquire);

        // Claim overlaps unread entries: give the slot back.
        if write.wrapping_sub(read) >= N as u32 {
            self.write_idx.fetch_sub(1, Ordering::AcqRel);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: `idx` was claimed above and is not visible to drain yet.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = msg.len().min(MAX_MSG_LEN) as u8;
            entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);
        }

        true
    }

    /// Oldest unread entry.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: `read` is behind `write`, so the slot is fully written.
        let entry = unsafe { (*self.entries.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Messages lost since the last `reset_dropped`.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }

    /// Entries waiting for the drain.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `args` into `buf`, cutting whatever does not fit. Returns the
/// byte count.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct SliceWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl Write for SliceWriter<'_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = SliceWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Format on the stack and push to `$stream` at `$level`.
///
/// ```ignore
/// con_log!(LogLevel::Warn, self.log, now, "{} at char {}", err, offset);
/// ```
#[macro_export]
macro_rules! con_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len]);
    }};
}

/// `con_log!` at `Info`.
#[macro_export]
macro_rules! con_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::con_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

/// `con_log!` at `Warn`.
#[macro_export]
macro_rules! con_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::con_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

/// `con_log!` at `Error`.
#[macro_export]
macro_rules! con_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::con_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

/// `con_log!` at `Debug`.
#[macro_export]
macro_rules! con_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::con_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stream_basic() {
        let stream = LogStream::<16>::new();

        assert!(stream.push(1000, LogLevel::Info, b"mode HiZ -> SPI"));
        assert!(stream.has_entries());
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message(), "mode HiZ -> SPI");

        assert!(!stream.has_entries());
    }

    #[test]
    fn test_log_stream_full() {
        let stream = LogStream::<4>::new();

        assert!(stream.push(1, LogLevel::Info, b"1"));
        assert!(stream.push(2, LogLevel::Info, b"2"));
        assert!(stream.push(3, LogLevel::Info, b"3"));
        assert!(stream.push(4, LogLevel::Info, b"4"));

        assert!(!stream.push(5, LogLevel::Info, b"5"));
        assert_eq!(stream.dropped(), 1);
        assert_eq!(stream.pending(), 4);

        stream.drain();
        assert!(stream.push(6, LogLevel::Info, b"6"));

        stream.reset_dropped();
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_long_message_truncated() {
        let stream = LogStream::<4>::new();
        let long = [b'a'; MAX_MSG_LEN + 20];

        assert!(stream.push(0, LogLevel::Warn, &long));
        let entry = stream.drain().unwrap();
        assert_eq!(entry.len as usize, MAX_MSG_LEN);
    }

    #[test]
    fn test_format_to_buffer() {
        let mut buf = [0u8; 32];
        let len = format_to_buffer(&mut buf, format_args!("syntax error at {}", 3));
        assert_eq!(&buf[..len], b"syntax error at 3");

        let mut small = [0u8; 4];
        let len = format_to_buffer(&mut small, format_args!("overflowing"));
        assert_eq!(&small[..len], b"over");
    }

    #[test]
    fn test_macros_push_formatted() {
        let stream = LogStream::<8>::new();

        con_info!(stream, 10, "macro {} defined", 2);
        con_error!(stream, 20, "supply fault");

        let first = stream.drain().unwrap();
        assert_eq!(first.level, LogLevel::Info);
        assert_eq!(first.message(), "macro 2 defined");

        let second = stream.drain().unwrap();
        assert_eq!(second.level, LogLevel::Error);
        assert_eq!(second.timestamp_us, 20);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn test_drain_from_other_thread() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());

        let producer = {
            let stream = Arc::clone(&stream);
            thread::spawn(move || {
                for j in 0..20 {
                    let msg = format!("line {}", j);
                    stream.push(j as i64, LogLevel::Debug, msg.as_bytes());
                }
            })
        };
        producer.join().unwrap();

        let mut count = 0;
        while stream.drain().is_some() {
            count += 1;
        }
        assert_eq!(count, 20);
    }
}
