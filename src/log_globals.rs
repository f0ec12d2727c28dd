//! Global log stream instance.

use crate::logging::LogStream;

/// Console log stream.
///
/// Producers: the console loop (and protocols, through the same handle).
/// Consumer: the diagnostic drain in `log_drain`.
pub static CONSOLE_LOG: LogStream = LogStream::new();
