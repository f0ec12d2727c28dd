//! # buspirate-console
//!
//! Interactive command console for a multi-protocol bus debugging tool.
//!
//! ## Architecture
//!
//! Bytes flow one way through the session:
//! - [`hal::ByteIo`] delivers keystrokes to the line editor
//! - Committed lines land in the command ring
//! - The dispatcher walks each line and drives the active [`Protocol`]
//!   and the [`hal::Hardware`] board services
//!
//! Everything lives in fixed-size buffers owned by [`Console`]; the
//! library never allocates.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod console;
pub mod hal;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod protocol;

pub use config::{BusConfig, DisplayMode, ModeConfig};
pub use console::{Console, ConsoleError, Step};
pub use hal::{ByteIo, Hardware};
pub use log_globals::CONSOLE_LOG;
pub use protocol::{HiZ, Protocol, ProtocolTable};
