//! Interactive command console
//!
//! Single-threaded polling loop - one `step` per received byte.
//! Zero heap allocation - all static buffers.

pub mod commands;
#[allow(clippy::module_inception)]
pub mod console;
pub mod dispatcher;
pub mod editor;
pub mod error;
pub mod history;
pub mod lexer;
pub mod macros;
pub mod prompt;
pub mod ring;
pub mod term;

pub use commands::{CommandDescriptor, COMMANDS};
pub use console::{Console, Step, VERSION};
pub use editor::{Edit, LineEditor};
pub use error::ConsoleError;
pub use history::{History, Recall};
pub use macros::MacroStore;
pub use prompt::{confirm, get_long, get_number};
pub use ring::CommandRing;
pub use term::TermWrite;
