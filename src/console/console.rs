//! Console session integrating all components

use super::editor::{Edit, LineEditor};
use super::error::ConsoleError;
use super::macros::MacroStore;
use super::ring::CommandRing;
use super::term::TermWrite;
use crate::config::{BusConfig, ModeConfig, USER_MACRO_LEN};
use crate::{con_info, con_warn};
use crate::hal::{ByteIo, Hardware};
use crate::log_globals::CONSOLE_LOG;
use crate::logging::LogStream;
use crate::protocol::ProtocolTable;

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// What one pass of [`Console::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No input was waiting.
    Idle,
    /// A keystroke was applied to the live line.
    Edited,
    /// A line was executed and a fresh prompt printed.
    Executed,
    /// Returned from binary bit-bang mode.
    BinaryMode,
    /// Returned from the SUMP logic analyzer.
    SumpMode,
}

/// Console state machine.
///
/// Owns everything a session mutates; there are no free-floating globals
/// apart from the log stream.
pub struct Console<IO, HW, P> {
    pub(super) io: IO,
    pub(super) hw: HW,
    pub(super) protocols: P,
    pub(super) ring: CommandRing,
    pub(super) editor: LineEditor,
    pub(super) macros: MacroStore,
    pub(super) mode: ModeConfig,
    pub(super) bus: BusConfig,
    pub(super) log: &'static LogStream,
}

impl<IO: ByteIo, HW: Hardware, P: ProtocolTable> Console<IO, HW, P> {
    /// Create a session in HiZ mode.
    ///
    /// # Panics
    ///
    /// Panics if the protocol table is empty; entry 0 must be HiZ.
    pub fn new(io: IO, hw: HW, protocols: P) -> Self {
        assert!(!protocols.is_empty(), "protocol table needs a HiZ entry");

        Self {
            io,
            hw,
            protocols,
            ring: CommandRing::new(),
            editor: LineEditor::new(),
            macros: MacroStore::new(),
            mode: ModeConfig::new(),
            bus: BusConfig::new(),
            log: &CONSOLE_LOG,
        }
    }

    /// Log to `log` instead of the global stream.
    pub fn with_log(mut self, log: &'static LogStream) -> Self {
        self.log = log;
        self
    }

    pub fn io(&self) -> &IO {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    pub fn hw(&self) -> &HW {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut HW {
        &mut self.hw
    }

    pub fn protocols(&self) -> &P {
        &self.protocols
    }

    pub fn mode(&self) -> &ModeConfig {
        &self.mode
    }

    pub fn bus(&self) -> &BusConfig {
        &self.bus
    }

    pub fn macros(&self) -> &MacroStore {
        &self.macros
    }

    pub fn ring(&self) -> &CommandRing {
        &self.ring
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    /// Name of the active protocol, as shown in the prompt.
    pub fn prompt_name(&self) -> &'static str {
        self.protocols.protocol(self.bus.bus_mode).name()
    }

    /// Print the prompt
    pub fn print_prompt(&mut self) {
        let name = self.prompt_name();
        self.io.put_str(name);
        self.io.put_str(">");
    }

    /// Print welcome banner
    pub fn print_banner(&mut self) {
        self.io.newline();
        self.version_info();
        self.print_prompt();
    }

    /// One cooperative pass: replay a pending macro, run the idle hook or
    /// handle one received byte.
    pub fn step(&mut self) -> Step {
        if let Some(slot) = self.macros.take_pending() {
            self.replay_macro(slot);
        }

        if !self.io.rx_ready() {
            if self.mode.periodic_service {
                let bus = self.bus.bus_mode;
                if self.protocols.protocol_mut(bus).periodic_update(&mut self.io) {
                    let name = self.prompt_name();
                    self.editor.redraw(&self.ring, &mut self.io, name);
                }
            }
            return Step::Idle;
        }

        if self.io.take_comms_error() {
            return Step::Idle;
        }

        let byte = self.io.read_byte();
        let name = self.prompt_name();

        match self.editor.feed(byte, &mut self.ring, &mut self.io, name) {
            Edit::Pending => Step::Edited,
            Edit::Overflow => {
                let now = self.hw.now_us();
                con_warn!(self.log, now, "{}", ConsoleError::BufferFull);
                Step::Edited
            }
            Edit::LineReady => {
                self.execute_line();
                self.print_prompt();
                Step::Executed
            }
            Edit::BinaryMode => {
                let now = self.hw.now_us();
                con_info!(self.log, now, "entering binary mode");
                self.hw.enter_binary_mode(&mut self.io);
                self.version_info();
                self.print_prompt();
                Step::BinaryMode
            }
            Edit::SumpMode => {
                let now = self.hw.now_us();
                con_info!(self.log, now, "entering SUMP mode");
                self.hw.enter_sump_mode(&mut self.io);
                self.print_prompt();
                Step::SumpMode
            }
        }
    }

    /// Banner, then [`step`](Self::step) forever.
    pub fn run(&mut self) -> ! {
        self.print_banner();
        loop {
            self.step();
        }
    }

    /// Feed a macro's bytes through the insert path as if typed.
    fn replay_macro(&mut self, slot: u32) {
        let mut body = [0u8; USER_MACRO_LEN];
        let len = match self.macros.get(slot) {
            Ok(bytes) => {
                body[..bytes.len()].copy_from_slice(bytes);
                bytes.len()
            }
            Err(_) => return,
        };

        for &b in &body[..len] {
            if !self.editor.insert(b, &mut self.ring, &mut self.io) {
                let now = self.hw.now_us();
                con_warn!(self.log, now, "macro {} cut short: {}", slot, ConsoleError::BufferFull);
                break;
            }
        }
    }
}
