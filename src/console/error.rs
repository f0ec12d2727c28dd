//! Console error types

/// Console error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// E01: Unknown command character
    UnknownCommand,
    /// E02: Malformed integer literal
    InvalidValue,
    /// E03: Missing closing quote, bracket or macro delimiter
    Unterminated,
    /// E04: Index outside the allowed range
    OutOfRange,
    /// E05: Macro body does not fit its slot
    MacroTooLong,
    /// E06: Command not available in HiZ mode
    ModeRequired,
    /// E07: Supply rails out of tolerance after enable
    SupplyFault,
    /// E08: Pull-ups requested on push-pull outputs
    NotOpenDrain,
    /// E09: Protocol index past the table
    NoSuchProtocol,
    /// E10: Command ring full
    BufferFull,
}

impl ConsoleError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::InvalidValue => "E02",
            Self::Unterminated => "E03",
            Self::OutOfRange => "E04",
            Self::MacroTooLong => "E05",
            Self::ModeRequired => "E06",
            Self::SupplyFault => "E07",
            Self::NotOpenDrain => "E08",
            Self::NoSuchProtocol => "E09",
            Self::BufferFull => "E10",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::InvalidValue => "invalid value",
            Self::Unterminated => "unterminated argument",
            Self::OutOfRange => "out of range",
            Self::MacroTooLong => "macro too long",
            Self::ModeRequired => "Command not used in this mode",
            Self::SupplyFault => "VREG too low, is there a short?",
            Self::NotOpenDrain => "Warning: pins not open drain (HiZ)",
            Self::NoSuchProtocol => "Nonexistent protocol!!",
            Self::BufferFull => "command buffer full",
        }
    }

    /// Syntax errors abandon the rest of the line and report a position.
    /// Everything else is reported and parsing moves on.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::UnknownCommand
                | Self::InvalidValue
                | Self::Unterminated
                | Self::OutOfRange
                | Self::MacroTooLong
        )
    }
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
