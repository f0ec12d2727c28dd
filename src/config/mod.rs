//! Module: config
//!
//! Purpose: Compile-time limits and runtime mode state for the console.
//!
//! Architecture:
//! - Limits: buffer sizes, macro bank shape, NUL-run thresholds
//! - `ModeConfig`: per-protocol settings, reset on every mode switch
//! - `BusConfig`: session settings that survive mode switches
//!
//! Safety: Plain data, owned by the single console thread.

/// Command ring capacity in bytes. Must be a power of 2.
pub const CMD_BUFFER_SIZE: usize = 256;

/// Number of user macro slots (`<1>` .. `<10>`).
pub const USER_MACRO_COUNT: usize = 10;

/// Bytes per user macro slot, including the NUL terminator.
pub const USER_MACRO_LEN: usize = 32;

/// Maximum entries listed by the `h` command.
pub const HISTORY_LIST_LEN: usize = 10;

/// Consecutive NUL bytes that switch into binary bit-bang mode.
pub const BINARY_MODE_NULS: u8 = 20;

/// NUL bytes that arm the SUMP trigger on the next ^B.
pub const SUMP_MODE_NULS: u8 = 5;

/// Digits accepted by the `int` menu prompt.
pub const PROMPT_INT_DIGITS: usize = 4;

/// Digits accepted by the `long` menu prompt.
pub const PROMPT_LONG_DIGITS: usize = 10;

/// Bell character sent on rejected keystrokes.
pub const BELL: u8 = 0x07;

/// Supply rail thresholds, in millivolts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplyLimits {
    /// Minimum 3.3V rail after enabling the regulators.
    pub min_3v3_mv: u32,
    /// Minimum 5V rail after enabling the regulators.
    pub min_5v_mv: u32,
    /// Vpullup below this means nothing is feeding the pull-ups.
    pub vpu_present_mv: u32,
    /// Vpullup above this means an external source is already connected.
    pub vpu_external_mv: u32,
}

/// Default rail thresholds.
pub const SUPPLY_LIMITS: SupplyLimits = SupplyLimits {
    min_3v3_mv: 3_000,
    min_5v_mv: 4_500,
    vpu_present_mv: 500,
    vpu_external_mv: 1_650,
};

/// Number formatting used when echoing bus values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DisplayMode {
    Hex = 0,
    Dec = 1,
    Bin = 2,
    Raw = 3,
}

impl DisplayMode {
    /// Convert from the 1-based menu choice.
    pub fn from_choice(choice: u32) -> Option<Self> {
        match choice {
            1 => Some(DisplayMode::Hex),
            2 => Some(DisplayMode::Dec),
            3 => Some(DisplayMode::Bin),
            4 => Some(DisplayMode::Raw),
            _ => None,
        }
    }

    /// One-shot read override selected by `rx`, `rd`, `rb`, `rw`.
    pub fn from_suffix(c: u8) -> Option<Self> {
        match c {
            b'x' => Some(DisplayMode::Hex),
            b'd' => Some(DisplayMode::Dec),
            b'b' => Some(DisplayMode::Bin),
            b'w' => Some(DisplayMode::Raw),
            _ => None,
        }
    }
}

/// What the `a`, `A` and `@` commands drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxRole {
    Aux,
    Cs,
    Aux1,
    Aux2,
}

/// Bit order presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Per-protocol settings.
///
/// Protocols adjust these in `setup`; the console resets them on every
/// mode switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    /// Bits per transfer.
    pub numbits: u8,
    /// Values are 16 bits wide.
    pub int16: bool,
    pub bit_order: BitOrder,
    pub aux_role: AuxRole,
    /// Echo the reply byte after every write.
    pub write_with_read: bool,
    /// Outputs are open drain (HiZ high level).
    pub open_drain: bool,
    /// Call the protocol's periodic hook while waiting for input.
    pub periodic_service: bool,
}

impl ModeConfig {
    pub const fn new() -> Self {
        Self {
            numbits: 8,
            int16: false,
            bit_order: BitOrder::MsbFirst,
            aux_role: AuxRole::Aux,
            write_with_read: false,
            open_drain: false,
            periodic_service: false,
        }
    }

    /// Restore defaults (part of every protocol switch).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Apply a `;bits` override.
    pub fn set_numbits(&mut self, bits: u8) {
        self.numbits = bits;
        self.int16 = bits > 8;
    }

    /// Width differs from the natural 8 or 16 bits.
    pub fn is_partial_width(&self) -> bool {
        if self.int16 {
            self.numbits != 16
        } else {
            self.numbits != 8
        }
    }

    pub fn lsb_first(&self) -> bool {
        self.bit_order == BitOrder::LsbFirst
    }

    /// Reverse `value` within the active width when LSB mode is on.
    pub fn apply_bit_order(&self, value: u32) -> u32 {
        if self.lsb_first() {
            reverse_bits(value, self.numbits)
        } else {
            value
        }
    }
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Session settings kept across protocol switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Index into the protocol table; 0 is HiZ.
    pub bus_mode: usize,
    pub display: DisplayMode,
    /// 0-based terminal speed choice (9 = raw BRG).
    pub terminal_speed: u8,
}

impl BusConfig {
    pub const fn new() -> Self {
        Self {
            bus_mode: 0,
            display: DisplayMode::Hex,
            terminal_speed: 8,
        }
    }

    /// The inert high-impedance mode is active.
    pub fn is_hiz(&self) -> bool {
        self.bus_mode == 0
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Reverse the low `bits` bits of `value`; higher bits are dropped.
pub fn reverse_bits(value: u32, bits: u8) -> u32 {
    let bits = u32::from(bits.clamp(1, 32));
    value.reverse_bits() >> (32 - bits)
}
