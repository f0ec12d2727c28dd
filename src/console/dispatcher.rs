//! Command dispatcher
//!
//! Walks a committed line from the ring's consume cursor and routes each
//! token. Handlers consume exactly what they use. On a syntax error the
//! cursor is left on the offending byte, which gives the reported offset.

use super::console::Console;
use super::history::{entry_bytes, EntryStarts};
use super::lexer::{get_int, get_numbits, get_repeat, read_format, skip_spaces};
use super::prompt::{confirm, get_number};
use super::term::TermWrite;
use super::{commands, ConsoleError};
use crate::config::{
    reverse_bits, AuxRole, BitOrder, DisplayMode, CMD_BUFFER_SIZE, HISTORY_LIST_LEN,
    SUPPLY_LIMITS,
};
use crate::hal::{AdcChannel, ByteIo, Hardware, PullupVoltage};
use crate::protocol::ProtocolTable;
use crate::{con_info, con_warn, con_error};

/// What the line loop does after a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Drop the rest of the line.
    EndLine,
}

/// Parse window of the line being executed.
struct LineWindow {
    /// First byte of the line, for error offsets.
    origin: usize,
    /// Where the next line starts once this one is done.
    next_start: usize,
}

const DISPLAY_MENU: &str = "Display format:\r\n 1. HEX\r\n 2. DEC\r\n 3. BIN\r\n 4. RAW";

const BAUD_MENU: &str = "Set serial port speed: (bps)\r\n 1. 300\r\n 2. 1200\r\n 3. 2400\r\n \
4. 4800\r\n 5. 9600\r\n 6. 19200\r\n 7. 38400\r\n 8. 57600\r\n 9. 115200\r\n10. BRG raw value";

const PULLUP_MENU: &str =
    "Select Vpu (Pullup) Source:\r\n 1) External (or None)\r\n 2) Onboard 3.3v\r\n 3) Onboard 5.0v";

/// Terminal speed choice for the raw divisor.
const RAW_BRG_SPEED: u8 = 9;

impl<IO: ByteIo, HW: Hardware, P: ProtocolTable> Console<IO, HW, P> {
    /// Run the committed line waiting in `[start, end)`, then empty the
    /// parse window. The line stays in the ring as history.
    pub fn execute_line(&mut self) {
        let mut window = LineWindow {
            origin: self.ring.start(),
            next_start: self.ring.end(),
        };

        while !self.ring.is_drained() {
            match self.dispatch(&mut window) {
                Ok(Flow::Continue) => {}
                Ok(Flow::EndLine) => break,
                Err(e) if e.is_syntax() => {
                    let offset = self.ring.distance(window.origin, self.ring.start()) + 1;
                    let now = self.hw.now_us();
                    con_warn!(self.log, now, "{} at char {}", e, offset);
                    self.io
                        .put_fmt(format_args!("Syntax error at char {}\r\n", offset));
                    break;
                }
                Err(e) => self.io.put_line(e.message()),
            }
        }

        self.ring.reset_to(window.next_start);
        self.editor.begin_line(&self.ring);
    }

    fn dispatch(&mut self, window: &mut LineWindow) -> Result<Flow, ConsoleError> {
        let c = self.ring.peek();

        match c {
            b'0'..=b'9' => return self.send_literal().map(|_| Flow::Continue),
            b'<' => return self.user_macro().map(|_| Flow::Continue),
            b'"' => return self.send_string().map(|_| Flow::Continue),
            b' ' | b',' | b'\r' | b'\n' | 0 => {
                self.ring.advance();
                return Ok(Flow::Continue);
            }
            _ => {}
        }

        if !is_command(c) {
            return Err(ConsoleError::UnknownCommand);
        }
        self.ring.advance();

        let bus = self.bus.bus_mode;
        match c {
            b'?' => commands::print_help(&mut self.io),
            b'i' => {
                self.version_info();
                if !self.bus.is_hiz() {
                    self.status_info();
                }
            }
            b'v' => self.pin_states(),
            b'h' => self.history_command(window),
            b'm' => {
                if let Err(e) = self.change_mode() {
                    self.io.put_line(e.message());
                }
                return Ok(Flow::EndLine);
            }
            b'o' => self.set_display_mode(),
            b'b' => self.set_baud_rate(),
            b'c' => self.set_aux_role(AuxRole::Aux),
            b'C' => self.set_aux_role(AuxRole::Cs),
            b'k' => self.set_aux_role(AuxRole::Aux1),
            b'K' => self.set_aux_role(AuxRole::Aux2),
            b'l' => self.set_bit_order(BitOrder::MsbFirst),
            b'L' => self.set_bit_order(BitOrder::LsbFirst),
            b'W' => self.power_on()?,
            b'w' => self.power_off()?,
            b'P' => self.pullups_on()?,
            b'p' => {
                self.require_bus_mode()?;
                self.hw.set_pullups(false);
                self.io.put_line("Pull-up resistors OFF");
            }
            b'e' => self.set_pullup_voltage()?,
            b'=' | b'|' => {
                skip_spaces(&mut self.ring);
                let mut value = get_int(&mut self.ring)?;
                if c == b'|' {
                    value = reverse_bits(value & 0xFF, 8);
                }
                self.put_conversion(value);
            }
            b'a' | b'A' => {
                let high = c == b'A';
                for _ in 0..get_repeat(&mut self.ring)? {
                    self.hw.set_aux(self.mode.aux_role, high);
                }
                self.io.put_line(if high { "AUX HIGH" } else { "AUX LOW" });
            }
            b'@' => {
                for _ in 0..get_repeat(&mut self.ring)? {
                    self.io.put_str("AUX INPUT/HI-Z, READ: ");
                    let level = self.hw.read_aux(self.mode.aux_role);
                    self.io.put_state(level);
                    self.io.newline();
                }
            }
            b'&' => {
                let us = get_repeat(&mut self.ring)?;
                self.io.put_fmt(format_args!("DELAY {}us\r\n", us));
                self.hw.delay_us(us);
            }
            b'%' => {
                let ms = get_repeat(&mut self.ring)?;
                self.io.put_fmt(format_args!("DELAY {}ms\r\n", ms));
                self.hw.delay_ms(ms);
            }
            b'[' => self.protocols.protocol_mut(bus).start(&mut self.io),
            b'{' => self.protocols.protocol_mut(bus).start_with_read(&mut self.io),
            b']' => self.protocols.protocol_mut(bus).stop(&mut self.io),
            b'}' => self.protocols.protocol_mut(bus).stop_from_read(&mut self.io),
            b'/' => {
                self.io.put_line("CLOCK, 1");
                self.protocols.protocol_mut(bus).clock_high(&mut self.io);
            }
            b'\\' => {
                self.io.put_line("CLOCK, 0");
                self.protocols.protocol_mut(bus).clock_low(&mut self.io);
            }
            b'-' => {
                self.io.put_line("DATA OUTPUT, 1");
                self.protocols.protocol_mut(bus).data_high(&mut self.io);
            }
            b'_' => {
                self.io.put_line("DATA OUTPUT, 0");
                self.protocols.protocol_mut(bus).data_low(&mut self.io);
            }
            b'.' => {
                self.io.put_str("DATA STATE: ");
                let level = self.protocols.protocol_mut(bus).data_state(&mut self.io);
                self.io.put_state(level);
                self.io.newline();
            }
            b'^' => {
                let ticks = get_repeat(&mut self.ring)?;
                self.io.put_str("CLOCK TICKS: ");
                self.io.put_value(ticks, self.bus.display, 8, false);
                for _ in 0..ticks {
                    self.protocols.protocol_mut(bus).clock_pulse(&mut self.io);
                }
                self.io.newline();
            }
            b'!' => {
                let reads = get_repeat(&mut self.ring)?;
                self.io.put_str("READ BIT: ");
                for _ in 0..reads {
                    let bit = self.protocols.protocol_mut(bus).read_bit(&mut self.io);
                    self.io.put_state(bit);
                    self.io.put_str(" ");
                }
                self.io.put_line("*pin is now HiZ");
            }
            b'r' => self.read_values()?,
            b'(' => {
                let n = get_int(&mut self.ring)?;
                skip_spaces(&mut self.ring);
                if self.ring.peek() != b')' {
                    return Err(ConsoleError::Unterminated);
                }
                self.ring.advance();
                self.protocols.protocol_mut(bus).run_macro(n, &mut self.io);
                self.io.newline();
            }
            b'~' => {
                if self.bus.is_hiz() {
                    self.hw.self_test(&mut self.io);
                } else {
                    self.io.put_line("Self-test in HiZ mode only");
                }
            }
            b'#' => {
                let now = self.hw.now_us();
                con_info!(self.log, now, "reset requested");
                self.io.put_line("RESET");
                self.io.flush();
                self.hw.reset();
            }
            b'$' => {
                if confirm(&mut self.io) {
                    let now = self.hw.now_us();
                    con_info!(self.log, now, "jump to bootloader");
                    self.io.put_line("BOOTLOADER");
                    self.hw.delay_ms(100);
                    self.hw.reinit();
                    self.io.flush();
                    self.hw.jump_to_bootloader();
                }
            }
            b'f' => self.hw.measure_frequency(&mut self.io),
            b'g' => {
                self.require_bus_mode()?;
                self.hw.pwm(&mut self.io);
            }
            b'S' => {
                self.require_bus_mode()?;
                self.hw.servo(&mut self.io);
            }
            b'd' => {
                self.io.put_str("VOLTAGE PROBE: ");
                let mv = self.hw.read_millivolts(AdcChannel::Probe);
                self.io.put_volts(mv);
                self.io.put_line("V");
            }
            b'D' => self.hw.voltmeter(&mut self.io),
            _ => return Err(ConsoleError::UnknownCommand),
        }

        Ok(Flow::Continue)
    }

    fn require_bus_mode(&self) -> Result<(), ConsoleError> {
        if self.bus.is_hiz() {
            return Err(ConsoleError::ModeRequired);
        }
        Ok(())
    }

    /// `m [n]`
    fn change_mode(&mut self) -> Result<(), ConsoleError> {
        skip_spaces(&mut self.ring);

        match get_int(&mut self.ring) {
            Ok(n) if n > 0 => {
                let index = (n - 1) as usize;
                if index >= self.protocols.len() {
                    return Err(ConsoleError::NoSuchProtocol);
                }
                self.switch_mode(index);
                self.io.put_line("Ready");
            }
            _ => {
                for (i, name) in self.protocols.names().enumerate() {
                    self.io.put_fmt(format_args!("{}. {}\r\n", i + 1, name));
                }
                self.io.put_line("x. exit(without change)");

                let count = self.protocols.len() as i32;
                match get_number(&mut self.io, 1, 1, count, true) {
                    Some(n) if n > 0 => {
                        let index = (n - 1) as usize;
                        self.switch_mode(index);
                        self.io.put_line("Clutch disengaged!!!");
                        if index != 0 {
                            self.io.put_line(
                                "To finish setup, start up the power supplies with command 'W'\r\n",
                            );
                        }
                        self.io.put_line("Ready");
                    }
                    _ => self.io.put_line("no mode change"),
                }
            }
        }

        Ok(())
    }

    /// Leave the active protocol and enter `index`.
    ///
    /// Order is fixed: outgoing cleanup, board reinit, mode reset,
    /// incoming setup, then the mode LED.
    pub fn switch_mode(&mut self, index: usize) {
        let from = self.bus.bus_mode;

        self.protocols.protocol_mut(from).cleanup(&mut self.io);
        self.hw.reinit();
        self.mode.reset();
        self.bus.bus_mode = index;
        self.protocols
            .protocol_mut(index)
            .setup(&mut self.mode, &mut self.io);
        self.hw.set_mode_led(index != 0);

        let now = self.hw.now_us();
        con_info!(
            self.log,
            now,
            "mode {} -> {}",
            self.protocols.protocol(from).name(),
            self.protocols.protocol(index).name()
        );
    }

    /// `o [n]`
    fn set_display_mode(&mut self) {
        skip_spaces(&mut self.ring);

        let choice = get_int(&mut self.ring).ok().and_then(DisplayMode::from_choice);
        self.bus.display = match choice {
            Some(mode) => mode,
            None => {
                self.io.put_line(DISPLAY_MENU);
                let n = get_number(&mut self.io, 1, 1, 4, false).unwrap_or(1);
                DisplayMode::from_choice(n as u32).unwrap_or(DisplayMode::Hex)
            }
        };
        self.io.put_line("Display format set");
    }

    /// `b [n [brg]]`
    fn set_baud_rate(&mut self) {
        skip_spaces(&mut self.ring);

        let speed = match get_int(&mut self.ring) {
            Ok(n @ 1..=10) => (n - 1) as u8,
            _ => {
                self.io.put_line(BAUD_MENU);
                let n = get_number(&mut self.io, 9, 1, 10, false).unwrap_or(9);
                (n - 1) as u8
            }
        };
        self.bus.terminal_speed = speed;

        let brg = if speed == RAW_BRG_SPEED {
            skip_spaces(&mut self.ring);
            match get_int(&mut self.ring) {
                Ok(n) if n != 0 => Some(n as u16),
                _ => {
                    self.io.put_line("Enter raw value for BRG");
                    Some(get_number(&mut self.io, 34, 0, 32767, false).unwrap_or(34) as u16)
                }
            }
        } else {
            None
        };

        self.io.put_line("Adjust your terminal");
        self.io.put_line("Space to continue");
        self.io.flush();

        self.hw.set_terminal_speed(speed, brg);

        while self.io.read_byte() != b' ' {}
    }

    fn set_aux_role(&mut self, role: AuxRole) {
        self.mode.aux_role = role;
        self.io.put_line(commands::aux_role_message(role));
    }

    fn set_bit_order(&mut self, order: BitOrder) {
        self.mode.bit_order = order;
        self.io.put_line(commands::bit_order_message(order));
    }

    /// `W`: supplies on, verify the rails, then connect the protocol.
    fn power_on(&mut self) -> Result<(), ConsoleError> {
        self.require_bus_mode()?;

        self.hw.set_vreg(true);
        self.hw.delay_ms(2);

        let v33 = self.hw.read_millivolts(AdcChannel::Rail3v3);
        let v5 = self.hw.read_millivolts(AdcChannel::Rail5v);

        if v33 > SUPPLY_LIMITS.min_3v3_mv && v5 > SUPPLY_LIMITS.min_5v_mv {
            self.io.put_line("Power supplies ON");
            let bus = self.bus.bus_mode;
            self.protocols.protocol_mut(bus).get_ready(&mut self.io);
            self.io.put_line("Clutch engaged!!!");
        } else {
            self.hw.set_vreg(false);
            let now = self.hw.now_us();
            con_error!(self.log, now, "supply fault: 3V3={}mV 5V={}mV", v33, v5);
            self.io.put_line(ConsoleError::SupplyFault.message());
            self.io.put_line("Power supplies OFF");
        }

        Ok(())
    }

    /// `w`: disconnect the protocol, then supplies off.
    fn power_off(&mut self) -> Result<(), ConsoleError> {
        self.require_bus_mode()?;

        let bus = self.bus.bus_mode;
        self.protocols.protocol_mut(bus).cleanup(&mut self.io);
        self.io.put_line("Clutch disengaged!!!");

        self.hw.set_vreg(false);
        self.io.put_line("Power supplies OFF");
        Ok(())
    }

    /// `P`
    fn pullups_on(&mut self) -> Result<(), ConsoleError> {
        self.require_bus_mode()?;

        if !self.mode.open_drain {
            self.io.put_line(ConsoleError::NotOpenDrain.message());
        }
        self.hw.set_pullups(true);
        self.io.put_line("Pull-up resistors ON");

        if self.hw.read_millivolts(AdcChannel::Vpullup) < SUPPLY_LIMITS.vpu_present_mv {
            self.io.put_line("Warning: no voltage on Vpullup pin");
        }
        Ok(())
    }

    /// `e [n]`
    fn set_pullup_voltage(&mut self) -> Result<(), ConsoleError> {
        // The argument belongs to `e` even when the command is refused.
        skip_spaces(&mut self.ring);
        let argument = get_int(&mut self.ring).ok();

        self.require_bus_mode()?;
        if !self.mode.open_drain {
            return Err(ConsoleError::NotOpenDrain);
        }

        self.hw.set_pullup_voltage(PullupVoltage::Off);
        self.hw.delay_ms(2);
        if self.hw.read_millivolts(AdcChannel::Vpullup) > SUPPLY_LIMITS.vpu_external_mv {
            self.io.put_line("Warning: already a voltage on Vpullup pin");
        }

        let choice = match argument {
            Some(n) => n,
            None => {
                self.io.put_line(PULLUP_MENU);
                get_number(&mut self.io, 1, 1, 3, false).unwrap_or(1) as u32
            }
        };

        let (voltage, message) = match choice {
            2 => (PullupVoltage::V3v3, "3.3V on-board pullup voltage enabled"),
            3 => (PullupVoltage::V5, "5V on-board pullup voltage enabled"),
            _ => (PullupVoltage::Off, "on-board pullup voltage disabled"),
        };
        self.hw.set_pullup_voltage(voltage);
        self.io.put_line(message);
        Ok(())
    }

    /// `h`: list history, optionally re-run an entry in place of this line.
    fn history_command(&mut self, window: &mut LineWindow) {
        let mut starts = [0usize; HISTORY_LIST_LEN];
        let mut count = 0;

        for from in EntryStarts::new(&self.ring, window.origin).take(HISTORY_LIST_LEN) {
            starts[count] = from;
            count += 1;
            self.io.put_fmt(format_args!("{}. ", count));
            for b in entry_bytes(&self.ring, from) {
                self.io.write_byte(b);
            }
            self.io.newline();
        }

        let choice = get_number(&mut self.io, 0, 1, count as i32, true);
        let index = match choice {
            Some(n) if n > 0 => (n - 1) as usize,
            _ => {
                self.io.newline();
                return;
            }
        };

        let mut line = [0u8; CMD_BUFFER_SIZE];
        let mut len = 0;
        for b in entry_bytes(&self.ring, starts[index]) {
            if len == line.len() - 1 {
                break;
            }
            line[len] = b;
            len += 1;
        }

        let dest = window.next_start;
        for (i, &b) in line[..len].iter().enumerate() {
            self.ring.set(dest.wrapping_add(i), b);
        }
        self.ring.set(dest.wrapping_add(len), 0);
        self.ring.set_start(dest);
        self.ring.set_end(dest.wrapping_add(len + 1));

        window.origin = self.ring.start();
        window.next_start = self.ring.end();
    }

    /// Literal send: `value[:repeat][;bits]`
    fn send_literal(&mut self) -> Result<(), ConsoleError> {
        let value = get_int(&mut self.ring)?;
        let repeat = get_repeat(&mut self.ring)?;
        let bits = get_numbits(&mut self.ring)?;
        if bits != 0 {
            self.mode.set_numbits(bits.min(32) as u8);
        }

        let bus = self.bus.bus_mode;
        self.io.put_str("WRITE: ");
        for _ in 0..repeat {
            self.put_bus_value(value, self.bus.display);

            let wire = self.mode.apply_bit_order(value);
            let reply = self.protocols.protocol_mut(bus).send(wire, &mut self.io);
            self.io.put_str(" ");

            if self.mode.write_with_read {
                self.io.put_str("READ: ");
                let reply = self.mode.apply_bit_order(reply);
                self.put_bus_value(reply, self.bus.display);
                self.io.put_str(" ");
            }
        }
        self.io.newline();
        Ok(())
    }

    /// `r[x|d|b|w][:repeat][;bits]`
    ///
    /// The format override only applies to this read; the session display
    /// mode is never touched.
    fn read_values(&mut self) -> Result<(), ConsoleError> {
        let display = read_format(&mut self.ring).unwrap_or(self.bus.display);
        let repeat = get_repeat(&mut self.ring)?;
        let bits = get_numbits(&mut self.ring)?;
        if bits != 0 {
            self.mode.set_numbits(bits.min(32) as u8);
        }

        let bus = self.bus.bus_mode;
        self.io.put_str("READ: ");
        for _ in 0..repeat {
            let value = self.protocols.protocol_mut(bus).read(&mut self.io);
            let value = self.mode.apply_bit_order(value);
            self.put_bus_value(value, display);
            self.io.put_str(" ");
        }
        self.io.newline();
        Ok(())
    }

    /// `"..."`: every byte up to the closing quote goes to the protocol.
    fn send_string(&mut self) -> Result<(), ConsoleError> {
        let mut len = 1;
        loop {
            match self.ring.peek_at(len) {
                0 => return Err(ConsoleError::Unterminated),
                b'"' => break,
                _ => len += 1,
            }
            if len >= self.ring.capacity() {
                return Err(ConsoleError::Unterminated);
            }
        }

        let bus = self.bus.bus_mode;
        self.ring.advance();
        self.io.put_str("WRITE: \"");
        while self.ring.peek() != b'"' {
            let b = self.ring.take();
            self.io.write_byte(b);
            let wire = self.mode.apply_bit_order(u32::from(b));
            self.protocols.protocol_mut(bus).send(wire, &mut self.io);
        }
        self.ring.advance();
        self.io.put_str("\"");
        self.io.newline();
        Ok(())
    }

    /// `<n>`, `<n=...>`, `<0>`
    fn user_macro(&mut self) -> Result<(), ConsoleError> {
        let mut close = 1;
        loop {
            match self.ring.peek_at(close) {
                0 => return Err(ConsoleError::Unterminated),
                b'>' => break,
                _ => close += 1,
            }
            if close >= self.ring.capacity() {
                return Err(ConsoleError::Unterminated);
            }
        }
        let close = self.ring.wrap(self.ring.start().wrapping_add(close));

        self.ring.advance();
        let slot = get_int(&mut self.ring)?;

        match self.ring.peek() {
            b'=' => {
                let body_start = self.ring.next(self.ring.start());
                self.macros
                    .define(slot, self.ring.bytes(body_start, close))?;
                self.ring.set_start(self.ring.next(close));

                let now = self.hw.now_us();
                con_info!(self.log, now, "macro {} defined", slot);
            }
            b'>' => {
                if slot == 0 {
                    for (n, body) in self.macros.iter() {
                        self.io.put_fmt(format_args!("{}. <", n));
                        self.io.write_bytes(body);
                        self.io.put_line(">");
                    }
                } else {
                    self.macros.schedule(slot)?;
                    self.io.newline();
                }
                self.ring.advance();
            }
            _ => return Err(ConsoleError::Unterminated),
        }

        Ok(())
    }

    /// One bus value in `display`, with `;bits` for partial widths.
    fn put_bus_value(&mut self, value: u32, display: DisplayMode) {
        self.io
            .put_value(value, display, self.mode.numbits, self.mode.int16);
        if self.mode.is_partial_width() {
            self.io.put_fmt(format_args!(";{}", self.mode.numbits));
        }
    }

    /// `HEX = DEC = BIN`, sized to the value.
    fn put_conversion(&mut self, value: u32) {
        let bits: u8 = if value <= 0xFF {
            8
        } else if value <= 0xFFFF {
            16
        } else {
            32
        };

        match bits {
            8 => self.io.put_hex8(value),
            16 => self.io.put_hex16(value),
            _ => self.io.put_fmt(format_args!("0x{:08X}", value)),
        }
        self.io.put_str(" = ");
        self.io.put_dec(value);
        self.io.put_str(" = ");
        self.io.put_bin(value, bits);
        self.io.newline();
    }
}

/// Single-character commands handled after consuming the key.
fn is_command(c: u8) -> bool {
    matches!(
        c,
        b'?' | b'i' | b'v' | b'h' | b'm' | b'o' | b'b' | b'c' | b'C' | b'k' | b'K'
            | b'l' | b'L' | b'W' | b'w' | b'P' | b'p' | b'e' | b'=' | b'|' | b'a'
            | b'A' | b'@' | b'&' | b'%' | b'[' | b'{' | b']' | b'}' | b'/' | b'\\'
            | b'-' | b'_' | b'.' | b'^' | b'!' | b'r' | b'(' | b'~' | b'#' | b'$'
            | b'f' | b'g' | b'S' | b'd' | b'D'
    )
}
