//! Shared fixtures: scripted terminal, recording board and bus.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use buspirate_console::config::{AuxRole, ModeConfig};
use buspirate_console::hal::{
    AdcChannel, ByteIo, DeviceInfo, Hardware, Pin, PinState, PullupVoltage,
};
use buspirate_console::protocol::{HiZ, Protocol, ProtocolTable};
use buspirate_console::Console;

/// Ordered record of board and protocol calls, shared across fixtures.
pub type Events = Rc<RefCell<Vec<String>>>;

pub fn events() -> Events {
    Rc::new(RefCell::new(Vec::new()))
}

/// Terminal fed from a script, capturing everything written.
#[derive(Default)]
pub struct ScriptIo {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
    pub flushes: usize,
}

impl ScriptIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    /// Output so far as text, then cleared.
    pub fn take_output(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.output).into_owned();
        self.output.clear();
        text
    }

    pub fn bells(&self) -> usize {
        self.output.iter().filter(|&&b| b == 0x07).count()
    }
}

impl ByteIo for ScriptIo {
    fn rx_ready(&mut self) -> bool {
        !self.input.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.input.pop_front().expect("script ran out of input")
    }

    fn write_byte(&mut self, byte: u8) {
        self.output.push(byte);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

/// Board double with adjustable rail readings.
pub struct MockHardware {
    pub events: Events,
    pub vreg: bool,
    pub pullups: bool,
    pub pullup_voltage: PullupVoltage,
    pub rail_3v3_mv: u32,
    pub rail_5v_mv: u32,
    pub vpullup_mv: u32,
    pub probe_mv: u32,
    pub aux: bool,
    pub terminal: Option<(u8, Option<u16>)>,
    pub delayed_us: u64,
}

impl MockHardware {
    pub fn new(events: Events) -> Self {
        Self {
            events,
            vreg: false,
            pullups: false,
            pullup_voltage: PullupVoltage::Off,
            rail_3v3_mv: 3_300,
            rail_5v_mv: 5_000,
            vpullup_mv: 3_300,
            probe_mv: 1_250,
            aux: false,
            terminal: None,
            delayed_us: 0,
        }
    }

    fn record(&self, event: impl Into<String>) {
        self.events.borrow_mut().push(event.into());
    }
}

impl Hardware for MockHardware {
    fn reinit(&mut self) {
        self.vreg = false;
        self.pullups = false;
        self.record("reinit");
    }

    fn set_vreg(&mut self, on: bool) {
        self.vreg = on;
        self.record(format!("vreg {}", on));
    }

    fn vreg_enabled(&mut self) -> bool {
        self.vreg
    }

    fn set_pullups(&mut self, on: bool) {
        self.pullups = on;
        self.record(format!("pullups {}", on));
    }

    fn pullups_enabled(&mut self) -> bool {
        self.pullups
    }

    fn set_pullup_voltage(&mut self, voltage: PullupVoltage) {
        self.pullup_voltage = voltage;
    }

    fn read_millivolts(&mut self, channel: AdcChannel) -> u32 {
        match channel {
            AdcChannel::Rail3v3 => self.rail_3v3_mv,
            AdcChannel::Rail5v => self.rail_5v_mv,
            AdcChannel::Vpullup => self.vpullup_mv,
            AdcChannel::Probe => self.probe_mv,
        }
    }

    fn set_aux(&mut self, _role: AuxRole, high: bool) {
        self.aux = high;
    }

    fn read_aux(&mut self, _role: AuxRole) -> bool {
        self.aux
    }

    fn pin_state(&mut self, pin: Pin) -> PinState {
        PinState {
            input: pin != Pin::Aux,
            high: pin == Pin::Aux && self.aux,
        }
    }

    fn delay_us(&mut self, us: u32) {
        self.delayed_us += u64::from(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delayed_us += u64::from(ms) * 1000;
    }

    fn now_us(&mut self) -> i64 {
        self.delayed_us as i64
    }

    fn set_mode_led(&mut self, on: bool) {
        self.record(format!("led {}", on));
    }

    fn set_terminal_speed(&mut self, speed: u8, brg: Option<u16>) {
        self.terminal = Some((speed, brg));
    }

    fn device_info(&mut self) -> DeviceInfo {
        DeviceInfo {
            hardware: "Bus Pirate v3.5",
            bootloader: Some((4, 4)),
            device_id: 0x0447,
            revision: 0x3046,
            chip: "24FJ64GA002 B8",
            config_words: [0xFFFF, 0xFFFF],
        }
    }

    fn enter_binary_mode(&mut self, io: &mut dyn ByteIo) {
        self.record("binary mode");
        io.write_bytes(b"BBIO1");
    }

    fn enter_sump_mode(&mut self, _io: &mut dyn ByteIo) {
        self.record("sump mode");
    }

    fn reset(&mut self) -> ! {
        self.record("reset");
        panic!("board reset");
    }

    fn jump_to_bootloader(&mut self) -> ! {
        self.record("bootloader");
        panic!("bootloader jump");
    }
}

/// Bus double that logs every primitive and loops writes back.
pub struct Recorder {
    pub events: Events,
    /// Value returned by `read`.
    pub read_value: u32,
    /// Turn on write-with-read during setup.
    pub echo_writes: bool,
    /// Printed once by the idle hook; enables periodic service.
    pub notice: Option<&'static str>,
}

impl Recorder {
    pub fn new(events: Events) -> Self {
        Self {
            events,
            read_value: 0x41,
            echo_writes: false,
            notice: None,
        }
    }

    fn record(&self, event: impl Into<String>) {
        self.events.borrow_mut().push(event.into());
    }
}

impl Protocol for Recorder {
    fn name(&self) -> &'static str {
        "SPI"
    }

    fn setup(&mut self, mode: &mut ModeConfig, _io: &mut dyn ByteIo) {
        mode.write_with_read = self.echo_writes;
        mode.periodic_service = self.notice.is_some();
        self.record("setup");
    }

    fn cleanup(&mut self, _io: &mut dyn ByteIo) {
        self.record("cleanup");
    }

    fn get_ready(&mut self, _io: &mut dyn ByteIo) {
        self.record("get_ready");
    }

    fn start(&mut self, _io: &mut dyn ByteIo) {
        self.record("start");
    }

    fn stop(&mut self, _io: &mut dyn ByteIo) {
        self.record("stop");
    }

    fn send(&mut self, value: u32, _io: &mut dyn ByteIo) -> u32 {
        self.record(format!("send {:#04x}", value));
        value
    }

    fn read(&mut self, _io: &mut dyn ByteIo) -> u32 {
        self.record("read");
        self.read_value
    }

    fn periodic_update(&mut self, io: &mut dyn ByteIo) -> bool {
        match self.notice.take() {
            Some(text) => {
                io.write_bytes(text.as_bytes());
                true
            }
            None => false,
        }
    }
}

/// HiZ plus one recording bus.
pub struct Bench {
    pub hiz: HiZ,
    pub spi: Recorder,
}

impl ProtocolTable for Bench {
    fn len(&self) -> usize {
        2
    }

    fn protocol(&self, index: usize) -> &dyn Protocol {
        match index {
            0 => &self.hiz,
            _ => &self.spi,
        }
    }

    fn protocol_mut(&mut self, index: usize) -> &mut dyn Protocol {
        match index {
            0 => &mut self.hiz,
            _ => &mut self.spi,
        }
    }
}

pub type TestConsole = Console<ScriptIo, MockHardware, Bench>;

/// Fresh console in HiZ mode and the event log it writes to.
pub fn console() -> (TestConsole, Events) {
    console_with(|_| {})
}

/// Like [`console`], tuning the recording bus first.
pub fn console_with(tune: impl FnOnce(&mut Recorder)) -> (TestConsole, Events) {
    let log = events();
    let mut spi = Recorder::new(log.clone());
    tune(&mut spi);

    let bench = Bench { hiz: HiZ, spi };
    let console = Console::new(ScriptIo::new(), MockHardware::new(log.clone()), bench);
    (console, log)
}

/// Type `keys` and step until the script is consumed; returns the
/// output produced.
pub fn type_keys(console: &mut TestConsole, keys: &str) -> String {
    console.io_mut().push(keys.as_bytes());
    while console.io_mut().rx_ready() {
        console.step();
    }
    console.io_mut().take_output()
}

/// Switch to the recording bus and forget the events that caused.
pub fn enter_spi(console: &mut TestConsole, log: &Events) {
    type_keys(console, "m 2\r");
    log.borrow_mut().clear();
}
