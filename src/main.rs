//! buspirate-console - Main entry point
//!
//! Firmware (`target_os = "espidf"`): console on UART0, diagnostic log on
//! UART1 TX, a bare dev kit standing in for the bus hardware.
//!
//! Host: console on stdin/stdout with a loopback protocol, log on stderr.

#![cfg_attr(target_os = "espidf", no_std)]
#![cfg_attr(target_os = "espidf", no_main)]

#[cfg(target_os = "espidf")]
#[no_mangle]
fn main() {
    esp_idf_svc::sys::link_patches();

    if firmware::run().is_err() {
        esp_idf_svc::hal::reset::restart();
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    host::run();
}

#[cfg(target_os = "espidf")]
mod firmware {
    use buspirate_console::config::AuxRole;
    use buspirate_console::hal::uart::{UartConsole, UartLogPort};
    use buspirate_console::hal::{
        AdcChannel, ByteIo, DeviceInfo, Hardware, Pin, PinState, PullupVoltage,
    };
    use buspirate_console::log_drain::{self, LogDrainConfig};
    use buspirate_console::protocol::{HiZ, Protocol};
    use buspirate_console::{Console, Step, CONSOLE_LOG};
    use esp_idf_svc::hal::delay::{Ets, FreeRtos};
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{self, UartDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::EspError;

    /// Board services of a plain dev kit: no regulators or ADC taps, so
    /// rails read nominal and pins keep their last requested state.
    struct DevKit {
        vreg: bool,
        pullups: bool,
        aux: bool,
    }

    impl Hardware for DevKit {
        fn reinit(&mut self) {
            self.vreg = false;
            self.pullups = false;
            self.aux = false;
        }

        fn set_vreg(&mut self, on: bool) {
            self.vreg = on;
        }

        fn vreg_enabled(&mut self) -> bool {
            self.vreg
        }

        fn set_pullups(&mut self, on: bool) {
            self.pullups = on;
        }

        fn pullups_enabled(&mut self) -> bool {
            self.pullups
        }

        fn set_pullup_voltage(&mut self, _voltage: PullupVoltage) {}

        fn read_millivolts(&mut self, channel: AdcChannel) -> u32 {
            match channel {
                AdcChannel::Rail3v3 if self.vreg => 3_300,
                AdcChannel::Rail5v if self.vreg => 5_000,
                _ => 0,
            }
        }

        fn set_aux(&mut self, _role: AuxRole, high: bool) {
            self.aux = high;
        }

        fn read_aux(&mut self, _role: AuxRole) -> bool {
            self.aux
        }

        fn pin_state(&mut self, pin: Pin) -> PinState {
            match pin {
                Pin::Aux => PinState { input: false, high: self.aux },
                _ => PinState { input: true, high: false },
            }
        }

        fn delay_us(&mut self, us: u32) {
            Ets::delay_us(us);
        }

        fn delay_ms(&mut self, ms: u32) {
            FreeRtos::delay_ms(ms);
        }

        fn now_us(&mut self) -> i64 {
            // SAFETY: esp_timer is started by the IDF before main
            unsafe { esp_idf_svc::sys::esp_timer_get_time() }
        }

        fn set_mode_led(&mut self, _on: bool) {}

        fn set_terminal_speed(&mut self, _speed: u8, _brg: Option<u16>) {}

        fn device_info(&mut self) -> DeviceInfo {
            DeviceInfo {
                hardware: "Bus Pirate console (ESP32 dev kit)",
                bootloader: None,
                device_id: 0,
                revision: 0,
                chip: if cfg!(feature = "esp32s3") { "ESP32-S3" } else { "ESP32-P4" },
                config_words: [0, 0],
            }
        }

        fn enter_binary_mode(&mut self, io: &mut dyn ByteIo) {
            io.write_bytes(b"BBIO1");
        }

        fn reset(&mut self) -> ! {
            esp_idf_svc::hal::reset::restart()
        }

        fn jump_to_bootloader(&mut self) -> ! {
            #[cfg(feature = "esp32s3")]
            // SAFETY: forces ROM download boot on the next restart (S3 only)
            unsafe {
                const RTC_CNTL_OPTION1_REG: u32 = 0x6000_8128;
                const RTC_CNTL_FORCE_DOWNLOAD_BOOT: u32 = 1;
                core::ptr::write_volatile(
                    RTC_CNTL_OPTION1_REG as *mut u32,
                    RTC_CNTL_FORCE_DOWNLOAD_BOOT,
                );
            }
            esp_idf_svc::hal::reset::restart()
        }
    }

    pub fn run() -> Result<(), EspError> {
        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;

        let config = uart::config::Config::default().baudrate(Hertz(115_200));

        #[cfg(feature = "esp32s3")]
        let (tx, rx) = (pins.gpio43, pins.gpio44);
        #[cfg(not(feature = "esp32s3"))]
        let (tx, rx) = (pins.gpio37, pins.gpio38);

        let uart = UartDriver::new(
            peripherals.uart0,
            tx,
            rx,
            Option::<AnyIOPin>::None, // CTS
            Option::<AnyIOPin>::None, // RTS
            &config,
        )?;

        let log_tx =
            log_drain::init_log_uart(peripherals.uart1, pins.gpio17, &LogDrainConfig::default())?;
        let mut log_port = UartLogPort::new(log_tx);

        let mut hiz = HiZ;
        let protocols: [&mut dyn Protocol; 1] = [&mut hiz];

        let board = DevKit {
            vreg: false,
            pullups: false,
            aux: false,
        };
        let mut console = Console::new(UartConsole::new(uart), board, protocols);
        console.print_banner();

        loop {
            if console.step() == Step::Idle {
                log_drain::drain_into(&CONSOLE_LOG, &mut log_port);
                FreeRtos::delay_ms(1);
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::io::{Read, Write};
    use std::sync::mpsc::{self, Receiver, TryRecvError};
    use std::time::{Duration, Instant};

    use buspirate_console::config::{AuxRole, ModeConfig};
    use buspirate_console::hal::{
        AdcChannel, ByteIo, DeviceInfo, Hardware, Pin, PinState, PullupVoltage,
    };
    use buspirate_console::log_drain;
    use buspirate_console::protocol::{HiZ, Protocol};
    use buspirate_console::{Console, Step, CONSOLE_LOG};

    /// Terminal on stdin/stdout, fed by a reader thread.
    struct StdTerminal {
        rx: Receiver<u8>,
        peeked: Option<u8>,
        out: std::io::Stdout,
    }

    impl StdTerminal {
        fn spawn() -> Self {
            let (tx, rx) = mpsc::channel();
            std::thread::spawn(move || {
                let stdin = std::io::stdin();
                for byte in stdin.lock().bytes() {
                    match byte {
                        Ok(b) if tx.send(b).is_ok() => {}
                        _ => break,
                    }
                }
            });
            Self {
                rx,
                peeked: None,
                out: std::io::stdout(),
            }
        }
    }

    impl ByteIo for StdTerminal {
        fn rx_ready(&mut self) -> bool {
            if self.peeked.is_some() {
                return true;
            }
            match self.rx.try_recv() {
                Ok(b) => {
                    self.peeked = Some(b);
                    true
                }
                Err(TryRecvError::Empty) => false,
                Err(TryRecvError::Disconnected) => std::process::exit(0),
            }
        }

        fn read_byte(&mut self) -> u8 {
            let _ = self.out.flush();
            if let Some(b) = self.peeked.take() {
                return b;
            }
            self.rx.recv().unwrap_or_else(|_| std::process::exit(0))
        }

        fn write_byte(&mut self, byte: u8) {
            let _ = self.out.write_all(&[byte]);
        }

        fn write_bytes(&mut self, bytes: &[u8]) {
            let _ = self.out.write_all(bytes);
        }

        fn flush(&mut self) {
            let _ = self.out.flush();
        }
    }

    struct Stderr;

    impl ByteIo for Stderr {
        fn rx_ready(&mut self) -> bool {
            false
        }

        fn read_byte(&mut self) -> u8 {
            0
        }

        fn write_byte(&mut self, byte: u8) {
            let _ = std::io::stderr().write_all(&[byte]);
        }
    }

    /// Pretend board with healthy rails.
    struct Simulator {
        started: Instant,
        vreg: bool,
        pullups: bool,
        aux: bool,
    }

    impl Hardware for Simulator {
        fn reinit(&mut self) {
            self.vreg = false;
            self.pullups = false;
            self.aux = false;
        }

        fn set_vreg(&mut self, on: bool) {
            self.vreg = on;
        }

        fn vreg_enabled(&mut self) -> bool {
            self.vreg
        }

        fn set_pullups(&mut self, on: bool) {
            self.pullups = on;
        }

        fn pullups_enabled(&mut self) -> bool {
            self.pullups
        }

        fn set_pullup_voltage(&mut self, _voltage: PullupVoltage) {}

        fn read_millivolts(&mut self, channel: AdcChannel) -> u32 {
            match channel {
                AdcChannel::Rail3v3 if self.vreg => 3_300,
                AdcChannel::Rail5v if self.vreg => 5_000,
                AdcChannel::Vpullup if self.pullups => 3_300,
                _ => 0,
            }
        }

        fn set_aux(&mut self, _role: AuxRole, high: bool) {
            self.aux = high;
        }

        fn read_aux(&mut self, _role: AuxRole) -> bool {
            self.aux
        }

        fn pin_state(&mut self, pin: Pin) -> PinState {
            match pin {
                Pin::Aux => PinState { input: false, high: self.aux },
                _ => PinState { input: true, high: false },
            }
        }

        fn delay_us(&mut self, us: u32) {
            std::thread::sleep(Duration::from_micros(u64::from(us)));
        }

        fn delay_ms(&mut self, ms: u32) {
            std::thread::sleep(Duration::from_millis(u64::from(ms)));
        }

        fn now_us(&mut self) -> i64 {
            self.started.elapsed().as_micros() as i64
        }

        fn set_mode_led(&mut self, _on: bool) {}

        fn set_terminal_speed(&mut self, _speed: u8, _brg: Option<u16>) {}

        fn device_info(&mut self) -> DeviceInfo {
            DeviceInfo {
                hardware: "Bus Pirate console (host simulator)",
                bootloader: None,
                device_id: 0,
                revision: 0,
                chip: "host",
                config_words: [0, 0],
            }
        }

        fn enter_binary_mode(&mut self, io: &mut dyn ByteIo) {
            io.write_bytes(b"BBIO1");
        }

        fn reset(&mut self) -> ! {
            std::process::exit(0)
        }

        fn jump_to_bootloader(&mut self) -> ! {
            std::process::exit(0)
        }
    }

    /// Echoes every written value back on the next read.
    #[derive(Default)]
    struct Loopback {
        last: u32,
    }

    impl Protocol for Loopback {
        fn name(&self) -> &'static str {
            "LOOPBACK"
        }

        fn setup(&mut self, mode: &mut ModeConfig, _io: &mut dyn ByteIo) {
            mode.write_with_read = true;
        }

        fn start(&mut self, _io: &mut dyn ByteIo) {}

        fn stop(&mut self, _io: &mut dyn ByteIo) {}

        fn send(&mut self, value: u32, _io: &mut dyn ByteIo) -> u32 {
            self.last = value;
            value
        }

        fn read(&mut self, _io: &mut dyn ByteIo) -> u32 {
            self.last
        }

        fn print_pins_state(&mut self, io: &mut dyn ByteIo) {
            io.write_bytes(b"CLK\tMOSI\tCS\tMISO");
        }
    }

    pub fn run() {
        let mut hiz = HiZ;
        let mut loopback = Loopback::default();
        let protocols: [&mut dyn Protocol; 2] = [&mut hiz, &mut loopback];

        let board = Simulator {
            started: Instant::now(),
            vreg: false,
            pullups: false,
            aux: false,
        };
        let mut console = Console::new(StdTerminal::spawn(), board, protocols);
        let mut stderr = Stderr;

        console.print_banner();
        console.io_mut().flush();

        loop {
            if console.step() == Step::Idle {
                log_drain::drain_into(&CONSOLE_LOG, &mut stderr);
                console.io_mut().flush();
                std::thread::sleep(Duration::from_millis(5));
            }
        }
    }
}
