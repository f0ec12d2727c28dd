//! Help table and information screens

use super::console::{Console, VERSION};
use super::term::TermWrite;
use crate::config::{AuxRole, BitOrder};
use crate::hal::{AdcChannel, ByteIo, Hardware, Pin};
use crate::protocol::ProtocolTable;

/// Command descriptor
pub struct CommandDescriptor {
    pub key: &'static str,
    pub brief: &'static str,
}

/// All commands, in help order
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { key: "?", brief: "This help" },
    CommandDescriptor { key: "=X/|X", brief: "Converts X/reverse X" },
    CommandDescriptor { key: "~", brief: "Selftest" },
    CommandDescriptor { key: "#", brief: "Reset" },
    CommandDescriptor { key: "$", brief: "Jump to bootloader" },
    CommandDescriptor { key: "&/%", brief: "Delay 1 us/ms" },
    CommandDescriptor { key: "a/A/@", brief: "AUXPIN (low/HI/READ)" },
    CommandDescriptor { key: "b", brief: "Set baudrate" },
    CommandDescriptor { key: "c/C", brief: "AUX assignment (aux/CS)" },
    CommandDescriptor { key: "k/K", brief: "AUX assignment (aux1/aux2)" },
    CommandDescriptor { key: "d/D", brief: "Measure ADC (once/CONT.)" },
    CommandDescriptor { key: "e", brief: "Set pullup voltage" },
    CommandDescriptor { key: "f", brief: "Measure frequency" },
    CommandDescriptor { key: "g/S", brief: "Generate PWM/Servo" },
    CommandDescriptor { key: "h", brief: "Command history" },
    CommandDescriptor { key: "i", brief: "Versioninfo/statusinfo" },
    CommandDescriptor { key: "l/L", brief: "Bitorder (msb/LSB)" },
    CommandDescriptor { key: "m", brief: "Change mode" },
    CommandDescriptor { key: "o", brief: "Set output type" },
    CommandDescriptor { key: "p/P", brief: "Pullup resistors (off/ON)" },
    CommandDescriptor { key: "v", brief: "Show volts/states" },
    CommandDescriptor { key: "w/W", brief: "PSU (off/ON)" },
    CommandDescriptor { key: "(x)", brief: "Protocol macro x" },
    CommandDescriptor { key: "<x>/<x= >/<0>", brief: "Usermacro x/assign x/list all" },
    CommandDescriptor { key: "[/{", brief: "Start" },
    CommandDescriptor { key: "]/}", brief: "Stop" },
    CommandDescriptor { key: "1234", brief: "Send value" },
    CommandDescriptor { key: "r", brief: "Read" },
    CommandDescriptor { key: "/\\", brief: "Clock hi/lo" },
    CommandDescriptor { key: "-/_", brief: "Data hi/lo" },
    CommandDescriptor { key: "^", brief: "Clock tick" },
    CommandDescriptor { key: ".", brief: "Read data pin state" },
    CommandDescriptor { key: "!", brief: "Read bit" },
    CommandDescriptor { key: ":", brief: "Repeat e.g. r:2" },
    CommandDescriptor { key: ";", brief: "Bits to read/write e.g. 0x55;2" },
    CommandDescriptor { key: "\"abc\"", brief: "Send string" },
];

/// Print the help table
pub fn print_help(io: &mut dyn ByteIo) {
    for c in COMMANDS {
        io.put_fmt(format_args!("{:<16}{}\r\n", c.key, c.brief));
    }
}

/// Message shown when the AUX role changes, and in the status screen.
pub fn aux_role_message(role: AuxRole) -> &'static str {
    match role {
        AuxRole::Aux => "a/A/@ controls AUX pin",
        AuxRole::Cs => "a/A/@ controls CS pin",
        AuxRole::Aux1 => "a/A/@ controls AUX1 pin",
        AuxRole::Aux2 => "a/A/@ controls AUX2 pin",
    }
}

pub fn bit_order_message(order: BitOrder) -> &'static str {
    match order {
        BitOrder::MsbFirst => "MSB set: MOST sig bit first",
        BitOrder::LsbFirst => "LSB set: LEAST sig bit first",
    }
}

impl<IO: ByteIo, HW: Hardware, P: ProtocolTable> Console<IO, HW, P> {
    /// Hardware, firmware and chip identification (`i`, startup).
    pub fn version_info(&mut self) {
        let info = self.hw.device_info();

        self.io.put_line(info.hardware);
        self.io.put_str(VERSION);
        self.io.put_str(" [");
        for (i, name) in self.protocols.names().enumerate() {
            if i > 0 {
                self.io.put_str(" ");
            }
            self.io.put_str(name);
        }
        self.io.put_str("]");
        if let Some((major, minor)) = info.bootloader {
            self.io
                .put_fmt(format_args!(" Bootloader v{}.{}", major, minor));
        }
        self.io.newline();

        self.io.put_fmt(format_args!(
            "DEVID:0x{:04X} REVID:0x{:04X} ({})\r\n",
            info.device_id, info.revision, info.chip
        ));
        self.io.put_line("http://dangerousprototypes.com");
    }

    /// Settings of the active mode (`i` outside HiZ).
    pub fn status_info(&mut self) {
        let info = self.hw.device_info();
        self.io.put_fmt(format_args!(
            "CFG1:0x{:04X} CFG2:0x{:04X}\r\n",
            info.config_words[0], info.config_words[1]
        ));
        self.io.put_line("*----------*");

        self.pin_states();

        let vreg = self.hw.vreg_enabled();
        self.io
            .put_str(if vreg { "Power supplies ON" } else { "Power supplies OFF" });
        self.io.put_str(", ");
        let pullups = self.hw.pullups_enabled();
        self.io.put_str(if pullups {
            "Pull-up resistors ON"
        } else {
            "Pull-up resistors OFF"
        });
        self.io.put_str(", ");
        self.io.put_line(if self.mode.open_drain {
            "Open drain outputs (H=Hi-Z, L=GND)"
        } else {
            "Normal outputs (H=3.3V, L=GND)"
        });

        self.io.put_str(bit_order_message(self.mode.bit_order));
        self.io.put_fmt(format_args!(
            ", Number of bits read/write: {}\r\n",
            self.mode.numbits
        ));
        self.io.put_line(aux_role_message(self.mode.aux_role));

        self.protocols
            .protocol_mut(self.bus.bus_mode)
            .print_settings(&mut self.io);

        self.io.put_line("*----------*");
    }

    /// Pin direction, level and rail voltage table (`v`).
    pub fn pin_states(&mut self) {
        self.io.put_line("Pinstates:");
        self.io.put_line(
            "1.(BR)\t2.(RD)\t3.(OR)\t4.(YW)\t5.(GN)\t6.(BL)\t7.(PU)\t8.(GR)\t9.(WT)\t0.(Blk)",
        );
        self.io.put_str("GND\t3.3V\t5.0V\tADC\tVPU\tAUX\t");
        self.protocols
            .protocol_mut(self.bus.bus_mode)
            .print_pins_state(&mut self.io);
        self.io.newline();

        self.io.put_str("P\tP\tP\tI\tI\t");
        for pin in Pin::ALL {
            let state = self.hw.pin_state(pin);
            self.io.put_str(if state.input { "I\t" } else { "O\t" });
        }
        self.io.newline();

        self.io.put_str("GND\t");
        for channel in [
            AdcChannel::Rail3v3,
            AdcChannel::Rail5v,
            AdcChannel::Probe,
            AdcChannel::Vpullup,
        ] {
            let mv = self.hw.read_millivolts(channel);
            self.io.put_volts(mv);
            self.io.put_str("V\t");
        }
        for pin in Pin::ALL {
            let state = self.hw.pin_state(pin);
            self.io.put_str(if state.high { "H\t" } else { "L\t" });
        }
        self.io.newline();
    }
}
