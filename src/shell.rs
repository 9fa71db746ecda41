//! The `x9555` shell command.
//!
//! [`Shell`] owns the platform and the one device created with `x9555 create`, and dispatches
//! argument vectors the way an RTOS shell passes them (`args[0]` is the command name).  Output
//! goes to any [`core::fmt::Write`], so the same dispatcher works on a UART console and on a
//! host terminal.
use core::cell::RefCell;
use core::fmt::{self, Write};

use crate::interrupt::{is_no_interrupt_pin, log_interrupt, NO_INTERRUPT_PIN};
use crate::registers::{Mode, Pin, PinState, Port, Register};
use crate::{
    Address, BusProvider, Device, Driver, Error, InterruptCallback, InterruptController,
    InterruptStatus, PinId,
};

/// Longest bus name a [`DeviceIdentity`] can hold.
pub const BUS_NAME_MAX: usize = 16;

type BusError<P> = <<P as BusProvider>::Bus as embedded_hal::i2c::ErrorType>::Error;
type ShellDevice<P> = Device<RefCell<Driver<<P as BusProvider>::Bus>>>;

/// What `x9555 create` was asked for; a matching identity reuses the existing device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub bus: heapless::String<BUS_NAME_MAX>,
    pub interrupt_pin: Option<PinId>,
    pub address: Address,
}

/// An argument rendered as `[Decimal 5]->[Hexadecimal 0x5]->[Binary 101]`.
pub struct Radix(pub u8);

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Decimal {}]->[Hexadecimal {:#x}]->[Binary {:b}]",
            self.0, self.0, self.0
        )
    }
}

/// Parse a decimal, `0x` hexadecimal or `0b` binary byte.
pub fn parse_literal(s: &str) -> Option<u8> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u8::from_str_radix(bin, 2).ok()
    } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

enum Failure<E> {
    Output(fmt::Error),
    Number(usize),
    BusName,
    Device(Error<E>),
}

impl<E> From<fmt::Error> for Failure<E> {
    fn from(e: fmt::Error) -> Self {
        Failure::Output(e)
    }
}

impl<E> From<Error<E>> for Failure<E> {
    fn from(e: Error<E>) -> Self {
        Failure::Device(e)
    }
}

impl<E> From<crate::InvalidArgument> for Failure<E> {
    fn from(e: crate::InvalidArgument) -> Self {
        Failure::Device(e.into())
    }
}

struct Session<P: BusProvider> {
    identity: DeviceIdentity,
    device: ShellDevice<P>,
    last_status: Option<InterruptStatus>,
}

pub struct Shell<P: BusProvider> {
    platform: P,
    session: Option<Session<P>>,
    callback: InterruptCallback,
}

impl<P> Shell<P>
where
    P: BusProvider + InterruptController,
{
    pub fn new(platform: P) -> Self {
        Self::with_callback(platform, log_interrupt)
    }

    /// Use `callback` as interrupt routine for every device created from this shell.
    pub fn with_callback(platform: P, callback: InterruptCallback) -> Self {
        Self {
            platform,
            session: None,
            callback,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn device(&self) -> Option<&ShellDevice<P>> {
        self.session.as_ref().map(|s| &s.device)
    }

    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.session.as_ref().map(|s| &s.identity)
    }

    /// Tear down the current device, detaching its interrupt.
    pub fn destroy(&mut self) {
        if let Some(session) = self.session.take() {
            drop(session.device.deinit(&mut self.platform));
        }
    }

    /// Run one command line.  Only errors of `out` itself are returned; everything else is
    /// reported as text.
    pub fn run<W: Write>(&mut self, args: &[&str], out: &mut W) -> fmt::Result {
        if args.len() < 2 {
            return usage(out);
        }
        writeln!(
            out,
            "user input command is : x9555 {}, parameters count are : {} ",
            args[1],
            args.len() - 2
        )?;

        match self.dispatch(args, out) {
            Ok(()) => Ok(()),
            Err(Failure::Output(e)) => Err(e),
            Err(Failure::Number(i)) => writeln!(
                out,
                "'{}' is not a decimal, 0x hexadecimal or 0b binary byte.\n",
                args[i]
            ),
            Err(Failure::BusName) => writeln!(
                out,
                "bus name '{}' is longer than {} characters.\n",
                args[3], BUS_NAME_MAX
            ),
            Err(Failure::Device(e)) => writeln!(out, "x9555 {} failed: {}.\n", args[1], e),
        }
    }

    fn dispatch<W: Write>(&mut self, args: &[&str], out: &mut W) -> Result<(), Failure<BusError<P>>> {
        let num = |i: usize| -> Result<u8, Failure<BusError<P>>> {
            parse_literal(args[i]).ok_or(Failure::Number(i))
        };

        if args[1] == "create" {
            if args.len() < 5 {
                writeln!(
                    out,
                    "cmd is : x9555 create <device interrupt pin> <device_name> <device address>\n\
                     --device interrupt pin is : x9555 interrupt pin name, {} for none.\n\
                     --device_name is : I2C bus name.\n\
                     --device address is : 0x0[A2 A1 A0]\n",
                    NO_INTERRUPT_PIN
                )?;
                return Ok(());
            }
            return self.create(args[2], args[3], num(4)?, out);
        }

        let Some(session) = &mut self.session else {
            writeln!(
                out,
                "Please using command : x9555 create <device interrupt pin> <device name> <device address>' first.\n"
            )?;
            return Ok(());
        };
        let device = &session.device;

        match (args[1], args.len()) {
            ("interrupt_clear", _) => {
                let status = device.interrupt_clear()?;
                writeln!(out, "x9555 interrupt clear done:")?;
                writeln!(out, "read port0 value :{}.", Radix(status.port0))?;
                writeln!(out, "read port1 value :{}.", Radix(status.port1))?;
                if let Some(last) = session.last_status.replace(status) {
                    write!(out, "changed pins since last clear :")?;
                    for pin in status.changed_since(&last) {
                        write!(out, " {}", pin.number())?;
                    }
                    writeln!(out, ".")?;
                }
                writeln!(out)?;
            }
            ("port_config", 5..) => {
                let (port, register, value) = (num(2)?, num(3)?, num(4)?);
                device.configure(Port::try_from(port)?, Register::try_from(register)?, value)?;
                writeln!(out, "x9555 port config done:")?;
                writeln!(out, "port number is :{}.", Radix(port))?;
                writeln!(out, "config register address is :{}.", Radix(register))?;
                writeln!(out, "config register value is :{}.\n", Radix(value))?;
            }
            ("port_mode", 4..) => {
                let (port, mode) = (num(2)?, num(3)?);
                device.set_port_mode(Port::try_from(port)?, Mode::try_from(mode)?)?;
                writeln!(out, "set x9555 port mode done:")?;
                writeln!(out, "port number is :{}.", Radix(port))?;
                writeln!(out, "port mode is :{}.\n", Radix(mode))?;
            }
            ("port_write", 4..) => {
                let (port, value) = (num(2)?, num(3)?);
                device.write_port(Port::try_from(port)?, value)?;
                writeln!(out, "x9555 port write done:")?;
                writeln!(out, "port number is :{}.", Radix(port))?;
                writeln!(out, "port value is :{}.\n", Radix(value))?;
            }
            ("port_read", 4..) => {
                let (port, mode) = (num(2)?, num(3)?);
                let value = device.read_port(Port::try_from(port)?, Mode::try_from(mode)?)?;
                writeln!(out, "x9555 port read done:")?;
                writeln!(out, "port number is :{}.", Radix(port))?;
                writeln!(out, "port mode is :{}.", Radix(mode))?;
                writeln!(out, "read port value :{}.\n", Radix(value))?;
            }
            ("pin_mode", 4..) => {
                let (pin, mode) = (num(2)?, num(3)?);
                device.set_pin_mode(Pin::try_from(pin)?, Mode::try_from(mode)?)?;
                writeln!(out, "set x9555 pin mode done:")?;
                writeln!(out, "pin number is :{}.", Radix(pin))?;
                writeln!(out, "pin mode is :{}.\n", Radix(mode))?;
            }
            ("pin_write", 4..) => {
                let (pin, state) = (num(2)?, num(3)?);
                device.write_pin(Pin::try_from(pin)?, PinState::try_from(state)?)?;
                writeln!(out, "x9555 pin write done:")?;
                writeln!(out, "pin number is :{}.", Radix(pin))?;
                writeln!(out, "pin state is :{}.\n", Radix(state))?;
            }
            ("pin_read", 4..) => {
                let (pin, mode) = (num(2)?, num(3)?);
                let state = device.read_pin(Pin::try_from(pin)?, Mode::try_from(mode)?)?;
                writeln!(out, "x9555 pin read done:")?;
                writeln!(out, "pin number is :{}.", Radix(pin))?;
                writeln!(out, "pin mode is :{}.", Radix(mode))?;
                writeln!(out, "read pin value :{}.\n", Radix(state as u8))?;
            }
            _ => writeln!(
                out,
                "command don't found or not enough parameters. Please enter 'x9555' for help.\n"
            )?,
        }
        Ok(())
    }

    fn create<W: Write>(
        &mut self,
        pin_name: &str,
        bus_name: &str,
        offset: u8,
        out: &mut W,
    ) -> Result<(), Failure<BusError<P>>> {
        let mut bus = heapless::String::new();
        bus.push_str(bus_name)
            .map_err(|_| Failure::<BusError<P>>::BusName)?;
        let identity = DeviceIdentity {
            bus,
            interrupt_pin: if is_no_interrupt_pin(pin_name) {
                None
            } else {
                self.platform.pin_get(pin_name)
            },
            address: Address::from_offset(offset),
        };

        // An unresolvable pin name must reach `init` so it gets reported.
        let unresolved = !is_no_interrupt_pin(pin_name) && identity.interrupt_pin.is_none();
        if unresolved || self.identity() != Some(&identity) {
            writeln!(out, "create ...")?;
            self.destroy();
            let device = Device::init(&mut self.platform, pin_name, bus_name, offset, self.callback)?;
            self.session = Some(Session {
                identity,
                device,
                last_status: None,
            });
        }

        let pin = match self.device().and_then(|d| d.interrupt_pin()) {
            Some(PinId(n)) => n as i64,
            None => -1,
        };
        writeln!(out, "x9555 device create done.")?;
        writeln!(
            out,
            "device interrupt set pin name : {}, get pin number : [{}].",
            pin_name, pin
        )?;
        writeln!(out, "device bus is : {}.", bus_name)?;
        writeln!(out, "devices address is :{}.\n", Radix(offset))?;
        Ok(())
    }
}

/// Help text printed by a bare `x9555`.
pub fn usage<W: Write>(out: &mut W) -> fmt::Result {
    writeln!(out, "Usage:")?;
    writeln!(
        out,
        "x9555 create <device interrupt pin> <device name> <device address> \t - create x9555 by given name.\n\
         Example 1 :x9555 create PA.00 i2c1 0x01\n\
         Example 2 :x9555 create {} i2c1 0x01\n",
        NO_INTERRUPT_PIN
    )?;
    for (cmd, help) in [
        ("interrupt_clear \t\t\t\t\t", "x9555 interrupt clear."),
        ("port_config <port> <config register> <register value> \t", "config x9555 register."),
        ("port_mode <port> <port mode> \t\t\t\t", "set x9555 port mode."),
        ("port_write <port> <port value> \t\t\t\t", "set x9555 port output."),
        ("port_read <port> <port mode> \t\t\t\t", "get x9555 port input."),
        ("pin_mode <pin> <pin mode> \t\t\t\t", "set x9555 io mode."),
        ("pin_write <pin> <pin state> \t\t\t\t", "set x9555 io output."),
        ("pin_read <pin> <pin mode> \t\t\t\t", "get x9555 io input."),
    ] {
        writeln!(out, "x9555 {} - {}", cmd, help)?;
    }

    writeln!(out, "\nX9555 Register:")?;
    for reg in Register::ALL {
        writeln!(out, "{:<44} {:#04x}", reg.name(), reg as u8)?;
    }

    writeln!(out, "\nX9555 Pin State:")?;
    writeln!(out, "X9555_PIN_LOW \t {:#04x}", PinState::Low as u8)?;
    writeln!(out, "X9555_PIN_HIGH \t {:#04x}", PinState::High as u8)?;

    writeln!(out, "\nX9555 Port Number:")?;
    writeln!(out, "X9555_PORT_0 \t\t {:#04x}", Port::P0 as u8)?;
    writeln!(out, "X9555_PORT_1 \t\t {:#04x}", Port::P1 as u8)?;

    writeln!(out, "\nX9555 (pin or port) Mode:")?;
    writeln!(out, "X9555_OUTPUT \t\t\t {:#04x}", Mode::Output as u8)?;
    writeln!(out, "X9555_INPUT \t\t\t {:#04x}", Mode::Input as u8)?;
    writeln!(out, "X9555_POLARITY_INVERSION \t {:#04x}", Mode::PolarityInversion as u8)?;

    for port in [Port::P0, Port::P1] {
        writeln!(out, "\nX9555 IO PORT {}:", port as u8)?;
        for pin in Pin::all().filter(|p| p.port() == port) {
            writeln!(out, "X9555_IO_{}_{} \t\t {}", port as u8, pin.bit(), pin.number())?;
        }
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::{parse_literal, Radix, Shell};
    use crate::registers::{Pin, PinState, Register};
    use crate::sim::{SimBus, SimPlatform};
    use crate::Address;

    fn shell() -> (Shell<SimPlatform>, SimBus) {
        let bus = SimBus::new();
        bus.add_chip(Address::from_offset(1));
        let mut platform = SimPlatform::new();
        platform.add_bus("i2c1", bus.clone());
        (Shell::new(platform), bus)
    }

    fn run(shell: &mut Shell<SimPlatform>, line: &str) -> String {
        let args: Vec<&str> = line.split_whitespace().collect();
        let mut out = String::new();
        shell.run(&args, &mut out).unwrap();
        out
    }

    #[test]
    fn literals() {
        assert_eq!(parse_literal("17"), Some(17));
        assert_eq!(parse_literal("0x1f"), Some(0x1f));
        assert_eq!(parse_literal("0b101"), Some(5));
        assert_eq!(parse_literal("256"), None);
        assert_eq!(parse_literal("-1"), None);
        assert_eq!(parse_literal("PA.00"), None);
        assert_eq!(parse_literal(""), None);
        assert_eq!(
            Radix(5).to_string(),
            "[Decimal 5]->[Hexadecimal 0x5]->[Binary 101]"
        );
    }

    #[test]
    fn usage_lists_everything() {
        let (mut shell, _) = shell();
        let out = run(&mut shell, "x9555");
        assert!(out.starts_with("Usage:"));
        for reg in Register::ALL {
            assert!(out.contains(reg.name()));
        }
        assert!(out.contains("X9555_POLARITY_INVERSION"));
        assert!(out.contains("X9555_IO_1_7 \t\t 17"));
    }

    #[test]
    fn commands_need_a_device() {
        let (mut shell, _) = shell();
        let out = run(&mut shell, "x9555 port_write 0 0xff");
        assert!(out.contains("first"));
    }

    #[test]
    fn create_and_drive_pins() {
        let (mut shell, bus) = shell();

        let out = run(&mut shell, "x9555 create RT_NULL i2c1 0x01");
        assert!(out.contains("create ..."));
        assert!(out.contains("get pin number : [-1]"));
        assert_eq!(shell.device().unwrap().address().get(), 0x21);

        run(&mut shell, "x9555 port_mode 0 0");
        assert_eq!(bus.register(0x21, Register::Configuration0), 0x00);

        run(&mut shell, "x9555 pin_write 3 1");
        assert_eq!(bus.register(0x21, Register::OutputPort0) & 0x08, 0x08);

        let out = run(&mut shell, "x9555 pin_read 3 0");
        assert!(out.contains("read pin value :[Decimal 1]"));

        let out = run(&mut shell, "x9555 port_read 0 0b0");
        assert!(out.contains("read port value :[Decimal 255]"));
    }

    #[test]
    fn create_is_idempotent_for_same_identity() {
        let (mut shell, _) = shell();
        run(&mut shell, "x9555 create RT_NULL i2c1 1");
        let out = run(&mut shell, "x9555 create RT_NULL i2c1 0x1");
        assert!(!out.contains("create ..."));
        assert!(out.contains("create done"));
    }

    #[test]
    fn create_with_interrupt_pin() {
        let (mut shell, bus) = shell();
        bus.add_chip(Address::from_offset(2));

        let out = run(&mut shell, "x9555 create PA.03 i2c1 2");
        assert!(out.contains("get pin number : [3]"));
        assert!(shell.platform().is_attached(crate::PinId(3)));

        run(&mut shell, "x9555 create RT_NULL i2c1 1");
        assert!(!shell.platform().is_attached(crate::PinId(3)));
    }

    #[test]
    fn none_means_no_interrupt_pin() {
        let (mut shell, _) = shell();
        let out = run(&mut shell, "x9555 create none i2c1 1");
        assert!(out.contains("get pin number : [-1]"));
        assert_eq!(shell.device().unwrap().interrupt_pin(), None);

        let out = run(&mut shell, "x9555 create none i2c1 1");
        assert!(!out.contains("create ..."));
    }

    #[test]
    fn interrupt_clear_reports_changed_pins() {
        let (mut shell, bus) = shell();
        run(&mut shell, "x9555 create RT_NULL i2c1 1");

        let out = run(&mut shell, "x9555 interrupt_clear");
        assert!(!out.contains("changed pins"));

        bus.set_level(0x21, Pin::try_from(14).unwrap(), PinState::Low);
        bus.set_level(0x21, Pin::try_from(2).unwrap(), PinState::Low);
        let out = run(&mut shell, "x9555 interrupt_clear");
        assert!(out.contains("read port1 value :[Decimal 239]"));
        assert!(out.contains("changed pins since last clear : 2 14."));

        let out = run(&mut shell, "x9555 interrupt_clear");
        assert!(out.contains("changed pins since last clear :."));
    }

    #[test]
    fn failures_are_reported() {
        let (mut shell, bus) = shell();

        let out = run(&mut shell, "x9555 create RT_NULL i2c9 1");
        assert!(out.contains("i2c bus not found"));
        assert!(shell.device().is_none());

        let out = run(&mut shell, "x9555 create PZ.99 i2c1 1");
        assert!(out.contains("interrupt pin not found"));

        run(&mut shell, "x9555 create RT_NULL i2c1 1");
        let out = run(&mut shell, "x9555 port_config 0 0x07 0x00");
        assert!(out.contains("not consistent with port 0"));

        let out = run(&mut shell, "x9555 pin_mode 9 1");
        assert!(out.contains("pin 9 not found"));

        let out = run(&mut shell, "x9555 port_write zero 1");
        assert!(out.contains("'zero' is not"));

        let out = run(&mut shell, "x9555 port_write 0");
        assert!(out.contains("command don't found"));

        bus.fail_after(0);
        let out = run(&mut shell, "x9555 interrupt_clear");
        assert!(out.contains("i2c transfer failed"));
        let out = run(&mut shell, "x9555 interrupt_clear");
        assert!(out.contains("interrupt clear done"));
    }
}
