//! Host demo of the `x9555` shell command against simulated expanders.
//!
//! ```text
//! $ cargo run --features cli -- x9555 create RT_NULL i2c1 0x01
//! $ cargo run --features cli            # interactive, one command per line
//! x9555 create PA.00 i2c1 0x01
//! x9555 pin_mode 12 0
//! sim_level i2c1 0x01 3 0               # drive an input low and raise INT
//! ```
//!
//! Set `RUST_LOG=debug` to see the register traffic.
use std::io::{self, BufRead, Write};

use x9555::shell::{parse_literal, Shell};
use x9555::sim::{SimBus, SimPlatform};
use x9555::{Address, Pin, PinState};

const BUSES: [&str; 2] = ["i2c0", "i2c1"];

fn platform() -> SimPlatform {
    let mut platform = SimPlatform::new();
    for name in BUSES {
        let bus = SimBus::new();
        for offset in 0..8 {
            bus.add_chip(Address::from_offset(offset));
        }
        platform.add_bus(name, bus);
    }
    platform
}

/// `sim_level <bus> <address offset> <pin> <state>`
fn sim_level(shell: &Shell<SimPlatform>, args: &[&str]) -> Result<(), String> {
    let [_, bus, offset, pin, state] = args else {
        return Err("usage: sim_level <bus> <address offset> <pin> <state>".into());
    };
    let bus = shell
        .platform()
        .bus(*bus)
        .ok_or_else(|| format!("no bus '{}'", bus))?;
    let number = |s: &str| parse_literal(s).ok_or_else(|| format!("'{}' is not a number", s));
    let address = Address::from_offset(number(*offset)?);
    let pin = Pin::try_from(number(*pin)?).map_err(|e| e.to_string())?;
    let state = PinState::try_from(number(*state)?).map_err(|e| e.to_string())?;

    bus.set_level(address.get(), pin, state);
    if bus.interrupt_asserted(address.get()) {
        if let Some(int_pin) = shell
            .device()
            .filter(|d| d.address() == address)
            .and_then(|d| d.interrupt_pin())
        {
            shell.platform().fire(int_pin);
        }
    }
    Ok(())
}

fn execute(shell: &mut Shell<SimPlatform>, args: &[&str]) -> io::Result<()> {
    let mut out = String::new();
    match args.first() {
        Some(&"x9555") => {
            if shell.run(args, &mut out).is_err() {
                log::error!("formatting shell output failed");
            }
        }
        Some(&"sim_level") => {
            if let Err(e) = sim_level(shell, args) {
                out = format!("{}\n", e);
            }
        }
        Some(cmd) => out = format!("{}: command not found.\n", cmd),
        None => {}
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    stdout.flush()
}

fn main() -> io::Result<()> {
    env_logger::init();
    let mut shell = Shell::new(platform());

    let argv: Vec<String> = std::env::args().skip(1).collect();
    if !argv.is_empty() {
        let args: Vec<&str> = argv.iter().map(String::as_str).collect();
        return execute(&mut shell, &args);
    }

    for line in io::stdin().lock().lines() {
        let line = line?;
        let args: Vec<&str> = line.split_whitespace().collect();
        if matches!(args.first(), Some(&"exit") | Some(&"quit")) {
            break;
        }
        execute(&mut shell, &args)?;
    }
    shell.destroy();
    Ok(())
}
