//! Applies a small descriptor table against the simulated register file and
//! prints the resulting pin state. Run with RUST_LOG=debug to watch the
//! per-pin programming sequence.

use tm4c123_port::{
    det::LogHook, regs::SimPorts, InternalResistor, PinConfig, PinDirection, PinLevel, PinMode,
    PortConfig, PortDriver, PortId, PortReg,
};

// A board might configure: the user LED on PF1, the user switch on PF4,
// and PB0 handed to the UART.
static PINS: [PinConfig; 3] = [
    PinConfig::output(PortId::F, 1, PinLevel::High),
    PinConfig {
        direction_changeable: true,
        ..PinConfig::input(PortId::F, 4, InternalResistor::PullUp)
    },
    PinConfig {
        mode: PinMode::new(1),
        mode_changeable: true,
        ..PinConfig::input(PortId::B, 0, InternalResistor::Off)
    },
];

fn main() {
    env_logger::init();

    let mut driver = PortDriver::new(SimPorts::new(), LogHook);
    println!("Applying table with {} pins...", PINS.len());
    driver.init(PortConfig::new(&PINS));
    println!("Initialized: {}", driver.is_initialized());

    for index in 0..PINS.len() as u8 {
        println!(
            "pin {}: direction={:?} mode={:?}",
            index,
            driver.pin_direction(index),
            driver.pin_mode(index).map(|m| m.raw()),
        );
    }

    // The switch pin was marked direction-changeable, so this succeeds.
    driver.set_pin_direction(1, PinDirection::Output);
    println!(
        "pin 1 after runtime change: direction={:?}",
        driver.pin_direction(1)
    );

    let sim = driver.registers();
    println!(
        "PF registers: DIR={:#04x} DEN={:#04x} DATA={:#04x} PUR={:#04x}",
        sim.reg(PortId::F, PortReg::Dir),
        sim.reg(PortId::F, PortReg::Den),
        sim.reg(PortId::F, PortReg::Data),
        sim.reg(PortId::F, PortReg::Pur),
    );
    println!("{} register writes issued in total", sim.writes().len());
}
