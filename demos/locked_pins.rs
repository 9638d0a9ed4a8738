//! Shows the mutability guards in action: runtime changes against locked pins
//! are refused and surface only on the diagnostic hook.

use tm4c123_port::{
    regs::SimPorts, ErrorHook, PinConfig, PinDirection, PinLevel, PortConfig, PortDriver,
    PortError, PortId, ServiceId,
};

/// Prints each reported triple as it arrives.
#[derive(Debug, Default)]
struct PrintingHook {
    count: usize,
}

impl ErrorHook for PrintingHook {
    fn report(&mut self, module_id: u16, service: ServiceId, error: PortError) {
        self.count += 1;
        println!(
            "diagnostic #{}: module={} service=0x{:02X} code=0x{:02X} ({})",
            self.count,
            module_id,
            service.id(),
            error.code(),
            error
        );
    }
}

// Both pins locked: neither direction nor mode may change after init.
static PINS: [PinConfig; 2] = [
    PinConfig::output(PortId::F, 2, PinLevel::Low),
    PinConfig::output(PortId::F, 3, PinLevel::Low),
];

fn main() {
    env_logger::init();

    let mut driver = PortDriver::new(SimPorts::new(), PrintingHook::default());

    // Guarded services before init: each call reports and does nothing.
    driver.refresh_port_direction();
    driver.set_pin_direction(0, PinDirection::Input);

    driver.init(PortConfig::new(&PINS));
    println!("Initialized: {}", driver.is_initialized());

    // Locked pin: the request is refused, hardware stays as configured.
    driver.set_pin_direction(0, PinDirection::Input);
    println!("pin 0 direction: {:?}", driver.pin_direction(0));

    // Unknown pin index.
    driver.set_pin_direction(9, PinDirection::Output);

    println!("{} diagnostics reported", driver.hook().count);
}
