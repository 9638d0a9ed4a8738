//! # tm4c123-port
//!
//! A table-driven port/pin configuration driver for the TM4C123GH6PM GPIO
//! blocks (ports A–F, eight pins each).
//!
//! A board support layer builds one immutable [`PortConfig`] table describing
//! every managed pin — electrical mode, direction, internal resistor, initial
//! output level, and per-pin mutability flags — and hands it to
//! [`PortDriver::init`], which programs each pin as one coherent register
//! sequence. Afterwards the driver serves runtime direction and mode changes,
//! but only for pins whose table entry explicitly marked that attribute as
//! changeable; everything else is locked for the lifetime of the process.
//!
//! ## Features
//!
//! *   One-shot application of a build-time descriptor table (`init`).
//! *   Per-pin mutability enforcement for runtime direction/mode changes.
//! *   Bulk restoration of locked-pin directions (`refresh_port_direction`).
//! *   Live direction/mode read-back (`pin_direction`, `pin_mode`).
//! *   Unlock handling for the commit-protected pins (PC0–PC3, PD7, PF0).
//! *   Out-of-band usage-error reporting through a pluggable hook
//!     ([`det::ErrorHook`]); the configuration services themselves never
//!     return failures in-band.
//! *   Register access behind a seam ([`regs::RegisterFile`]) with a
//!     memory-mapped backend for the chip and a simulated backend for tests.
//!
//! The optional runtime services mirror the build switches of classic port
//! drivers and can be compiled out via the `set-pin-direction`,
//! `set-pin-mode`, and `version-info` cargo features (all on by default).
//!
//! ## Basic usage
//!
//! ```
//! use tm4c123_port::{
//!     det::LogHook, regs::SimPorts, InternalResistor, PinConfig, PinDirection, PinLevel,
//!     PortConfig, PortDriver, PortId,
//! };
//!
//! // Normally generated by the board support layer.
//! static PINS: [PinConfig; 2] = [
//!     PinConfig::output(PortId::F, 1, PinLevel::High),
//!     PinConfig::input(PortId::F, 4, InternalResistor::PullUp),
//! ];
//!
//! let mut driver = PortDriver::new(SimPorts::new(), LogHook);
//! driver.init(PortConfig::new(&PINS));
//! assert!(driver.is_initialized());
//! assert_eq!(driver.pin_direction(0), Some(PinDirection::Output));
//! ```
//!
//! On the real chip, substitute [`regs::MmioPorts`] for the simulated backend
//! and wire the hook into the system's diagnostic event manager.
//!
//! ## Concurrency
//!
//! Every operation is a bounded, synchronous sequence of register accesses.
//! All mutating services take `&mut self`; callers that share a driver
//! between execution contexts must serialize access externally.

use log::debug;

mod consts;

pub mod config;
pub mod det;
pub mod regs;

pub use config::{
    InternalResistor, PinConfig, PinDirection, PinLevel, PinMode, PortConfig, PortId,
};
pub use consts::MODULE_ID;
pub use det::{ErrorHook, LogHook, PortError, ServiceId};
pub use regs::{MmioPorts, PortReg, RegisterFile, SimPorts};

/// Static identification of this driver build.
#[cfg(feature = "version-info")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub vendor_id: u16,
    pub module_id: u16,
    pub sw_major_version: u8,
    pub sw_minor_version: u8,
    pub sw_patch_version: u8,
}

/// Returns the vendor/module/version identifiers of this driver build.
#[cfg(feature = "version-info")]
pub const fn version_info() -> VersionInfo {
    VersionInfo {
        vendor_id: consts::VENDOR_ID,
        module_id: consts::MODULE_ID,
        sw_major_version: consts::SW_MAJOR_VERSION,
        sw_minor_version: consts::SW_MINOR_VERSION,
        sw_patch_version: consts::SW_PATCH_VERSION,
    }
}

/// Pins whose commit register gates reprogramming: the JTAG/SWD pins PC0–PC3
/// and the NMI-capable pins PD7 and PF0.
fn pin_is_protected(port: PortId, pin: u8) -> bool {
    matches!((port, pin), (PortId::C, 0..=3) | (PortId::D, 7) | (PortId::F, 0))
}

/// The configuration engine for one port controller.
///
/// Holds the register-file backend, the diagnostic hook, and the module
/// state. The state machine has exactly two states — not initialized and
/// initialized — encoded as the presence of the applied table reference;
/// the only transition is a fully successful [`init`](Self::init).
pub struct PortDriver<'cfg, R, H> {
    regs: R,
    hook: H,
    config: Option<PortConfig<'cfg>>,
}

impl<'cfg, R: RegisterFile, H: ErrorHook> PortDriver<'cfg, R, H> {
    /// Creates an engine in the not-initialized state.
    pub fn new(regs: R, hook: H) -> Self {
        Self {
            regs,
            hook,
            config: None,
        }
    }

    /// Whether a descriptor table has been successfully applied.
    ///
    /// `init` signals failure only through the diagnostic hook; callers
    /// detect it by this remaining `false`.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    /// The register-file backend, for inspection.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Mutable access to the register-file backend.
    ///
    /// Intended for simulated backends (injecting reset values or drift in a
    /// harness); going around the engine on real hardware forfeits the
    /// table's guarantees.
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// The diagnostic hook, for inspection.
    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Applies a descriptor table to the hardware.
    ///
    /// The whole table is validated before the first register is touched: an
    /// empty table, a pin number outside the port, a duplicate `(port, pin)`
    /// pair, or a mode the hardware does not recognize reports
    /// [`PortError::ParamConfig`] and leaves the module not initialized with
    /// zero hardware writes. A valid table is then applied descriptor by
    /// descriptor, each pin as one coherent programming sequence (unlock if
    /// protected, resistor, initial level, direction, then the mode path with
    /// digital-enable last, so a pin never passes through an unintended
    /// transient configuration).
    ///
    /// A repeated call re-validates and re-applies; an invalid table on a
    /// repeated call leaves the previously applied configuration in force.
    pub fn init(&mut self, table: PortConfig<'cfg>) {
        if !table_is_valid(&table) {
            self.report(ServiceId::Init, PortError::ParamConfig);
            return;
        }
        debug!("applying pin configuration table ({} pins)", table.len());
        for pc in table.pins() {
            self.apply_pin(pc);
        }
        self.config = Some(table);
        debug!("port driver initialized");
    }

    /// Changes the direction of a configured pin at runtime.
    ///
    /// Guards, in order: module initialized ([`PortError::Uninit`]), `pin`
    /// inside the configured set ([`PortError::ParamPin`]), and the pin's
    /// table entry marked direction-changeable
    /// ([`PortError::DirectionUnchangeable`]). A failed guard reports once
    /// and leaves the hardware untouched. On success only the direction bit
    /// is reprogrammed; mode, resistor, and the current output level stay as
    /// they are.
    #[cfg(feature = "set-pin-direction")]
    pub fn set_pin_direction(&mut self, pin: u8, direction: PinDirection) {
        let Some(config) = self.config else {
            self.report(ServiceId::SetPinDirection, PortError::Uninit);
            return;
        };
        let Some(pc) = config.pin(pin) else {
            self.report(ServiceId::SetPinDirection, PortError::ParamPin);
            return;
        };
        if !pc.direction_changeable {
            self.report(ServiceId::SetPinDirection, PortError::DirectionUnchangeable);
            return;
        }
        debug!("pin {}: direction -> {:?}", pin, direction);
        self.write_bit(pc.port, PortReg::Dir, pc.pin, direction == PinDirection::Output);
    }

    /// Restores the configured direction of every direction-locked pin.
    ///
    /// Pins marked direction-changeable are deliberately left alone; for the
    /// rest the direction bit is rewritten from the table, correcting any
    /// accidental runtime drift. Direction only — mode and resistor state are
    /// out of this service's scope. Reports [`PortError::Uninit`] and does
    /// nothing if called before initialization.
    pub fn refresh_port_direction(&mut self) {
        let Some(config) = self.config else {
            self.report(ServiceId::RefreshPortDirection, PortError::Uninit);
            return;
        };
        debug!("refreshing directions of locked pins");
        for pc in config.pins() {
            if !pc.direction_changeable {
                self.write_bit(pc.port, PortReg::Dir, pc.pin, pc.direction == PinDirection::Output);
            }
        }
    }

    /// Changes the peripheral-function mode of a configured pin at runtime.
    ///
    /// Guards, in order: module initialized ([`PortError::Uninit`]), `pin`
    /// inside the configured set ([`PortError::ParamPin`]), `mode` recognized
    /// by the hardware ([`PortError::ParamInvalidMode`]), and the pin's table
    /// entry marked mode-changeable ([`PortError::ModeUnchangeable`]). On
    /// success only the mode path (analog select, alternate select, function
    /// code, digital enable) is reprogrammed; direction, resistor, and output
    /// level stay untouched.
    #[cfg(feature = "set-pin-mode")]
    pub fn set_pin_mode(&mut self, pin: u8, mode: PinMode) {
        let Some(config) = self.config else {
            self.report(ServiceId::SetPinMode, PortError::Uninit);
            return;
        };
        let Some(pc) = config.pin(pin) else {
            self.report(ServiceId::SetPinMode, PortError::ParamPin);
            return;
        };
        if !mode.is_hardware_valid() {
            self.report(ServiceId::SetPinMode, PortError::ParamInvalidMode);
            return;
        }
        if !pc.mode_changeable {
            self.report(ServiceId::SetPinMode, PortError::ModeUnchangeable);
            return;
        }
        debug!("pin {}: mode -> {}", pin, mode.raw());
        self.write_mode(pc.port, pc.pin, mode);
    }

    /// Reads back the live direction of a configured pin.
    ///
    /// Returns `None` (after logging) before initialization or for a pin
    /// index outside the configured set.
    pub fn pin_direction(&mut self, pin: u8) -> Option<PinDirection> {
        let Some(config) = self.config else {
            debug!("pin_direction queried before initialization");
            return None;
        };
        let pc = config.pin(pin)?;
        Some(if self.regs.read(pc.port, PortReg::Dir) & pc.mask() != 0 {
            PinDirection::Output
        } else {
            PinDirection::Input
        })
    }

    /// Reads back the live mode of a configured pin, reconstructed from the
    /// analog/alternate/function-code register state.
    ///
    /// Returns `None` (after logging) before initialization or for a pin
    /// index outside the configured set.
    pub fn pin_mode(&mut self, pin: u8) -> Option<PinMode> {
        let Some(config) = self.config else {
            debug!("pin_mode queried before initialization");
            return None;
        };
        let pc = config.pin(pin)?;
        let mask = pc.mask();
        if self.regs.read(pc.port, PortReg::Amsel) & mask != 0 {
            return Some(PinMode::ANALOG);
        }
        if self.regs.read(pc.port, PortReg::Afsel) & mask != 0 {
            let shift = u32::from(pc.pin) * consts::PCTL_BITS_PER_PIN;
            let code = (self.regs.read(pc.port, PortReg::Pctl) >> shift) & 0xF;
            return Some(PinMode::new(code as u8));
        }
        Some(PinMode::DIO)
    }

    // --- Per-pin programming sequence ---

    /// Programs one descriptor as a coherent sequence. The digital-enable bit
    /// is written last, so the pin goes live only once mode, resistor, level,
    /// and direction are all in their configured state.
    fn apply_pin(&mut self, pc: &PinConfig) {
        debug!(
            "applying {:?}{}: mode={} dir={:?} resistor={:?} level={:?}",
            pc.port,
            pc.pin,
            pc.mode.raw(),
            pc.direction,
            pc.resistor,
            pc.initial_level
        );
        if pin_is_protected(pc.port, pc.pin) {
            self.unlock(pc.port, pc.pin);
        }
        self.write_resistor(pc.port, pc.pin, pc.resistor);
        if pc.direction == PinDirection::Output {
            self.write_bit(pc.port, PortReg::Data, pc.pin, pc.initial_level == PinLevel::High);
        }
        self.write_bit(pc.port, PortReg::Dir, pc.pin, pc.direction == PinDirection::Output);
        self.write_mode(pc.port, pc.pin, pc.mode);
    }

    /// Performs the documented unlock sequence for a commit-protected pin:
    /// the unlock key into LOCK, then the pin's commit bit. The commit bit
    /// stays set, so later runtime changes need no second unlock.
    fn unlock(&mut self, port: PortId, pin: u8) {
        debug!("unlocking protected pin {:?}{}", port, pin);
        self.regs.write(port, PortReg::Lock, consts::UNLOCK_KEY);
        self.write_bit(port, PortReg::Cr, pin, true);
    }

    /// Programs the mode path of one pin. For the analog selector the digital
    /// buffer is disabled first and the analog select set last; for digital
    /// modes the analog select is cleared first and the digital buffer
    /// enabled last.
    fn write_mode(&mut self, port: PortId, pin: u8, mode: PinMode) {
        if mode.is_analog() {
            self.write_bit(port, PortReg::Den, pin, false);
            self.write_bit(port, PortReg::Afsel, pin, false);
            self.write_pctl(port, pin, 0);
            self.write_bit(port, PortReg::Amsel, pin, true);
        } else {
            self.write_bit(port, PortReg::Amsel, pin, false);
            self.write_bit(port, PortReg::Afsel, pin, mode.is_alternate());
            self.write_pctl(port, pin, if mode.is_alternate() { mode.raw() } else { 0 });
            self.write_bit(port, PortReg::Den, pin, true);
        }
    }

    /// Programs the internal resistor, clearing the opposing pull first so
    /// both pulls are never enabled at once.
    fn write_resistor(&mut self, port: PortId, pin: u8, resistor: InternalResistor) {
        match resistor {
            InternalResistor::PullUp => {
                self.write_bit(port, PortReg::Pdr, pin, false);
                self.write_bit(port, PortReg::Pur, pin, true);
            }
            InternalResistor::PullDown => {
                self.write_bit(port, PortReg::Pur, pin, false);
                self.write_bit(port, PortReg::Pdr, pin, true);
            }
            InternalResistor::Off => {
                self.write_bit(port, PortReg::Pur, pin, false);
                self.write_bit(port, PortReg::Pdr, pin, false);
            }
        }
    }

    /// Read-modify-write of one bit; skips the write when the register
    /// already holds the requested value.
    fn write_bit(&mut self, port: PortId, reg: PortReg, pin: u8, set: bool) {
        let mask = 1u32 << pin;
        let current = self.regs.read(port, reg);
        let new = if set { current | mask } else { current & !mask };
        if new != current {
            self.regs.write(port, reg, new);
        }
    }

    /// Read-modify-write of one pin's 4-bit PCTL function code.
    fn write_pctl(&mut self, port: PortId, pin: u8, code: u8) {
        let shift = u32::from(pin) * consts::PCTL_BITS_PER_PIN;
        let current = self.regs.read(port, PortReg::Pctl);
        let new = (current & !(0xF << shift)) | (u32::from(code) << shift);
        if new != current {
            self.regs.write(port, PortReg::Pctl, new);
        }
    }

    fn report(&mut self, service: ServiceId, error: PortError) {
        debug!("{:?} rejected: {}", service, error);
        self.hook.report(consts::MODULE_ID, service, error);
    }
}

/// Structural validity of a descriptor table: non-empty, every pin number on
/// its port, every mode recognized, no `(port, pin)` pair listed twice.
fn table_is_valid(table: &PortConfig<'_>) -> bool {
    if table.is_empty() {
        return false;
    }
    let pins = table.pins();
    for (i, pc) in pins.iter().enumerate() {
        if pc.pin >= consts::PINS_PER_PORT {
            return false;
        }
        if !pc.mode.is_hardware_valid() {
            return false;
        }
        if pins[..i]
            .iter()
            .any(|other| other.port == pc.port && other.pin == pc.pin)
        {
            return false;
        }
    }
    true
}
