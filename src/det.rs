//! Usage-error taxonomy and the diagnostic reporting seam.
//!
//! The port driver never returns failures in-band from its configuration
//! services: a failed guard is reported once, as a
//! `(module id, service id, error code)` triple, to whatever [`ErrorHook`]
//! the engine was built with, and the service degrades to a no-op. Test
//! harnesses assert on the hook; production builds typically wire the hook
//! into the system's diagnostic event manager.

use log::warn;
use thiserror::Error;

use crate::consts::{errcode, service};

/// Usage errors detectable by the port driver's guards.
///
/// Discriminants are the wire codes of the diagnostic protocol.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PortError {
    /// Pin index is not part of the configured pin set.
    #[error("pin index not in the configured pin set")]
    ParamPin = errcode::PARAM_PIN,
    /// Runtime direction change attempted on a direction-locked pin.
    #[error("direction change attempted on a direction-locked pin")]
    DirectionUnchangeable = errcode::DIRECTION_UNCHANGEABLE,
    /// Initialization attempted with a structurally invalid table.
    #[error("invalid pin configuration table")]
    ParamConfig = errcode::PARAM_CONFIG,
    /// Mode value not recognized by the target hardware.
    #[error("mode value not recognized by the hardware")]
    ParamInvalidMode = errcode::PARAM_INVALID_MODE,
    /// Runtime mode change attempted on a mode-locked pin.
    #[error("mode change attempted on a mode-locked pin")]
    ModeUnchangeable = errcode::MODE_UNCHANGEABLE,
    /// Service invoked before successful initialization.
    #[error("service called before module initialization")]
    Uninit = errcode::UNINIT,
    /// A required output location was absent.
    ///
    /// Reserved by the diagnostic protocol. The Rust surface passes version
    /// info by value, so the driver itself never raises this code.
    #[error("required output pointer was null")]
    ParamPointer = errcode::PARAM_POINTER,
}

impl PortError {
    /// Wire code of this error in the diagnostic protocol.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Services of the port driver, as identified on the diagnostic channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServiceId {
    Init = service::INIT,
    SetPinDirection = service::SET_PIN_DIRECTION,
    RefreshPortDirection = service::REFRESH_PORT_DIRECTION,
    GetVersionInfo = service::GET_VERSION_INFO,
    SetPinMode = service::SET_PIN_MODE,
}

impl ServiceId {
    /// Wire id of this service in the diagnostic protocol.
    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }
}

/// Sink for guard-failure reports.
///
/// One report is emitted per failed guard; the failing service performs no
/// hardware writes. Implementations must not call back into the driver.
pub trait ErrorHook {
    fn report(&mut self, module_id: u16, service: ServiceId, error: PortError);
}

/// Hook that forwards every report to the `log` facade at `warn` level.
///
/// The default choice for targets without a diagnostic event manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHook;

impl ErrorHook for LogHook {
    fn report(&mut self, module_id: u16, service: ServiceId, error: PortError) {
        warn!(
            "port driver diagnostic: module {} service 0x{:02X} error 0x{:02X} ({})",
            module_id,
            service.id(),
            error.code(),
            error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_protocol() {
        assert_eq!(PortError::ParamPin.code(), 0x0A);
        assert_eq!(PortError::DirectionUnchangeable.code(), 0x0B);
        assert_eq!(PortError::ParamConfig.code(), 0x0C);
        assert_eq!(PortError::ParamInvalidMode.code(), 0x0D);
        assert_eq!(PortError::ModeUnchangeable.code(), 0x0E);
        assert_eq!(PortError::Uninit.code(), 0x0F);
        assert_eq!(PortError::ParamPointer.code(), 0x10);
    }

    #[test]
    fn service_ids_match_protocol() {
        assert_eq!(ServiceId::Init.id(), 0x00);
        assert_eq!(ServiceId::SetPinDirection.id(), 0x01);
        assert_eq!(ServiceId::RefreshPortDirection.id(), 0x02);
        assert_eq!(ServiceId::GetVersionInfo.id(), 0x03);
        assert_eq!(ServiceId::SetPinMode.id(), 0x04);
    }

    #[test]
    fn errors_render_messages() {
        let rendered = PortError::Uninit.to_string();
        assert!(rendered.contains("initialization"));
    }
}
