//! Thermostat setpoint and run/stop state as exchanged with the controller.
//!
//! The controller speaks in raw register values: the setpoint is stored in tenths of a degree,
//! the run state is reported as a status word and commanded with `1` (run) or `0` (stop).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest setpoint the dashboard accepts, in degrees Celsius.
pub const MIN_SETPOINT: f64 = 10.0;
/// Highest setpoint the dashboard accepts, in degrees Celsius.
pub const MAX_SETPOINT: f64 = 60.0;

const STATUS_ON: u16 = 512;
const STATUS_OFF: u16 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SetpointError {
    #[error("setpoint must be between 10°C and 60°C, got {0}°C")]
    OutOfRange(f64),
    #[error("setpoint is not a finite number")]
    NotFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("unknown thermostat control value {0}, expected 0 or 1")]
    UnknownCommand(i64),
}

/// A target temperature within `MIN_SETPOINT..=MAX_SETPOINT`.
///
/// ```rust
/// use thermoview::thermostat::Setpoint;
///
/// let sp = Setpoint::new(25.5).unwrap();
/// assert_eq!(sp.to_register(), 255);
/// assert_eq!(Setpoint::from_register(255).unwrap(), sp);
///
/// assert!(Setpoint::new(9.9).is_err());
/// assert!(Setpoint::new(60.1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Setpoint(f64);

impl Setpoint {
    /// Validates a target temperature in degrees Celsius.
    ///
    /// # Errors
    ///
    /// * [`SetpointError::NotFinite`] - for `NaN` or an infinity
    /// * [`SetpointError::OutOfRange`] - outside `10.0..=60.0`
    pub fn new(celsius: f64) -> Result<Setpoint, SetpointError> {
        if !celsius.is_finite() {
            return Err(SetpointError::NotFinite);
        }
        if !(MIN_SETPOINT..=MAX_SETPOINT).contains(&celsius) {
            return Err(SetpointError::OutOfRange(celsius));
        }
        Ok(Setpoint(celsius))
    }

    /// Decodes a register value in tenths of a degree.
    pub fn from_register(tenths: i32) -> Result<Setpoint, SetpointError> {
        Setpoint::new(f64::from(tenths) / 10.0)
    }

    /// Target temperature in degrees Celsius.
    pub fn celsius(self) -> f64 {
        self.0
    }

    /// Register encoding, tenths of a degree.
    pub fn to_register(self) -> i32 {
        (self.0 * 10.0).round() as i32
    }
}

impl fmt::Display for Setpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C", self.0)
    }
}

/// Run state decoded from the controller's status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermostatStatus {
    On,
    Off,
    Unknown(u16),
}

impl ThermostatStatus {
    /// Decodes a status word. `512` is on, `768` is off, anything else is kept as unknown.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use thermoview::thermostat::ThermostatStatus;
    ///
    /// assert_eq!(ThermostatStatus::from_code(512), ThermostatStatus::On);
    /// assert_eq!(ThermostatStatus::from_code(768).label(), "OFF");
    /// assert_eq!(ThermostatStatus::from_code(1).code(), 1);
    /// ```
    pub fn from_code(code: u16) -> ThermostatStatus {
        match code {
            STATUS_ON => ThermostatStatus::On,
            STATUS_OFF => ThermostatStatus::Off,
            other => ThermostatStatus::Unknown(other),
        }
    }

    /// Status word as the controller reports it.
    pub fn code(self) -> u16 {
        match self {
            ThermostatStatus::On => STATUS_ON,
            ThermostatStatus::Off => STATUS_OFF,
            ThermostatStatus::Unknown(code) => code,
        }
    }

    /// Text shown next to the dashboard switch.
    pub fn label(self) -> &'static str {
        match self {
            ThermostatStatus::On => "ON",
            ThermostatStatus::Off => "OFF",
            ThermostatStatus::Unknown(_) => "unknown",
        }
    }

    pub fn is_on(self) -> bool {
        self == ThermostatStatus::On
    }
}

/// Wire form of [`ThermostatStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub code: u16,
    pub label: String,
}

impl From<ThermostatStatus> for StatusReport {
    fn from(status: ThermostatStatus) -> Self {
        StatusReport {
            code: status.code(),
            label: status.label().to_string(),
        }
    }
}

/// Run or stop request sent to the controller, `1` and `0` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Run,
    Stop,
}

impl ControlCommand {
    /// Decodes the `control` field of a control request.
    ///
    /// # Errors
    ///
    /// [`ControlError::UnknownCommand`] for anything but `0` or `1`.
    pub fn from_wire(value: i64) -> Result<ControlCommand, ControlError> {
        match value {
            1 => Ok(ControlCommand::Run),
            0 => Ok(ControlCommand::Stop),
            other => Err(ControlError::UnknownCommand(other)),
        }
    }

    pub fn wire(self) -> i64 {
        match self {
            ControlCommand::Run => 1,
            ControlCommand::Stop => 0,
        }
    }

    /// Command the dashboard switch sends: run only when the thermostat reports off.
    pub fn toggle_from(status: ThermostatStatus) -> ControlCommand {
        match status {
            ThermostatStatus::Off => ControlCommand::Run,
            _ => ControlCommand::Stop,
        }
    }

    /// Status the controller reports once this command has been applied.
    pub fn resulting_status(self) -> ThermostatStatus {
        match self {
            ControlCommand::Run => ThermostatStatus::On,
            ControlCommand::Stop => ThermostatStatus::Off,
        }
    }
}

/// Controller registers: setpoint and status word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thermostat {
    pub setpoint: Setpoint,
    pub status: ThermostatStatus,
}

impl Thermostat {
    /// A controller holding `setpoint`, initially off.
    pub fn new(setpoint: Setpoint) -> Thermostat {
        Thermostat {
            setpoint,
            status: ThermostatStatus::Off,
        }
    }

    /// Applies `command` and returns the status the controller now reports.
    pub fn apply(&mut self, command: ControlCommand) -> ThermostatStatus {
        self.status = command.resulting_status();
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setpoint_bounds_are_inclusive() {
        assert!(Setpoint::new(10.0).is_ok());
        assert!(Setpoint::new(60.0).is_ok());
        assert_eq!(Setpoint::new(61.0), Err(SetpointError::OutOfRange(61.0)));
        assert_eq!(Setpoint::new(f64::NAN), Err(SetpointError::NotFinite));
        assert_eq!(Setpoint::from_register(99), Err(SetpointError::OutOfRange(9.9)));
    }

    #[test]
    fn register_rounds_to_tenths() {
        assert_eq!(Setpoint::new(23.46).unwrap().to_register(), 235);
        assert_eq!(Setpoint::new(10.0).unwrap().to_register(), 100);
    }

    #[test]
    fn status_codes() {
        assert_eq!(ThermostatStatus::from_code(512), ThermostatStatus::On);
        assert_eq!(ThermostatStatus::from_code(768), ThermostatStatus::Off);
        assert_eq!(ThermostatStatus::from_code(3).label(), "unknown");
        assert_eq!(ThermostatStatus::Unknown(3).code(), 3);
        assert_eq!(StatusReport::from(ThermostatStatus::On).label, "ON");
    }

    #[test]
    fn toggle_runs_only_from_off() {
        assert_eq!(
            ControlCommand::toggle_from(ThermostatStatus::Off),
            ControlCommand::Run
        );
        assert_eq!(
            ControlCommand::toggle_from(ThermostatStatus::On),
            ControlCommand::Stop
        );
        assert_eq!(
            ControlCommand::toggle_from(ThermostatStatus::Unknown(0)),
            ControlCommand::Stop
        );
    }

    #[test]
    fn control_wire_values() {
        assert_eq!(ControlCommand::from_wire(1), Ok(ControlCommand::Run));
        assert_eq!(ControlCommand::from_wire(0), Ok(ControlCommand::Stop));
        assert_eq!(
            ControlCommand::from_wire(2),
            Err(ControlError::UnknownCommand(2))
        );
        assert_eq!(ControlCommand::Run.wire(), 1);
    }

    #[test]
    fn apply_updates_status() {
        let mut t = Thermostat::new(Setpoint::new(25.0).unwrap());
        assert_eq!(t.status, ThermostatStatus::Off);
        assert_eq!(t.apply(ControlCommand::Run), ThermostatStatus::On);
        assert!(t.status.is_on());
    }
}
