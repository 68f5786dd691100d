//! Reading and controller state storage behind the REST endpoints.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::resample::Sample;
use crate::thermostat::{ControlCommand, Setpoint, Thermostat, ThermostatStatus};

/// Storage the HTTP layer reads and writes through.
///
/// `range` returns readings in the order they were stored, which is not necessarily
/// chronological; the resampler does not depend on ordering.
pub trait ReadingStore: Send + Sync {
    fn insert(&self, sample: Sample);

    /// Most recently stored reading.
    fn latest(&self) -> Option<Sample>;

    /// Readings with `start <= timestamp <= end`.
    fn range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Sample>;

    fn setpoint(&self) -> Setpoint;

    fn set_setpoint(&self, setpoint: Setpoint);

    fn status(&self) -> ThermostatStatus;

    fn apply(&self, command: ControlCommand) -> ThermostatStatus;
}

/// In-process [`ReadingStore`].
pub struct MemoryStore {
    readings: RwLock<Vec<Sample>>,
    thermostat: RwLock<Thermostat>,
}

impl MemoryStore {
    pub fn new(setpoint: Setpoint) -> MemoryStore {
        MemoryStore {
            readings: RwLock::new(Vec::new()),
            thermostat: RwLock::new(Thermostat::new(setpoint)),
        }
    }

    pub fn with_readings<I>(self, readings: I) -> MemoryStore
    where
        I: IntoIterator<Item = Sample>,
    {
        self.readings.write().extend(readings);
        self
    }

    pub fn len(&self) -> usize {
        self.readings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.read().is_empty()
    }
}

impl ReadingStore for MemoryStore {
    fn insert(&self, sample: Sample) {
        self.readings.write().push(sample);
    }

    fn latest(&self) -> Option<Sample> {
        self.readings.read().last().copied()
    }

    fn range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Sample> {
        self.readings
            .read()
            .iter()
            .filter(|s| s.timestamp >= start && s.timestamp <= end)
            .copied()
            .collect()
    }

    fn setpoint(&self) -> Setpoint {
        self.thermostat.read().setpoint
    }

    fn set_setpoint(&self, setpoint: Setpoint) {
        self.thermostat.write().setpoint = setpoint;
    }

    fn status(&self) -> ThermostatStatus {
        self.thermostat.read().status
    }

    fn apply(&self, command: ControlCommand) -> ThermostatStatus {
        self.thermostat.write().apply(command)
    }
}
