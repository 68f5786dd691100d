use thiserror::Error;

use crate::history::HistoryError;
use crate::resample::ResampleError;
use crate::thermostat::{ControlError, SetpointError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Window(#[from] ResampleError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Setpoint(#[from] SetpointError),
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error("failed to write csv export: {0}")]
    Csv(#[from] csv::Error),
    #[error("no temperature reading stored")]
    NoReading,
}

impl Error {
    /// Whether the error stems from bad caller input rather than server state.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::Window(_) | Error::History(_) | Error::Setpoint(_) | Error::Control(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
