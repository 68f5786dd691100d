//! History view query parameters: interval presets, the query itself, and the chart's time
//! axis scale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resample::{ResampleError, Window};

/// Largest grid a single history query may resample onto. A year of one-minute buckets is
/// 525 600; anything past this bound must pick a coarser interval.
pub const MAX_BUCKETS: usize = 527_040;

/// Reasons a [`HistoryQuery`] is refused before any readings are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("unsupported interval of {0} seconds, expected one of 60, 600, 1800 or 3600")]
    UnsupportedInterval(i64),
    #[error("query spans {buckets} buckets, at most {max} are allowed", max = MAX_BUCKETS)]
    TooManyBuckets { buckets: usize },
    #[error(transparent)]
    Window(#[from] ResampleError),
}

/// Data point spacing offered by the history view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    OneMinute,
    TenMinutes,
    ThirtyMinutes,
    OneHour,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::OneMinute,
        Interval::TenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
    ];

    /// Bucket width of the preset in seconds.
    pub const fn seconds(self) -> i64 {
        match self {
            Interval::OneMinute => 60,
            Interval::TenMinutes => 600,
            Interval::ThirtyMinutes => 1800,
            Interval::OneHour => 3600,
        }
    }

    /// Maps a width in seconds back to its preset, if it is one.
    pub fn from_seconds(seconds: i64) -> Option<Interval> {
        Interval::ALL.into_iter().find(|i| i.seconds() == seconds)
    }
}

fn default_interval_seconds() -> i64 {
    Interval::default().seconds()
}

/// A history search as submitted from the dashboard.
///
/// `interval` is the bucket width in seconds and must be one of the [`Interval`] presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default = "default_interval_seconds")]
    pub interval: i64,
}

impl HistoryQuery {
    /// Validates the query and builds the grid it resamples onto.
    ///
    /// # Errors
    ///
    /// * [`HistoryError::UnsupportedInterval`] - if `interval` is not a preset width
    /// * [`HistoryError::Window`] - if `end` is before `start`
    /// * [`HistoryError::TooManyBuckets`] - if the grid would exceed [`MAX_BUCKETS`]
    pub fn window(&self) -> Result<Window, HistoryError> {
        let interval = Interval::from_seconds(self.interval)
            .ok_or(HistoryError::UnsupportedInterval(self.interval))?;
        let window = Window::new(self.start, self.end, interval.seconds())?;

        let buckets = window.bucket_count();
        if buckets > MAX_BUCKETS {
            return Err(HistoryError::TooManyBuckets { buckets });
        }
        Ok(window)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
}

/// Time axis configuration for the history chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeScale {
    pub unit: TimeUnit,
    pub step_size: u32,
    pub display_format: String,
    pub tooltip_format: String,
}

const TOOLTIP_FORMAT: &str = "YYYY-MM-DD HH:mm:ss";

impl TimeScale {
    /// Picks the axis unit from the query span, counted in whole hours.
    ///
    /// Up to a day gets half-hour minute ticks, up to three days hourly ticks, and anything
    /// longer daily ticks.
    pub fn for_range(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeScale {
        let hours = (end - start).num_hours();
        let (unit, step_size, display_format) = if hours <= 24 {
            (TimeUnit::Minute, 30, "YYYY-MM-DD HH:mm")
        } else if hours <= 72 {
            (TimeUnit::Hour, 1, "YYYY-MM-DD HH:mm")
        } else {
            (TimeUnit::Day, 1, "YYYY-MM-DD")
        };

        TimeScale {
            unit,
            step_size,
            display_format: display_format.to_string(),
            tooltip_format: TOOLTIP_FORMAT.to_string(),
        }
    }
}
