//! Nearest-sample resampling of irregular temperature readings onto a fixed bucket grid.
//!
//! The history chart wants exactly one point per bucket. Readings arrive at irregular
//! instants, so each bucket keeps the single reading closest to its canonical time (the
//! bucket's start instant). Buckets nobody lands near stay absent and show up as gaps.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use thermoview::resample::{resample, Sample, Window};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 2, 0).unwrap();
//! let window = Window::new(start, end, 60).unwrap();
//!
//! let samples = [
//!     Sample::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 10).unwrap(), 20.0),
//!     Sample::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 5).unwrap(), 22.0),
//! ];
//!
//! let (series, stats) = resample(&window, &samples);
//! assert_eq!(series.temperatures(), vec![Some(20.0), Some(22.0)]);
//! assert_eq!(stats.mean, Some(21.0));
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single temperature reading as returned by the history query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Instant the reading was taken
    pub timestamp: DateTime<Utc>,
    /// Temperature in degrees Celsius
    pub temperature: f64,
}

impl Sample {
    /// Creates a reading of `temperature` degrees Celsius taken at `timestamp`.
    pub fn new(timestamp: DateTime<Utc>, temperature: f64) -> Sample {
        Sample {
            timestamp,
            temperature,
        }
    }
}

/// Reasons a [`Window`] cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResampleError {
    #[error("bucket width must be positive, got {0} seconds")]
    NonPositiveWidth(i64),
    #[error("bucket width of {0} seconds is too large")]
    WidthTooLarge(i64),
    #[error("window end {end} precedes start {start}")]
    InvertedWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// The bucket grid a query is resampled onto.
///
/// Bucket `i` covers `[start + i * width, start + (i + 1) * width)` and its canonical time is
/// `start + i * width`. The number of buckets is `ceil((end - start) / width)`, so a window
/// whose end equals its start has no buckets at all.
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use thermoview::resample::Window;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 2, 30).unwrap();
///
/// let window = Window::new(start, end, 60).unwrap();
/// assert_eq!(window.bucket_count(), 3);
///
/// assert!(Window::new(start, end, 0).is_err());
/// assert!(Window::new(end, start, 60).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    width_seconds: i64,
}

impl Window {
    /// Validates and builds a window.
    ///
    /// # Errors
    ///
    /// * [`ResampleError::NonPositiveWidth`] - if `width_seconds <= 0`
    /// * [`ResampleError::WidthTooLarge`] - if the width does not fit a millisecond duration
    /// * [`ResampleError::InvertedWindow`] - if `end` is before `start`
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        width_seconds: i64,
    ) -> Result<Window, ResampleError> {
        if width_seconds <= 0 {
            return Err(ResampleError::NonPositiveWidth(width_seconds));
        }
        let fits = width_seconds.checked_mul(1000).is_some()
            && Duration::try_seconds(width_seconds).is_some();
        if !fits {
            return Err(ResampleError::WidthTooLarge(width_seconds));
        }
        if end < start {
            return Err(ResampleError::InvertedWindow { start, end });
        }
        Ok(Window {
            start,
            end,
            width_seconds,
        })
    }

    /// First instant of the grid; also the canonical time of bucket 0.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound of the grid.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn width_seconds(&self) -> i64 {
        self.width_seconds
    }

    // Cannot overflow, `new` rejects widths above `i64::MAX / 1000`.
    fn width_millis(&self) -> i64 {
        self.width_seconds * 1000
    }

    /// Number of buckets on the grid, `ceil((end - start) / width)`.
    ///
    /// # Returns
    ///
    /// `0` when `end == start`, otherwise at least `1`.
    pub fn bucket_count(&self) -> usize {
        let span = (self.end - self.start).num_milliseconds();
        if span <= 0 {
            return 0;
        }
        let width = self.width_millis();
        let count = span / width + i64::from(span % width != 0);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Canonical time of bucket `index`, `start + index * width`.
    ///
    /// Indices below [`Window::bucket_count`] always land inside `[start, end)`. An index past
    /// the grid whose time cannot be represented saturates to `end`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use thermoview::resample::Window;
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let end = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
    /// let window = Window::new(start, end, 600).unwrap();
    ///
    /// assert_eq!(window.bucket_time(2), Utc.with_ymd_and_hms(2024, 1, 1, 0, 20, 0).unwrap());
    /// ```
    pub fn bucket_time(&self, index: usize) -> DateTime<Utc> {
        i64::try_from(index)
            .ok()
            .and_then(|i| self.width_seconds.checked_mul(i))
            .and_then(Duration::try_seconds)
            .and_then(|offset| self.start.checked_add_signed(offset))
            .unwrap_or(self.end)
    }

    /// Index of the bucket whose canonical time is nearest to `at`, or `None` when that index
    /// falls off either side of the grid.
    ///
    /// Halfway points round up, so a reading exactly between two canonical times belongs to the
    /// later bucket.
    pub fn nearest_bucket(&self, at: DateTime<Utc>) -> Option<usize> {
        let offset = (at - self.start).num_milliseconds() as f64;
        let index = (offset / self.width_millis() as f64 + 0.5).floor();
        if index < 0.0 || index >= self.bucket_count() as f64 {
            return None;
        }
        Some(index as usize)
    }
}

/// One chart point: the bucket's canonical time and the temperature chosen for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketPoint {
    pub time: DateTime<Utc>,
    pub temperature: Option<f64>,
}

/// Resampled series, one [`BucketPoint`] per bucket in ascending bucket order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketedSeries {
    pub points: Vec<BucketPoint>,
}

impl BucketedSeries {
    /// Number of buckets, present or absent.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BucketPoint> {
        self.points.iter()
    }

    /// Bucket times as a standalone array, parallel to [`BucketedSeries::temperatures`].
    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.time).collect()
    }

    /// Chosen temperatures in bucket order, `None` where no reading landed.
    pub fn temperatures(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.temperature).collect()
    }
}

/// Aggregates over the non-absent temperatures of a [`BucketedSeries`].
///
/// All three fields are `None` exactly when every bucket is absent. `mean` is rounded to two
/// decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub mean: Option<f64>,
}

impl Statistics {
    /// Computes max, min and mean over the present buckets of `series`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use thermoview::resample::{BucketPoint, BucketedSeries, Statistics};
    ///
    /// let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let series = BucketedSeries {
    ///     points: vec![
    ///         BucketPoint { time, temperature: Some(20.0) },
    ///         BucketPoint { time, temperature: None },
    ///         BucketPoint { time, temperature: Some(21.5) },
    ///     ],
    /// };
    ///
    /// let stats = Statistics::from_series(&series);
    /// assert_eq!(stats.max, Some(21.5));
    /// assert_eq!(stats.min, Some(20.0));
    /// assert_eq!(stats.mean, Some(20.75));
    /// ```
    pub fn from_series(series: &BucketedSeries) -> Statistics {
        let mut max: Option<f64> = None;
        let mut min: Option<f64> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        for value in series.iter().filter_map(|p| p.temperature) {
            max = Some(max.map_or(value, |m| m.max(value)));
            min = Some(min.map_or(value, |m| m.min(value)));
            sum += value;
            count += 1;
        }

        let mean = if count > 0 {
            Some(round_to_hundredths(sum / count as f64))
        } else {
            None
        };

        Statistics { max, min, mean }
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Closest sample seen so far for one bucket.
#[derive(Clone, Copy)]
struct Slot {
    distance_ms: i64,
    temperature: f64,
}

/// Resamples `samples` onto the bucket grid of `window`.
///
/// Each sample goes to the bucket whose canonical time is nearest; samples whose nearest
/// bucket lies outside the grid are dropped rather than clamped. When two samples compete for
/// a bucket the one strictly closer to the canonical time wins, and on an exact tie the one
/// seen first stays. Samples are evaluated in the order given and are not sorted.
///
/// Runs in `O(samples + buckets)` and never fails: an empty sample set just yields an all-absent
/// series with all-absent statistics.
pub fn resample(window: &Window, samples: &[Sample]) -> (BucketedSeries, Statistics) {
    let mut slots: Vec<Option<Slot>> = vec![None; window.bucket_count()];

    for sample in samples {
        let Some(index) = window.nearest_bucket(sample.timestamp) else {
            continue;
        };
        let distance_ms = (sample.timestamp - window.bucket_time(index))
            .num_milliseconds()
            .abs();

        let slot = &mut slots[index];
        let replace = match slot {
            Some(current) => distance_ms < current.distance_ms,
            None => true,
        };
        if replace {
            *slot = Some(Slot {
                distance_ms,
                temperature: sample.temperature,
            });
        }
    }

    let series = BucketedSeries {
        points: slots
            .iter()
            .enumerate()
            .map(|(i, slot)| BucketPoint {
                time: window.bucket_time(i),
                temperature: slot.map(|s| s.temperature),
            })
            .collect(),
    };
    let stats = Statistics::from_series(&series);

    (series, stats)
}
