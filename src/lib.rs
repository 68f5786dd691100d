#![deny(unsafe_code)]

//! Backend for a thermostat monitoring and control dashboard.
//!
//! The dashboard shows live and historical temperature readings, lets the user change the
//! setpoint and switch the thermostat on or off. This crate serves those screens over HTTP and
//! does the one piece of real computation behind the history view: resampling irregular
//! readings onto a fixed time grid.
//!
//! # Features
//!
//! - **Nearest-sample resampling**: one value per bucket, the reading closest to the bucket's
//!   canonical time, with gaps left absent rather than interpolated
//! - **Statistics**: max, min and two-decimal mean over the resampled series
//! - **CSV export**: `date,time,temperature` rows in a configurable UTC offset
//! - **Live window**: fixed-capacity rolling buffer of recent readings, filled by a poller
//! - **Thermostat control**: validated setpoints and run/stop commands in register encoding
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use thermoview::resample::{resample, Sample, Window};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 3, 0).unwrap();
//! let window = Window::new(start, end, 60).unwrap();
//!
//! let samples = [
//!     Sample::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 25).unwrap(), 21.0),
//!     Sample::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 5).unwrap(), 19.0), // closer to 00:00
//!     Sample::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 2, 1).unwrap(), 23.0),
//! ];
//!
//! let (series, stats) = resample(&window, &samples);
//! assert_eq!(series.temperatures(), vec![Some(19.0), None, Some(23.0)]);
//! assert_eq!(stats.max, Some(23.0));
//! assert_eq!(stats.mean, Some(21.0));
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod live;
pub mod resample;
pub mod store;
pub mod thermostat;

pub use crate::error::{Error, Result};
pub use crate::resample::{resample, BucketedSeries, Sample, Statistics, Window};
