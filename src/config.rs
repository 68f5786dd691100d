//! Command line and environment configuration for the dashboard server.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;
use clap::Parser;

use crate::export::{default_offset, CsvOptions};
use crate::thermostat::{Setpoint, SetpointError};

#[derive(Debug, Clone, Parser)]
#[command(name = "thermoview", about = "Thermostat monitoring and control dashboard server")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "THERMOVIEW_LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Live chart polling interval in milliseconds
    #[arg(long, env = "THERMOVIEW_REFRESH_MS", default_value_t = 10_000)]
    pub refresh_ms: u64,

    /// UTC offset, in whole hours, used for CSV date and time columns
    #[arg(
        long,
        env = "THERMOVIEW_UTC_OFFSET_HOURS",
        default_value_t = 9,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i32).range(-23..=23)
    )]
    pub utc_offset_hours: i32,

    /// Log filter, in `tracing_subscriber::EnvFilter` syntax
    #[arg(long, env = "THERMOVIEW_LOG", default_value = "info")]
    pub log: String,

    /// Setpoint the thermostat starts with, in degrees Celsius
    #[arg(long, env = "THERMOVIEW_INITIAL_SETPOINT", default_value_t = 25.0)]
    pub initial_setpoint: f64,
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(default_offset)
    }

    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            offset: self.offset(),
            ..CsvOptions::default()
        }
    }

    pub fn setpoint(&self) -> Result<Setpoint, SetpointError> {
        Setpoint::new(self.initial_setpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::parse_from(["thermoview"]);
        assert_eq!(config.listen.port(), 5000);
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
        assert_eq!(config.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(config.setpoint().unwrap().celsius(), 25.0);
    }

    #[test]
    fn overrides() {
        let config = Config::parse_from([
            "thermoview",
            "--listen",
            "127.0.0.1:8080",
            "--utc-offset-hours",
            "-5",
            "--initial-setpoint",
            "70",
        ]);
        assert_eq!(config.listen.to_string(), "127.0.0.1:8080");
        assert_eq!(config.offset().local_minus_utc(), -5 * 3600);
        assert!(config.setpoint().is_err());
    }

    #[test]
    fn rejects_offset_out_of_range() {
        assert!(Config::try_parse_from(["thermoview", "--utc-offset-hours", "30"]).is_err());
    }
}
