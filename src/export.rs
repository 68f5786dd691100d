//! CSV export of a resampled series and display strings for its statistics.

use std::io::Write;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::resample::{BucketedSeries, Statistics};

const CSV_HEADER: [&str; 3] = ["date", "time", "temperature"];
const BOM: &[u8] = "\u{feff}".as_bytes();

/// Text shown in place of a missing statistic.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    /// Zone the `date` and `time` columns are rendered in
    pub offset: FixedOffset,
    /// Prefix the output with a UTF-8 byte order mark so spreadsheet tools pick the encoding
    pub bom: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            offset: default_offset(),
            bom: true,
        }
    }
}

/// UTC+09:00, the zone the dashboard was deployed in.
pub fn default_offset() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Writes `series` as `date,time,temperature` records under a header record.
///
/// The byte order mark, when enabled, goes out raw ahead of the first record. Absent buckets
/// keep their record with an empty temperature field.
///
/// # Errors
///
/// Any I/O failure of `writer`, surfaced as [`csv::Error`].
pub fn write_csv<W: Write>(
    series: &BucketedSeries,
    options: &CsvOptions,
    mut writer: W,
) -> csv::Result<()> {
    if options.bom {
        writer.write_all(BOM)?;
    }

    let mut records = csv::WriterBuilder::new().from_writer(writer);
    records.write_record(CSV_HEADER)?;

    for point in series.iter() {
        let local = point.time.with_timezone(&options.offset);
        let temperature = point.temperature.map(|t| t.to_string()).unwrap_or_default();
        records.write_record([
            local.format("%Y-%m-%d").to_string(),
            local.format("%H:%M:%S").to_string(),
            temperature,
        ])?;
    }

    records.flush()?;
    Ok(())
}

/// Renders the whole export in memory, as served by the download endpoint.
pub fn to_csv_string(series: &BucketedSeries, options: &CsvOptions) -> csv::Result<String> {
    let mut buf = Vec::new();
    write_csv(series, options, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `"{value}°C"`, or [`NOT_AVAILABLE`].
pub fn format_temperature(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}°C"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// The statistics panel under the history chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsView {
    pub max: String,
    pub min: String,
    pub mean: String,
}

impl From<&Statistics> for StatisticsView {
    fn from(stats: &Statistics) -> Self {
        StatisticsView {
            max: format_temperature(stats.max),
            min: format_temperature(stats.min),
            mean: match stats.mean {
                Some(v) => format!("{v:.2}°C"),
                None => NOT_AVAILABLE.to_string(),
            },
        }
    }
}
