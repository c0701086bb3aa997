//! Persistence of scraped records

pub mod csv_sink;

pub use csv_sink::CsvSink;

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::PathBuf;

use crate::page_extractor::ProductRecord;
use crate::utils::OUTPUT_FILE_PREFIX;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sink task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Destination for the records of a run
pub trait ResultSink: Send + Sync {
    /// Persist `records` under the name `stem` and return where they went.
    fn write(&self, records: &[ProductRecord], stem: &str) -> Result<PathBuf, SinkError>;
}

/// `productos_entel_<YYYYMMDD_HHMMSS>` for the given instant
#[must_use]
pub fn output_stem<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{OUTPUT_FILE_PREFIX}_{}", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn stem_uses_second_resolution_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 12, 3, 9, 5, 7).unwrap();
        assert_eq!(output_stem(&now), "productos_entel_20241203_090507");
    }
}
