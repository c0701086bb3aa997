//! `;`-delimited CSV output

use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{ResultSink, SinkError};
use crate::page_extractor::ProductRecord;
use crate::utils::CSV_DELIMITER;

/// Writes `<output_dir>/<stem>.csv` with a header row, even when empty
#[derive(Debug, Clone)]
pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ResultSink for CsvSink {
    fn write(&self, records: &[ProductRecord], stem: &str) -> Result<PathBuf, SinkError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| SinkError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(format!("{stem}.csv"));
        let mut writer = WriterBuilder::new()
            .delimiter(CSV_DELIMITER)
            .has_headers(false)
            .from_path(&path)?;

        writer.write_record(ProductRecord::COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;

        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(path)
    }
}
