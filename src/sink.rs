use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ScrapeError;
use crate::record::TabularRecord;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes records to a CSV file, replacing whatever was there.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
    bom: bool,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), bom: false }
    }

    /// Prefix the file with a UTF-8 byte order mark so spreadsheet tools detect the encoding.
    pub fn with_bom(mut self, bom: bool) -> Self {
        self.bom = bom;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the header and one row per record. Returns the number of rows written.
    pub fn write<R: TabularRecord>(&self, records: &[R]) -> Result<usize, ScrapeError> {
        self.write_inner(records).map_err(|source| ScrapeError::Sink {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), rows = records.len(), "💾 saved records");
        Ok(records.len())
    }

    fn write_inner<R: TabularRecord>(&self, records: &[R]) -> Result<(), csv::Error> {
        let mut file = File::create(&self.path)?;
        if self.bom {
            file.write_all(UTF8_BOM)?;
        }

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(R::COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
