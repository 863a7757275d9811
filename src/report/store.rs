//! Report persistence: load, merge, and atomically replace the JSON report file.

use super::{ExportData, LastCount};
use crate::error::StorageError;
use crate::record::DeleteCountRecord;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Summary of one export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub path: PathBuf,
    /// BLAKE3 digest (hex) of the bytes on disk after the write.
    pub checksum: String,
    pub total_results: usize,
    pub new_results: usize,
    pub current_counts: Vec<LastCount>,
}

/// JSON report file at a fixed path.
#[derive(Debug, Clone)]
pub struct ReportStore {
    path: PathBuf,
}

impl ReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the existing report, or an empty one if the file does not exist.
    ///
    /// A file that exists but does not decode is an error; it is never replaced.
    pub fn load(&self) -> Result<ExportData, StorageError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No existing report; starting empty");
            return Ok(ExportData::default());
        }

        debug!(path = %self.path.display(), "Reading existing report");
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Write `data` as pretty JSON through a uniquely named sibling temp file and rename;
    /// returns the checksum. The temp file is removed on any failure.
    pub fn save(&self, data: &ExportData) -> Result<String, StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut bytes =
            serde_json::to_vec_pretty(data).map_err(|e| StorageError::Encode(e.to_string()))?;
        bytes.push(b'\n');

        let mut temp = tempfile::Builder::new()
            .prefix(&self.temp_prefix())
            .suffix(".tmp")
            .tempfile_in(dir)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| StorageError::IoError(e.error))?;

        let written = fs::read(&self.path)?;
        Ok(blake3::hash(&written).to_hex().to_string())
    }

    /// Merge `batch` into the stored report, dating the summary with today's UTC date
    /// (not the local date) to match how records are bucketed.
    pub fn export(&self, batch: Vec<DeleteCountRecord>) -> Result<ExportOutcome, StorageError> {
        self.export_on(batch, Utc::now().date_naive())
    }

    pub fn export_on(
        &self,
        batch: Vec<DeleteCountRecord>,
        today: NaiveDate,
    ) -> Result<ExportOutcome, StorageError> {
        let new_results = batch.len();
        let merged = self.load()?.merge(batch, today);
        let checksum = self.save(&merged)?;

        info!(
            path = %self.path.display(),
            checksum = %checksum,
            total_results = merged.results.len(),
            new_results = new_results,
            "Successfully exported results"
        );

        Ok(ExportOutcome {
            path: self.path.clone(),
            checksum,
            total_results: merged.results.len(),
            new_results,
            current_counts: merged.last_run_count,
        })
    }

    fn temp_prefix(&self) -> OsString {
        let mut prefix = OsString::from(".");
        prefix.push(self.path.file_name().unwrap_or_default());
        prefix.push(".");
        prefix
    }
}
