//! CSV import/export payloads.
//!
//! Uploads are checked locally against the dataset before anything is sent:
//! the server replaces the whole dataset with the file and requires a
//! `Sample Date` column plus one column per variable id.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{LenticrayError, Result};
use crate::model::{Dataset, SAMPLE_DATE};

/// Filename used when the server does not provide one.
pub const DEFAULT_DOWNLOAD_NAME: &str = "dataset.csv";

/// A CSV file ready to be sent to `upload_csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// `sha256:<hex>` of the file contents.
    pub hash: String,
    pub headers: Vec<String>,
    /// Data rows, excluding the header.
    pub row_count: usize,
}

impl CsvUpload {
    /// Read and check a file from disk.
    pub fn from_path(path: impl AsRef<Path>, dataset: &Dataset) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| LenticrayError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string());

        Self::from_bytes(file_name, bytes, dataset)
    }

    /// Check in-memory contents against the dataset's columns.
    pub fn from_bytes(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        dataset: &Dataset,
    ) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes.as_slice());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(LenticrayError::InvalidCsv("file has no header row".to_string()));
        }

        if !headers.iter().any(|h| h == SAMPLE_DATE) {
            return Err(LenticrayError::InvalidCsv(format!(
                "missing required column \"{}\"",
                SAMPLE_DATE
            )));
        }

        let missing: Vec<&str> = dataset
            .variable_ids()
            .filter(|id| !headers.iter().any(|h| h == id))
            .collect();
        if !missing.is_empty() {
            return Err(LenticrayError::InvalidCsv(format!(
                "missing variable column(s): {}",
                missing.join(", ")
            )));
        }

        let mut row_count = 0;
        for record in reader.records() {
            record?;
            row_count += 1;
        }

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let upload = Self {
            file_name: file_name.into(),
            bytes,
            hash,
            headers,
            row_count,
        };
        debug!(
            file = %upload.file_name,
            rows = upload.row_count,
            hash = %upload.hash,
            "prepared CSV upload"
        );
        Ok(upload)
    }
}

/// A CSV export received from `download_csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvDownload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CsvDownload {
    /// Build from a response body and its `Content-Disposition` header.
    pub fn new(content_disposition: Option<&str>, bytes: Vec<u8>) -> Self {
        let file_name = content_disposition
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string());
        Self { file_name, bytes }
    }

    /// Write the export. A directory target receives the server's filename.
    pub fn write_to(&self, target: impl AsRef<Path>) -> Result<PathBuf> {
        let target = target.as_ref();
        let path = if target.is_dir() {
            target.join(&self.file_name)
        } else {
            target.to_path_buf()
        };

        fs::write(&path, &self.bytes).map_err(|e| LenticrayError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}

/// Extract `filename` from a `Content-Disposition` value.
///
/// Quotes are stripped and any directory components dropped, so the result
/// is always a bare file name.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("filename"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .and_then(|value| value.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
}
