//! Error types for source loading.
//!
//! Every variant means the source cannot be used at all; the run stops
//! before any stage of the pipeline executes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a source extract.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source file not found.
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Text Decoding Errors ===
    /// The configured encoding label is not known.
    #[error("unsupported encoding '{label}' for {path}")]
    UnsupportedEncoding { path: PathBuf, label: String },

    /// File content is not valid in the configured encoding.
    #[error("{path} is not valid {encoding}")]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },

    // === Parsing Errors ===
    /// Failed to parse delimited text.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Fewer lines than the configured skip count plus a header.
    #[error("no header line in {path} after skipping {skip_rows} line(s)")]
    NoHeader { path: PathBuf, skip_rows: usize },

    /// Failed to open or read a spreadsheet.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Requested worksheet does not exist.
    #[error("sheet '{sheet}' not found in {path} (available: {available})")]
    SheetNotFound {
        path: PathBuf,
        sheet: String,
        available: String,
    },

    /// Source has no header and no rows.
    #[error("source is empty: {path}")]
    EmptySource { path: PathBuf },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

pub(crate) fn open_error(path: &std::path::Path, error: std::io::Error) -> IngestError {
    if error.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: error,
        }
    }
}
