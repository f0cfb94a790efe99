//! Error types for dataset ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Dataset file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit.
    #[error("file {path} is {size} bytes (limit {max_size})")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File uses an encoding other than UTF-8.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    // === CSV Parsing Errors ===
    /// The CSV reader rejected the file.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file has a header but no data rows.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    // === Content Errors ===
    /// Required column not found in the header.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// An `id` cell is not an integer.
    #[error("invalid id '{value}' at row {row} in {path}")]
    InvalidId {
        value: String,
        row: usize,
        path: PathBuf,
    },

    /// Two rows share the same `id`.
    #[error("duplicate id {id} at rows {first_row} and {row} in {path}")]
    DuplicateId {
        id: i64,
        first_row: usize,
        row: usize,
        path: PathBuf,
    },

    /// A `human` cell is neither blank nor a 0/1 label.
    #[error("invalid human rating '{value}' at row {row} in {path}")]
    InvalidRating {
        value: String,
        row: usize,
        path: PathBuf,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
