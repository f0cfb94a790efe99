//! Dataset ingestion for device match rating.
//!
//! This crate loads the candidate match file into an immutable
//! [`Dataset`](dmr_model::Dataset).
//!
//! # Features
//!
//! - **CSV Loading**: header row required, source row order preserved
//! - **Validation**: required columns, unique integer ids, existing `human` labels
//! - **Identity**: file name plus SHA-256 content hash for progress sanity checks
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use dmr_ingest::load_dataset;
//!
//! let dataset = load_dataset(Path::new("device_match_humanrating.csv"))?;
//! println!("{} rows, ids {:?}", dataset.len(), dataset.id_bounds());
//! ```

mod error;
mod hash;
mod header;
mod reader;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use reader::{
    MAX_CSV_FILE_SIZE, check_file_size, check_file_size_with_limit, load_dataset, parse_dataset,
    validate_encoding,
};

// === Hashing ===
pub use hash::sha256_hex;

/// Default dataset file name used when no path is configured.
pub const DEFAULT_DATASET_FILE: &str = "device_match_humanrating.csv";
