//! Progress loading operations.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{PersistenceError, Result};
use crate::types::{CURRENT_SCHEMA_VERSION, ProgressFile, REQUIRED_FIELDS};

/// Load a progress document from disk.
pub fn load_progress(path: &Path) -> Result<ProgressFile> {
    let text = fs::read_to_string(path).map_err(|e| PersistenceError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;

    let progress = parse_progress(&text)?;
    tracing::info!(path = %path.display(), range = %progress.range(), "Loaded progress");
    Ok(progress)
}

/// Parse and validate an uploaded progress document.
///
/// Required fields are checked on the raw JSON first so the error can name
/// every missing field instead of the first one serde trips over.
pub fn parse_progress(text: &str) -> Result<ProgressFile> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| PersistenceError::Deserialization { source: e })?;

    let Some(object) = value.as_object() else {
        return Err(PersistenceError::MalformedProgress {
            reason: "expected a JSON object".to_string(),
        });
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(PersistenceError::MalformedProgress {
            reason: format!("missing required fields: {}", missing.join(", ")),
        });
    }

    let progress: ProgressFile =
        serde_json::from_value(value).map_err(|e| PersistenceError::MalformedProgress {
            reason: e.to_string(),
        })?;

    if progress.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: progress.schema_version,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    Ok(progress)
}
