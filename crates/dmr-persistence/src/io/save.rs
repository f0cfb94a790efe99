//! Progress saving operations.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{PersistenceError, Result};
use crate::types::ProgressFile;

/// Render a progress document as JSON with four-space indentation.
pub fn to_json(progress: &ProgressFile) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    progress
        .serialize(&mut serializer)
        .map_err(|e| PersistenceError::Serialization { source: e })?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Save a progress document.
///
/// Uses atomic write (temp file + rename) so an interrupted save never
/// leaves a truncated document behind.
pub fn save_progress(progress: &ProgressFile, path: &Path) -> Result<()> {
    let json = to_json(progress)?;

    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut file = File::create(&temp_path).map_err(|e| PersistenceError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(json.as_bytes())
        .map_err(|e| PersistenceError::Io {
            operation: "write",
            path: temp_path.clone(),
            source: e,
        })?;

    file.sync_all().map_err(|e| PersistenceError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| PersistenceError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(
        path = %path.display(),
        range = %progress.range(),
        "Saved progress"
    );
    Ok(())
}
