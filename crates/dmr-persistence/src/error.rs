//! Persistence error types.
//!
//! All persistence operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::PathBuf;
use thiserror::Error;

use dmr_session::SessionError;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Failed to serialize progress data")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// The document is not JSON at all.
    #[error("Failed to parse progress data")]
    Deserialization {
        #[source]
        source: serde_json::Error,
    },

    /// The document is JSON but not a usable progress file.
    #[error("Invalid progress file format: {reason}")]
    MalformedProgress { reason: String },

    /// Unsupported schema version.
    #[error("Progress file version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion { found: u32, max_supported: u32 },

    /// A selected position does not exist in the loaded dataset.
    #[error("Position {position} is outside the dataset ({rows} rows)")]
    PositionOutOfBounds { position: usize, rows: usize },

    /// There is nothing to snapshot.
    #[error("No rating session is active")]
    NoActiveSession,

    /// The decoded state was rejected by the session.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::Serialization { .. } => {
                "An error occurred while saving the progress data.".to_string()
            }
            Self::Deserialization { .. } => {
                "The progress file is not valid JSON. It may be corrupted.".to_string()
            }
            Self::MalformedProgress { reason } => {
                format!("Invalid progress file format. {reason}")
            }
            Self::UnsupportedVersion {
                found,
                max_supported,
            } => {
                format!(
                    "This progress file was created with a newer version of the tool \
                    (file version {found}, this version supports up to {max_supported})."
                )
            }
            Self::PositionOutOfBounds { position, rows } => {
                format!(
                    "The progress file refers to row {position}, but the dataset only has {rows} rows."
                )
            }
            Self::NoActiveSession => "Select an id range before saving progress.".to_string(),
            Self::Session(err) => err.to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
            Self::Deserialization { .. } | Self::MalformedProgress { .. } => {
                Some("Make sure you selected a progress file downloaded from this tool.".into())
            }
            Self::UnsupportedVersion { .. } => {
                Some("Update to the latest version of the tool.".into())
            }
            Self::PositionOutOfBounds { .. } => {
                Some("Load the dataset the progress file was created with.".into())
            }
            Self::NoActiveSession => Some("Start a session with an id range first.".into()),
            Self::Serialization { .. } | Self::Session(_) => None,
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message() {
        let err = PersistenceError::MalformedProgress {
            reason: "missing required fields: ratings".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid progress file format: missing required fields: ratings"
        );
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_session_error_is_transparent() {
        let err: PersistenceError = SessionError::EmptySelection { start: 1, end: 2 }.into();
        assert_eq!(err.to_string(), "no rows found in the id range 1-2");
        assert!(err.suggestion().is_none());
    }
}
