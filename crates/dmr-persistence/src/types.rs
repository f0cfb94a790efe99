//! Progress document type.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use dmr_model::{IdRange, Rating};

/// Current schema version.
///
/// Documents without a version field are treated as version 1. The loader
/// rejects documents with a version greater than this.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Fields a document must contain to be restorable.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "id_start",
    "id_end",
    "filtered_indices",
    "current_index_in_filtered",
    "ratings",
];

/// Format of the informational `timestamp` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn default_schema_version() -> u32 {
    1
}

/// Portable snapshot of a rating session.
///
/// Field names match the documents written by earlier versions of the
/// tool, so old progress files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressFile {
    pub id_start: i64,
    pub id_end: i64,

    /// File name of the dataset the positions refer to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file_name: Option<String>,

    /// SHA-256 of the dataset contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file_sha256: Option<String>,

    /// Selected dataset positions, in dataset order.
    pub filtered_indices: Vec<usize>,

    /// Cursor into `filtered_indices`. Signed so that out-of-range values
    /// from hand-edited files still decode and can be clamped.
    pub current_index_in_filtered: i64,

    /// Position (as decimal text) to rating; `null` means unset.
    pub ratings: BTreeMap<String, Option<Rating>>,

    /// When the snapshot was taken, in local time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

impl ProgressFile {
    pub fn range(&self) -> IdRange {
        IdRange::new(self.id_start, self.id_end)
    }

    /// Set the timestamp to now.
    pub fn touch(&mut self) {
        self.timestamp = Some(Local::now().format(TIMESTAMP_FORMAT).to_string());
    }

    /// Parse the timestamp field.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.timestamp.as_deref()?;
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
    }
}

const PROGRESS_FILE_PREFIX: &str = "rating_progress_IDs_";

/// Default download name for the progress document of `range`.
pub fn default_progress_file_name(range: IdRange) -> String {
    format!("{PROGRESS_FILE_PREFIX}{}-{}.json", range.start, range.end)
}

/// Returns true for names produced by [`default_progress_file_name`].
pub fn is_progress_file_name(name: &str) -> bool {
    name.strip_prefix(PROGRESS_FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(parses_as_range)
}

/// `START-END` exactly as `IdRange` formats it; either end may be negative.
fn parses_as_range(text: &str) -> bool {
    text.match_indices('-').filter(|&(at, _)| at > 0).any(|(at, _)| {
        let (start, end) = (&text[..at], &text[at + 1..]);
        match (start.parse::<i64>(), end.parse::<i64>()) {
            (Ok(start), Ok(end)) => format!("{start}-{end}") == text,
            _ => false,
        }
    })
}
