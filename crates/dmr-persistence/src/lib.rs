//! Resumable progress for rating sessions.
//!
//! A progress document is the only state that survives between runs: the
//! rater downloads it, keeps it, and uploads it later to continue. This
//! crate converts sessions to and from that document and reads and writes
//! it on disk.
//!
//! # File Format
//!
//! Pretty-printed JSON:
//!
//! ```text
//! {
//!     "id_start": 2,
//!     "id_end": 4,
//!     "data_file_name": "device_match_humanrating.csv",
//!     "data_file_sha256": "…",
//!     "filtered_indices": [1, 2, 3],
//!     "current_index_in_filtered": 1,
//!     "ratings": { "1": 1, "2": null, "3": null },
//!     "timestamp": "2024-05-01 14:03:22",
//!     "schema_version": 1
//! }
//! ```
//!
//! `id_start`, `id_end`, `filtered_indices`, `current_index_in_filtered`
//! and `ratings` are required; the rest are optional on load.
//!
//! # Architecture
//!
//! - `types.rs` - The document type and naming helpers
//! - `convert.rs` - Session snapshot and restore
//! - `io/` - Atomic save and validated load
//! - `autosave/` - Autosave policy for interactive sessions
//! - `error.rs` - Error types with user-facing messages

mod autosave;
mod convert;
mod error;
mod io;
mod types;

pub use autosave::{AutoSaveConfig, DirtyTracker};
pub use convert::{Restored, RestoreWarning, restore, snapshot};
pub use error::{PersistenceError, Result};
pub use io::{load_progress, parse_progress, save_progress, to_json};
pub use types::{
    CURRENT_SCHEMA_VERSION, ProgressFile, REQUIRED_FIELDS, TIMESTAMP_FORMAT,
    default_progress_file_name, is_progress_file_name,
};
