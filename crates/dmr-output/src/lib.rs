//! Result export for rating sessions.
//!
//! - **CSV export**: the dataset rows of a range, with the `human` column
//!   filled in from the session's ratings
//! - **Summary**: label counts over an export

mod error;
mod export;
mod summary;

pub use error::{OutputError, Result};
pub use export::{
    ExportRow, ExportTable, default_export_file_name, export_ratings, export_to_file,
    to_csv_string, write_csv,
};
pub use summary::RatingSummary;
