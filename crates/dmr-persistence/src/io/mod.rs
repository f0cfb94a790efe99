//! File I/O operations for progress persistence.
//!
//! This module handles:
//! - Saving progress with atomic writes
//! - Loading and validating uploaded progress documents

mod load;
mod save;

pub use load::{load_progress, parse_progress};
pub use save::{save_progress, to_json};
