//! Auto-save support for the interactive review loop.
//!
//! Provides:
//! - `DirtyTracker` - Counts actions not yet written to the progress file
//! - `AutoSaveConfig` - User settings for auto-save behavior

mod config;
mod tracker;

pub use config::AutoSaveConfig;
pub use tracker::DirtyTracker;
