//! CLI library components for the match rater.

pub mod display;
pub mod logging;
pub mod review;
pub mod settings;
pub mod workspace;
