//! Inclusive id range selected for a rating session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` range over dataset row ids.
///
/// A range with `start > end` can be constructed but selects nothing;
/// range selection rejects it before a session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdRange {
    pub start: i64,
    pub end: i64,
}

impl IdRange {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Returns true when `start <= end`.
    pub const fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    pub const fn contains(&self, id: i64) -> bool {
        self.start <= id && id <= self.end
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
