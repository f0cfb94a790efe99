//! Session error types.

use thiserror::Error;

use crate::session::Phase;

/// A rejected range selection or session transition.
///
/// Every variant is recoverable: the session is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `id_start` is greater than `id_end`.
    #[error("start id {start} must be less than or equal to end id {end}")]
    InvalidRange { start: i64, end: i64 },

    /// No dataset row has an id in the requested range.
    #[error("no rows found in the id range {start}-{end}")]
    EmptySelection { start: i64, end: i64 },

    /// The operation is not valid in the session's current phase.
    #[error("cannot {operation} while the session is {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },

    /// Every item has already been visited; reset to rate another range.
    #[error("all items in this range have been rated")]
    AlreadyComplete,
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
