//! Rating session state machine.
//!
//! A [`RatingSession`] is an explicit value: callers own it, drive it with
//! user actions, and hand it to the persistence or output crates when the
//! rater saves or exports. Nothing here performs IO.
//!
//! ```text
//! AwaitingRange --start--> InProgress --rate/skip at last item--> Completed
//!       ^                                                            |
//!       +------------------------------reset-------------------------+
//! ```
//!
//! `reset` is valid from every phase.

mod error;
mod range;
mod session;

pub use error::{Result, SessionError};
pub use range::select_range;
pub use session::{
    Advance, CursorAdjustment, Navigation, Phase, RatingSession, RestoreReport, RestoredParts,
    SessionProgress,
};
