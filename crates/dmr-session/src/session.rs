//! The rating session and its transitions.

use std::collections::BTreeMap;
use std::fmt;

use dmr_model::{Dataset, IdRange, Position, Rating};

use crate::error::{Result, SessionError};
use crate::range::select_range;

// =============================================================================
// PHASE
// =============================================================================

/// Coarse state of a [`RatingSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No range selected yet, or the previous session was reset.
    AwaitingRange,
    /// The cursor points at an item waiting for a judgment.
    InProgress,
    /// The cursor moved past the final item. Only `reset` leaves this phase.
    Completed,
}

impl Phase {
    pub const fn name(self) -> &'static str {
        match self {
            Self::AwaitingRange => "awaiting a range",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TRANSITION RESULTS
// =============================================================================

/// Outcome of `rate` or `skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved to the next item.
    Moved { cursor: usize },
    /// The last item was handled; the session is now completed.
    Completed,
}

/// Outcome of `next` or `previous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved { cursor: usize },
    /// Already at the first (or last) item; the cursor did not change.
    AtBoundary,
}

/// Counts for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionProgress {
    pub total: usize,
    pub rated: usize,
    pub matches: usize,
    pub no_matches: usize,
    pub cursor: usize,
}

impl SessionProgress {
    pub fn unrated(&self) -> usize {
        self.total - self.rated
    }
}

// =============================================================================
// RESTORE INPUT
// =============================================================================

/// Session state decoded from a progress document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredParts {
    pub range: IdRange,
    pub filtered: Vec<Position>,
    pub ratings: BTreeMap<Position, Rating>,
    /// Raw cursor from the document; clamped on restore.
    pub cursor: i64,
}

/// A cursor that had to be moved into bounds during restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorAdjustment {
    pub requested: i64,
    pub clamped: usize,
}

/// Everything restore had to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub cursor: Option<CursorAdjustment>,
    /// Rated positions that are not part of the filtered list.
    pub dropped_ratings: Vec<Position>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.cursor.is_none() && self.dropped_ratings.is_empty()
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveRange {
    range: IdRange,
    filtered: Vec<Position>,
    /// Only set ratings are stored; a missing key means unset.
    ratings: BTreeMap<Position, Rating>,
    cursor: usize,
}

impl ActiveRange {
    fn all_rated(&self) -> bool {
        self.filtered.iter().all(|p| self.ratings.contains_key(p))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum State {
    #[default]
    AwaitingRange,
    InProgress(ActiveRange),
    Completed(ActiveRange),
}

/// One rater's pass over an id range.
///
/// Operations validate before mutating, so a rejected call leaves the
/// session unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingSession {
    state: State,
}

impl RatingSession {
    /// Create a session waiting for a range.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::AwaitingRange => Phase::AwaitingRange,
            State::InProgress(_) => Phase::InProgress,
            State::Completed(_) => Phase::Completed,
        }
    }

    fn active(&self) -> Option<&ActiveRange> {
        match &self.state {
            State::AwaitingRange => None,
            State::InProgress(active) | State::Completed(active) => Some(active),
        }
    }

    /// Begin rating `filtered` (positions selected for `range`).
    pub fn start(&mut self, filtered: Vec<Position>, range: IdRange) -> Result<()> {
        let phase = self.phase();
        if phase != Phase::AwaitingRange {
            return Err(SessionError::InvalidPhase {
                operation: "start",
                phase,
            });
        }
        if filtered.is_empty() {
            return Err(SessionError::EmptySelection {
                start: range.start,
                end: range.end,
            });
        }

        tracing::info!(range = %range, items = filtered.len(), "Started rating session");
        self.state = State::InProgress(ActiveRange {
            range,
            filtered,
            ratings: BTreeMap::new(),
            cursor: 0,
        });
        Ok(())
    }

    /// Select `range` in `dataset` and start rating it.
    pub fn start_range(&mut self, dataset: &Dataset, range: IdRange) -> Result<()> {
        let phase = self.phase();
        if phase != Phase::AwaitingRange {
            return Err(SessionError::InvalidPhase {
                operation: "start",
                phase,
            });
        }
        let filtered = select_range(dataset, range)?;
        self.start(filtered, range)
    }

    /// Record `rating` for the current item and advance.
    pub fn rate(&mut self, rating: Rating) -> Result<Advance> {
        self.advance("rate", Some(rating))
    }

    /// Advance without touching the current item's rating.
    pub fn skip(&mut self) -> Result<Advance> {
        self.advance("skip", None)
    }

    fn advance(&mut self, operation: &'static str, rating: Option<Rating>) -> Result<Advance> {
        let active = match &mut self.state {
            State::InProgress(active) => active,
            State::Completed(_) => return Err(SessionError::AlreadyComplete),
            State::AwaitingRange => {
                return Err(SessionError::InvalidPhase {
                    operation,
                    phase: Phase::AwaitingRange,
                });
            }
        };

        let position = active.filtered[active.cursor];
        if let Some(rating) = rating {
            active.ratings.insert(position, rating);
        }
        tracing::debug!(operation, position, ?rating, cursor = active.cursor, "Handled item");

        if active.cursor + 1 < active.filtered.len() {
            active.cursor += 1;
            return Ok(Advance::Moved {
                cursor: active.cursor,
            });
        }

        if let State::InProgress(active) = std::mem::take(&mut self.state) {
            tracing::info!(
                range = %active.range,
                rated = active.ratings.len(),
                total = active.filtered.len(),
                "Rating session completed"
            );
            self.state = State::Completed(active);
        }
        Ok(Advance::Completed)
    }

    /// Move to the next item without rating.
    pub fn next(&mut self) -> Result<Navigation> {
        let active = self.in_progress_mut("move to the next item")?;
        if active.cursor + 1 >= active.filtered.len() {
            return Ok(Navigation::AtBoundary);
        }
        active.cursor += 1;
        Ok(Navigation::Moved {
            cursor: active.cursor,
        })
    }

    /// Move back to the previous item.
    pub fn previous(&mut self) -> Result<Navigation> {
        let active = self.in_progress_mut("move to the previous item")?;
        if active.cursor == 0 {
            return Ok(Navigation::AtBoundary);
        }
        active.cursor -= 1;
        Ok(Navigation::Moved {
            cursor: active.cursor,
        })
    }

    fn in_progress_mut(&mut self, operation: &'static str) -> Result<&mut ActiveRange> {
        let phase = self.phase();
        match &mut self.state {
            State::InProgress(active) => Ok(active),
            _ => Err(SessionError::InvalidPhase { operation, phase }),
        }
    }

    /// Returns true when `next` would move the cursor.
    pub fn can_next(&self) -> bool {
        match &self.state {
            State::InProgress(active) => active.cursor + 1 < active.filtered.len(),
            _ => false,
        }
    }

    /// Returns true when `previous` would move the cursor.
    pub fn can_previous(&self) -> bool {
        match &self.state {
            State::InProgress(active) => active.cursor > 0,
            _ => false,
        }
    }

    /// Discard the current range, ratings and cursor.
    pub fn reset(&mut self) {
        if let Some(active) = self.active() {
            tracing::info!(range = %active.range, "Reset rating session");
        }
        self.state = State::AwaitingRange;
    }

    /// True once the cursor passed the last item, or every item is rated.
    pub fn is_complete(&self) -> bool {
        match &self.state {
            State::AwaitingRange => false,
            State::Completed(_) => true,
            State::InProgress(active) => active.all_rated(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn range(&self) -> Option<IdRange> {
        self.active().map(|a| a.range)
    }

    /// Selected positions in dataset order (empty while awaiting a range).
    pub fn filtered_indices(&self) -> &[Position] {
        match self.active() {
            Some(active) => &active.filtered,
            None => &[],
        }
    }

    /// Set ratings keyed by dataset position.
    pub fn ratings(&self) -> Option<&BTreeMap<Position, Rating>> {
        self.active().map(|a| &a.ratings)
    }

    pub fn rating_at(&self, position: Position) -> Option<Rating> {
        self.active()?.ratings.get(&position).copied()
    }

    /// Offset into the filtered list.
    pub fn cursor(&self) -> Option<usize> {
        self.active().map(|a| a.cursor)
    }

    /// Dataset position of the item under the cursor.
    pub fn current_position(&self) -> Option<Position> {
        self.active().map(|a| a.filtered[a.cursor])
    }

    pub fn len(&self) -> usize {
        self.filtered_indices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_indices().is_empty()
    }

    pub fn progress(&self) -> SessionProgress {
        let Some(active) = self.active() else {
            return SessionProgress::default();
        };
        let matches = active
            .ratings
            .values()
            .filter(|r| **r == Rating::Match)
            .count();
        SessionProgress {
            total: active.filtered.len(),
            rated: active.ratings.len(),
            matches,
            no_matches: active.ratings.len() - matches,
            cursor: active.cursor,
        }
    }

    // =========================================================================
    // Restore
    // =========================================================================

    /// Rebuild a session from decoded progress. `filtered` must be strictly
    /// increasing; `dmr_persistence::restore` checks this before calling.
    ///
    /// The cursor is clamped into range and ratings for positions outside
    /// the filtered list are dropped; both repairs are reported rather than
    /// rejected. Completion is derived from the ratings: the session is
    /// completed exactly when every filtered position has one.
    pub fn restore(parts: RestoredParts) -> Result<(Self, RestoreReport)> {
        let RestoredParts {
            range,
            filtered,
            mut ratings,
            cursor,
        } = parts;

        if filtered.is_empty() {
            return Err(SessionError::EmptySelection {
                start: range.start,
                end: range.end,
            });
        }

        let mut report = RestoreReport::default();

        let last = filtered.len() - 1;
        let clamped = usize::try_from(cursor).map_or(0, |c| c.min(last));
        if i64::try_from(clamped) != Ok(cursor) {
            report.cursor = Some(CursorAdjustment {
                requested: cursor,
                clamped,
            });
        }

        ratings.retain(|position, _| {
            let keep = filtered.contains(position);
            if !keep {
                report.dropped_ratings.push(*position);
            }
            keep
        });

        let active = ActiveRange {
            range,
            filtered,
            ratings,
            cursor: clamped,
        };
        let state = if active.all_rated() {
            State::Completed(active)
        } else {
            State::InProgress(active)
        };
        Ok((Self { state }, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(len: usize) -> RatingSession {
        let mut session = RatingSession::new();
        session
            .start((0..len).collect(), IdRange::new(0, len as i64))
            .unwrap();
        session
    }

    #[test]
    fn start_requires_awaiting_range() {
        let mut session = started(2);
        assert_eq!(
            session.start(vec![0], IdRange::new(0, 0)),
            Err(SessionError::InvalidPhase {
                operation: "start",
                phase: Phase::InProgress
            })
        );
    }

    #[test]
    fn start_rejects_empty_selection() {
        let mut session = RatingSession::new();
        assert_eq!(
            session.start(Vec::new(), IdRange::new(3, 4)),
            Err(SessionError::EmptySelection { start: 3, end: 4 })
        );
        assert_eq!(session.phase(), Phase::AwaitingRange);
    }

    #[test]
    fn rate_on_last_item_completes() {
        let mut session = started(2);
        assert_eq!(
            session.rate(Rating::Match),
            Ok(Advance::Moved { cursor: 1 })
        );
        assert_eq!(session.rate(Rating::NoMatch), Ok(Advance::Completed));
        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.cursor(), Some(1));
        assert!(session.is_complete());
    }

    #[test]
    fn rate_after_completion_is_rejected() {
        let mut session = started(1);
        session.skip().unwrap();
        let before = session.clone();
        assert_eq!(session.rate(Rating::Match), Err(SessionError::AlreadyComplete));
        assert_eq!(session.skip(), Err(SessionError::AlreadyComplete));
        assert_eq!(session, before);
    }

    #[test]
    fn transitions_rejected_before_start() {
        let mut session = RatingSession::new();
        assert!(matches!(
            session.rate(Rating::Match),
            Err(SessionError::InvalidPhase { .. })
        ));
        assert!(matches!(
            session.next(),
            Err(SessionError::InvalidPhase { .. })
        ));
        assert!(!session.can_next());
        assert!(!session.can_previous());
        assert_eq!(session.current_position(), None);
    }

    #[test]
    fn navigation_stops_at_boundaries() {
        let mut session = started(2);
        assert!(!session.can_previous());
        assert_eq!(session.previous(), Ok(Navigation::AtBoundary));
        assert_eq!(session.next(), Ok(Navigation::Moved { cursor: 1 }));
        assert!(!session.can_next());
        assert_eq!(session.next(), Ok(Navigation::AtBoundary));
        assert_eq!(session.cursor(), Some(1));
    }

    #[test]
    fn navigation_rejected_when_completed() {
        let mut session = started(1);
        session.rate(Rating::Match).unwrap();
        assert_eq!(
            session.previous(),
            Err(SessionError::InvalidPhase {
                operation: "move to the previous item",
                phase: Phase::Completed
            })
        );
    }

    #[test]
    fn reset_returns_to_awaiting_range() {
        let mut session = started(3);
        session.rate(Rating::Match).unwrap();
        session.reset();
        assert_eq!(session.phase(), Phase::AwaitingRange);
        assert!(session.is_empty());
        assert_eq!(session.ratings(), None);
        assert!(session.start(vec![4], IdRange::new(1, 1)).is_ok());
    }

    #[test]
    fn progress_counts_labels() {
        let mut session = started(4);
        session.rate(Rating::Match).unwrap();
        session.rate(Rating::NoMatch).unwrap();
        session.skip().unwrap();
        let progress = session.progress();
        assert_eq!(progress.total, 4);
        assert_eq!(progress.rated, 2);
        assert_eq!(progress.matches, 1);
        assert_eq!(progress.no_matches, 1);
        assert_eq!(progress.unrated(), 2);
        assert_eq!(progress.cursor, 3);
    }

    #[test]
    fn rating_last_item_completes_with_gaps() {
        let mut session = started(2);
        session.next().unwrap();
        session.rate(Rating::Match).unwrap();
        assert!(session.is_complete());
        assert_eq!(session.rating_at(0), None);
    }

    #[test]
    fn restore_clamps_cursor_and_drops_foreign_ratings() {
        let parts = RestoredParts {
            range: IdRange::new(1, 3),
            filtered: vec![0, 1, 2],
            ratings: BTreeMap::from([(1, Rating::Match), (9, Rating::NoMatch)]),
            cursor: 7,
        };
        let (session, report) = RatingSession::restore(parts).unwrap();
        assert_eq!(session.cursor(), Some(2));
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(
            report.cursor,
            Some(CursorAdjustment {
                requested: 7,
                clamped: 2
            })
        );
        assert_eq!(report.dropped_ratings, vec![9]);
        assert_eq!(session.ratings().map(BTreeMap::len), Some(1));
    }

    #[test]
    fn restore_negative_cursor_clamps_to_zero() {
        let parts = RestoredParts {
            range: IdRange::new(1, 2),
            filtered: vec![0, 1],
            ratings: BTreeMap::new(),
            cursor: -3,
        };
        let (session, report) = RatingSession::restore(parts).unwrap();
        assert_eq!(session.cursor(), Some(0));
        assert!(!report.is_clean());
    }

    #[test]
    fn restore_derives_completion_from_ratings() {
        let parts = RestoredParts {
            range: IdRange::new(1, 2),
            filtered: vec![0, 1],
            ratings: BTreeMap::from([(0, Rating::Match), (1, Rating::NoMatch)]),
            cursor: 0,
        };
        let (session, report) = RatingSession::restore(parts).unwrap();
        assert_eq!(session.phase(), Phase::Completed);
        assert!(report.is_clean());
    }
}
