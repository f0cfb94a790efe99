//! Dirty state tracking for auto-save.

use std::time::Instant;

use super::AutoSaveConfig;

/// Tracks session changes not yet written to the progress file.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    /// Actions since the last successful save.
    pending: u32,

    /// When the first unsaved action was made.
    /// Reset when saved.
    first_unsaved_change: Option<Instant>,

    /// Whether a save is currently in progress.
    saving: bool,
}

impl DirtyTracker {
    /// Create a new tracker with no unsaved changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are unsaved changes.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.pending > 0
    }

    /// Check if a save is in progress.
    #[inline]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Number of actions since the last successful save.
    #[inline]
    pub fn pending_actions(&self) -> u32 {
        self.pending
    }

    /// Record one state-changing action.
    pub fn mark_dirty(&mut self) {
        self.pending = self.pending.saturating_add(1);
        if self.first_unsaved_change.is_none() {
            self.first_unsaved_change = Some(Instant::now());
        }
    }

    /// Mark that a save has started.
    pub fn start_save(&mut self) {
        self.saving = true;
    }

    /// Mark that a save has completed successfully.
    pub fn save_complete(&mut self) {
        self.pending = 0;
        self.saving = false;
        self.first_unsaved_change = None;
    }

    /// Mark that a save has failed.
    pub fn save_failed(&mut self) {
        self.saving = false;
        // pending is kept so the next check retries
    }

    /// Get milliseconds since the first unsaved change.
    pub fn ms_since_first_unsaved(&self) -> Option<u64> {
        self.first_unsaved_change
            .map(|t| u64::try_from(t.elapsed().as_millis()).unwrap_or(u64::MAX))
    }

    /// Check if auto-save should trigger based on the config.
    pub fn should_auto_save(&self, config: &AutoSaveConfig) -> bool {
        if self.saving {
            return false;
        }
        match self.ms_since_first_unsaved() {
            Some(since_first) => config.should_save(self.pending, since_first),
            None => false,
        }
    }
}
