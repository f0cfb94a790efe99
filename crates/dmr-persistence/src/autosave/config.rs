//! Auto-save configuration.

use serde::{Deserialize, Serialize};

/// Configuration for auto-save behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Whether auto-save is enabled.
    pub enabled: bool,

    /// Save once this many actions are unsaved.
    pub every_actions: u32,

    /// Maximum delay before forcing a save.
    ///
    /// Checked after each action: if the oldest unsaved action is older
    /// than this, save even when `every_actions` has not been reached.
    pub max_delay_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            every_actions: 1,
            max_delay_ms: 30_000, // 30 seconds max
        }
    }
}

impl AutoSaveConfig {
    /// Create a disabled auto-save config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Check if auto-save should trigger given the number of unsaved
    /// actions and the time since the first of them.
    pub fn should_save(&self, pending_actions: u32, since_first_unsaved_ms: u64) -> bool {
        if !self.enabled || pending_actions == 0 {
            return false;
        }

        if pending_actions >= self.every_actions.max(1) {
            return true;
        }

        since_first_unsaved_ms >= self.max_delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AutoSaveConfig::default();
        assert!(config.enabled);
        assert_eq!(config.every_actions, 1);
    }

    #[test]
    fn test_should_save_disabled() {
        let config = AutoSaveConfig::disabled();
        assert!(!config.should_save(10, 60_000));
    }

    #[test]
    fn test_should_save_action_count() {
        let config = AutoSaveConfig {
            every_actions: 3,
            ..Default::default()
        };

        assert!(!config.should_save(0, 0));
        assert!(!config.should_save(2, 1000));
        assert!(config.should_save(3, 1000));
    }

    #[test]
    fn test_should_save_max_delay() {
        let config = AutoSaveConfig {
            every_actions: 10,
            ..Default::default()
        };

        assert!(!config.should_save(1, 25_000));
        assert!(config.should_save(1, 35_000));
    }

    #[test]
    fn test_zero_every_actions_saves_each_action() {
        let config = AutoSaveConfig {
            every_actions: 0,
            ..Default::default()
        };
        assert!(config.should_save(1, 0));
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config: AutoSaveConfig = serde_json::from_str(r#"{"every_actions": 5}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.every_actions, 5);
        assert_eq!(config.max_delay_ms, 30_000);
    }
}
