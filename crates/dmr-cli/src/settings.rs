//! User settings, loaded from TOML.
//!
//! Settings are stored in the platform-specific config folder:
//! - macOS: ~/Library/Application Support/com.device-match-rater.Match-Rater/
//! - Windows: %APPDATA%/device-match-rater/Match Rater/config/
//! - Linux: ~/.config/matchrater/
//!
//! Every section is optional; missing keys take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use dmr_ingest::DEFAULT_DATASET_FILE;
use dmr_persistence::AutoSaveConfig;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "device-match-rater";
const APP_NAME: &str = "Match Rater";
const CONFIG_FILENAME: &str = "settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dataset: DatasetSettings,
    pub progress: ProgressSettings,
    pub autosave: AutoSaveConfig,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    /// Dataset CSV used when `--data` is not given.
    pub path: PathBuf,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATASET_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    /// Where progress documents and exports are written.
    pub directory: PathBuf,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Show the row id next to the OPD device.
    pub show_ids: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { show_ids: true }
    }
}

/// Get the path to the settings file.
///
/// Returns `None` if the platform-specific directory cannot be determined.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Load settings from `explicit`, or from the platform config folder.
///
/// Falls back to defaults if the file is missing or cannot be parsed. An
/// explicitly requested file that is missing is worth a warning; the
/// default one is not.
pub fn load_settings(explicit: Option<&Path>) -> Settings {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match settings_path() {
            Some(path) => path,
            None => {
                tracing::warn!("Could not determine settings path, using defaults");
                return Settings::default();
            }
        },
    };

    match fs::read_to_string(&path) {
        Ok(content) => parse_settings(&content, &path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            tracing::debug!("No settings file found at {:?}, using defaults", path);
            Settings::default()
        }
        Err(e) => {
            tracing::warn!("Failed to read settings file {:?}: {}, using defaults", path, e);
            Settings::default()
        }
    }
}

fn parse_settings(content: &str, path: &Path) -> Settings {
    match toml::from_str(content) {
        Ok(settings) => {
            tracing::info!("Loaded settings from {:?}", path);
            settings
        }
        Err(e) => {
            tracing::warn!("Failed to parse settings file {:?}: {}, using defaults", path, e);
            Settings::default()
        }
    }
}
