//! Where the dataset and progress files live.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use dmr_ingest::load_dataset;
use dmr_model::{Dataset, IdRange};
use dmr_output::default_export_file_name;
use dmr_persistence::{
    Restored, default_progress_file_name, is_progress_file_name, load_progress, restore,
    save_progress, snapshot,
};
use dmr_session::RatingSession;

use crate::settings::Settings;

/// Dataset path and progress directory for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    data_path: PathBuf,
    progress_dir: PathBuf,
}

impl Workspace {
    pub fn new(data_path: impl Into<PathBuf>, progress_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            progress_dir: progress_dir.into(),
        }
    }

    /// `--data` wins over the configured dataset path.
    pub fn from_settings(settings: &Settings, data: Option<PathBuf>) -> Self {
        Self::new(
            data.unwrap_or_else(|| settings.dataset.path.clone()),
            settings.progress.directory.clone(),
        )
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn progress_dir(&self) -> &Path {
        &self.progress_dir
    }

    pub fn load_dataset(&self) -> Result<Dataset> {
        load_dataset(&self.data_path)
            .with_context(|| format!("load dataset {}", self.data_path.display()))
    }

    pub fn progress_path(&self, range: IdRange) -> PathBuf {
        self.progress_dir.join(default_progress_file_name(range))
    }

    pub fn export_path(&self, range: IdRange) -> PathBuf {
        self.progress_dir.join(default_export_file_name(range))
    }

    /// Pick the progress file a command should use.
    ///
    /// An explicit path is taken as is. Otherwise the progress directory is
    /// searched; a single progress file is used, several are ambiguous.
    pub fn find_progress(&self, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            return Ok(Some(path.to_path_buf()));
        }

        let entries = match fs::read_dir(&self.progress_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("list progress directory {}", self.progress_dir.display())
                });
            }
        };

        let mut found: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(is_progress_file_name)
            })
            .collect();
        found.sort();

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => {
                let names: Vec<String> = found
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect();
                bail!(
                    "several progress files found, choose one with --progress:\n  {}",
                    names.join("\n  ")
                )
            }
        }
    }

    /// Like [`Workspace::find_progress`], but a progress file must exist.
    pub fn require_progress(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        match self.find_progress(explicit)? {
            Some(path) => Ok(path),
            None => bail!(
                "no progress file in {}; run `match-rater start` first",
                self.progress_dir.display()
            ),
        }
    }

    /// Load a progress file and rebuild its session against `dataset`.
    pub fn open_session(&self, path: &Path, dataset: &Dataset) -> Result<Restored> {
        let progress = load_progress(path)?;
        let restored = restore(progress, dataset)
            .with_context(|| format!("restore session from {}", path.display()))?;
        Ok(restored)
    }

    /// Snapshot `session` and write it to `path`.
    pub fn save_session(&self, session: &RatingSession, dataset: &Dataset, path: &Path) -> Result<()> {
        let progress = snapshot(session, dataset.identity())?;
        save_progress(&progress, path)?;
        Ok(())
    }
}
