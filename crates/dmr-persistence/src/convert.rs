//! Conversion between live sessions and progress documents.
//!
//! Completion is never stored. A restored session is completed exactly
//! when every selected position has a rating, so the flag cannot drift
//! from the ratings it summarizes.

use std::collections::BTreeMap;
use std::fmt;

use dmr_model::{Dataset, DatasetIdentity, Position, Rating};
use dmr_session::{RatingSession, RestoredParts};

use crate::error::{PersistenceError, Result};
use crate::types::{CURRENT_SCHEMA_VERSION, ProgressFile};

/// Non-fatal problem found while restoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreWarning {
    /// The document names a different dataset file.
    DatasetMismatch { recorded: String, loaded: String },
    /// Same file name, different contents.
    DatasetChanged { file_name: String },
    /// The stored cursor was outside the selection.
    CursorClamped { requested: i64, clamped: usize },
    /// Ratings for positions that are not part of the selection.
    DroppedRatings { positions: Vec<Position> },
    /// Selected rows whose id no longer falls in the recorded range.
    PositionsOutsideRange { count: usize },
}

impl fmt::Display for RestoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatasetMismatch { recorded, loaded } => write!(
                f,
                "This progress file was created for a different data file ({recorded}, loaded {loaded}). Some IDs may not match."
            ),
            Self::DatasetChanged { file_name } => write!(
                f,
                "{file_name} has changed since this progress file was saved. Some IDs may not match."
            ),
            Self::CursorClamped { requested, clamped } => write!(
                f,
                "Saved position {requested} was out of range; resuming at item {}.",
                clamped + 1
            ),
            Self::DroppedRatings { positions } => write!(
                f,
                "Ignored {} rating(s) for rows outside the selected range.",
                positions.len()
            ),
            Self::PositionsOutsideRange { count } => write!(
                f,
                "{count} selected row(s) have ids outside the recorded range."
            ),
        }
    }
}

/// A session rebuilt from a progress document.
#[derive(Debug, Clone)]
pub struct Restored {
    pub session: RatingSession,
    pub warnings: Vec<RestoreWarning>,
}

/// Capture `session` as a progress document for `dataset`.
///
/// Every selected position is written, with `null` for unrated ones.
pub fn snapshot(session: &RatingSession, dataset: &DatasetIdentity) -> Result<ProgressFile> {
    let (Some(range), Some(cursor)) = (session.range(), session.cursor()) else {
        return Err(PersistenceError::NoActiveSession);
    };

    let ratings: BTreeMap<String, Option<Rating>> = session
        .filtered_indices()
        .iter()
        .map(|&position| (position.to_string(), session.rating_at(position)))
        .collect();

    let mut progress = ProgressFile {
        id_start: range.start,
        id_end: range.end,
        data_file_name: Some(dataset.file_name.clone()),
        data_file_sha256: dataset.sha256.clone(),
        filtered_indices: session.filtered_indices().to_vec(),
        current_index_in_filtered: i64::try_from(cursor).unwrap_or(i64::MAX),
        ratings,
        timestamp: None,
        schema_version: CURRENT_SCHEMA_VERSION,
    };
    progress.touch();
    Ok(progress)
}

/// Rebuild a session from `progress`, checked against the loaded `dataset`.
///
/// Rejects documents whose positions do not exist in the dataset or are not
/// in strictly increasing order. Dataset
/// mismatches, an out-of-range cursor and stray ratings are repaired or
/// tolerated and returned as warnings.
pub fn restore(progress: ProgressFile, dataset: &Dataset) -> Result<Restored> {
    if progress.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: progress.schema_version,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    let mut warnings = Vec::new();
    check_dataset(&progress, dataset.identity(), &mut warnings);

    let rows = dataset.len();
    if let Some(&position) = progress.filtered_indices.iter().find(|&&p| p >= rows) {
        return Err(PersistenceError::PositionOutOfBounds { position, rows });
    }
    if let Some(pair) = progress
        .filtered_indices
        .windows(2)
        .find(|pair| pair[0] >= pair[1])
    {
        return Err(PersistenceError::MalformedProgress {
            reason: format!(
                "filtered_indices must be strictly increasing, found {} before {}",
                pair[0], pair[1]
            ),
        });
    }

    let range = progress.range();
    let outside = progress
        .filtered_indices
        .iter()
        .filter_map(|&p| dataset.get(p))
        .filter(|record| !range.contains(record.id))
        .count();
    if outside > 0 {
        warnings.push(RestoreWarning::PositionsOutsideRange { count: outside });
    }

    let ratings = decode_ratings(progress.ratings)?;
    let (session, report) = RatingSession::restore(RestoredParts {
        range,
        filtered: progress.filtered_indices,
        ratings,
        cursor: progress.current_index_in_filtered,
    })?;

    if let Some(adjustment) = report.cursor {
        warnings.push(RestoreWarning::CursorClamped {
            requested: adjustment.requested,
            clamped: adjustment.clamped,
        });
    }
    if !report.dropped_ratings.is_empty() {
        warnings.push(RestoreWarning::DroppedRatings {
            positions: report.dropped_ratings,
        });
    }

    for warning in &warnings {
        tracing::warn!("{warning}");
    }
    tracing::info!(
        range = %range,
        items = session.len(),
        rated = session.progress().rated,
        phase = %session.phase(),
        "Restored rating session"
    );

    Ok(Restored { session, warnings })
}

fn check_dataset(
    progress: &ProgressFile,
    loaded: &DatasetIdentity,
    warnings: &mut Vec<RestoreWarning>,
) {
    let Some(recorded) = progress.data_file_name.as_deref() else {
        return;
    };
    if recorded != loaded.file_name {
        warnings.push(RestoreWarning::DatasetMismatch {
            recorded: recorded.to_string(),
            loaded: loaded.file_name.clone(),
        });
        return;
    }
    if let (Some(recorded_hash), Some(loaded_hash)) =
        (progress.data_file_sha256.as_deref(), loaded.sha256.as_deref())
        && !recorded_hash.eq_ignore_ascii_case(loaded_hash)
    {
        warnings.push(RestoreWarning::DatasetChanged {
            file_name: loaded.file_name.clone(),
        });
    }
}

/// Turn text keys back into positions, dropping unset entries.
fn decode_ratings(
    ratings: BTreeMap<String, Option<Rating>>,
) -> Result<BTreeMap<Position, Rating>> {
    let mut decoded = BTreeMap::new();
    for (key, rating) in ratings {
        let position: Position = key.trim().parse().map_err(|_| {
            PersistenceError::MalformedProgress {
                reason: format!("rating key '{key}' is not a row position"),
            }
        })?;
        if let Some(rating) = rating {
            decoded.insert(position, rating);
        }
    }
    Ok(decoded)
}
