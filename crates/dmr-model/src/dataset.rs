//! Candidate match dataset.
//!
//! A dataset is loaded once and never mutated. Sessions refer to rows by
//! their [`Position`] in source order, not by `id`.

use serde::{Deserialize, Serialize};

use crate::rating::Rating;

/// Zero-based index of a row within the dataset's source order.
pub type Position = usize;

pub const COL_ID: &str = "id";
pub const COL_OPD_DEVICE: &str = "opd_device";
pub const COL_OPD_COMPANY: &str = "opd_company";
pub const COL_FDA_DEVICE: &str = "fda_device";
pub const COL_FDA_COMPANY: &str = "fda_company";
pub const COL_HUMAN: &str = "human";

/// Columns every dataset file must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_ID,
    COL_OPD_DEVICE,
    COL_OPD_COMPANY,
    COL_FDA_DEVICE,
    COL_FDA_COMPANY,
];

/// Identifies which dataset a progress document was recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetIdentity {
    /// File name of the dataset (no directory component).
    pub file_name: String,
    /// Hex-encoded SHA-256 of the file contents, when known.
    pub sha256: Option<String>,
}

impl DatasetIdentity {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            sha256: None,
        }
    }

    #[must_use]
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }
}

/// One candidate pair: an OPD device and the FDA device it may match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub id: i64,
    pub opd_device: String,
    pub opd_company: String,
    pub fda_device: String,
    pub fda_company: String,
    /// Rating already present in the dataset file, if any.
    pub human: Option<Rating>,
    /// Raw cell values aligned with [`Dataset::columns`].
    pub values: Vec<String>,
}

impl MatchRecord {
    /// Build a record whose raw values follow [`REQUIRED_COLUMNS`].
    pub fn new(
        id: i64,
        opd_device: impl Into<String>,
        opd_company: impl Into<String>,
        fda_device: impl Into<String>,
        fda_company: impl Into<String>,
    ) -> Self {
        let opd_device = opd_device.into();
        let opd_company = opd_company.into();
        let fda_device = fda_device.into();
        let fda_company = fda_company.into();
        let values = vec![
            id.to_string(),
            opd_device.clone(),
            opd_company.clone(),
            fda_device.clone(),
            fda_company.clone(),
        ];
        Self {
            id,
            opd_device,
            opd_company,
            fda_device,
            fda_company,
            human: None,
            values,
        }
    }
}

/// Immutable, ordered collection of candidate pairs.
#[derive(Debug, Clone)]
pub struct Dataset {
    identity: DatasetIdentity,
    columns: Vec<String>,
    records: Vec<MatchRecord>,
}

impl Dataset {
    /// Create a dataset from already-validated parts.
    ///
    /// Each record's `values` must be aligned with `columns`.
    pub fn new(identity: DatasetIdentity, columns: Vec<String>, records: Vec<MatchRecord>) -> Self {
        Self {
            identity,
            columns,
            records,
        }
    }

    /// Create a dataset with exactly the required columns, in order.
    pub fn from_records(identity: DatasetIdentity, records: Vec<MatchRecord>) -> Self {
        let columns = REQUIRED_COLUMNS.iter().map(ToString::to_string).collect();
        Self::new(identity, columns, records)
    }

    pub fn identity(&self) -> &DatasetIdentity {
        &self.identity
    }

    /// Column names in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: Position) -> Option<&MatchRecord> {
        self.records.get(position)
    }

    /// Index of the `human` column, if the source file has one.
    pub fn human_column(&self) -> Option<usize> {
        self.columns.iter().position(|c| c == COL_HUMAN)
    }

    /// Smallest and largest row id, or `None` for an empty dataset.
    pub fn id_bounds(&self) -> Option<(i64, i64)> {
        let min = self.records.iter().map(|r| r.id).min()?;
        let max = self.records.iter().map(|r| r.id).max()?;
        Some((min, max))
    }
}
