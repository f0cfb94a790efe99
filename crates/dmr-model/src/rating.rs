//! Human rating labels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Judgment recorded for one candidate pair.
///
/// Serialized as the integer label used in progress documents and exports:
/// `1` for a match, `0` for no match. An unset rating has no value at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Rating {
    /// The two records describe the same device.
    Match,
    /// The two records describe different devices.
    NoMatch,
}

impl Rating {
    /// Integer label written to progress documents and exports.
    pub const fn code(self) -> u8 {
        match self {
            Self::Match => 1,
            Self::NoMatch => 0,
        }
    }

    /// Human-readable name for prompts and tables.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Match => "Match",
            Self::NoMatch => "No Match",
        }
    }

    /// Parse a `human` cell from a dataset file.
    ///
    /// Blank cells are unset. Float renderings (`1.0`, `0.0`) are accepted
    /// because spreadsheet tools rewrite sparse integer columns that way.
    pub fn from_cell(value: &str) -> Result<Option<Self>> {
        let trimmed = value.trim();
        match trimmed {
            "" | "NaN" | "nan" => Ok(None),
            "1" | "1.0" => Ok(Some(Self::Match)),
            "0" | "0.0" => Ok(Some(Self::NoMatch)),
            _ => Err(ModelError::InvalidRating {
                value: trimmed.to_string(),
            }),
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.code()
    }
}

impl TryFrom<u8> for Rating {
    type Error = ModelError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Self::Match),
            0 => Ok(Self::NoMatch),
            _ => Err(ModelError::InvalidRatingCode { code }),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
