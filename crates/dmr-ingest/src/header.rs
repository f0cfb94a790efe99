//! Header parsing and column lookup.

use std::path::Path;

use dmr_model::{
    COL_FDA_COMPANY, COL_FDA_DEVICE, COL_HUMAN, COL_ID, COL_OPD_COMPANY, COL_OPD_DEVICE,
    REQUIRED_COLUMNS,
};

use crate::error::{IngestError, Result};

/// Where each known column sits in a parsed header.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    /// Normalized column names in source order.
    pub columns: Vec<String>,
    pub id: usize,
    pub opd_device: usize,
    pub opd_company: usize,
    pub fda_device: usize,
    pub fda_company: usize,
    /// Present only when the file already carries ratings.
    pub human: Option<usize>,
}

impl ColumnLayout {
    /// Resolve required columns, failing on the first one that is missing.
    pub fn resolve(columns: Vec<String>, path: &Path) -> Result<Self> {
        for required in REQUIRED_COLUMNS {
            if !columns.iter().any(|c| c == required) {
                return Err(IngestError::MissingColumn {
                    column: required.to_string(),
                    path: path.to_path_buf(),
                });
            }
        }
        let index = |name: &str| columns.iter().position(|c| c == name).unwrap_or_default();
        Ok(Self {
            id: index(COL_ID),
            opd_device: index(COL_OPD_DEVICE),
            opd_company: index(COL_OPD_COMPANY),
            fda_device: index(COL_FDA_DEVICE),
            fda_company: index(COL_FDA_COMPANY),
            human: columns.iter().position(|c| c == COL_HUMAN),
            columns,
        })
    }
}

/// Normalizes a header value by trimming whitespace and a leading BOM.
pub fn normalize_header(value: &str) -> String {
    value.trim_start_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  id  "), "id");
        assert_eq!(normalize_header("\u{feff}id"), "id");
    }

    #[test]
    fn test_resolve_any_column_order() {
        let layout = ColumnLayout::resolve(
            names(&[
                "fda_company",
                "id",
                "score",
                "opd_device",
                "opd_company",
                "fda_device",
                "human",
            ]),
            Path::new("pairs.csv"),
        )
        .unwrap();
        assert_eq!(layout.id, 1);
        assert_eq!(layout.fda_company, 0);
        assert_eq!(layout.fda_device, 5);
        assert_eq!(layout.human, Some(6));
        assert_eq!(layout.columns.len(), 7);
    }

    #[test]
    fn test_resolve_missing_column() {
        let result = ColumnLayout::resolve(
            names(&["id", "opd_device", "opd_company", "fda_device"]),
            Path::new("pairs.csv"),
        );
        match result {
            Err(IngestError::MissingColumn { column, .. }) => assert_eq!(column, "fda_company"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }
}
