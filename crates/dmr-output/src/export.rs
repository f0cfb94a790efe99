//! Labeled CSV export.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use dmr_model::{COL_HUMAN, Dataset, IdRange, Position, Rating};

use crate::error::{OutputError, Result};

/// One exported dataset row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub id: i64,
    /// Cell values aligned with [`ExportTable::columns`].
    pub values: Vec<String>,
    /// Label in the `human` column, if any.
    pub label: Option<Rating>,
}

/// Rows of one id range, ready to be written as CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub range: IdRange,
    pub columns: Vec<String>,
    pub rows: Vec<ExportRow>,
}

impl ExportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the export for `range` from the dataset and the session's ratings.
///
/// Rows keep source order and every source column. A rating from the
/// session wins over the dataset's own `human` value; rows without one keep
/// whatever the dataset had.
pub fn export_ratings(
    dataset: &Dataset,
    ratings: &BTreeMap<Position, Rating>,
    range: IdRange,
) -> ExportTable {
    let mut columns = dataset.columns().to_vec();
    let human = match dataset.human_column() {
        Some(index) => index,
        None => {
            columns.push(COL_HUMAN.to_string());
            columns.len() - 1
        }
    };

    let rows = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| range.contains(record.id))
        .map(|(position, record)| {
            let mut values = record.values.clone();
            values.resize(columns.len(), String::new());
            let label = match ratings.get(&position) {
                Some(&rating) => {
                    values[human] = rating.code().to_string();
                    Some(rating)
                }
                None => record.human,
            };
            ExportRow {
                id: record.id,
                values,
                label,
            }
        })
        .collect();

    ExportTable {
        range,
        columns,
        rows,
    }
}

/// Write the table as CSV with a header row.
pub fn write_csv<W: Write>(table: &ExportTable, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&table.columns)?;
    for row in &table.rows {
        csv.write_record(&row.values)?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn to_csv_string(table: &ExportTable) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write the table to `path`, creating the parent directory if needed.
pub fn export_to_file(table: &ExportTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| OutputError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let file = File::create(path).map_err(|e| OutputError::Io {
        operation: "create",
        path: path.to_path_buf(),
        source: e,
    })?;
    write_csv(table, file)?;

    tracing::info!(
        path = %path.display(),
        range = %table.range,
        rows = table.len(),
        "Exported ratings"
    );
    Ok(())
}

/// File name offered for an export of `range`.
pub fn default_export_file_name(range: IdRange) -> String {
    format!("device_match_ratings_IDs_{}-{}.csv", range.start, range.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmr_model::{DatasetIdentity, MatchRecord};

    fn record(id: i64, human: &str) -> MatchRecord {
        let mut record = MatchRecord::new(id, "opd", "opd co", "fda", "fda co");
        record.values.insert(1, human.to_string());
        record.human = Rating::from_cell(human).unwrap();
        record
    }

    #[test]
    fn existing_human_column_stays_in_place() {
        let columns = ["id", "human", "opd_device", "opd_company", "fda_device", "fda_company"]
            .map(String::from)
            .to_vec();
        let dataset = Dataset::new(
            DatasetIdentity::new("pairs.csv"),
            columns,
            vec![record(1, "1.0"), record(2, ""), record(3, "0")],
        );
        let ratings = BTreeMap::from([(1, Rating::NoMatch)]);

        let table = export_ratings(&dataset, &ratings, IdRange::new(1, 3));

        assert_eq!(table.columns[1], "human");
        assert_eq!(table.columns.len(), 6);
        assert_eq!(table.rows[0].values[1], "1.0");
        assert_eq!(table.rows[0].label, Some(Rating::Match));
        assert_eq!(table.rows[1].values[1], "0");
        assert_eq!(table.rows[2].label, Some(Rating::NoMatch));
    }

    #[test]
    fn missing_human_column_is_appended() {
        let dataset = Dataset::from_records(
            DatasetIdentity::new("pairs.csv"),
            vec![MatchRecord::new(5, "a", "b", "c", "d")],
        );
        let table = export_ratings(&dataset, &BTreeMap::new(), IdRange::new(0, 10));
        assert_eq!(table.columns.last().map(String::as_str), Some("human"));
        assert_eq!(table.rows[0].values.last().map(String::as_str), Some(""));
        assert_eq!(table.rows[0].label, None);
    }

    #[test]
    fn default_name_includes_range() {
        assert_eq!(
            default_export_file_name(IdRange::new(100, 250)),
            "device_match_ratings_IDs_100-250.csv"
        );
    }
}
