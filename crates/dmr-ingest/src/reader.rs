//! Dataset file reading.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use dmr_model::{Dataset, DatasetIdentity, MatchRecord, Rating};

use crate::error::{IngestError, Result};
use crate::hash::sha256_hex;
use crate::header::{ColumnLayout, normalize_header};

/// Maximum file size for CSV loading (500 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_CSV_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| open_error(path, e))?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Detect encoding and validate it's supported (UTF-8 only).
///
/// Checks for UTF-16 BOM markers which are not supported.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;

    let mut buffer = [0u8; 4];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read >= 2 {
        if buffer[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    // UTF-8 BOM is acceptable (stripped from the first header)
    Ok(())
}

/// Load a dataset file.
///
/// The returned dataset's identity carries the file name and a SHA-256 of
/// the exact bytes read, so progress documents can be checked against it.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    check_file_size(path)?;
    validate_encoding(path)?;

    let bytes = fs::read(path).map_err(|e| open_error(path, e))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let identity = DatasetIdentity::new(file_name).with_sha256(sha256_hex(&bytes));

    let dataset = parse_rows(&bytes, identity, path)?;
    tracing::info!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Parse dataset contents that did not come from a file on disk.
///
/// Errors refer to the data by `identity.file_name`.
pub fn parse_dataset(bytes: &[u8], identity: DatasetIdentity) -> Result<Dataset> {
    let path = PathBuf::from(&identity.file_name);
    parse_rows(bytes, identity, &path)
}

fn parse_rows(bytes: &[u8], identity: DatasetIdentity, path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, &e))?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    let layout = ColumnLayout::resolve(headers, path)?;

    let mut records = Vec::new();
    let mut seen: HashMap<i64, usize> = HashMap::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| csv_error(path, &e))?;
        let cell = |index: usize| record.get(index).unwrap_or_default();

        let raw_id = cell(layout.id).trim();
        let id: i64 = raw_id.parse().map_err(|_| IngestError::InvalidId {
            value: raw_id.to_string(),
            row,
            path: path.to_path_buf(),
        })?;
        if let Some(&first_row) = seen.get(&id) {
            return Err(IngestError::DuplicateId {
                id,
                first_row,
                row,
                path: path.to_path_buf(),
            });
        }
        seen.insert(id, row);

        let human = match layout.human {
            Some(index) => {
                Rating::from_cell(cell(index)).map_err(|_| IngestError::InvalidRating {
                    value: cell(index).to_string(),
                    row,
                    path: path.to_path_buf(),
                })?
            }
            None => None,
        };

        records.push(MatchRecord {
            id,
            opd_device: cell(layout.opd_device).to_string(),
            opd_company: cell(layout.opd_company).to_string(),
            fda_device: cell(layout.fda_device).to_string(),
            fda_company: cell(layout.fda_company).to_string(),
            human,
            values: record.iter().map(str::to_string).collect(),
        });
    }

    if records.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    Ok(Dataset::new(identity, layout.columns, records))
}

fn open_error(path: &Path, e: std::io::Error) -> IngestError {
    if e.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

fn csv_error(path: &Path, e: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "id,opd_device,opd_company,fda_device,fda_company";

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_dataset_preserves_source_order() {
        let file = create_temp_csv(&format!(
            "{HEADER}\n5,Pump,Acme,Infusion Pump,ACME\n2,Stent,Beta,Coronary Stent,Beta Corp\n"
        ));
        let dataset = load_dataset(file.path()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].id, 5);
        assert_eq!(dataset.records()[1].opd_device, "Stent");
        assert!(dataset.identity().sha256.is_some());
    }

    #[test]
    fn test_load_dataset_reads_existing_human_column() {
        let file = create_temp_csv(&format!(
            "{HEADER},human\n1,a,b,c,d,1.0\n2,a,b,c,d,\n3,a,b,c,d,0\n"
        ));
        let dataset = load_dataset(file.path()).unwrap();

        assert_eq!(dataset.human_column(), Some(5));
        let labels: Vec<_> = dataset.records().iter().map(|r| r.human).collect();
        assert_eq!(labels, vec![Some(Rating::Match), None, Some(Rating::NoMatch)]);
    }

    #[test]
    fn test_load_dataset_with_bom() {
        let file = create_temp_csv(&format!("\u{feff}{HEADER}\n1,a,b,c,d\n"));
        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.columns()[0], "id");
    }

    #[test]
    fn test_load_dataset_quoted_fields() {
        let file = create_temp_csv(&format!("{HEADER}\n1,\"Pump, Model A\",Acme,x,y\n"));
        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.records()[0].opd_device, "Pump, Model A");
    }

    #[test]
    fn test_load_dataset_header_only() {
        let file = create_temp_csv(&format!("{HEADER}\n"));
        assert!(matches!(
            load_dataset(file.path()),
            Err(IngestError::EmptyCsv { .. })
        ));
    }

    #[test]
    fn test_load_dataset_invalid_id() {
        let file = create_temp_csv(&format!("{HEADER}\n1,a,b,c,d\nabc,a,b,c,d\n"));
        match load_dataset(file.path()) {
            Err(IngestError::InvalidId { value, row, .. }) => {
                assert_eq!(value, "abc");
                assert_eq!(row, 1);
            }
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }

    #[test]
    fn test_load_dataset_duplicate_id() {
        let file = create_temp_csv(&format!("{HEADER}\n1,a,b,c,d\n1,e,f,g,h\n"));
        assert!(matches!(
            load_dataset(file.path()),
            Err(IngestError::DuplicateId { id: 1, first_row: 0, row: 1, .. })
        ));
    }

    #[test]
    fn test_load_dataset_invalid_human() {
        let file = create_temp_csv(&format!("{HEADER},human\n1,a,b,c,d,maybe\n"));
        assert!(matches!(
            load_dataset(file.path()),
            Err(IngestError::InvalidRating { .. })
        ));
    }

    #[test]
    fn test_load_dataset_ragged_row() {
        let file = create_temp_csv(&format!("{HEADER}\n1,a,b,c\n"));
        assert!(matches!(
            load_dataset(file.path()),
            Err(IngestError::CsvParse { .. })
        ));
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let result = load_dataset(Path::new("/nonexistent/pairs.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_validate_encoding_rejects_utf16() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xFE, b'i', 0]).unwrap();
        assert!(matches!(
            validate_encoding(file.path()),
            Err(IngestError::UnsupportedEncoding {
                encoding: "UTF-16 LE",
                ..
            })
        ));
    }

    #[test]
    fn test_check_file_size_with_limit() {
        let file = create_temp_csv(&format!("{HEADER}\n1,a,b,c,d\n"));
        assert!(check_file_size_with_limit(file.path(), 1024).is_ok());
        assert!(matches!(
            check_file_size_with_limit(file.path(), 4),
            Err(IngestError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_parse_dataset_uses_identity_name() {
        let result = parse_dataset(b"id,opd_device\n1,a\n", DatasetIdentity::new("upload.csv"));
        match result {
            Err(IngestError::MissingColumn { path, .. }) => {
                assert_eq!(path, PathBuf::from("upload.csv"));
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }
}
