//! CSV reading and atomic CSV writes.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Reads a CSV file with a single header row.
///
/// The whole file is scanned for schema inference: survey columns often hold
/// only integers for thousands of rows before the first fractional weight.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read CSV table"
    );
    Ok(df)
}

/// Writes `df` to `path` through a sibling temp file and a rename.
///
/// Readers see either the previous file or the complete new one.
pub fn write_csv_atomic(path: &Path, df: &DataFrame) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| IngestError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("csv.tmp");
    let file = File::create(&temp_path).map_err(|e| IngestError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    let mut writer = BufWriter::new(file);
    let mut out = df.clone();
    CsvWriter::new(&mut writer)
        .include_header(true)
        .finish(&mut out)
        .map_err(|e| IngestError::CsvWrite {
            path: temp_path.clone(),
            message: e.to_string(),
        })?;

    let file = writer.into_inner().map_err(|e| IngestError::Io {
        operation: "flush",
        path: temp_path.clone(),
        source: e.into_error(),
    })?;
    file.sync_all().map_err(|e| IngestError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| IngestError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), rows = df.height(), "wrote CSV table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_table() {
        let file = create_temp_csv("SCRAM,WEEK,PWEIGHT\nA,41,1.5\nB,41,2\n");
        let df = read_csv_table(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("PWEIGHT").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let result = read_csv_table(&dir.path().join("pulse-01.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_atomic_write_replaces_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("pulse-41.csv");

        let first = df!("q_var" => ["ANXIOUS"], "q_val" => [1i64]).unwrap();
        write_csv_atomic(&path, &first).unwrap();
        let second = df!("q_var" => ["ANXIOUS", "WORRY"], "q_val" => [1i64, 2]).unwrap();
        write_csv_atomic(&path, &second).unwrap();

        let read = read_csv_table(&path).unwrap();
        assert_eq!(read.height(), 2);
        assert!(!path.with_extension("csv.tmp").exists());
    }
}
