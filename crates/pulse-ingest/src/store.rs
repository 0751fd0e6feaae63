//! Directory-backed wave source and aggregate store.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use pulse_core::{AggregateStore, BoxError, WaveSource};
use pulse_model::constants::{CBSA_TITLE, Q_VAL, Q_VAR, WEEK, XTAB_VAL, XTAB_VAR};
use tracing::info;

use crate::csv::{read_csv_table, write_csv_atomic};
use crate::discovery::{SMOOTHED_FILE_NAME, list_wave_files, wave_file_name};
use crate::error::{IngestError, Result};

/// Raw waves stored as `pulse-WW.csv` files in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl WaveSource for DirectorySource {
    fn available_weeks(&self) -> std::result::Result<Vec<u32>, BoxError> {
        Ok(list_wave_files(&self.dir)?
            .into_iter()
            .map(|(week, _)| week)
            .collect())
    }

    fn load_wave(&self, week: u32) -> std::result::Result<DataFrame, BoxError> {
        let path = self.dir.join(wave_file_name(week));
        let df = read_csv_table(&path)?;
        info!(week, rows = df.height(), columns = df.width(), "loaded wave file");
        Ok(df)
    }
}

/// Processed waves and the smoothed table, one CSV per week.
///
/// Every write goes through a temp file and a rename, so a failed wave leaves
/// the previously stored file for that week untouched.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    /// Opens (creating if needed) a store directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| IngestError::Io {
            operation: "create directory",
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn smoothed_path(&self) -> PathBuf {
        self.dir.join(SMOOTHED_FILE_NAME)
    }
}

/// Casts a stored cell table back to its canonical column types.
///
/// CSV round trips lose dtypes: an all-null `cbsa_title` reads back as a
/// string column of nulls, whole-valued estimates as integers. Key columns
/// become Int64 or String and every other column Float64.
pub fn cast_cell_columns(df: DataFrame) -> Result<DataFrame> {
    let exprs: Vec<Expr> = df
        .get_column_names()
        .iter()
        .map(|name| {
            let name = name.as_str();
            let dtype = match name {
                WEEK | XTAB_VAL | Q_VAL => DataType::Int64,
                XTAB_VAR | Q_VAR | CBSA_TITLE => DataType::String,
                _ => DataType::Float64,
            };
            col(name).cast(dtype)
        })
        .collect();
    Ok(df.lazy().select(exprs).collect()?)
}

impl AggregateStore for DirectoryStore {
    fn replace_wave(&self, week: u32, cells: &DataFrame) -> std::result::Result<(), BoxError> {
        let path = self.dir.join(wave_file_name(week));
        write_csv_atomic(&path, cells)?;
        info!(week, rows = cells.height(), path = %path.display(), "stored wave");
        Ok(())
    }

    fn stored_weeks(&self) -> std::result::Result<Vec<u32>, BoxError> {
        Ok(list_wave_files(&self.dir)?
            .into_iter()
            .map(|(week, _)| week)
            .collect())
    }

    fn load_cells(&self) -> std::result::Result<DataFrame, BoxError> {
        let mut stacked: Option<DataFrame> = None;
        for (_, path) in list_wave_files(&self.dir)? {
            let frame = cast_cell_columns(read_csv_table(&path)?)?;
            match stacked.as_mut() {
                Some(all) => {
                    all.vstack_mut(&frame)?;
                }
                None => stacked = Some(frame),
            }
        }
        Ok(stacked.unwrap_or_default())
    }

    fn replace_smoothed(&self, smoothed: &DataFrame) -> std::result::Result<(), BoxError> {
        let path = self.smoothed_path();
        write_csv_atomic(&path, smoothed)?;
        info!(rows = smoothed.height(), path = %path.display(), "stored smoothed table");
        Ok(())
    }

    fn load_smoothed(&self) -> std::result::Result<Option<DataFrame>, BoxError> {
        let path = self.smoothed_path();
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(cast_cell_columns(read_csv_table(&path)?)?))
    }
}
