//! Wave file naming and discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// File holding the smoothed table in a store directory.
pub const SMOOTHED_FILE_NAME: &str = "pulse-smoothed.csv";

/// `pulse-WW.csv`, with the week zero-padded to two digits.
pub fn wave_file_name(week: u32) -> String {
    format!("pulse-{week:02}.csv")
}

/// Week number encoded in a wave file name.
///
/// ```
/// use pulse_ingest::parse_wave_file_name;
///
/// assert_eq!(parse_wave_file_name("pulse-07.csv"), Some(7));
/// assert_eq!(parse_wave_file_name("pulse-smoothed.csv"), None);
/// ```
pub fn parse_wave_file_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("pulse-")?.strip_suffix(".csv")?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Wave files in `dir`, sorted by week.
pub fn list_wave_files(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let week = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_wave_file_name);
        if let Some(week) = week {
            files.push((week, path));
        }
    }
    files.sort_by_key(|(week, _)| *week);
    Ok(files)
}
