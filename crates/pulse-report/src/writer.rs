//! Writing cache artifacts to disk.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::cache::QueryCache;
use crate::error::{ReportError, Result};

/// Writes every artifact as compact JSON under `dir`, one file per key.
///
/// Each file is written to a temp name and renamed into place. Returns the
/// number of files written.
pub fn write_cache(dir: &Path, cache: &QueryCache) -> Result<usize> {
    fs::create_dir_all(dir).map_err(|e| ReportError::Io {
        operation: "create directory",
        path: dir.to_path_buf(),
        source: e,
    })?;

    for (name, artifact) in cache {
        let path = dir.join(name);
        let temp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(artifact)?;
        fs::write(&temp_path, bytes).map_err(|e| ReportError::Io {
            operation: "write",
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &path).map_err(|e| ReportError::Io {
            operation: "rename",
            path: path.clone(),
            source: e,
        })?;
    }

    info!(files = cache.len(), dir = %dir.display(), "wrote query cache");
    Ok(cache.len())
}
