//! Saving raw analysis results to disk.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use lexcheck_utils::atomic_write;

/// File name written inside the save directory.
pub const RESULTS_FILE: &str = "analysis_results.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Write `raw` pretty-printed to `<dir>/analysis_results.json`, replacing any
/// previous results. Returns the written path.
pub fn save_results(dir: &Path, raw: &serde_json::Value) -> Result<PathBuf, PersistError> {
    std::fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut bytes = serde_json::to_vec_pretty(raw)?;
    bytes.push(b'\n');

    let path = dir.join(RESULTS_FILE);
    atomic_write(&path, &bytes).map_err(|source| PersistError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Analysis results saved");
    Ok(path)
}
