//! Writing user-facing files (exports, downloads) to an output directory.

use std::path::{Path, PathBuf};

use crate::error::GeneLinkerError;

/// Write `bytes` to `dir/filename`, creating `dir` if needed.
/// Failures are reported as retryable `FileOperation` errors naming the path.
pub fn write_artifact(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, GeneLinkerError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        GeneLinkerError::FileOperation(format!("cannot create {}: {e}", dir.display()))
    })?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes).map_err(|e| {
        GeneLinkerError::FileOperation(format!("cannot write {}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
    Ok(path)
}
