//! Atomic JSON file writes shared by the cache store and the output catalog

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{debug, error};

use crate::constants::files;

/// Path of the temporary sibling used while writing `path`
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(files::TEMP_FILE_SUFFIX);
    path.with_file_name(name)
}

/// Serialize `value` as pretty JSON
pub fn to_json_bytes<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write `content` to `path` using the temp file + rename pattern
///
/// Parent directories are created when missing. A failed write leaves any
/// previous file at `path` untouched.
pub async fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
            debug!("Created directory: {}", parent.display());
        }
    }

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, content).await?;

    if let Err(e) = fs::rename(&temp_path, path).await {
        error!("Failed to rename {}: {}", temp_path.display(), e);
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
