//! Output paths and atomic file replacement.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{OutputError, Result};

/// Suffix appended to a document's stem for its standardized output.
pub const OUTPUT_SUFFIX: &str = "_normalized";

/// `<dir>/<stem>_normalized.<extension>` for `document`.
pub fn output_path_for(dir: &Path, document: &Path, extension: &str) -> PathBuf {
    let stem = document
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("requirements");
    dir.join(format!("{stem}{OUTPUT_SUFFIX}.{extension}"))
}

/// Ensure a parent directory exists for a file path.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| OutputError::io("create directory", parent, e))?;
    }
    Ok(())
}

/// Writes `bytes` next to `path` and renames over it, so readers never see a
/// partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp =
        NamedTempFile::new_in(dir).map_err(|e| OutputError::io("create temp file in", dir, e))?;
    temp.write_all(bytes)
        .map_err(|e| OutputError::io("write", temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| OutputError::io("sync", temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| OutputError::io("replace", path, e.error))?;
    debug!(path = %path.display(), bytes = bytes.len(), "output written");
    Ok(())
}
