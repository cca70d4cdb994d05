//! Document identity: the sole key of the mapping cache.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// `(canonical path, last-modified time, byte size)` of a source document.
///
/// Two identities are equal only when all three components match exactly.
/// File contents are never hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentIdentity {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    pub size: u64,
}

impl DocumentIdentity {
    pub fn new(path: impl Into<PathBuf>, modified: DateTime<Utc>, size: u64) -> Self {
        Self {
            path: path.into(),
            modified,
            size,
        }
    }

    /// Reads the identity of an existing file from the filesystem.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let canonical = fs::canonicalize(path)?;
        let metadata = fs::metadata(&canonical)?;
        let modified: DateTime<Utc> = metadata.modified()?.into();
        Ok(Self {
            path: canonical,
            modified,
            size: metadata.len(),
        })
    }

    /// Stable string key derived from all three identity components.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.path.to_string_lossy().as_bytes());
        hasher.update(b"|");
        hasher.update(
            self.modified
                .to_rfc3339_opts(SecondsFormat::Nanos, true)
                .as_bytes(),
        );
        hasher.update(b"|");
        hasher.update(self.size.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn same_path(&self, other: &DocumentIdentity) -> bool {
        self.path == other.path
    }
}

impl fmt::Display for DocumentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} bytes, modified {})",
            self.path.display(),
            self.size,
            self.modified.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}
