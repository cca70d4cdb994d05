//! Persistent store of per-document mapping decisions.
//!
//! # Storage Format
//!
//! One human-readable JSON file:
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "<sha256 of path|mtime|size>": {
//!       "identity": { "path": "...", "modified": "...", "size": 123 },
//!       "selected_sheet": "Sheet1",
//!       "column_mapping": { "Req ID": "Requirement ID", "Owner": "skip" },
//!       "saved_at": "..."
//!     }
//!   }
//! }
//! ```
//!
//! The whole file is loaded once when the cache is opened and rewritten in
//! full on every change. Deleting it is equivalent to clearing the cache.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use reqnorm_model::{CachedDecision, DocumentIdentity};

use crate::error::CacheError;

/// Default cache location, relative to the working directory.
pub const DEFAULT_CACHE_PATH: &str = ".cache/file_processing_cache.json";

pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Deserialize)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, CachedDecision>,
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    version: u32,
    entries: &'a BTreeMap<String, CachedDecision>,
}

/// The mapping cache. Owns all on-disk cache state.
#[derive(Debug)]
pub struct MappingCache {
    /// `None` keeps the cache in memory only.
    path: Option<PathBuf>,
    entries: BTreeMap<String, CachedDecision>,
    load_error: Option<String>,
}

impl MappingCache {
    /// Opens the cache at `path`.
    ///
    /// Never fails: a missing file is an empty cache, and an unreadable or
    /// corrupt one is logged, remembered in [`Self::load_error`], and treated
    /// as empty. The corrupt file is replaced on the next successful write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (entries, load_error) = match Self::read_entries(&path) {
            Ok(entries) => (entries, None),
            Err(error) => {
                warn!(path = %path.display(), %error, "mapping cache unreadable, starting empty");
                (BTreeMap::new(), Some(error.to_string()))
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "mapping cache loaded");
        Self {
            path: Some(path),
            entries,
            load_error,
        }
    }

    /// A cache that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
            load_error: None,
        }
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, CachedDecision>, CacheError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(CacheError::Io {
                    operation: "read",
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let file: CacheFile =
            serde_json::from_str(&text).map_err(|source| CacheError::Deserialization {
                path: path.to_path_buf(),
                source,
            })?;
        if file.version > CACHE_FORMAT_VERSION {
            return Err(CacheError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: file.version,
                max_supported: CACHE_FORMAT_VERSION,
            });
        }
        // Entries whose key no longer matches their identity are dropped.
        Ok(file
            .entries
            .into_iter()
            .filter(|(key, decision)| *key == decision.identity.cache_key())
            .collect())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Why the persisted cache was ignored at open time, if it was.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The decision recorded for exactly this identity.
    pub fn get(&self, identity: &DocumentIdentity) -> Option<&CachedDecision> {
        self.entries
            .get(&identity.cache_key())
            .filter(|decision| decision.matches(identity))
    }

    /// A decision recorded for the same path under a different identity.
    pub fn stale_entry(&self, identity: &DocumentIdentity) -> Option<&CachedDecision> {
        self.entries
            .values()
            .find(|decision| decision.identity.same_path(identity) && !decision.matches(identity))
    }

    /// Records `decision` under its identity and flushes the store.
    ///
    /// Any other entry for the same path is dropped, so an edited document's
    /// new decision replaces its old one instead of accumulating beside it.
    /// The in-memory store changes only once the write has succeeded.
    pub fn put(&mut self, decision: CachedDecision) -> Result<(), CacheError> {
        let key = decision.identity.cache_key();
        let mut entries = self.entries.clone();
        entries.retain(|existing_key, existing| {
            *existing_key == key || !existing.identity.same_path(&decision.identity)
        });
        let pruned = self.entries.len() - entries.len();
        let path = decision.identity.path.clone();
        entries.insert(key, decision);
        self.write_entries(&entries)?;
        if pruned > 0 {
            debug!(path = %path.display(), pruned, "dropped stale cache entries");
        }
        self.entries = entries;
        Ok(())
    }

    /// Removes every entry and deletes the backing file.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.entries.clear();
        self.load_error = None;
        let Some(path) = &self.path else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "mapping cache cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io {
                operation: "remove",
                path: path.clone(),
                source: e,
            }),
        }
    }

    /// Writes the complete store via temp file and atomic rename.
    ///
    /// The temp file is removed on every failure path, and the previous
    /// contents stay intact until the rename succeeds.
    pub fn flush(&self) -> Result<(), CacheError> {
        self.write_entries(&self.entries)
    }

    fn write_entries(&self, entries: &BTreeMap<String, CachedDecision>) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = CacheFileRef {
            version: CACHE_FORMAT_VERSION,
            entries,
        };
        let bytes =
            serde_json::to_vec_pretty(&file).map_err(|source| CacheError::Serialization { source })?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| CacheError::Io {
            operation: "create directory",
            path: parent.clone(),
            source: e,
        })?;

        let mut temp = NamedTempFile::new_in(&parent).map_err(|e| CacheError::Io {
            operation: "create",
            path: parent.clone(),
            source: e,
        })?;
        let temp_path = temp.path().to_path_buf();
        temp.write_all(&bytes).map_err(|e| CacheError::Io {
            operation: "write",
            path: temp_path.clone(),
            source: e,
        })?;
        temp.as_file().sync_all().map_err(|e| CacheError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source: e,
        })?;
        temp.persist(path).map_err(|e| CacheError::AtomicWriteFailed {
            temp_path,
            target_path: path.clone(),
            source: e.error,
        })?;

        debug!(path = %path.display(), entries = entries.len(), "mapping cache written");
        Ok(())
    }
}
