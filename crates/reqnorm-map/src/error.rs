//! Error types for mapping and cache operations.

use std::path::PathBuf;

use thiserror::Error;

use reqnorm_model::CanonicalField;

/// Cache persistence error.
#[derive(Debug, Error)]
pub enum CacheError {
    /// File I/O error.
    #[error("failed to {operation} cache file {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize mapping cache")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse mapping cache {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("mapping cache {path} has version {found} (maximum supported: {max_supported})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        max_supported: u32,
    },

    /// The temp file could not be moved over the previous cache.
    #[error("failed to replace cache file {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Document-fatal mapping error.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("operator cancelled resolution of column '{label}'")]
    ColumnCancelled { label: String },

    #[error("operator cancelled sheet selection")]
    SheetCancelled,

    #[error("document has no sheets")]
    NoSheets,

    #[error("sheet '{name}' is not one of the document's sheets")]
    UnknownSheet { name: String },

    #[error("column '{label}' was answered with {field} {attempts} times, but that field is already claimed")]
    ConflictingAnswer {
        label: String,
        field: CanonicalField,
        attempts: usize,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl MapError {
    /// True when the operator asked to abandon the document.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::ColumnCancelled { .. } | Self::SheetCancelled)
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
