use std::path::PathBuf;

use thiserror::Error;

use reqnorm_ingest::IngestError;
use reqnorm_map::MapError;

/// Failure that removes one document from a run without stopping the batch.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read identity of {path}: {source}")]
    Identity {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Read(#[from] IngestError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("sheet '{sheet}' of {path} has no columns")]
    NoColumns { path: PathBuf, sheet: String },

    #[error("sheet '{sheet}' disappeared from {path}")]
    SheetMissing { path: PathBuf, sheet: String },
}

impl DocumentError {
    /// True when the operator cancelled resolution for this document.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Map(error) if error.is_cancellation())
    }
}

pub type Result<T> = std::result::Result<T, DocumentError>;
