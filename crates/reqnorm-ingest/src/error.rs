//! Error types for document reading and discovery.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or discovering documents.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Format Errors ===
    /// The document type is recognized but has no reader.
    #[error("unsupported {kind} document: {path}")]
    UnsupportedFormat { path: PathBuf, kind: &'static str },

    /// The extension matches no known document type.
    #[error("unrecognized document type: {path}")]
    UnknownFormat { path: PathBuf },

    #[error("failed to parse delimited text {path}: {message}")]
    CsvParse { path: PathBuf, message: String },
}

impl IngestError {
    pub(crate) fn file_read(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;
