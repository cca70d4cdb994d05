//! Batch document discovery.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{IngestError, Result};
use crate::reader::DocumentKind;

/// Which document types a batch run picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFilter {
    #[default]
    All,
    Csv,
    /// Structured requirement text.
    Text,
    Excel,
    /// PDFs and the text extracted from them.
    Pdf,
}

impl DocumentFilter {
    pub fn accepts(&self, kind: DocumentKind) -> bool {
        match self {
            Self::All => true,
            Self::Csv => kind == DocumentKind::Delimited,
            Self::Text => kind == DocumentKind::StructuredText,
            Self::Excel => kind == DocumentKind::Spreadsheet,
            Self::Pdf => matches!(kind, DocumentKind::Pdf | DocumentKind::StructuredText),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Csv => "csv",
            Self::Text => "text",
            Self::Excel => "excel",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            "excel" | "xlsx" => Ok(Self::Excel),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("unknown document filter: {other}")),
        }
    }
}

fn is_ignored_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('~') || name.to_ascii_lowercase().ends_with(".md")
}

/// Lists supported documents directly inside `dir`.
///
/// Skips subdirectories, hidden files, `~` lock files and Markdown.
/// Returns files sorted by filename.
pub fn list_documents(dir: &Path, filter: DocumentFilter) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if is_ignored_name(name) {
            continue;
        }
        if DocumentKind::from_path(&path).is_some_and(|kind| filter.accepts(kind)) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
