//! Format selection: one reader variant per supported document type.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::csv_table::CsvReader;
use crate::document::RawDocument;
use crate::error::{IngestError, Result};
use crate::structured_text::StructuredTextReader;

/// Document type, decided once from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Delimited,
    StructuredText,
    Spreadsheet,
    Pdf,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".req.txt") {
            return Some(Self::StructuredText);
        }
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Delimited),
            "xlsx" | "xls" | "xlsm" => Some(Self::Spreadsheet),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delimited => "delimited text",
            Self::StructuredText => "structured text",
            Self::Spreadsheet => "spreadsheet",
            Self::Pdf => "PDF",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability to turn a file into raw sheets.
pub trait DocumentReader {
    fn read_document(&self, path: &Path) -> Result<RawDocument>;
}

/// Reader chosen for one document.
#[derive(Debug, Clone, Copy)]
pub enum FormatReader {
    Delimited(CsvReader),
    StructuredText(StructuredTextReader),
    /// Recognized, but binary parsing is not available.
    Unsupported(DocumentKind),
}

impl FormatReader {
    pub fn for_path(path: &Path) -> Result<Self> {
        let kind = DocumentKind::from_path(path).ok_or_else(|| IngestError::UnknownFormat {
            path: path.to_path_buf(),
        })?;
        Ok(Self::for_kind(kind))
    }

    pub fn for_kind(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Delimited => Self::Delimited(CsvReader::new()),
            DocumentKind::StructuredText => Self::StructuredText(StructuredTextReader),
            DocumentKind::Spreadsheet | DocumentKind::Pdf => Self::Unsupported(kind),
        }
    }
}

impl DocumentReader for FormatReader {
    fn read_document(&self, path: &Path) -> Result<RawDocument> {
        match self {
            Self::Delimited(reader) => reader.read(path),
            Self::StructuredText(reader) => reader.read(path),
            Self::Unsupported(kind) => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                kind: kind.as_str(),
            }),
        }
    }
}

/// Reads any supported document, choosing the reader by file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoReader;

impl DocumentReader for AutoReader {
    fn read_document(&self, path: &Path) -> Result<RawDocument> {
        FormatReader::for_path(path)?.read_document(path)
    }
}
