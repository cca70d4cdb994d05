use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::field::CanonicalField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Compliance text that matched no synonym; passed through unchanged.
    UnrecognizedCompliance,
    /// Cell text containing replacement characters from a lossy decode.
    MalformedText,
    /// A cached or automatic claim lost to an earlier label in source order.
    MappingConflict,
    /// A cached decision existed for this path but for a different identity.
    StaleCache,
    /// The persisted cache could not be read and was treated as empty.
    CacheUnreadable,
    /// A decision could not be saved; the document was still processed.
    CacheUnwritable,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::UnrecognizedCompliance => "unrecognized compliance",
            WarningKind::MalformedText => "malformed text",
            WarningKind::MappingConflict => "mapping conflict",
            WarningKind::StaleCache => "stale cache",
            WarningKind::CacheUnreadable => "cache unreadable",
            WarningKind::CacheUnwritable => "cache unwritable",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal condition surfaced for later audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingWarning {
    pub kind: WarningKind,
    pub document: PathBuf,
    /// 1-based data row, when the warning concerns a cell.
    pub row: Option<usize>,
    /// Source column label.
    pub column: Option<String>,
    pub field: Option<CanonicalField>,
    pub message: String,
}

impl ProcessingWarning {
    pub fn new(kind: WarningKind, document: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            document: document.into(),
            row: None,
            column: None,
            field: None,
            message: message.into(),
        }
    }

    pub fn at_cell(mut self, row: usize, column: impl Into<String>, field: CanonicalField) -> Self {
        self.row = Some(row);
        self.column = Some(column.into());
        self.field = Some(field);
        self
    }

    pub fn for_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl fmt::Display for ProcessingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document.display())?;
        if let Some(row) = self.row {
            write!(f, " row {row}")?;
        }
        if let Some(column) = &self.column {
            write!(f, " column '{column}'")?;
        }
        write!(f, ": {}: {}", self.kind, self.message)
    }
}
