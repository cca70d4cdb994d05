//! Per-document mapping outcome and summary statistics.

use serde::Serialize;

use reqnorm_model::{ColumnMapping, ProcessingWarning};

/// How each label of one document was resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    /// Reused from the cached decision.
    pub from_cache: usize,
    /// Matched through the catalog.
    pub automatic: usize,
    /// Answered by the operator (including skips).
    pub interactive: usize,
    /// Labels mapped to skip, however decided.
    pub skipped: usize,
}

impl MappingStats {
    pub fn total(&self) -> usize {
        self.from_cache + self.automatic + self.interactive
    }
}

/// Result of resolving one document's columns.
#[derive(Debug, Clone)]
pub struct MappingOutcome {
    pub mapping: ColumnMapping,
    /// True when any decision differs from what the cache held.
    pub changed: bool,
    pub stats: MappingStats,
    pub warnings: Vec<ProcessingWarning>,
}
