//! Per-document and batch results.

use std::path::PathBuf;

use reqnorm_map::MappingStats;
use reqnorm_model::{ColumnMapping, DocumentIdentity, ProcessingWarning, RequirementRecord};

use crate::error::DocumentError;

/// Result of standardizing one document.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub identity: DocumentIdentity,
    /// Sheet or section the records were read from.
    pub sheet: String,
    pub mapping: ColumnMapping,
    pub stats: MappingStats,
    pub records: Vec<RequirementRecord>,
    pub warnings: Vec<ProcessingWarning>,
}

#[derive(Debug)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub result: Result<DocumentReport, DocumentError>,
}

impl DocumentOutcome {
    pub fn report(&self) -> Option<&DocumentReport> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&DocumentError> {
        self.result.as_ref().err()
    }
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchResult {
    pub fn succeeded(&self) -> impl Iterator<Item = &DocumentReport> {
        self.outcomes.iter().filter_map(DocumentOutcome::report)
    }

    pub fn failed(&self) -> impl Iterator<Item = (&PathBuf, &DocumentError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.error().map(|error| (&outcome.path, error)))
    }

    /// Records of every successful document, documents in input order and
    /// rows in source order.
    pub fn records(&self) -> impl Iterator<Item = &RequirementRecord> {
        self.succeeded().flat_map(|report| report.records.iter())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ProcessingWarning> {
        self.succeeded().flat_map(|report| report.warnings.iter())
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn cancelled_count(&self) -> usize {
        self.failed().filter(|(_, error)| error.is_cancellation()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }
}
