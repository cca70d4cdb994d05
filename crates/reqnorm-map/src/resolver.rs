//! The interactive-resolution capability and a scripted stand-in for it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

use reqnorm_model::CanonicalField;

/// Why a column reached interactive resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionReason {
    /// No catalog synonym recognizes the label.
    NoMatch,
    /// Several fields recognize the label.
    Ambiguous(Vec<CanonicalField>),
    /// The cached or automatic target is held by an earlier label.
    ConflictWith {
        field: CanonicalField,
        claimed_by: String,
    },
    /// The previous answer named a field that is already claimed.
    AnswerRejected(CanonicalField),
}

/// One question about one source column.
#[derive(Debug, Clone)]
pub struct ColumnRequest<'a> {
    pub document: &'a Path,
    pub label: &'a str,
    /// Fields already held by earlier labels in this pass.
    pub claimed: &'a BTreeSet<CanonicalField>,
    pub reason: ResolutionReason,
    /// Closest free field by string similarity, as a hint only.
    pub suggestion: Option<CanonicalField>,
}

impl ColumnRequest<'_> {
    /// Unclaimed fields in catalog order.
    pub fn free_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| !self.claimed.contains(field))
            .collect()
    }
}

/// One question about which sheet of a document to use.
#[derive(Debug, Clone)]
pub struct SheetRequest<'a> {
    pub document: &'a Path,
    pub sheets: &'a [String],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnResolution {
    Field(CanonicalField),
    Skip,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetResolution {
    Sheet(String),
    Cancel,
}

/// Capability to ask an operator about an otherwise unresolved decision.
///
/// Calls block until answered. Implementations must return `Cancel` rather
/// than panic when no answer can be obtained.
pub trait InteractiveResolver {
    fn resolve_column(&mut self, request: &ColumnRequest<'_>) -> ColumnResolution;

    fn resolve_sheet(&mut self, request: &SheetRequest<'_>) -> SheetResolution;
}

/// What a [`ScriptedResolver`] answers once its script runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptFallback {
    #[default]
    Cancel,
    /// First sheet, skip every column.
    FirstSheetSkipColumns,
}

/// Deterministic resolver replaying pre-recorded answers.
///
/// Answers keyed by label take precedence over the ordered queue. Every
/// call is recorded so callers can assert how often an operator would have
/// been asked.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResolver {
    by_label: BTreeMap<String, VecDeque<ColumnResolution>>,
    column_queue: VecDeque<ColumnResolution>,
    sheet_queue: VecDeque<SheetResolution>,
    fallback: ScriptFallback,
    column_calls: Vec<String>,
    sheet_calls: usize,
}

impl ScriptedResolver {
    /// Empty script; any question is answered with cancel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Never asks anyone: first sheet, skip unresolved columns.
    pub fn non_interactive() -> Self {
        Self {
            fallback: ScriptFallback::FirstSheetSkipColumns,
            ..Self::default()
        }
    }

    pub fn answer(mut self, label: impl Into<String>, resolution: ColumnResolution) -> Self {
        self.by_label
            .entry(label.into())
            .or_default()
            .push_back(resolution);
        self
    }

    pub fn then_column(mut self, resolution: ColumnResolution) -> Self {
        self.column_queue.push_back(resolution);
        self
    }

    pub fn then_sheet(mut self, resolution: SheetResolution) -> Self {
        self.sheet_queue.push_back(resolution);
        self
    }

    /// Labels asked about, in call order.
    pub fn column_calls(&self) -> &[String] {
        &self.column_calls
    }

    pub fn sheet_calls(&self) -> usize {
        self.sheet_calls
    }

    pub fn total_calls(&self) -> usize {
        self.column_calls.len() + self.sheet_calls
    }
}

impl InteractiveResolver for ScriptedResolver {
    fn resolve_column(&mut self, request: &ColumnRequest<'_>) -> ColumnResolution {
        self.column_calls.push(request.label.to_string());
        let scripted = self
            .by_label
            .get_mut(request.label)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.column_queue.pop_front());
        scripted.unwrap_or(match self.fallback {
            ScriptFallback::Cancel => ColumnResolution::Cancel,
            ScriptFallback::FirstSheetSkipColumns => ColumnResolution::Skip,
        })
    }

    fn resolve_sheet(&mut self, request: &SheetRequest<'_>) -> SheetResolution {
        self.sheet_calls += 1;
        if let Some(answer) = self.sheet_queue.pop_front() {
            return answer;
        }
        match (self.fallback, request.sheets.first()) {
            (ScriptFallback::FirstSheetSkipColumns, Some(first)) => {
                SheetResolution::Sheet(first.clone())
            }
            _ => SheetResolution::Cancel,
        }
    }
}
