use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

/// One raw row: column label to cell text. Missing labels read as empty.
pub type RawRow = BTreeMap<String, String>;

/// One sheet or section of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetData {
    pub name: String,
    /// Unique column labels in source order.
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl SheetData {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn cell<'a>(&'a self, row: &'a RawRow, label: &str) -> &'a str {
        row.get(label).map(String::as_str).unwrap_or("")
    }
}

/// Everything a reader extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawDocument {
    pub path: PathBuf,
    pub sheets: Vec<SheetData>,
}

impl RawDocument {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetData> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn into_sheet(self, name: &str) -> Option<SheetData> {
        self.sheets.into_iter().find(|sheet| sheet.name == name)
    }
}

/// Makes `labels` unique by suffixing repeats as `Label (2)`, `Label (3)`.
/// Blank labels become `Column N` (1-based position).
pub fn disambiguate_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut taken: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::with_capacity(labels.len());
    for (idx, label) in labels.into_iter().enumerate() {
        let base = if label.is_empty() {
            format!("Column {}", idx + 1)
        } else {
            label
        };
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        let mut candidate = if *count == 1 {
            base.clone()
        } else {
            format!("{base} ({count})")
        };
        while taken.contains(&candidate) {
            *count += 1;
            candidate = format!("{base} ({count})");
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_get_numbered_suffixes() {
        let labels = vec!["ID".into(), "Notes".into(), "Notes".into(), String::new(), "Notes".into()];
        assert_eq!(
            disambiguate_labels(labels),
            vec!["ID", "Notes", "Notes (2)", "Column 4", "Notes (3)"]
        );
    }

    #[test]
    fn suffix_never_collides_with_real_label() {
        let labels = vec!["A (2)".into(), "A".into(), "A".into()];
        assert_eq!(disambiguate_labels(labels), vec!["A (2)", "A", "A (3)"]);
    }
}
