//! Source-label to canonical-field mappings.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ModelError, Result};
use crate::field::CanonicalField;

/// Marker written to the cache file for an explicitly skipped column.
pub const SKIP_MARKER: &str = "skip";

/// Where a source column goes: a canonical field, or nowhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnTarget {
    Field(CanonicalField),
    Skip,
}

impl ColumnTarget {
    pub fn field(&self) -> Option<CanonicalField> {
        match self {
            ColumnTarget::Field(field) => Some(*field),
            ColumnTarget::Skip => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, ColumnTarget::Skip)
    }
}

impl From<CanonicalField> for ColumnTarget {
    fn from(field: CanonicalField) -> Self {
        ColumnTarget::Field(field)
    }
}

impl fmt::Display for ColumnTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnTarget::Field(field) => f.write_str(field.label()),
            ColumnTarget::Skip => f.write_str(SKIP_MARKER),
        }
    }
}

impl Serialize for ColumnTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColumnTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        // The original tool wrote an empty string for skipped columns.
        if s.trim().is_empty() || s.trim().eq_ignore_ascii_case(SKIP_MARKER) {
            return Ok(ColumnTarget::Skip);
        }
        s.parse::<CanonicalField>()
            .map(ColumnTarget::Field)
            .map_err(serde::de::Error::custom)
    }
}

/// Assignment of raw source labels to canonical fields or skip.
///
/// At most one label may claim a given canonical field; [`ColumnMapping::insert`]
/// refuses a second claim instead of silently replacing the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    entries: BTreeMap<String, ColumnTarget>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a decision for `label`, replacing any earlier decision for the same label.
    pub fn insert(&mut self, label: impl Into<String>, target: ColumnTarget) -> Result<()> {
        let label = label.into();
        if let ColumnTarget::Field(field) = target
            && let Some(owner) = self.label_for(field)
            && owner != label
        {
            return Err(ModelError::DuplicateClaim {
                field: field.label().to_string(),
                first: owner.to_string(),
                second: label,
            });
        }
        self.entries.insert(label, target);
        Ok(())
    }

    pub fn target(&self, label: &str) -> Option<ColumnTarget> {
        self.entries.get(label).copied()
    }

    /// Source label currently claiming `field`, if any.
    pub fn label_for(&self, field: CanonicalField) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, target)| target.field() == Some(field))
            .map(|(label, _)| label.as_str())
    }

    pub fn claimed_fields(&self) -> BTreeSet<CanonicalField> {
        self.entries.values().filter_map(ColumnTarget::field).collect()
    }

    /// Canonical field to source label, for every claimed field.
    pub fn sources_by_field(&self) -> BTreeMap<CanonicalField, &str> {
        self.entries
            .iter()
            .filter_map(|(label, target)| target.field().map(|field| (field, label.as_str())))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnTarget)> {
        self.entries.iter().map(|(label, target)| (label.as_str(), *target))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.values().filter(|target| target.is_skip()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for ColumnMapping {
    /// Rebuilds the mapping through [`ColumnMapping::insert`] so persisted data
    /// that violates the one-claim-per-field rule is rejected on load.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, ColumnTarget>::deserialize(deserializer)?;
        let mut mapping = ColumnMapping::new();
        for (label, target) in raw {
            mapping
                .insert(label, target)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(mapping)
    }
}
