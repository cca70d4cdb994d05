//! The fixed, ordered set of canonical requirement fields.
//!
//! The declaration order of [`CanonicalField`] is the output column order of
//! every standardized record.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Number of canonical fields in the requirement schema.
pub const FIELD_COUNT: usize = 16;

/// One of the sixteen output columns of the standardized schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalField {
    ParentId,
    RequirementId,
    Type,
    SubType,
    Title,
    Definition,
    Notes,
    Remarks,
    Responsibility,
    Applicability,
    Compliance,
    ComplianceNotes,
    Verification,
    VerificationNotes,
    ReferenceDocument,
    OriginalIdentifier,
}

impl CanonicalField {
    /// All fields in catalog (output) order.
    pub const ALL: [CanonicalField; FIELD_COUNT] = [
        CanonicalField::ParentId,
        CanonicalField::RequirementId,
        CanonicalField::Type,
        CanonicalField::SubType,
        CanonicalField::Title,
        CanonicalField::Definition,
        CanonicalField::Notes,
        CanonicalField::Remarks,
        CanonicalField::Responsibility,
        CanonicalField::Applicability,
        CanonicalField::Compliance,
        CanonicalField::ComplianceNotes,
        CanonicalField::Verification,
        CanonicalField::VerificationNotes,
        CanonicalField::ReferenceDocument,
        CanonicalField::OriginalIdentifier,
    ];

    /// Column label as written in output headers and the cache file.
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::ParentId => "Parent ID",
            CanonicalField::RequirementId => "Requirement ID",
            CanonicalField::Type => "Type",
            CanonicalField::SubType => "Sub-Type",
            CanonicalField::Title => "Title",
            CanonicalField::Definition => "Definition",
            CanonicalField::Notes => "Notes",
            CanonicalField::Remarks => "Remarks",
            CanonicalField::Responsibility => "Responsibility",
            CanonicalField::Applicability => "Applicability",
            CanonicalField::Compliance => "Compliance",
            CanonicalField::ComplianceNotes => "Compliance Notes",
            CanonicalField::Verification => "Verification",
            CanonicalField::VerificationNotes => "Verification Notes",
            CanonicalField::ReferenceDocument => "Reference Document",
            CanonicalField::OriginalIdentifier => "Original Identifier",
        }
    }

    /// Zero-based position in catalog order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Field at a zero-based catalog position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether values of this field go through the compliance normalizer.
    pub fn is_compliance(&self) -> bool {
        matches!(self, CanonicalField::Compliance)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CanonicalField {
    type Err = ModelError;

    /// Parses a field from its exact label, ignoring ASCII case and outer whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CanonicalField::ALL
            .iter()
            .find(|field| field.label().eq_ignore_ascii_case(trimmed))
            .copied()
            .ok_or_else(|| ModelError::UnknownField(s.to_string()))
    }
}

impl Serialize for CanonicalField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for CanonicalField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
