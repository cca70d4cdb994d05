use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Normalized compliance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComplianceValue {
    /// `C`
    Compliant,
    /// `NC`
    NonCompliant,
    /// `PC`
    PartiallyCompliant,
    /// Empty cell.
    #[default]
    Empty,
}

impl ComplianceValue {
    pub fn code(&self) -> &'static str {
        match self {
            ComplianceValue::Compliant => "C",
            ComplianceValue::NonCompliant => "NC",
            ComplianceValue::PartiallyCompliant => "PC",
            ComplianceValue::Empty => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ComplianceValue::Empty)
    }
}

impl fmt::Display for ComplianceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ComplianceValue {
    type Err = ModelError;

    /// Parses the exact output code (`C`, `NC`, `PC` or empty).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "C" => Ok(ComplianceValue::Compliant),
            "NC" => Ok(ComplianceValue::NonCompliant),
            "PC" => Ok(ComplianceValue::PartiallyCompliant),
            "" => Ok(ComplianceValue::Empty),
            other => Err(ModelError::UnknownComplianceCode(other.to_string())),
        }
    }
}

impl Serialize for ComplianceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ComplianceValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
