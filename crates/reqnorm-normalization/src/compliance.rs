use reqnorm_model::ComplianceValue;

use crate::options::ComplianceOptions;
use crate::text::normalize_text;

const COMPLIANCE_SYNONYMS: &[(&str, ComplianceValue)] = &[
    ("c", ComplianceValue::Compliant),
    ("compliant", ComplianceValue::Compliant),
    ("nc", ComplianceValue::NonCompliant),
    ("non-compliant", ComplianceValue::NonCompliant),
    ("non compliant", ComplianceValue::NonCompliant),
    ("noncompliant", ComplianceValue::NonCompliant),
    ("not-compliant", ComplianceValue::NonCompliant),
    ("not compliant", ComplianceValue::NonCompliant),
    ("notcompliant", ComplianceValue::NonCompliant),
    ("pc", ComplianceValue::PartiallyCompliant),
    ("partially-compliant", ComplianceValue::PartiallyCompliant),
    ("partially compliant", ComplianceValue::PartiallyCompliant),
    ("partial-compliant", ComplianceValue::PartiallyCompliant),
    ("partial compliant", ComplianceValue::PartiallyCompliant),
    ("partially", ComplianceValue::PartiallyCompliant),
    ("partial", ComplianceValue::PartiallyCompliant),
];

/// Result of coercing one raw compliance cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplianceOutcome {
    Normalized(ComplianceValue),
    /// Non-empty text matching no synonym, kept as cleaned text.
    Unrecognized(String),
}

impl ComplianceOutcome {
    pub fn is_recognized(&self) -> bool {
        matches!(self, ComplianceOutcome::Normalized(_))
    }

    /// Output cell text: the code, or the passed-through value.
    pub fn as_text(&self) -> &str {
        match self {
            ComplianceOutcome::Normalized(value) => value.code(),
            ComplianceOutcome::Unrecognized(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ComplianceOutcome::Normalized(value) => value.code().to_string(),
            ComplianceOutcome::Unrecognized(text) => text,
        }
    }
}

fn compact_key(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn lookup_key(value: &str) -> String {
    normalize_text(value).to_lowercase()
}

/// Coerce a raw compliance cell with default options.
pub fn normalize_compliance(raw: &str) -> ComplianceOutcome {
    normalize_compliance_with(raw, &ComplianceOptions::default())
}

/// Coerce a raw compliance cell.
///
/// Order: custom synonyms, built-in synonyms, then (when lenient) both again
/// on their alphanumeric-only form. Empty input is [`ComplianceValue::Empty`].
pub fn normalize_compliance_with(raw: &str, options: &ComplianceOptions) -> ComplianceOutcome {
    let cleaned = normalize_text(raw);
    if cleaned.is_empty() {
        return ComplianceOutcome::Normalized(ComplianceValue::Empty);
    }
    let key = cleaned.to_lowercase();

    let custom = || {
        options
            .custom_maps
            .iter()
            .map(|(synonym, value)| (lookup_key(synonym), *value))
    };
    let builtin = || {
        COMPLIANCE_SYNONYMS
            .iter()
            .map(|(synonym, value)| (synonym.to_string(), *value))
    };

    if let Some((_, value)) = custom().chain(builtin()).find(|(synonym, _)| *synonym == key) {
        return ComplianceOutcome::Normalized(value);
    }

    if options.lenient {
        let compact = compact_key(&key);
        if !compact.is_empty()
            && let Some((_, value)) = custom()
                .chain(builtin())
                .find(|(synonym, _)| compact_key(synonym) == compact)
        {
            return ComplianceOutcome::Normalized(value);
        }
    }

    ComplianceOutcome::Unrecognized(cleaned)
}
