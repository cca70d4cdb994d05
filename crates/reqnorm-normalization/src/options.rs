use std::collections::HashMap;

use serde::Deserialize;

use reqnorm_model::ComplianceValue;

/// Options for free-text normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// Fold typographic characters to ASCII and drop what remains non-ASCII.
    /// Default: false (case and script are preserved).
    pub ascii_fold: bool,
}

impl TextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ascii_fold(mut self, enable: bool) -> Self {
        self.ascii_fold = enable;
        self
    }
}

/// Options for compliance coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceOptions {
    /// Retry unmatched values on their alphanumeric-only form.
    /// Default: true.
    pub lenient: bool,

    /// Extra synonyms (raw text -> value), consulted before the built-in table.
    /// Keys are matched case-insensitively on their whitespace-collapsed form.
    pub custom_maps: HashMap<String, ComplianceValue>,
}

impl Default for ComplianceOptions {
    fn default() -> Self {
        Self {
            lenient: true,
            custom_maps: HashMap::new(),
        }
    }
}

impl ComplianceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lenient(mut self, enable: bool) -> Self {
        self.lenient = enable;
        self
    }

    pub fn with_custom_map(mut self, map: HashMap<String, ComplianceValue>) -> Self {
        self.custom_maps = map;
        self
    }
}

/// Both option sets, as carried through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationOptions {
    pub text: TextOptions,
    pub compliance: ComplianceOptions,
}
