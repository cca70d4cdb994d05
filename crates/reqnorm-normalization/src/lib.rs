//! Value normalization applied between raw cells and canonical records.

pub mod compliance;
pub mod options;
pub mod text;

pub use compliance::{ComplianceOutcome, normalize_compliance, normalize_compliance_with};
pub use options::{ComplianceOptions, NormalizationOptions, TextOptions};
pub use text::{REPLACEMENT_CHAR, TextOutcome, normalize_text, normalize_text_with};
