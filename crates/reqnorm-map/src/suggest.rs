//! Similarity hints for interactive resolution.

use std::collections::BTreeSet;

use rapidfuzz::distance::jaro_winkler::similarity as jaro_similarity;

use reqnorm_model::CanonicalField;
use reqnorm_standards::{SchemaCatalog, normalize_label};

/// Minimum Jaro-Winkler similarity for a hint to be offered.
const SUGGESTION_MIN_SCORE: f64 = 0.80;

/// The unclaimed field whose synonyms look most like `label`.
///
/// Ties keep the earlier field in catalog order.
pub fn closest_free_field(
    catalog: &SchemaCatalog,
    label: &str,
    claimed: &BTreeSet<CanonicalField>,
) -> Option<CanonicalField> {
    let normalized = normalize_label(label);
    if normalized.is_empty() {
        return None;
    }
    let mut best: Option<(CanonicalField, f64)> = None;
    for definition in catalog.fields() {
        if claimed.contains(&definition.field) {
            continue;
        }
        let score = definition
            .synonyms()
            .iter()
            .map(|synonym| jaro_similarity(normalized.chars(), synonym.chars()))
            .fold(0.0_f64, f64::max);
        if score >= SUGGESTION_MIN_SCORE && best.is_none_or(|(_, top)| score > top) {
            best = Some((definition.field, score));
        }
    }
    best.map(|(field, _)| field)
}
