//! The ordered canonical field catalog and its synonym matcher.

use std::collections::BTreeSet;

use reqnorm_model::CanonicalField;

/// Built-in synonyms per field. Each field's own label is added on top.
const BUILTIN_SYNONYMS: [(CanonicalField, &[&str]); 16] = [
    (
        CanonicalField::ParentId,
        &["parent", "parent id", "parent requirement id", "source"],
    ),
    (
        CanonicalField::RequirementId,
        &["req id", "requirement id", "id", "object identifier", "object id"],
    ),
    (CanonicalField::Type, &["type", "object type"]),
    (CanonicalField::SubType, &["sub-type", "subtype"]),
    (CanonicalField::Title, &["title"]),
    (
        CanonicalField::Definition,
        &["definition", "description", "req description"],
    ),
    (
        CanonicalField::Notes,
        &["note", "notes", "comments", "justification & comments"],
    ),
    (CanonicalField::Remarks, &["remarks"]),
    (
        CanonicalField::Responsibility,
        &["responsibility", "responsible", "owner", "subsystem allocation"],
    ),
    (CanonicalField::Applicability, &["applicability", "applicable"]),
    (
        CanonicalField::Compliance,
        &["compliance", "status", "compliance status"],
    ),
    (
        CanonicalField::ComplianceNotes,
        &["compliance note", "compliance notes", "compliance comment"],
    ),
    (
        CanonicalField::Verification,
        &["verification", "verification method"],
    ),
    (
        CanonicalField::VerificationNotes,
        &[
            "verification note",
            "verification notes",
            "verification comment",
        ],
    ),
    (
        CanonicalField::ReferenceDocument,
        &["reference", "reference document", "ref doc", "document"],
    ),
    (
        CanonicalField::OriginalIdentifier,
        &[
            "original identifier",
            "original esa identifier",
            "orginal esa identifier",
            "esa identifier",
            "esa id",
        ],
    ),
];

/// Trim, collapse internal whitespace and case-fold a label.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Case-folded alphanumeric characters only; punctuation, underscores and
/// whitespace are dropped.
pub fn loose_key(label: &str) -> String {
    label
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One canonical field with its recognized synonyms (normalized form).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub field: CanonicalField,
    synonyms: Vec<String>,
}

impl FieldDefinition {
    fn new(field: CanonicalField) -> Self {
        let mut definition = Self {
            field,
            synonyms: Vec::new(),
        };
        definition.add_synonym(field.label());
        definition
    }

    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    fn add_synonym(&mut self, synonym: &str) -> bool {
        let normalized = normalize_label(synonym);
        if normalized.is_empty() || self.synonyms.contains(&normalized) {
            return false;
        }
        self.synonyms.push(normalized);
        true
    }
}

/// Result of classifying a raw label against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynonymMatch {
    Unique(CanonicalField),
    /// More than one field recognizes the label.
    Ambiguous(Vec<CanonicalField>),
    NoMatch,
}

impl SynonymMatch {
    pub fn field(&self) -> Option<CanonicalField> {
        match self {
            SynonymMatch::Unique(field) => Some(*field),
            _ => None,
        }
    }
}

/// Static, ordered definition of the sixteen canonical fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCatalog {
    fields: Vec<FieldDefinition>,
    loose_matching: bool,
}

impl Default for SchemaCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SchemaCatalog {
    /// Catalog with the built-in synonym table and loose matching enabled.
    pub fn builtin() -> Self {
        let fields = BUILTIN_SYNONYMS
            .iter()
            .map(|(field, synonyms)| {
                let mut definition = FieldDefinition::new(*field);
                for synonym in synonyms.iter() {
                    definition.add_synonym(synonym);
                }
                definition
            })
            .collect();
        Self {
            fields,
            loose_matching: true,
        }
    }

    pub fn with_loose_matching(mut self, enabled: bool) -> Self {
        self.loose_matching = enabled;
        self
    }

    pub fn set_loose_matching(&mut self, enabled: bool) {
        self.loose_matching = enabled;
    }

    pub fn loose_matching(&self) -> bool {
        self.loose_matching
    }

    /// Adds a synonym to `field`. Returns false if it was already known or blank.
    pub fn add_synonym(&mut self, field: CanonicalField, synonym: &str) -> bool {
        self.fields[field.index()].add_synonym(synonym)
    }

    /// Fields in catalog order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn synonyms(&self, field: CanonicalField) -> &[String] {
        self.fields[field.index()].synonyms()
    }

    /// Classify `label`: exact normalized match first, then loose match.
    ///
    /// The loose pass only runs when the exact pass found nothing, so an
    /// exact ambiguity is never hidden by a loose unique hit.
    pub fn classify(&self, label: &str) -> SynonymMatch {
        let normalized = normalize_label(label);
        if normalized.is_empty() {
            return SynonymMatch::NoMatch;
        }
        let exact = self.matching_fields(|synonym| *synonym == normalized);
        if !exact.is_empty() || !self.loose_matching {
            return Self::into_match(exact);
        }
        let key = loose_key(&normalized);
        if key.is_empty() {
            return SynonymMatch::NoMatch;
        }
        Self::into_match(self.matching_fields(|synonym| loose_key(synonym) == key))
    }

    /// The unique field recognizing `label`, or `None` when unknown or ambiguous.
    pub fn match_synonym(&self, label: &str) -> Option<CanonicalField> {
        self.classify(label).field()
    }

    fn matching_fields(&self, predicate: impl Fn(&String) -> bool) -> BTreeSet<CanonicalField> {
        self.fields
            .iter()
            .filter(|definition| definition.synonyms.iter().any(&predicate))
            .map(|definition| definition.field)
            .collect()
    }

    fn into_match(fields: BTreeSet<CanonicalField>) -> SynonymMatch {
        let mut fields: Vec<_> = fields.into_iter().collect();
        match fields.len() {
            0 => SynonymMatch::NoMatch,
            1 => SynonymMatch::Unique(fields.remove(0)),
            _ => SynonymMatch::Ambiguous(fields),
        }
    }
}
