use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};

use reqnorm_map::{
    ColumnMapper, ColumnRequest, ColumnResolution, InteractiveResolver, MapError, MappingCache,
    MappingRequest, ResolutionReason, ScriptedResolver, SheetRequest, SheetResolution,
};
use reqnorm_model::{CanonicalField, ColumnTarget, DocumentIdentity, WarningKind};
use reqnorm_standards::SchemaCatalog;

fn identity(size: u64) -> DocumentIdentity {
    let modified = Utc
        .with_ymd_and_hms(2025, 9, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    DocumentIdentity::new("/docs/reqs.csv", modified, size)
}

fn labels(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|label| label.to_string()).collect()
}

fn request<'a>(identity: &'a DocumentIdentity, labels: &'a [String]) -> MappingRequest<'a> {
    MappingRequest {
        identity,
        selected_sheet: None,
        labels,
    }
}

/// Records every request it receives, answering from a fixed list.
struct RecordingResolver {
    answers: Vec<ColumnResolution>,
    seen: Vec<(String, ResolutionReason, BTreeSet<CanonicalField>)>,
}

impl InteractiveResolver for RecordingResolver {
    fn resolve_column(&mut self, request: &ColumnRequest<'_>) -> ColumnResolution {
        self.seen.push((
            request.label.to_string(),
            request.reason.clone(),
            request.claimed.clone(),
        ));
        if self.answers.is_empty() {
            ColumnResolution::Cancel
        } else {
            self.answers.remove(0)
        }
    }

    fn resolve_sheet(&mut self, _request: &SheetRequest<'_>) -> SheetResolution {
        SheetResolution::Cancel
    }
}

#[test]
fn rerun_on_unchanged_document_never_asks() {
    let catalog = SchemaCatalog::builtin();
    let mapper = ColumnMapper::new(&catalog);
    let dir = tempfile::tempdir().expect("temp dir");
    let cache_path = dir.path().join("cache.json");
    let doc = identity(512);
    let cols = labels(&["Req ID", "Desc", "Compliance"]);

    let mut cache = MappingCache::open(&cache_path);
    let mut first = ScriptedResolver::new()
        .answer("Desc", ColumnResolution::Field(CanonicalField::Definition));
    let outcome = mapper
        .resolve(&mut cache, request(&doc, &cols), &mut first)
        .expect("first pass");
    assert_eq!(first.column_calls(), ["Desc".to_string()]);
    assert!(outcome.changed);
    assert_eq!(outcome.stats.automatic, 2);
    assert_eq!(outcome.stats.interactive, 1);

    // Fresh handle, as a new run would have.
    let mut cache = MappingCache::open(&cache_path);
    let mut second = ScriptedResolver::new();
    let rerun = mapper
        .resolve(&mut cache, request(&doc, &cols), &mut second)
        .expect("second pass");
    assert_eq!(second.total_calls(), 0);
    assert!(!rerun.changed);
    assert_eq!(rerun.stats.from_cache, 3);
    assert_eq!(rerun.mapping, outcome.mapping);
}

#[test]
fn changed_size_invalidates_whole_decision() {
    let catalog = SchemaCatalog::builtin();
    let mapper = ColumnMapper::new(&catalog);
    let mut cache = MappingCache::in_memory();
    let cols = labels(&["Req ID", "Desc"]);

    let original = identity(100);
    let mut first = ScriptedResolver::new().answer("Desc", ColumnResolution::Skip);
    mapper
        .resolve(&mut cache, request(&original, &cols), &mut first)
        .expect("first pass");

    let edited = identity(140);
    let mut second = ScriptedResolver::new()
        .answer("Desc", ColumnResolution::Field(CanonicalField::Definition));
    let outcome = mapper
        .resolve(&mut cache, request(&edited, &cols), &mut second)
        .expect("edited pass");

    assert_eq!(second.column_calls(), ["Desc".to_string()]);
    assert_eq!(
        outcome.mapping.target("Desc"),
        Some(ColumnTarget::Field(CanonicalField::Definition))
    );
    assert!(
        outcome
            .warnings
            .iter()
            .any(|warning| warning.kind == WarningKind::StaleCache)
    );
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&original).is_none());
    let stored = cache.get(&edited).expect("new decision stored");
    assert_eq!(stored.column_mapping, outcome.mapping);
}

#[test]
fn earliest_label_wins_contested_field() {
    let catalog = SchemaCatalog::builtin();
    let mapper = ColumnMapper::new(&catalog);
    let mut cache = MappingCache::in_memory();
    let doc = identity(1);
    let cols = labels(&["Req ID", "Requirement ID", "Title"]);

    let mut resolver = RecordingResolver {
        answers: vec![ColumnResolution::Field(CanonicalField::OriginalIdentifier)],
        seen: Vec::new(),
    };
    let outcome = mapper
        .resolve(&mut cache, request(&doc, &cols), &mut resolver)
        .expect("resolve");

    assert_eq!(
        outcome.mapping.label_for(CanonicalField::RequirementId),
        Some("Req ID")
    );
    assert_eq!(resolver.seen.len(), 1);
    let (label, reason, claimed) = &resolver.seen[0];
    assert_eq!(label, "Requirement ID");
    assert_eq!(
        reason,
        &ResolutionReason::ConflictWith {
            field: CanonicalField::RequirementId,
            claimed_by: "Req ID".to_string(),
        }
    );
    assert!(claimed.contains(&CanonicalField::RequirementId));
    assert_eq!(
        outcome.mapping.target("Requirement ID"),
        Some(ColumnTarget::Field(CanonicalField::OriginalIdentifier))
    );
    assert_eq!(
        outcome.mapping.target("Title"),
        Some(ColumnTarget::Field(CanonicalField::Title))
    );
    assert!(
        outcome
            .warnings
            .iter()
            .any(|warning| warning.kind == WarningKind::MappingConflict)
    );
}

#[test]
fn cancellation_is_document_fatal_and_leaves_cache_alone() {
    let catalog = SchemaCatalog::builtin();
    let mapper = ColumnMapper::new(&catalog);
    let mut cache = MappingCache::in_memory();
    let doc = identity(7);
    let cols = labels(&["Req ID", "Mystery"]);

    let mut resolver = ScriptedResolver::new();
    let err = mapper
        .resolve(&mut cache, request(&doc, &cols), &mut resolver)
        .unwrap_err();
    assert!(err.is_cancellation());
    assert!(matches!(err, MapError::ColumnCancelled { ref label } if label == "Mystery"));
    assert!(cache.is_empty());
}

#[test]
fn repeated_claimed_answers_give_up() {
    let catalog = SchemaCatalog::builtin();
    let mapper = ColumnMapper::new(&catalog);
    let mut cache = MappingCache::in_memory();
    let doc = identity(9);
    let cols = labels(&["Title", "Heading"]);

    let mut resolver = ScriptedResolver::new()
        .then_column(ColumnResolution::Field(CanonicalField::Title))
        .then_column(ColumnResolution::Field(CanonicalField::Title))
        .then_column(ColumnResolution::Field(CanonicalField::Title));
    let err = mapper
        .resolve(&mut cache, request(&doc, &cols), &mut resolver)
        .unwrap_err();
    assert!(matches!(
        err,
        MapError::ConflictingAnswer { attempts: 3, field: CanonicalField::Title, .. }
    ));
    assert!(!err.is_cancellation());
    assert_eq!(resolver.column_calls().len(), 3);
}

#[test]
fn rejected_answer_is_reasked_once() {
    let catalog = SchemaCatalog::builtin();
    let mapper = ColumnMapper::new(&catalog);
    let mut cache = MappingCache::in_memory();
    let doc = identity(9);
    let cols = labels(&["Title", "Heading"]);

    let mut resolver = ScriptedResolver::new()
        .then_column(ColumnResolution::Field(CanonicalField::Title))
        .then_column(ColumnResolution::Field(CanonicalField::Remarks));
    let outcome = mapper
        .resolve(&mut cache, request(&doc, &cols), &mut resolver)
        .expect("resolve");
    assert_eq!(resolver.column_calls().len(), 2);
    assert_eq!(
        outcome.mapping.label_for(CanonicalField::Remarks),
        Some("Heading")
    );
    assert_eq!(outcome.mapping.claimed_fields().len(), 2);
}

#[test]
fn non_interactive_skips_unresolved_columns() {
    let catalog = SchemaCatalog::builtin();
    let mapper = ColumnMapper::new(&catalog);
    let mut cache = MappingCache::in_memory();
    let doc = identity(3);
    let cols = labels(&["ID", "Internal Flag", "Status"]);

    let mut resolver = ScriptedResolver::non_interactive();
    let outcome = mapper
        .resolve(&mut cache, request(&doc, &cols), &mut resolver)
        .expect("resolve");
    assert_eq!(outcome.mapping.target("Internal Flag"), Some(ColumnTarget::Skip));
    assert_eq!(outcome.stats.skipped, 1);
    assert_eq!(
        outcome.mapping.target("Status"),
        Some(ColumnTarget::Field(CanonicalField::Compliance))
    );
}

#[test]
fn cached_mapping_is_ignored_for_a_different_sheet() {
    let catalog = SchemaCatalog::builtin();
    let mapper = ColumnMapper::new(&catalog);
    let mut cache = MappingCache::in_memory();
    let doc = identity(11);
    let cols = labels(&["Owner Notes"]);

    let mut first = ScriptedResolver::new().answer("Owner Notes", ColumnResolution::Skip);
    mapper
        .resolve(
            &mut cache,
            MappingRequest {
                identity: &doc,
                selected_sheet: Some("Sheet1"),
                labels: &cols,
            },
            &mut first,
        )
        .expect("first");

    let mut second = ScriptedResolver::new().answer("Owner Notes", ColumnResolution::Skip);
    mapper
        .resolve(
            &mut cache,
            MappingRequest {
                identity: &doc,
                selected_sheet: Some("Sheet2"),
                labels: &cols,
            },
            &mut second,
        )
        .expect("second");
    assert_eq!(second.column_calls().len(), 1);
    let stored = cache.get(&doc).expect("stored");
    assert_eq!(stored.selected_sheet.as_deref(), Some("Sheet2"));
}
