use std::fs;

use chrono::{TimeZone, Utc};

use reqnorm_map::{
    MapError, MappingCache, ScriptedResolver, SheetResolution, SheetSelector, SheetSource,
};
use reqnorm_model::{CachedDecision, CanonicalField, ColumnMapping, ColumnTarget, DocumentIdentity};

fn identity(path: &str, size: u64) -> DocumentIdentity {
    let modified = Utc
        .with_ymd_and_hms(2025, 1, 20, 16, 45, 0)
        .single()
        .expect("valid timestamp");
    DocumentIdentity::new(path, modified, size)
}

fn decision(identity: DocumentIdentity, sheet: Option<&str>) -> CachedDecision {
    let mut mapping = ColumnMapping::new();
    mapping
        .insert("Req ID", ColumnTarget::Field(CanonicalField::RequirementId))
        .expect("insert");
    CachedDecision::new(identity, sheet.map(str::to_string), mapping)
}

fn sheets(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn put_persists_human_readable_json() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("cache.json");
    let mut cache = MappingCache::open(&path);
    assert!(cache.is_empty());

    cache
        .put(decision(identity("/docs/a.csv", 10), Some("Reqs")))
        .expect("put");

    let text = fs::read_to_string(&path).expect("cache written");
    assert!(text.contains("\"version\": 1"));
    assert!(text.contains("\"Req ID\": \"Requirement ID\""));
    assert!(text.contains("\"selected_sheet\": \"Reqs\""));

    let reopened = MappingCache::open(&path);
    assert_eq!(reopened.len(), 1);
    assert!(reopened.load_error().is_none());
    let stored = reopened
        .get(&identity("/docs/a.csv", 10))
        .expect("entry survives reopen");
    assert_eq!(stored.selected_sheet.as_deref(), Some("Reqs"));
}

#[test]
fn corrupt_file_is_treated_as_empty_then_replaced() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("cache.json");
    fs::write(&path, "{ not json").expect("write corrupt cache");

    let mut cache = MappingCache::open(&path);
    assert!(cache.is_empty());
    assert!(cache.load_error().is_some());

    cache
        .put(decision(identity("/docs/b.csv", 1), None))
        .expect("put after corruption");
    let reopened = MappingCache::open(&path);
    assert_eq!(reopened.len(), 1);
    assert!(reopened.load_error().is_none());
}

#[test]
fn newer_format_version_is_not_trusted() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("cache.json");
    fs::write(&path, r#"{"version": 99, "entries": {}}"#).expect("write cache");

    let cache = MappingCache::open(&path);
    assert!(cache.is_empty());
    assert!(cache.load_error().is_some_and(|error| error.contains("99")));
}

#[test]
fn entries_for_other_paths_survive_put() {
    let mut cache = MappingCache::in_memory();
    cache
        .put(decision(identity("/docs/a.csv", 1), None))
        .expect("put a");
    cache
        .put(decision(identity("/docs/b.csv", 1), None))
        .expect("put b");
    cache
        .put(decision(identity("/docs/a.csv", 2), None))
        .expect("put a again");
    assert_eq!(cache.len(), 2);
    assert!(cache.get(&identity("/docs/b.csv", 1)).is_some());
}

#[test]
fn clear_removes_backing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("cache.json");
    let mut cache = MappingCache::open(&path);
    cache
        .put(decision(identity("/docs/a.csv", 1), None))
        .expect("put");
    assert!(path.exists());

    cache.clear().expect("clear");
    assert!(!path.exists());
    assert!(cache.is_empty());
    // Clearing an absent file is not an error.
    cache.clear().expect("clear again");
}

#[test]
fn sheet_selection_reuses_cache_for_same_identity() {
    let mut cache = MappingCache::in_memory();
    let doc = identity("/docs/book.xlsx", 2048);
    cache
        .put(decision(doc.clone(), Some("Requirements")))
        .expect("put");
    let selector = SheetSelector::new();
    let names = sheets(&["Cover", "Requirements"]);

    let mut resolver = ScriptedResolver::new();
    let choice = selector
        .select(&cache, &doc, &names, &mut resolver)
        .expect("select");
    assert_eq!(choice.name, "Requirements");
    assert_eq!(choice.source, SheetSource::Cached);
    assert_eq!(resolver.sheet_calls(), 0);

    let edited = identity("/docs/book.xlsx", 4096);
    let mut resolver = ScriptedResolver::new().then_sheet(SheetResolution::Sheet("Cover".into()));
    let choice = selector
        .select(&cache, &edited, &names, &mut resolver)
        .expect("select edited");
    assert_eq!(choice.name, "Cover");
    assert_eq!(choice.source, SheetSource::Interactive);
    assert_eq!(resolver.sheet_calls(), 1);
}

#[test]
fn sheet_selection_edge_cases() {
    let cache = MappingCache::in_memory();
    let doc = identity("/docs/book.xlsx", 1);
    let selector = SheetSelector::new();

    let mut resolver = ScriptedResolver::new();
    let only = selector
        .select(&cache, &doc, &sheets(&["Data"]), &mut resolver)
        .expect("single sheet");
    assert_eq!(only.persisted_name(), None);
    assert_eq!(resolver.sheet_calls(), 0);

    let err = selector
        .select(&cache, &doc, &[], &mut resolver)
        .unwrap_err();
    assert!(matches!(err, MapError::NoSheets));

    let err = selector
        .select(&cache, &doc, &sheets(&["A", "B"]), &mut resolver)
        .unwrap_err();
    assert!(err.is_cancellation());

    let mut first = ScriptedResolver::non_interactive();
    let choice = selector
        .select(&cache, &doc, &sheets(&["A", "B"]), &mut first)
        .expect("non-interactive");
    assert_eq!(choice.persisted_name(), Some("A"));
}
