use std::fs;
use std::path::{Path, PathBuf};

use reqnorm_core::{BatchOptions, DocumentError, ProcessingContext, StandardizationPipeline};
use reqnorm_ingest::{DocumentReader, IngestError, RawDocument, RawRow, SheetData};
use reqnorm_map::{ColumnResolution, MappingCache, ScriptedResolver, SheetResolution};
use reqnorm_model::{CanonicalField, ColumnTarget, DocumentIdentity, WarningKind};

const SCENARIO: &str = "Req ID,Desc,Compliance\nR-1,The system shall log events.,compliant\n";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write document");
    path
}

fn pipeline(cache_path: &Path) -> StandardizationPipeline {
    StandardizationPipeline::new(ProcessingContext::default(), MappingCache::open(cache_path))
}

fn desc_is_definition() -> ScriptedResolver {
    ScriptedResolver::new().answer("Desc", ColumnResolution::Field(CanonicalField::Definition))
}

#[test]
fn scenario_document_yields_one_canonical_record() {
    let dir = tempfile::tempdir().expect("temp dir");
    let doc = write(dir.path(), "reqs.csv", SCENARIO);
    let mut pipeline = pipeline(&dir.path().join("cache.json"));
    let mut resolver = desc_is_definition();

    let report = pipeline
        .process_document(&doc, &mut resolver)
        .expect("document processed");
    assert_eq!(resolver.column_calls(), ["Desc".to_string()]);
    assert_eq!(report.records.len(), 1);
    assert!(report.warnings.is_empty());

    let record = &report.records[0];
    assert_eq!(record.get(CanonicalField::RequirementId), "R-1");
    assert_eq!(
        record.get(CanonicalField::Definition),
        "The system shall log events."
    );
    assert_eq!(record.get(CanonicalField::Compliance), "C");
    let filled: Vec<_> = CanonicalField::ALL
        .iter()
        .filter(|field| !record.get(**field).is_empty())
        .collect();
    assert_eq!(filled.len(), 3);
    assert_eq!(record.values().len(), 16);
}

#[test]
fn unchanged_document_is_not_asked_about_again() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache_path = dir.path().join("cache.json");
    let doc = write(dir.path(), "reqs.csv", SCENARIO);

    let first = pipeline(&cache_path)
        .process_document(&doc, &mut desc_is_definition())
        .expect("first run");

    let mut silent = ScriptedResolver::new();
    let second = pipeline(&cache_path)
        .process_document(&doc, &mut silent)
        .expect("second run");
    assert_eq!(silent.total_calls(), 0);
    assert_eq!(second.mapping, first.mapping);
    assert_eq!(second.stats.from_cache, 3);
    assert_eq!(second.records, first.records);
}

#[test]
fn edited_document_is_resolved_again_and_replaces_its_entry() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache_path = dir.path().join("cache.json");
    let doc = write(dir.path(), "reqs.csv", SCENARIO);
    pipeline(&cache_path)
        .process_document(&doc, &mut desc_is_definition())
        .expect("first run");

    write(
        dir.path(),
        "reqs.csv",
        "Req ID,Desc,Compliance,Owner\nR-1,The system shall log events.,NC,OBC\n",
    );
    let mut pipeline = pipeline(&cache_path);
    let mut resolver = desc_is_definition();
    let report = pipeline
        .process_document(&doc, &mut resolver)
        .expect("edited run");
    assert_eq!(resolver.column_calls(), ["Desc".to_string()]);
    assert_eq!(report.records[0].get(CanonicalField::Compliance), "NC");
    assert_eq!(report.records[0].get(CanonicalField::Responsibility), "OBC");
    assert!(
        report
            .warnings
            .iter()
            .any(|warning| warning.kind == WarningKind::StaleCache)
    );

    let cache = pipeline.into_cache();
    assert_eq!(cache.len(), 1);
    let identity = DocumentIdentity::from_path(&doc).expect("identity");
    let stored = cache.get(&identity).expect("new entry");
    assert_eq!(stored.column_mapping.len(), 4);
    assert_eq!(
        stored.column_mapping.target("Owner"),
        Some(ColumnTarget::Field(CanonicalField::Responsibility))
    );
}

#[test]
fn batch_keeps_going_after_cancelled_and_unsupported_documents() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cancelled = write(dir.path(), "a.csv", "ID,Mystery\nR-1,?\n");
    let unsupported = write(dir.path(), "b.xlsx", "PK not really a workbook");
    let good = write(dir.path(), "c.csv", "ID;Title;Status\nR-7;Boot;partially compliant\nR-8;Halt;TBD\n");
    let paths = vec![cancelled, unsupported, good];

    let mut pipeline = pipeline(&dir.path().join("cache.json"));
    let mut resolver = ScriptedResolver::new();
    let mut seen = Vec::new();
    let result = pipeline.process_batch_with(
        &paths,
        &mut resolver,
        BatchOptions { read_threads: 2 },
        |outcome| seen.push(outcome.path.clone()),
    );

    assert_eq!(seen, paths);
    assert_eq!(result.succeeded().count(), 1);
    assert_eq!(result.cancelled_count(), 1);
    assert!(result.has_failures());
    let errors: Vec<_> = result.failed().map(|(_, error)| error).collect();
    assert!(errors[0].is_cancellation());
    assert!(matches!(
        errors[1],
        DocumentError::Read(IngestError::UnsupportedFormat { .. })
    ));

    let compliance: Vec<_> = result
        .records()
        .map(|record| record.get(CanonicalField::Compliance).to_string())
        .collect();
    assert_eq!(compliance, ["PC", "TBD"]);
    assert_eq!(result.warning_count(), 1);

    // Only the completed document reached the cache.
    assert_eq!(pipeline.cache().len(), 1);
}

#[test]
fn empty_document_has_no_columns() {
    let dir = tempfile::tempdir().expect("temp dir");
    let doc = write(dir.path(), "empty.csv", "\n\n");
    let err = pipeline(&dir.path().join("cache.json"))
        .process_document(&doc, &mut ScriptedResolver::new())
        .unwrap_err();
    assert!(matches!(err, DocumentError::NoColumns { .. }));
    assert!(!err.is_cancellation());
}

#[test]
fn missing_file_fails_on_identity() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = pipeline(&dir.path().join("cache.json"))
        .process_document(&dir.path().join("absent.csv"), &mut ScriptedResolver::new())
        .unwrap_err();
    assert!(matches!(err, DocumentError::Identity { .. }));
}

#[test]
fn unreadable_cache_surfaces_a_warning() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache_path = write(dir.path(), "cache.json", "not json at all");
    let pipeline = pipeline(&cache_path);
    let warning = pipeline.cache_warning().expect("cache warning");
    assert_eq!(warning.kind, WarningKind::CacheUnreadable);
}

#[test]
fn failed_cache_write_keeps_records_and_persists_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache_path = dir.path().join("cache.json");
    // A directory where the cache file belongs makes every save fail.
    fs::create_dir(&cache_path).expect("blocking dir");
    let first = write(dir.path(), "a.csv", SCENARIO);
    let second = write(dir.path(), "b.csv", SCENARIO);

    let mut pipeline = pipeline(&cache_path);
    let report = pipeline
        .process_document(&first, &mut desc_is_definition())
        .expect("document still processed");
    assert_eq!(report.records.len(), 1);
    assert!(
        report
            .warnings
            .iter()
            .any(|warning| warning.kind == WarningKind::CacheUnwritable)
    );
    assert!(pipeline.cache().is_empty());

    fs::remove_dir(&cache_path).expect("unblock cache path");
    let report = pipeline
        .process_document(&second, &mut desc_is_definition())
        .expect("second document");
    assert!(report.warnings.is_empty());

    let reopened = MappingCache::open(&cache_path);
    assert_eq!(reopened.len(), 1);
    let first_identity = DocumentIdentity::from_path(&first).expect("identity");
    let second_identity = DocumentIdentity::from_path(&second).expect("identity");
    assert!(reopened.get(&first_identity).is_none());
    assert!(reopened.get(&second_identity).is_some());
}

/// Serves two fixed sheets for any existing file.
struct TwoSheetReader;

impl DocumentReader for TwoSheetReader {
    fn read_document(&self, path: &Path) -> reqnorm_ingest::Result<RawDocument> {
        let sheet = |name: &str, columns: &[&str], values: &[&str]| {
            let mut sheet = SheetData::new(name, columns.iter().map(|c| c.to_string()).collect());
            let row: RawRow = columns
                .iter()
                .zip(values)
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect();
            sheet.rows.push(row);
            sheet
        };
        Ok(RawDocument {
            path: path.to_path_buf(),
            sheets: vec![
                sheet("A", &["Req ID"], &["A-1"]),
                sheet("B", &["Req ID", "Compliance"], &["B-1", "compliant"]),
            ],
        })
    }
}

fn workbook_pipeline(cache_path: &Path) -> StandardizationPipeline<TwoSheetReader> {
    StandardizationPipeline::with_reader(
        ProcessingContext::default(),
        MappingCache::open(cache_path),
        TwoSheetReader,
    )
}

#[test]
fn sheet_choice_is_asked_once_per_document_version() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache_path = dir.path().join("cache.json");
    let doc = write(dir.path(), "book.csv", "two sheets");

    let mut resolver = ScriptedResolver::new().then_sheet(SheetResolution::Sheet("B".into()));
    let first = workbook_pipeline(&cache_path)
        .process_document(&doc, &mut resolver)
        .expect("first run");
    assert_eq!(resolver.sheet_calls(), 1);
    assert_eq!(first.sheet, "B");
    assert_eq!(first.records[0].get(CanonicalField::RequirementId), "B-1");

    let mut silent = ScriptedResolver::new();
    let second = workbook_pipeline(&cache_path)
        .process_document(&doc, &mut silent)
        .expect("second run");
    assert_eq!(silent.total_calls(), 0);
    assert_eq!(second.sheet, "B");
    assert_eq!(second.stats.from_cache, 2);
    assert_eq!(second.records, first.records);

    write(dir.path(), "book.csv", "two sheets, now longer");
    let mut resolver = ScriptedResolver::new().then_sheet(SheetResolution::Sheet("A".into()));
    let third = workbook_pipeline(&cache_path)
        .process_document(&doc, &mut resolver)
        .expect("changed run");
    assert_eq!(resolver.sheet_calls(), 1);
    assert_eq!(third.sheet, "A");
    assert_eq!(third.records[0].get(CanonicalField::RequirementId), "A-1");
}
