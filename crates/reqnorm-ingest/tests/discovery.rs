use std::fs;

use reqnorm_ingest::{DocumentFilter, IngestError, list_documents};

fn names(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn lists_supported_documents_sorted() {
    let dir = tempfile::tempdir().expect("temp dir");
    for name in [
        "b.csv",
        "a.xlsx",
        "c.req.txt",
        "d.pdf",
        "README.md",
        ".hidden.csv",
        "~$a.xlsx",
        "image.png",
    ] {
        fs::write(dir.path().join(name), "x").expect("write file");
    }
    fs::create_dir(dir.path().join("nested.csv")).expect("create dir");

    let all = list_documents(dir.path(), DocumentFilter::All).expect("list all");
    assert_eq!(names(&all), vec!["a.xlsx", "b.csv", "c.req.txt", "d.pdf"]);

    let csv = list_documents(dir.path(), DocumentFilter::Csv).expect("list csv");
    assert_eq!(names(&csv), vec!["b.csv"]);

    let pdf = list_documents(dir.path(), DocumentFilter::Pdf).expect("list pdf");
    assert_eq!(names(&pdf), vec!["c.req.txt", "d.pdf"]);
}

#[test]
fn filter_parses_from_cli_text() {
    assert_eq!("Excel".parse::<DocumentFilter>(), Ok(DocumentFilter::Excel));
    assert!("word".parse::<DocumentFilter>().is_err());
}

#[test]
fn missing_directory_is_an_error() {
    let err = list_documents(std::path::Path::new("/nonexistent/dir"), DocumentFilter::All)
        .unwrap_err();
    assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
}
