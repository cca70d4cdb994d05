use std::fs;
use std::path::PathBuf;

use reqnorm_cli::config::{CliOverrides, ConfigFile, EnvOverrides, Settings, load_config_file};
use reqnorm_model::{CanonicalField, ComplianceValue};
use reqnorm_normalization::{ComplianceOutcome, normalize_compliance_with};
use reqnorm_output::OutputFormat;

const FILE: &str = r#"
cache_path = "from-file.json"
output_dir = "exports"
delimiter = ","
loose_matching = false
ascii_fold = true

[compliance.synonyms]
"meets" = "C"
"fails" = "NC"
"#;

#[test]
fn flags_beat_environment_beat_file() {
    let file = ConfigFile::parse(FILE).expect("valid config");
    let env = EnvOverrides {
        cache_path: Some(PathBuf::from("from-env.json")),
        catalog_path: Some(PathBuf::from("env-catalog.toml")),
    };
    let cli = CliOverrides {
        catalog_path: Some(PathBuf::from("cli-catalog.toml")),
        ..CliOverrides::default()
    };
    let settings = Settings::resolve(file, None, &env, &cli);
    assert_eq!(settings.cache_path, PathBuf::from("from-env.json"));
    assert_eq!(settings.catalog_path, Some(PathBuf::from("cli-catalog.toml")));
    assert_eq!(settings.output_dir, PathBuf::from("exports"));
    assert_eq!(settings.delimiter, ',');
    assert!(settings.ascii_fold);
}

#[test]
fn defaults_without_any_source() {
    let settings = Settings::default();
    assert_eq!(
        settings.cache_path,
        PathBuf::from(".cache/file_processing_cache.json")
    );
    assert_eq!(settings.output_dir, PathBuf::from("output"));
    assert_eq!(settings.delimiter, ';');
    assert_eq!(settings.loose_matching, None);
    assert!(!settings.ascii_fold);
    assert!(settings.catalog().expect("builtin").loose_matching());
}

#[test]
fn config_synonyms_reach_the_compliance_normalizer() {
    let file = ConfigFile::parse(FILE).expect("valid config");
    let settings = Settings::resolve(file, None, &EnvOverrides::default(), &CliOverrides::default());
    assert_eq!(
        settings.compliance_synonyms.get("meets"),
        Some(&ComplianceValue::Compliant)
    );
    let options = settings.normalization();
    assert_eq!(
        normalize_compliance_with("Meets", &options.compliance),
        ComplianceOutcome::Normalized(ComplianceValue::Compliant)
    );
    assert!(options.text.ascii_fold);

    let catalog = settings.catalog().expect("catalog");
    assert!(!catalog.loose_matching());
    assert_eq!(
        settings
            .write_options(OutputFormat::Csv)
            .expect("delimiter")
            .delimiter,
        b','
    );
}

#[test]
fn unknown_keys_and_codes_are_rejected_by_the_parser() {
    assert!(ConfigFile::parse("colour = true").is_err());
    assert!(ConfigFile::parse("[compliance.synonyms]\nmeh = \"maybe\"").is_err());
}

#[test]
fn unparsable_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("reqnorm.toml");
    fs::write(&path, "delimiter = [").expect("write config");
    let (file, source) = load_config_file(Some(&path));
    assert_eq!(file, ConfigFile::default());
    assert_eq!(source, None);

    fs::write(&path, "output_dir = \"out\"").expect("write config");
    let (file, source) = load_config_file(Some(&path));
    assert_eq!(file.output_dir, Some(PathBuf::from("out")));
    assert_eq!(source, Some(path));
}

#[test]
fn catalog_file_from_settings_extends_synonyms() {
    let dir = tempfile::tempdir().expect("temp dir");
    let catalog_path = dir.path().join("catalog.toml");
    fs::write(
        &catalog_path,
        "[fields.\"Requirement ID\"]\nsynonyms = [\"Req Number\"]\n",
    )
    .expect("write catalog");
    let cli = CliOverrides {
        catalog_path: Some(catalog_path),
        ..CliOverrides::default()
    };
    let settings = Settings::resolve(ConfigFile::default(), None, &EnvOverrides::default(), &cli);
    let catalog = settings.catalog().expect("catalog");
    assert_eq!(
        catalog.match_synonym("req number"),
        Some(CanonicalField::RequirementId)
    );

    let missing = CliOverrides {
        catalog_path: Some(dir.path().join("absent.toml")),
        ..CliOverrides::default()
    };
    let settings = Settings::resolve(ConfigFile::default(), None, &EnvOverrides::default(), &missing);
    assert!(settings.catalog().is_err());
}
