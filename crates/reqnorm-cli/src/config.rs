//! Run settings: CLI flags over environment over `reqnorm.toml` over defaults.
//!
//! The config file is looked up at an explicit `--config` path, then
//! `./reqnorm.toml`, then the platform config directory:
//! - Linux: ~/.config/reqnorm/reqnorm.toml
//! - macOS: ~/Library/Application Support/org.reqnorm.reqnorm/reqnorm.toml
//! - Windows: %APPDATA%/reqnorm/config/reqnorm.toml

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use reqnorm_map::DEFAULT_CACHE_PATH;
use reqnorm_model::ComplianceValue;
use reqnorm_normalization::{ComplianceOptions, NormalizationOptions, TextOptions};
use reqnorm_output::{DEFAULT_DELIMITER, OutputFormat, WriteOptions};
use reqnorm_standards::{CATALOG_ENV_VAR, SchemaCatalog};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "reqnorm";
const APP_NAME: &str = "reqnorm";
pub const CONFIG_FILENAME: &str = "reqnorm.toml";

/// Environment variable naming the mapping cache file.
pub const CACHE_ENV_VAR: &str = "REQNORM_CACHE";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Contents of `reqnorm.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub cache_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub delimiter: Option<char>,
    pub loose_matching: Option<bool>,
    pub ascii_fold: Option<bool>,
    pub compliance: ComplianceSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComplianceSection {
    /// Extra raw value -> `C` / `NC` / `PC`.
    pub synonyms: BTreeMap<String, ComplianceValue>,
}

impl ConfigFile {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Default config file in the platform config directory.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => std::iter::once(PathBuf::from(CONFIG_FILENAME))
            .chain(user_config_path())
            .collect(),
    }
}

/// Loads the first config file found.
///
/// A missing or unparsable file falls back to defaults with a warning;
/// configuration never stops a run.
pub fn load_config_file(explicit: Option<&Path>) -> (ConfigFile, Option<PathBuf>) {
    for path in candidate_paths(explicit) {
        match fs::read_to_string(&path) {
            Ok(content) => match ConfigFile::parse(&content) {
                Ok(file) => {
                    info!(path = %path.display(), "loaded config file");
                    return (file, Some(path));
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "failed to parse config file, using defaults");
                    return (ConfigFile::default(), None);
                }
            },
            Err(error) if error.kind() == ErrorKind::NotFound => {
                if explicit.is_some() {
                    warn!(path = %path.display(), "config file not found, using defaults");
                }
                debug!(path = %path.display(), "no config file");
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to read config file, using defaults");
                return (ConfigFile::default(), None);
            }
        }
    }
    (ConfigFile::default(), None)
}

/// Environment values consulted between flags and the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub cache_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
}

impl EnvOverrides {
    pub fn from_process() -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };
        Self {
            cache_path: var(CACHE_ENV_VAR),
            catalog_path: var(CATALOG_ENV_VAR),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub cache_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub cache_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub delimiter: char,
    /// `None` keeps whatever the catalog (built-in or override file) says.
    pub loose_matching: Option<bool>,
    pub ascii_fold: bool,
    pub compliance_synonyms: BTreeMap<String, ComplianceValue>,
    /// Config file the settings were read from, if any.
    pub source: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(
            ConfigFile::default(),
            None,
            &EnvOverrides::default(),
            &CliOverrides::default(),
        )
    }
}

impl Settings {
    pub fn resolve(
        file: ConfigFile,
        source: Option<PathBuf>,
        env: &EnvOverrides,
        cli: &CliOverrides,
    ) -> Self {
        let cache_path = cli
            .cache_path
            .clone()
            .or_else(|| env.cache_path.clone())
            .or(file.cache_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));
        let catalog_path = cli
            .catalog_path
            .clone()
            .or_else(|| env.catalog_path.clone())
            .or(file.catalog_path);
        let output_dir = cli
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        Self {
            cache_path,
            catalog_path,
            output_dir,
            delimiter: file.delimiter.unwrap_or(DEFAULT_DELIMITER),
            loose_matching: file.loose_matching,
            ascii_fold: file.ascii_fold.unwrap_or(false),
            compliance_synonyms: file.compliance.synonyms,
            source,
        }
    }

    /// Loads the config file and applies the process environment and `cli`.
    pub fn load(config: Option<&Path>, cli: &CliOverrides) -> Self {
        let (file, source) = load_config_file(config);
        Self::resolve(file, source, &EnvOverrides::from_process(), cli)
    }

    pub fn catalog(&self) -> Result<SchemaCatalog> {
        let mut catalog = match &self.catalog_path {
            Some(path) => SchemaCatalog::load(path)
                .with_context(|| format!("load catalog overrides from {}", path.display()))?,
            None => SchemaCatalog::builtin(),
        };
        if let Some(loose) = self.loose_matching {
            catalog.set_loose_matching(loose);
        }
        Ok(catalog)
    }

    pub fn normalization(&self) -> NormalizationOptions {
        let custom: HashMap<String, ComplianceValue> = self
            .compliance_synonyms
            .iter()
            .map(|(raw, value)| (raw.clone(), *value))
            .collect();
        NormalizationOptions {
            text: TextOptions::new().with_ascii_fold(self.ascii_fold),
            compliance: ComplianceOptions::new().with_custom_map(custom),
        }
    }

    pub fn write_options(&self, format: OutputFormat) -> Result<WriteOptions> {
        WriteOptions::new(format)
            .with_delimiter(self.delimiter)
            .context("invalid delimiter in configuration")
    }
}
