//! Catalog override path resolution.

use std::path::{Path, PathBuf};

/// Environment variable naming a TOML file of extra synonyms.
pub const CATALOG_ENV_VAR: &str = "REQNORM_CATALOG";

/// Resolve the catalog override file.
///
/// Resolution order:
/// 1. an explicit path (from `--catalog` or the config file)
/// 2. `REQNORM_CATALOG` environment variable
///
/// Returns `None` when only the built-in catalog should be used.
pub fn catalog_override_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    std::env::var_os(CATALOG_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
