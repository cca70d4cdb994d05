//! TOML catalog overrides layered on top of the built-in synonym table.
//!
//! ```toml
//! loose_matching = true
//!
//! [fields."Requirement ID"]
//! synonyms = ["req no", "requirement number"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use reqnorm_model::CanonicalField;

use crate::catalog::SchemaCatalog;
use crate::error::CatalogError;
use crate::paths::catalog_override_path;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    loose_matching: Option<bool>,
    #[serde(default)]
    fields: BTreeMap<String, FieldOverride>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldOverride {
    #[serde(default)]
    synonyms: Vec<String>,
}

impl SchemaCatalog {
    /// Built-in catalog extended with the overrides in `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        Self::from_toml_str(&text, path)
    }

    /// Parse overrides from TOML text; `origin` is used only in error messages.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text).map_err(|source| CatalogError::Toml {
            path: origin.to_path_buf(),
            source,
        })?;
        let mut catalog = SchemaCatalog::builtin();
        if let Some(loose) = file.loose_matching {
            catalog.set_loose_matching(loose);
        }
        for (name, overrides) in file.fields {
            let field: CanonicalField =
                name.parse().map_err(|_| CatalogError::UnknownField {
                    path: origin.to_path_buf(),
                    field: name.clone(),
                })?;
            for synonym in &overrides.synonyms {
                if synonym.trim().is_empty() {
                    return Err(CatalogError::EmptySynonym {
                        path: origin.to_path_buf(),
                        field: field.label().to_string(),
                    });
                }
                catalog.add_synonym(field, synonym);
            }
        }
        Ok(catalog)
    }

    /// Built-in catalog, extended from `explicit` or `REQNORM_CATALOG` when set.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, CatalogError> {
        match catalog_override_path(explicit) {
            Some(path) => Self::load(&path),
            None => Ok(Self::builtin()),
        }
    }
}
