#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod loader;
pub mod paths;

pub use crate::catalog::{FieldDefinition, SchemaCatalog, SynonymMatch, loose_key, normalize_label};
pub use crate::error::CatalogError;
pub use crate::paths::{CATALOG_ENV_VAR, catalog_override_path};
