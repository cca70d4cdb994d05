//! Choice of which sheet or section of a document to read.

use tracing::{debug, info, warn};

use reqnorm_model::DocumentIdentity;

use crate::cache::MappingCache;
use crate::error::{MapError, Result};
use crate::resolver::{InteractiveResolver, SheetRequest, SheetResolution};

/// How a sheet was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSource {
    /// The document has exactly one sheet.
    Only,
    Cached,
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetChoice {
    pub name: String,
    pub source: SheetSource,
}

impl SheetChoice {
    /// Name to store in the cached decision. Single-sheet documents store none.
    pub fn persisted_name(&self) -> Option<&str> {
        match self.source {
            SheetSource::Only => None,
            SheetSource::Cached | SheetSource::Interactive => Some(&self.name),
        }
    }
}

/// Picks a sheet, reusing a cached selection only for an unchanged identity.
#[derive(Debug, Clone)]
pub struct SheetSelector {
    max_attempts: usize,
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl SheetSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(
        &self,
        cache: &MappingCache,
        identity: &DocumentIdentity,
        sheets: &[String],
        resolver: &mut dyn InteractiveResolver,
    ) -> Result<SheetChoice> {
        match sheets {
            [] => return Err(MapError::NoSheets),
            [only] => {
                return Ok(SheetChoice {
                    name: only.clone(),
                    source: SheetSource::Only,
                });
            }
            _ => {}
        }

        if let Some(cached) = cache
            .get(identity)
            .and_then(|decision| decision.selected_sheet.as_deref())
        {
            if sheets.iter().any(|sheet| sheet == cached) {
                debug!(document = %identity.path.display(), sheet = cached, "reusing cached sheet");
                return Ok(SheetChoice {
                    name: cached.to_string(),
                    source: SheetSource::Cached,
                });
            }
            warn!(sheet = cached, "cached sheet no longer present");
        }

        let request = SheetRequest {
            document: &identity.path,
            sheets,
        };
        let mut last_unknown = String::new();
        for _ in 0..self.max_attempts {
            match resolver.resolve_sheet(&request) {
                SheetResolution::Cancel => {
                    info!(document = %identity.path.display(), "sheet selection cancelled");
                    return Err(MapError::SheetCancelled);
                }
                SheetResolution::Sheet(name) if sheets.contains(&name) => {
                    return Ok(SheetChoice {
                        name,
                        source: SheetSource::Interactive,
                    });
                }
                SheetResolution::Sheet(name) => {
                    warn!(sheet = %name, "answer is not one of the document's sheets");
                    last_unknown = name;
                }
            }
        }
        Err(MapError::UnknownSheet { name: last_unknown })
    }
}
