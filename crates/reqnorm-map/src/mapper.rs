//! Column mapping resolution.
//!
//! Labels are resolved strictly in source order. A label keeps its cached
//! target, or takes its unique catalog match, only while that target is
//! still unclaimed; the earliest label wins and later contenders are routed
//! to the operator.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use reqnorm_model::{
    CachedDecision, CanonicalField, ColumnMapping, ColumnTarget, DocumentIdentity,
    ProcessingWarning, WarningKind,
};
use reqnorm_standards::{SchemaCatalog, SynonymMatch};

use crate::cache::MappingCache;
use crate::error::{MapError, Result};
use crate::resolver::{ColumnRequest, ColumnResolution, InteractiveResolver, ResolutionReason};
use crate::state::{MappingOutcome, MappingStats};
use crate::suggest::closest_free_field;

/// How many times an answer naming a claimed field is re-asked.
pub const MAX_CONFLICTING_ANSWERS: usize = 3;

/// Input to one mapping pass.
#[derive(Debug, Clone, Copy)]
pub struct MappingRequest<'a> {
    pub identity: &'a DocumentIdentity,
    /// Sheet the labels come from; stored alongside the mapping.
    pub selected_sheet: Option<&'a str>,
    /// Raw labels in source order.
    pub labels: &'a [String],
}

/// Resolves source labels against the catalog, the cache and the operator.
#[derive(Debug, Clone)]
pub struct ColumnMapper<'a> {
    catalog: &'a SchemaCatalog,
    max_conflicting_answers: usize,
}

/// Mutable state of one pass.
struct Pass<'r> {
    document: &'r DocumentIdentity,
    mapping: ColumnMapping,
    stats: MappingStats,
    warnings: Vec<ProcessingWarning>,
    changed: bool,
}

impl Pass<'_> {
    fn claimed(&self) -> BTreeSet<CanonicalField> {
        self.mapping.claimed_fields()
    }

    fn owner_of(&self, field: CanonicalField) -> Option<String> {
        self.mapping.label_for(field).map(str::to_string)
    }

    fn record(&mut self, label: &str, target: ColumnTarget) {
        // Callers only pass unclaimed fields or skip.
        if let Err(error) = self.mapping.insert(label, target) {
            warn!(%error, "mapping insert refused");
        }
    }

    fn conflict(
        &mut self,
        label: &str,
        field: CanonicalField,
        claimed_by: String,
        origin: &str,
    ) -> ResolutionReason {
        warn!(
            document = %self.document.path.display(),
            label,
            field = %field,
            claimed_by = %claimed_by,
            origin,
            "target already claimed by an earlier column"
        );
        self.warnings.push(
            ProcessingWarning::new(
                WarningKind::MappingConflict,
                &self.document.path,
                format!("{origin} target {field} is already claimed by '{claimed_by}'"),
            )
            .for_column(label),
        );
        ResolutionReason::ConflictWith { field, claimed_by }
    }
}

impl<'a> ColumnMapper<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self {
            catalog,
            max_conflicting_answers: MAX_CONFLICTING_ANSWERS,
        }
    }

    pub fn with_max_conflicting_answers(mut self, attempts: usize) -> Self {
        self.max_conflicting_answers = attempts.max(1);
        self
    }

    /// Produce a complete mapping for `request.labels`.
    ///
    /// On success the decision is written to `cache` under the current
    /// identity whenever it differs from what was cached. A failed write
    /// becomes a [`WarningKind::CacheUnwritable`] warning. Cancellation and
    /// repeated conflicting answers are returned as document-fatal errors and
    /// leave the cache untouched.
    pub fn resolve(
        &self,
        cache: &mut MappingCache,
        request: MappingRequest<'_>,
        resolver: &mut dyn InteractiveResolver,
    ) -> Result<MappingOutcome> {
        let identity = request.identity;
        let mut pass = Pass {
            document: identity,
            mapping: ColumnMapping::new(),
            stats: MappingStats::default(),
            warnings: Vec::new(),
            changed: false,
        };

        if let Some(stale) = cache.stale_entry(identity) {
            info!(
                document = %identity.path.display(),
                cached = %stale.identity,
                "document changed since its cached decision, resolving afresh"
            );
            pass.warnings.push(ProcessingWarning::new(
                WarningKind::StaleCache,
                &identity.path,
                format!("cached decision for {} ignored", stale.identity),
            ));
        }
        let cached = cache
            .get(identity)
            .filter(|decision| decision.selected_sheet.as_deref() == request.selected_sheet)
            .map(|decision| decision.column_mapping.clone());
        let had_cache = cached.is_some();

        for label in request.labels {
            if pass.mapping.target(label).is_some() {
                continue;
            }

            let cached_target = cached.as_ref().and_then(|mapping| mapping.target(label));
            let reason = match cached_target {
                Some(ColumnTarget::Skip) => {
                    pass.record(label, ColumnTarget::Skip);
                    pass.stats.from_cache += 1;
                    continue;
                }
                Some(ColumnTarget::Field(field)) => match pass.owner_of(field) {
                    None => {
                        pass.record(label, ColumnTarget::Field(field));
                        pass.stats.from_cache += 1;
                        continue;
                    }
                    Some(owner) => pass.conflict(label, field, owner, "cached"),
                },
                None => match self.catalog.classify(label) {
                    SynonymMatch::Unique(field) => match pass.owner_of(field) {
                        None => {
                            debug!(label, field = %field, "automatic match");
                            pass.record(label, ColumnTarget::Field(field));
                            pass.stats.automatic += 1;
                            pass.changed = true;
                            continue;
                        }
                        Some(owner) => pass.conflict(label, field, owner, "automatic"),
                    },
                    SynonymMatch::Ambiguous(fields) => ResolutionReason::Ambiguous(fields),
                    SynonymMatch::NoMatch => ResolutionReason::NoMatch,
                },
            };

            let target = self.ask(&pass, label, reason, resolver)?;
            pass.record(label, target);
            pass.stats.interactive += 1;
            pass.changed = true;
        }

        pass.stats.skipped = pass.mapping.skipped_count();
        // A cached mapping with labels this document no longer has is a change too.
        if let Some(cached) = &cached
            && cached != &pass.mapping
        {
            pass.changed = true;
        }

        if pass.changed || !had_cache {
            let decision = CachedDecision::new(
                identity.clone(),
                request.selected_sheet.map(str::to_string),
                pass.mapping.clone(),
            );
            if let Err(error) = cache.put(decision) {
                warn!(document = %identity.path.display(), %error, "mapping decision not saved");
                pass.warnings.push(ProcessingWarning::new(
                    WarningKind::CacheUnwritable,
                    &identity.path,
                    format!("mapping decision not saved: {error}"),
                ));
            }
        }

        info!(
            document = %identity.path.display(),
            cached = pass.stats.from_cache,
            automatic = pass.stats.automatic,
            interactive = pass.stats.interactive,
            skipped = pass.stats.skipped,
            "columns resolved"
        );

        Ok(MappingOutcome {
            mapping: pass.mapping,
            changed: pass.changed,
            stats: pass.stats,
            warnings: pass.warnings,
        })
    }

    fn ask(
        &self,
        pass: &Pass<'_>,
        label: &str,
        mut reason: ResolutionReason,
        resolver: &mut dyn InteractiveResolver,
    ) -> Result<ColumnTarget> {
        let mut rejected = 0;
        loop {
            let claimed = pass.claimed();
            let request = ColumnRequest {
                document: &pass.document.path,
                label,
                claimed: &claimed,
                reason: reason.clone(),
                suggestion: closest_free_field(self.catalog, label, &claimed),
            };
            match resolver.resolve_column(&request) {
                ColumnResolution::Cancel => {
                    info!(label, "column resolution cancelled");
                    return Err(MapError::ColumnCancelled {
                        label: label.to_string(),
                    });
                }
                ColumnResolution::Skip => return Ok(ColumnTarget::Skip),
                ColumnResolution::Field(field) if !claimed.contains(&field) => {
                    return Ok(ColumnTarget::Field(field));
                }
                ColumnResolution::Field(field) => {
                    rejected += 1;
                    warn!(label, field = %field, rejected, "answer names an already claimed field");
                    if rejected >= self.max_conflicting_answers {
                        return Err(MapError::ConflictingAnswer {
                            label: label.to_string(),
                            field,
                            attempts: rejected,
                        });
                    }
                    reason = ResolutionReason::AnswerRejected(field);
                }
            }
        }
    }
}
