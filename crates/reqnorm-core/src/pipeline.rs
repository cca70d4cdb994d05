//! Standardization pipeline: one document end to end, and batches of them.
//!
//! # Order per document
//!
//! 1. Read the document identity and raw sheets
//! 2. Select a sheet ([`SheetSelector`])
//! 3. Resolve its columns once ([`ColumnMapper`], persists to the cache)
//! 4. Build one [`RequirementRecord`] per row
//!
//! Batches may read raw documents on several threads, but sheet selection,
//! column resolution and every cache access run on the calling thread, one
//! document at a time, in input order.
//!
//! [`RequirementRecord`]: reqnorm_model::RequirementRecord

use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, info, info_span, warn};

use reqnorm_ingest::{AutoReader, DocumentReader, RawDocument};
use reqnorm_map::{ColumnMapper, InteractiveResolver, MappingCache, MappingRequest, SheetSelector};
use reqnorm_model::{DocumentIdentity, ProcessingWarning, WarningKind};

use crate::context::ProcessingContext;
use crate::error::{DocumentError, Result};
use crate::records::build_records;
use crate::report::{BatchResult, DocumentOutcome, DocumentReport};

/// Options for batch runs.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Threads used to read raw documents ahead of resolution. `1` reads
    /// each document just before it is resolved.
    pub read_threads: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { read_threads: 1 }
    }
}

type Prefetched = Result<(DocumentIdentity, RawDocument)>;

/// Orchestrates reading, resolution and normalization.
///
/// Owns the mapping cache for the lifetime of the run.
pub struct StandardizationPipeline<R = AutoReader> {
    context: ProcessingContext,
    reader: R,
    cache: MappingCache,
    selector: SheetSelector,
}

impl StandardizationPipeline<AutoReader> {
    pub fn new(context: ProcessingContext, cache: MappingCache) -> Self {
        Self::with_reader(context, cache, AutoReader)
    }
}

impl<R: DocumentReader> StandardizationPipeline<R> {
    pub fn with_reader(context: ProcessingContext, cache: MappingCache, reader: R) -> Self {
        Self {
            context,
            reader,
            cache,
            selector: SheetSelector::new(),
        }
    }

    pub fn context(&self) -> &ProcessingContext {
        &self.context
    }

    pub fn cache(&self) -> &MappingCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut MappingCache {
        &mut self.cache
    }

    pub fn into_cache(self) -> MappingCache {
        self.cache
    }

    /// Warning to surface when the persisted cache had to be ignored.
    pub fn cache_warning(&self) -> Option<ProcessingWarning> {
        let error = self.cache.load_error()?;
        let path = self.cache.path().map(Path::to_path_buf).unwrap_or_default();
        Some(ProcessingWarning::new(
            WarningKind::CacheUnreadable,
            path,
            format!("mapping cache ignored: {error}"),
        ))
    }

    fn read(&self, path: &Path) -> Prefetched {
        read_with(&self.reader, path)
    }

    /// Process one document from disk.
    pub fn process_document(
        &mut self,
        path: &Path,
        resolver: &mut dyn InteractiveResolver,
    ) -> Result<DocumentReport> {
        let (identity, raw) = self.read(path)?;
        self.process_raw(identity, raw, resolver)
    }

    /// Process an already-read document.
    pub fn process_raw(
        &mut self,
        identity: DocumentIdentity,
        raw: RawDocument,
        resolver: &mut dyn InteractiveResolver,
    ) -> Result<DocumentReport> {
        let span = info_span!("document", path = %identity.path.display());
        let _guard = span.enter();

        let sheet_names = raw.sheet_names();
        let choice = self
            .selector
            .select(&self.cache, &identity, &sheet_names, resolver)?;
        let sheet = raw
            .into_sheet(&choice.name)
            .ok_or_else(|| DocumentError::SheetMissing {
                path: identity.path.clone(),
                sheet: choice.name.clone(),
            })?;
        if sheet.columns.is_empty() {
            return Err(DocumentError::NoColumns {
                path: identity.path.clone(),
                sheet: sheet.name,
            });
        }

        let mapper = ColumnMapper::new(&self.context.catalog);
        let outcome = mapper.resolve(
            &mut self.cache,
            MappingRequest {
                identity: &identity,
                selected_sheet: choice.persisted_name(),
                labels: &sheet.columns,
            },
            resolver,
        )?;

        let built = build_records(
            &identity.path,
            &sheet,
            &outcome.mapping,
            &self.context.normalization,
        );
        let mut warnings = outcome.warnings;
        warnings.extend(built.warnings);

        info!(
            sheet = %sheet.name,
            records = built.records.len(),
            warnings = warnings.len(),
            "document standardized"
        );

        Ok(DocumentReport {
            path: identity.path.clone(),
            identity,
            sheet: sheet.name,
            mapping: outcome.mapping,
            stats: outcome.stats,
            records: built.records,
            warnings,
        })
    }

    /// Process documents in order. A failing document is recorded and the
    /// batch continues.
    pub fn process_batch(
        &mut self,
        paths: &[PathBuf],
        resolver: &mut dyn InteractiveResolver,
        options: BatchOptions,
    ) -> BatchResult
    where
        R: Sync,
    {
        self.process_batch_with(paths, resolver, options, |_| {})
    }

    /// Like [`Self::process_batch`], calling `on_document` after each document.
    pub fn process_batch_with(
        &mut self,
        paths: &[PathBuf],
        resolver: &mut dyn InteractiveResolver,
        options: BatchOptions,
        mut on_document: impl FnMut(&DocumentOutcome),
    ) -> BatchResult
    where
        R: Sync,
    {
        let mut prefetched = if options.read_threads > 1 {
            self.prefetch(paths, options.read_threads)
        } else {
            Vec::new()
        }
        .into_iter();

        let mut result = BatchResult::default();
        for path in paths {
            let read = match prefetched.next() {
                Some(read) => read,
                None => self.read(path),
            };
            let document_result = match read {
                Ok((identity, raw)) => self.process_raw(identity, raw, resolver),
                Err(error) => Err(error),
            };
            let outcome = DocumentOutcome {
                path: path.clone(),
                result: document_result,
            };
            if let Err(error) = &outcome.result {
                warn!(path = %path.display(), %error, "document skipped");
            }
            on_document(&outcome);
            result.outcomes.push(outcome);
        }
        result
    }

    /// Reads every document on up to `threads` scoped threads, returning
    /// results in input order.
    fn prefetch(&self, paths: &[PathBuf], threads: usize) -> Vec<Prefetched>
    where
        R: Sync,
    {
        let reader = &self.reader;
        let chunk = paths.len().div_ceil(threads).max(1);
        thread::scope(|scope| {
            let handles: Vec<_> = paths
                .chunks(chunk)
                .map(|group| {
                    scope.spawn(move || {
                        group
                            .iter()
                            .map(|path| read_with(reader, path))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }
}

fn read_with<R: DocumentReader>(reader: &R, path: &Path) -> Prefetched {
    let identity = DocumentIdentity::from_path(path).map_err(|source| DocumentError::Identity {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = reader.read_document(&identity.path)?;
    debug!(path = %identity.path.display(), sheets = raw.sheets.len(), "document read");
    Ok((identity, raw))
}
