use reqnorm_normalization::NormalizationOptions;
use reqnorm_standards::SchemaCatalog;

/// Immutable settings shared by every document of a run.
#[derive(Debug, Clone, Default)]
pub struct ProcessingContext {
    pub catalog: SchemaCatalog,
    pub normalization: NormalizationOptions,
}

impl ProcessingContext {
    pub fn new(catalog: SchemaCatalog) -> Self {
        Self {
            catalog,
            normalization: NormalizationOptions::default(),
        }
    }

    pub fn with_normalization(mut self, normalization: NormalizationOptions) -> Self {
        self.normalization = normalization;
        self
    }
}
