//! Requirement standardization: sheet selection, column resolution and value
//! normalization for one document or a batch.

pub mod context;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod report;

pub use context::ProcessingContext;
pub use error::{DocumentError, Result};
pub use pipeline::{BatchOptions, StandardizationPipeline};
pub use records::{BuiltRecords, build_records};
pub use report::{BatchResult, DocumentOutcome, DocumentReport};
