//! Column mapping resolution for requirement documents.
//!
//! [`ColumnMapper`] and [`SheetSelector`] decide how a document's structure
//! maps onto the canonical schema, consulting the [`MappingCache`] first and
//! an [`InteractiveResolver`] last.

pub mod cache;
pub mod error;
pub mod mapper;
pub mod resolver;
pub mod sheet;
pub mod state;
pub mod suggest;

pub use cache::{CACHE_FORMAT_VERSION, DEFAULT_CACHE_PATH, MappingCache};
pub use error::{CacheError, MapError, Result};
pub use mapper::{ColumnMapper, MAX_CONFLICTING_ANSWERS, MappingRequest};
pub use resolver::{
    ColumnRequest, ColumnResolution, InteractiveResolver, ResolutionReason, ScriptFallback,
    ScriptedResolver, SheetRequest, SheetResolution,
};
pub use sheet::{SheetChoice, SheetSelector, SheetSource};
pub use state::{MappingOutcome, MappingStats};
pub use suggest::closest_free_field;
