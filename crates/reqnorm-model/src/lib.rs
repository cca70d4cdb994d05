pub mod compliance;
pub mod decision;
pub mod error;
pub mod field;
pub mod identity;
pub mod mapping;
pub mod record;
pub mod warning;

pub use compliance::ComplianceValue;
pub use decision::CachedDecision;
pub use error::{ModelError, Result};
pub use field::{CanonicalField, FIELD_COUNT};
pub use identity::DocumentIdentity;
pub use mapping::{ColumnMapping, ColumnTarget, SKIP_MARKER};
pub use record::RequirementRecord;
pub use warning::{ProcessingWarning, WarningKind};
