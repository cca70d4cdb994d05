use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::DocumentIdentity;
use crate::mapping::ColumnMapping;

/// A remembered resolution for one document identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedDecision {
    pub identity: DocumentIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_sheet: Option<String>,
    #[serde(default)]
    pub column_mapping: ColumnMapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl CachedDecision {
    pub fn new(
        identity: DocumentIdentity,
        selected_sheet: Option<String>,
        column_mapping: ColumnMapping,
    ) -> Self {
        Self {
            identity,
            selected_sheet,
            column_mapping,
            saved_at: Some(Utc::now()),
        }
    }

    /// True when this decision was recorded for exactly `identity`.
    pub fn matches(&self, identity: &DocumentIdentity) -> bool {
        &self.identity == identity
    }
}
