//! Fill history (audit trail).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of retained history entries.
pub const HISTORY_CAPACITY: usize = 50;

/// A field involved in a fill operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryField {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// One recorded fill operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub fields_count: usize,
    pub fields: Vec<HistoryField>,
}

impl HistoryEntry {
    pub fn new(url: impl Into<String>, fields: Vec<HistoryField>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            url: url.into(),
            fields_count: fields.len(),
            fields,
        }
    }
}
