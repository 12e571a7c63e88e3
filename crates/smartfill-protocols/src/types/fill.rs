//! Fill results and undo snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FrameId;

/// Outcome of applying values to one frame (or, merged, to a page).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillResult {
    pub filled_count: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl FillResult {
    /// Fold another result into this one.
    pub fn merge(&mut self, other: FillResult) {
        self.filled_count += other.filled_count;
        self.errors.extend(other.errors);
    }
}

/// One captured pre-fill value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub field_id: String,
    pub previous_value: String,
}

/// Values captured immediately before each mutation of a fill, in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FillSnapshot {
    entries: Vec<SnapshotEntry>,
}

impl FillSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the prior value of a field. Only the first capture per field is
    /// kept, so a field touched twice still restores to its original value.
    pub fn capture(&mut self, field_id: &str, previous_value: impl Into<String>) -> bool {
        if self.get(field_id).is_some() {
            return false;
        }
        self.entries.push(SnapshotEntry {
            field_id: field_id.to_string(),
            previous_value: previous_value.into(),
        });
        true
    }

    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.field_id == field_id)
            .map(|e| e.previous_value.as_str())
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reply of one frame to a fill request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameFill {
    #[serde(flatten)]
    pub result: FillResult,
    #[serde(default)]
    pub snapshot: FillSnapshot,
}

/// Snapshot of one frame, bound to the document it was captured from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub frame_id: FrameId,
    pub document_id: String,
    pub snapshot: FillSnapshot,
}

/// The live undo record of a tab: the most recent fill operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastFill {
    pub tab_id: String,
    pub url: String,
    pub filled_at: DateTime<Utc>,
    pub frames: Vec<FrameSnapshot>,
}

impl LastFill {
    /// Total number of captured fields across frames.
    pub fn field_count(&self) -> usize {
        self.frames.iter().map(|f| f.snapshot.len()).sum()
    }
}

#[cfg(test)]
#[path = "fill_tests.rs"]
mod tests;
