//! Undo manager.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use smartfill_protocols::{keys, FrameSnapshot, LastFill, StateStore, StateStoreExt, StoreError};

use crate::orchestrator::FrameOrchestrator;

/// Keeps the live snapshot of each tab in the state store.
///
/// At most one snapshot per tab is live; recording a new fill replaces it.
pub struct UndoManager {
    store: Arc<dyn StateStore>,
}

impl UndoManager {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Replace the tab's live snapshot.
    pub async fn record(
        &self,
        tab_id: &str,
        url: &str,
        frames: Vec<FrameSnapshot>,
    ) -> Result<(), StoreError> {
        let record = LastFill {
            tab_id: tab_id.to_string(),
            url: url.to_string(),
            filled_at: Utc::now(),
            frames,
        };
        debug!(
            "Recording undo snapshot for tab {} ({} fields)",
            tab_id,
            record.field_count()
        );
        self.store.set_as(&keys::last_fill(tab_id), &record).await
    }

    /// The tab's live snapshot, if any.
    pub async fn last(&self, tab_id: &str) -> Result<Option<LastFill>, StoreError> {
        match self.store.get_as(&keys::last_fill(tab_id)).await {
            Err(StoreError::Serialization(e)) => {
                warn!("Discarding unreadable undo snapshot for tab {}: {}", tab_id, e);
                Ok(None)
            }
            other => other,
        }
    }

    /// Whether an undo would do anything.
    pub async fn can_undo(&self, tab_id: &str) -> Result<bool, StoreError> {
        Ok(self.last(tab_id).await?.is_some())
    }

    /// Revert the tab's most recent fill and drop its snapshot. Without a
    /// live snapshot this is a no-op returning 0.
    pub async fn undo(&self, orchestrator: &FrameOrchestrator) -> Result<usize, StoreError> {
        let tab_id = orchestrator.tab_id();
        let Some(record) = self.last(tab_id).await? else {
            debug!("Nothing to undo for tab {}", tab_id);
            return Ok(0);
        };

        let undone = orchestrator.undo_all(&record.frames).await;
        self.clear(tab_id).await?;

        info!("Undid {} fields on tab {}", undone, tab_id);
        Ok(undone)
    }

    pub async fn clear(&self, tab_id: &str) -> Result<(), StoreError> {
        self.store.remove(&keys::last_fill(tab_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "undo_tests.rs"]
mod tests;
