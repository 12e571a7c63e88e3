//! Fill history (bounded audit log).

use std::sync::Arc;

use tracing::{debug, warn};

use smartfill_protocols::{
    keys, HistoryEntry, StateStore, StateStoreExt, StoreError, HISTORY_CAPACITY,
};

/// Newest-first list of past fills, capped at [`HISTORY_CAPACITY`].
///
/// An audit trail only; entries are never replayed.
pub struct HistoryStore {
    store: Arc<dyn StateStore>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Prepend an entry, evicting the oldest beyond capacity.
    pub async fn record(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut entries = self.list().await?;
        debug!("Recording fill history entry {} ({} fields)", entry.id, entry.fields_count);
        entries.insert(0, entry);
        entries.truncate(HISTORY_CAPACITY);
        self.store.set_as(keys::FILL_HISTORY, &entries).await
    }

    /// All entries, newest first.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        match self.store.get_as::<Vec<HistoryEntry>>(keys::FILL_HISTORY).await {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(StoreError::Serialization(e)) => {
                warn!("Fill history is unreadable, starting over: {}", e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(keys::FILL_HISTORY).await?;
        Ok(())
    }
}
