//! Persistent key-value state.
//!
//! Every piece of ambient mutable state (profile, credential, the live undo
//! snapshot, fill history) lives behind this interface so the engine can be
//! driven against an in-memory store in tests and a file store in the CLI.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::StoreError;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

/// Well-known store keys.
pub mod keys {
    pub const USER_PROFILE: &str = "userProfile";
    pub const API_KEY: &str = "apiKey";
    pub const FILL_HISTORY: &str = "fillHistory";

    const LAST_FILL_PREFIX: &str = "lastFill/";

    /// Key of the live fill snapshot for a tab.
    pub fn last_fill(tab_id: &str) -> String {
        format!("{}{}", LAST_FILL_PREFIX, tab_id)
    }
}

/// Notification broadcast after every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreChange {
    pub key: String,
    /// New value, `None` when the key was removed.
    pub value: Option<Value>,
}

/// Key-value store with change notifications.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove a key. Returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

/// Typed helpers over [`StateStore`].
#[async_trait]
pub trait StateStoreExt: StateStore {
    async fn get_as<T>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn set_as<T>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(value)?;
        self.set(key, value).await
    }
}

impl<S: StateStore + ?Sized> StateStoreExt for S {}
