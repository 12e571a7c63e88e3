//! # SmartFill Store
//!
//! [`StateStore`](smartfill_protocols::StateStore) implementations.
//!
//! - [`MemoryStateStore`] - process-local, for tests and throwaway runs
//! - [`FileStateStore`] - one JSON document on disk, rewritten atomically

mod file;
mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

/// Capacity of the change notification channel.
pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 64;
