//! # SmartFill Protocols
//!
//! Data model and capability traits shared by every SmartFill crate.
//! Contains only definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`FrameChannel`] - Reaches the frames of one page (scan / fill / undo)
//! - [`ValueResolver`] - Maps field descriptors and a profile to fill values
//! - [`StateStore`] - Persistent key-value state (profile, credential, undo, history)

pub mod channel;
pub mod error;
pub mod resolver;
pub mod store;
pub mod types;

pub use channel::FrameChannel;
pub use error::{ChannelError, PreconditionError, ResolverError, StoreError};
pub use resolver::{ResolveRequest, ValueResolver};
pub use store::{keys, StateStore, StateStoreExt, StoreChange};
pub use types::*;
