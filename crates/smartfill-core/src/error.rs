//! Autofill service errors.

use thiserror::Error;

use smartfill_protocols::{PreconditionError, ResolverError, StoreError};

#[derive(Debug, Error)]
pub enum AutofillError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("Value resolver failed: {0}")]
    Resolver(#[from] ResolverError),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Another fill or undo is already running on tab {0}")]
    Busy(String),
}

impl AutofillError {
    /// The most specific message to show the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Resolver(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
