//! Precondition failures checked before any page work.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Please add your Anthropic API key first.")]
    MissingCredential,

    #[error("Please set up your profile first (at least your name).")]
    IncompleteProfile,
}
