//! Value resolver errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Value resolver unreachable: {0}")]
    Unreachable(String),

    #[error("Credential rejected: {0}")]
    AuthRejected(String),

    #[error("Upstream error: {status} - {message}")]
    Upstream { status: u16, message: String },

    #[error("Value resolver returned no text")]
    EmptyReply,

    #[error("No JSON object found in reply")]
    NoJsonObject,

    #[error("Malformed JSON in reply: {0}")]
    MalformedJson(String),
}

impl ResolverError {
    /// Whether the reply arrived but could not be understood.
    pub fn is_invalid_response(&self) -> bool {
        matches!(
            self,
            Self::NoJsonObject | Self::MalformedJson(_) | Self::EmptyReply
        )
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        if self.is_invalid_response() {
            "The AI returned an invalid response. Please try again.".to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
