//! Frame channel errors.

use thiserror::Error;

use crate::types::FrameId;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Frame {0} is unreachable")]
    Unreachable(FrameId),

    #[error("Frame {frame_id} did not reply within {timeout_ms} ms")]
    Timeout { frame_id: FrameId, timeout_ms: u64 },

    #[error("Frame {frame_id} replied with an error: {message}")]
    Remote { frame_id: FrameId, message: String },

    #[error("Unexpected reply from frame {frame_id}: {detail}")]
    UnexpectedReply { frame_id: FrameId, detail: String },

    #[error("Page unavailable: {0}")]
    PageUnavailable(String),
}

impl ChannelError {
    pub fn frame_id(&self) -> Option<FrameId> {
        match self {
            Self::Unreachable(id) => Some(*id),
            Self::Timeout { frame_id, .. }
            | Self::Remote { frame_id, .. }
            | Self::UnexpectedReply { frame_id, .. } => Some(*frame_id),
            Self::PageUnavailable(_) => None,
        }
    }
}
