//! Frame channel protocol.
//!
//! A channel reaches every frame of one page (one browser tab). The
//! orchestrator fans requests out over it and joins the replies.

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::types::{FrameId, FrameInfo, FrameRequest, FrameResponse};

/// Transport to the frames of a single page.
#[async_trait]
pub trait FrameChannel: Send + Sync {
    /// Stable identifier of the page (tab) this channel talks to.
    fn tab_id(&self) -> &str;

    /// Enumerate every frame of the page, nested frames included.
    async fn frames(&self) -> Result<Vec<FrameInfo>, ChannelError>;

    /// Deliver one request to one frame and wait for its reply.
    async fn send(
        &self,
        frame_id: FrameId,
        request: FrameRequest,
    ) -> Result<FrameResponse, ChannelError>;
}
