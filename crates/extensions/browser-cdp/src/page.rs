//! Live browser tab as a [`FrameChannel`].

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use smartfill_core::{Document, FrameAgent, PageCapture};
use smartfill_protocols::{
    ChannelError, FrameChannel, FrameId, FrameInfo, FrameRequest, FrameResponse,
};

use crate::client::CdpClient;
use crate::error::CdpError;
use crate::protocol::FrameDescriptor;
use crate::scripts::{apply_expression, unresolved, CAPTURE_JS};
use crate::session::PageSession;

/// Isolated-world execution contexts, one per loaded frame document.
#[derive(Default)]
struct ContextCache {
    contexts: Mutex<HashMap<(String, String), i64>>,
}

impl ContextCache {
    fn key(frame: &FrameDescriptor) -> (String, String) {
        (frame.id.clone(), frame.loader_id.clone())
    }

    fn get(&self, frame: &FrameDescriptor) -> Option<i64> {
        self.contexts.lock().get(&Self::key(frame)).copied()
    }

    fn insert(&self, frame: &FrameDescriptor, context_id: i64) {
        self.contexts.lock().insert(Self::key(frame), context_id);
    }

    fn forget(&self, frame: &FrameDescriptor) {
        self.contexts.lock().remove(&Self::key(frame));
    }

    /// Drop contexts of documents no longer in the frame tree.
    fn retain(&self, frames: &[FrameDescriptor]) {
        self.contexts.lock().retain(|(id, loader_id), _| {
            frames
                .iter()
                .any(|f| &f.id == id && &f.loader_id == loader_id)
        });
    }
}

/// One attached tab. Frames are numbered in depth-first order of the frame
/// tree as of the last enumeration; the main frame is 0.
pub struct CdpPage {
    session: PageSession,
    agent: FrameAgent,
    frames: RwLock<Vec<FrameDescriptor>>,
    contexts: ContextCache,
}

impl CdpPage {
    pub fn new(session: PageSession, agent: FrameAgent) -> Self {
        Self {
            session,
            agent,
            frames: RwLock::new(Vec::new()),
            contexts: ContextCache::default(),
        }
    }

    /// Connect to Chrome and attach to the first tab matching `url_filter`.
    pub async fn connect(
        endpoint: &str,
        url_filter: Option<&str>,
        agent: FrameAgent,
    ) -> Result<Self, CdpError> {
        let client = CdpClient::connect(endpoint).await?;
        let target = client.find_page(url_filter).await?;
        info!("Attaching to tab {} ({})", target.target_id, target.url);
        let session = client.attach_page(&target.target_id).await?;
        Ok(Self::new(session, agent))
    }

    async fn refresh_frames(&self) -> Result<Vec<FrameDescriptor>, CdpError> {
        let frames = self.session.frame_tree().await?.flatten();
        self.contexts.retain(&frames);
        *self.frames.write().await = frames.clone();
        Ok(frames)
    }

    async fn descriptor(&self, frame_id: FrameId) -> Option<FrameDescriptor> {
        if self.frames.read().await.is_empty() {
            if let Err(e) = self.refresh_frames().await {
                warn!("Frame enumeration failed: {}", e);
                return None;
            }
        }
        self.frames.read().await.get(frame_id as usize).cloned()
    }

    /// The frame's isolated world, created on first use per document.
    async fn context_for(&self, frame: &FrameDescriptor) -> Result<i64, CdpError> {
        if let Some(context_id) = self.contexts.get(frame) {
            return Ok(context_id);
        }
        let context_id = self.session.isolated_world(&frame.id).await?;
        debug!("Created isolated world {} in frame {}", context_id, frame.id);
        self.contexts.insert(frame, context_id);
        Ok(context_id)
    }

    async fn round_trip(
        &self,
        frame: &FrameDescriptor,
        request: FrameRequest,
    ) -> Result<FrameResponse, CdpError> {
        let context_id = self.context_for(frame).await?;
        let result = self.exchange(frame, context_id, request).await;
        if result.is_err() {
            // The context may have died with its document.
            self.contexts.forget(frame);
        }
        result
    }

    /// Capture, handle, write back.
    async fn exchange(
        &self,
        frame: &FrameDescriptor,
        context_id: i64,
        request: FrameRequest,
    ) -> Result<FrameResponse, CdpError> {
        let captured = self.session.evaluate_in(context_id, CAPTURE_JS).await?;
        let capture: PageCapture = serde_json::from_value(captured)?;
        let mut document = Document::from_capture(&capture);

        let response = self.agent.handle(&mut document, request);

        let journal = document.take_journal();
        if !journal.is_empty() {
            debug!("Replaying {} mutations in frame {}", journal.len(), frame.id);
            let result = self
                .session
                .evaluate_in(context_id, &apply_expression(&journal)?)
                .await?;
            let missing = unresolved(&result);
            if !missing.is_empty() {
                warn!(
                    "{} elements of frame {} vanished before write-back: {:?}",
                    missing.len(),
                    frame.id,
                    missing
                );
            }
        }
        Ok(response)
    }
}

#[async_trait]
impl FrameChannel for CdpPage {
    fn tab_id(&self) -> &str {
        self.session.target_id()
    }

    async fn frames(&self) -> Result<Vec<FrameInfo>, ChannelError> {
        let frames = self
            .refresh_frames()
            .await
            .map_err(|e| ChannelError::PageUnavailable(e.to_string()))?;
        Ok(frames
            .iter()
            .enumerate()
            .map(|(index, frame)| FrameInfo {
                frame_id: index as FrameId,
                document_id: format!("{}:{}", frame.id, frame.loader_id),
            })
            .collect())
    }

    async fn send(
        &self,
        frame_id: FrameId,
        request: FrameRequest,
    ) -> Result<FrameResponse, ChannelError> {
        let frame = self
            .descriptor(frame_id)
            .await
            .ok_or(ChannelError::Unreachable(frame_id))?;

        self.round_trip(&frame, request)
            .await
            .map_err(|e| match e {
                CdpError::FrameNotFound(_) | CdpError::SessionClosed => {
                    ChannelError::Unreachable(frame_id)
                }
                other => ChannelError::Remote {
                    frame_id,
                    message: other.to_string(),
                },
            })
    }
}
