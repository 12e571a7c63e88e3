//! In-memory page.
//!
//! A [`FrameChannel`] over documents held in process: one document per
//! frame, each answered by a [`FrameAgent`]. Backs offline runs against a
//! captured page file, and lets tests script unreachable or silent frames.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use smartfill_protocols::{ChannelError, FrameChannel, FrameId, FrameInfo, FrameRequest, FrameResponse};

use crate::agent::FrameAgent;
use crate::dom::{Document, PageCapture};

/// How a frame reacts to requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBehavior {
    Responsive,
    /// Every request fails immediately.
    Unreachable,
    /// Requests are accepted but never answered.
    Silent,
}

struct FrameState {
    document: Document,
    /// Bumped on every navigation or reload.
    generation: u64,
}

struct LocalFrame {
    parent: Option<FrameId>,
    behavior: FrameBehavior,
    state: Mutex<FrameState>,
}

/// A page of in-memory frames. Frame 0 is the top-level document.
pub struct LocalPage {
    tab_id: String,
    frames: Vec<LocalFrame>,
    agent: FrameAgent,
}

impl LocalPage {
    pub fn new(tab_id: impl Into<String>) -> Self {
        Self {
            tab_id: tab_id.into(),
            frames: Vec::new(),
            agent: FrameAgent::default(),
        }
    }

    /// Build a page from a capture, flattening nested frames depth-first.
    pub fn from_capture(tab_id: impl Into<String>, capture: &PageCapture) -> Self {
        let mut page = Self::new(tab_id);
        page.push_capture(None, capture);
        page
    }

    fn push_capture(&mut self, parent: Option<FrameId>, capture: &PageCapture) {
        let frame_id = self.push(parent, Document::from_capture(capture), FrameBehavior::Responsive);
        for child in &capture.frames {
            self.push_capture(Some(frame_id), child);
        }
    }

    fn push(&mut self, parent: Option<FrameId>, document: Document, behavior: FrameBehavior) -> FrameId {
        let frame_id = self.frames.len() as FrameId;
        self.frames.push(LocalFrame {
            parent,
            behavior,
            state: Mutex::new(FrameState {
                document,
                generation: 0,
            }),
        });
        frame_id
    }

    pub fn with_agent(mut self, agent: FrameAgent) -> Self {
        self.agent = agent;
        self
    }

    /// Add a responsive frame. Frames after the first are children of the
    /// top-level frame.
    pub fn with_frame(self, document: Document) -> Self {
        self.with_frame_behavior(document, FrameBehavior::Responsive)
    }

    pub fn with_frame_behavior(mut self, document: Document, behavior: FrameBehavior) -> Self {
        let parent = if self.frames.is_empty() { None } else { Some(0) };
        self.push(parent, document, behavior);
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Copy of a frame's current document.
    pub async fn document(&self, frame_id: FrameId) -> Option<Document> {
        let frame = self.frames.get(frame_id as usize)?;
        Some(frame.state.lock().await.document.clone())
    }

    /// Replace a frame's document, as a navigation would.
    pub async fn navigate(&self, frame_id: FrameId, document: Document) -> bool {
        let Some(frame) = self.frames.get(frame_id as usize) else {
            return false;
        };
        let mut state = frame.state.lock().await;
        state.document = document;
        state.generation += 1;
        debug!("Frame {} navigated (generation {})", frame_id, state.generation);
        true
    }

    /// Swap a frame's content while it keeps its document identity, as a
    /// script rewriting the page would.
    pub async fn rewrite(&self, frame_id: FrameId, document: Document) -> bool {
        let Some(frame) = self.frames.get(frame_id as usize) else {
            return false;
        };
        frame.state.lock().await.document = document;
        true
    }

    /// Reload a frame: same document content, new document identity.
    pub async fn reload(&self, frame_id: FrameId) -> bool {
        let Some(frame) = self.frames.get(frame_id as usize) else {
            return false;
        };
        frame.state.lock().await.generation += 1;
        true
    }

    /// Export the current state of every frame, nesting restored.
    pub async fn to_capture(&self) -> Option<PageCapture> {
        if self.frames.is_empty() {
            return None;
        }
        let mut captures = Vec::with_capacity(self.frames.len());
        for frame in &self.frames {
            let state = frame.state.lock().await;
            captures.push(Some(PageCapture {
                url: state.document.url().to_string(),
                title: state.document.title().to_string(),
                root: state.document.to_serialized(),
                frames: Vec::new(),
            }));
        }

        // Children always follow their parent, so fold from the back.
        for index in (1..captures.len()).rev() {
            let Some(parent) = self.frames[index].parent else {
                continue;
            };
            if let Some(child) = captures[index].take() {
                if let Some(Some(parent_capture)) = captures.get_mut(parent as usize) {
                    parent_capture.frames.insert(0, child);
                }
            }
        }
        captures.into_iter().next().flatten()
    }
}

#[async_trait]
impl FrameChannel for LocalPage {
    fn tab_id(&self) -> &str {
        &self.tab_id
    }

    async fn frames(&self) -> Result<Vec<FrameInfo>, ChannelError> {
        let mut frames = Vec::with_capacity(self.frames.len());
        for (index, frame) in self.frames.iter().enumerate() {
            let generation = frame.state.lock().await.generation;
            frames.push(FrameInfo {
                frame_id: index as FrameId,
                document_id: format!("{}:{}", index, generation),
            });
        }
        Ok(frames)
    }

    async fn send(
        &self,
        frame_id: FrameId,
        request: FrameRequest,
    ) -> Result<FrameResponse, ChannelError> {
        let frame = self
            .frames
            .get(frame_id as usize)
            .ok_or(ChannelError::Unreachable(frame_id))?;

        match frame.behavior {
            FrameBehavior::Unreachable => Err(ChannelError::Unreachable(frame_id)),
            FrameBehavior::Silent => std::future::pending().await,
            FrameBehavior::Responsive => {
                let mut state = frame.state.lock().await;
                Ok(self.agent.handle(&mut state.document, request))
            }
        }
    }
}

#[cfg(test)]
#[path = "local_page_tests.rs"]
mod tests;
