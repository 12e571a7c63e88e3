//! Per-frame request handler.

use tracing::debug;

use smartfill_protocols::{FrameRequest, FrameResponse};

use crate::dom::Document;
use crate::executor::FillExecutor;
use crate::scanner;

/// Answers scan / fill / undo requests against one frame's document.
///
/// The agent keeps no state between requests: the undo snapshot travels in
/// the fill reply and comes back with the undo request.
#[derive(Debug, Clone, Default)]
pub struct FrameAgent {
    executor: FillExecutor,
}

impl FrameAgent {
    pub fn new(executor: FillExecutor) -> Self {
        Self { executor }
    }

    pub fn handle(&self, doc: &mut Document, request: FrameRequest) -> FrameResponse {
        debug!("Frame agent handling {} on {}", request.name(), doc.url());

        match request {
            FrameRequest::Scan => FrameResponse::Scan {
                fields: scanner::scan(doc),
                page_context: Some(doc.page_context()),
            },
            FrameRequest::Fill { values } => FrameResponse::Fill(self.executor.fill(doc, &values)),
            FrameRequest::Undo { snapshot } => FrameResponse::Undo {
                undone: self.executor.restore(doc, &snapshot),
            },
        }
    }
}
