//! Cross-frame message contract.

use serde::{Deserialize, Serialize};

use super::{FieldDescriptor, FieldValues, FillSnapshot, FrameFill, PageContext};

/// Integer frame identifier; the top-level frame is always 0.
pub type FrameId = u32;

/// Identifier of the top-level frame.
pub const TOP_FRAME: FrameId = 0;

/// A frame of the page together with the identity of its current document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInfo {
    pub frame_id: FrameId,
    /// Changes whenever the frame navigates or reloads.
    pub document_id: String,
}

/// Request sent to a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FrameRequest {
    Scan,
    Fill { values: FieldValues },
    Undo { snapshot: FillSnapshot },
}

impl FrameRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Fill { .. } => "fill",
            Self::Undo { .. } => "undo",
        }
    }
}

/// Reply of a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameResponse {
    Scan {
        fields: Vec<FieldDescriptor>,
        #[serde(rename = "pageContext", skip_serializing_if = "Option::is_none")]
        page_context: Option<PageContext>,
    },
    Fill(FrameFill),
    Undo {
        undone: usize,
    },
    Error {
        error: String,
    },
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
