//! Field descriptors produced by a frame scan.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{FrameId, TOP_FRAME};

/// Mapping from field id (or page-unique key) to the value to fill.
pub type FieldValues = BTreeMap<String, String>;

/// Kind of form control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Tel,
    Url,
    Number,
    Date,
    File,
    Checkbox,
    Radio,
    Select,
    Textarea,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Number => "number",
            Self::Date => "date",
            Self::File => "file",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the control holds a checked state rather than a text value.
    pub fn is_toggle(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

impl From<&str> for FieldType {
    fn from(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        match lower.as_str() {
            "" | "text" => Self::Text,
            "email" => Self::Email,
            "password" => Self::Password,
            "tel" => Self::Tel,
            "url" => Self::Url,
            "number" => Self::Number,
            "date" => Self::Date,
            "file" => Self::File,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "select" | "select-one" | "select-multiple" => Self::Select,
            "textarea" => Self::Textarea,
            _ => Self::Other(lower),
        }
    }
}

impl From<String> for FieldType {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<option>` of a select control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
    #[serde(default)]
    pub selected: bool,
}

/// Structured record describing one discovered form control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Frame-local locator, unique within the frame.
    pub id: String,
    pub label: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub tag_name: String,
    pub placeholder: String,
    pub current_value: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub frame_id: FrameId,
}

impl FieldDescriptor {
    /// Page-unique key of this field.
    pub fn key(&self) -> String {
        field_key(self.frame_id, &self.id)
    }

    /// Best human-readable name for previews.
    pub fn display_label(&self) -> &str {
        if !self.label.is_empty() {
            &self.label
        } else if !self.name.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }

    /// The reduced view handed to the value resolver.
    pub fn simplified(&self) -> SimplifiedField {
        SimplifiedField {
            id: self.key(),
            label: self.label.clone(),
            name: self.name.clone(),
            field_type: self.field_type.clone(),
            placeholder: self.placeholder.clone(),
            options: self.options.clone(),
        }
    }
}

/// Build the page-unique key for a frame-local field id.
///
/// Top-frame fields keep their id; nested frames are prefixed so identical
/// locators in different frames never collide.
pub fn field_key(frame_id: FrameId, id: &str) -> String {
    if frame_id == TOP_FRAME {
        id.to_string()
    } else {
        format!("frame-{}::{}", frame_id, id)
    }
}

/// Field view sent to the value resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedField {
    pub id: String,
    pub label: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

#[cfg(test)]
#[path = "field_tests.rs"]
mod tests;
