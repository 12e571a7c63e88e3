//! Fill executor.

use tracing::debug;

use smartfill_protocols::{FieldValues, FillResult, FillSnapshot, FrameFill, SelectOption};

use crate::dom::{Document, NodeId};
use crate::locator;
use crate::matcher;

/// Values that check a checkbox, compared case-insensitively.
const TRUTHY: &[&str] = &["true", "yes", "1", "on", "checked"];

const INPUT_EVENTS: &[&str] = &["input", "change"];

/// Outcome of applying one instruction.
enum Applied {
    Filled,
    Skipped,
    Failed(String),
}

/// Applies value mappings to a frame's document and restores snapshots.
#[derive(Debug, Clone)]
pub struct FillExecutor {
    focus_and_blur: bool,
}

impl Default for FillExecutor {
    fn default() -> Self {
        Self {
            focus_and_blur: true,
        }
    }
}

impl FillExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus each control before writing and blur it afterwards.
    pub fn with_focus_and_blur(mut self, enabled: bool) -> Self {
        self.focus_and_blur = enabled;
        self
    }

    /// Apply `values` (frame-local id to value). Every field's prior value is
    /// captured before it is first written.
    pub fn fill(&self, doc: &mut Document, values: &FieldValues) -> FrameFill {
        let mut result = FillResult::default();
        let mut snapshot = FillSnapshot::new();

        for (field_id, value) in values {
            let Some(node) = locator::resolve(doc, field_id) else {
                result
                    .errors
                    .push(format!("Field with ID \"{}\" not found.", field_id));
                continue;
            };

            match self.apply(doc, node, field_id, value, &mut snapshot) {
                Applied::Filled => result.filled_count += 1,
                Applied::Skipped => {}
                Applied::Failed(message) => result
                    .errors
                    .push(format!("Could not fill field {}: {}", field_id, message)),
            }
        }

        FrameFill { result, snapshot }
    }

    fn apply(
        &self,
        doc: &mut Document,
        node: NodeId,
        field_id: &str,
        value: &str,
        snapshot: &mut FillSnapshot,
    ) -> Applied {
        let Some(el) = doc.element(node) else {
            return Applied::Skipped;
        };
        let tag = el.tag().to_string();
        let input_type = el.input_type();

        match (tag.as_str(), input_type.as_str()) {
            ("select", _) => {
                let options: Vec<SelectOption> = doc
                    .options(node)
                    .into_iter()
                    .map(|option| SelectOption {
                        value: doc.option_value(option),
                        text: doc.option_text(option),
                        selected: false,
                    })
                    .collect();
                let Some(index) = matcher::best_option(&options, value) else {
                    debug!(
                        "No option of {} matches {:?} (options: {:?})",
                        field_id,
                        value,
                        options.iter().map(|o| o.text.as_str()).collect::<Vec<_>>()
                    );
                    return Applied::Skipped;
                };
                snapshot.capture(field_id, doc.value(node));
                self.write(doc, node, |doc| {
                    doc.set_value(node, &options[index].value)
                });
                Applied::Filled
            }
            ("input", "checkbox") => {
                let checked = TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(value.trim()));
                snapshot.capture(field_id, doc.is_checked(node).to_string());
                self.write(doc, node, |doc| doc.set_checked(node, checked));
                Applied::Filled
            }
            ("input", "radio") => {
                let matches = doc.value(node) == value || value.eq_ignore_ascii_case("true");
                if !matches {
                    debug!("Radio {} does not carry value {:?}, skipped", field_id, value);
                    return Applied::Skipped;
                }
                snapshot.capture(field_id, doc.is_checked(node).to_string());
                let peers = doc.radio_group_peers(node);
                for peer in &peers {
                    if doc.is_checked(*peer) {
                        snapshot.capture(&locator::locate(doc, *peer), "true");
                    }
                }
                self.write(doc, node, |doc| {
                    doc.set_checked(node, true);
                    for peer in &peers {
                        if doc.is_checked(*peer) {
                            doc.set_checked(*peer, false);
                        }
                    }
                });
                Applied::Filled
            }
            ("input", "file") => {
                if value.is_empty() {
                    Applied::Skipped
                } else {
                    Applied::Failed("file inputs cannot be set programmatically".to_string())
                }
            }
            _ => {
                snapshot.capture(field_id, doc.value(node));
                self.write(doc, node, |doc| doc.set_value(node, value));
                Applied::Filled
            }
        }
    }

    /// Run a mutation wrapped in focus/blur and followed by input/change.
    fn write(&self, doc: &mut Document, node: NodeId, mutate: impl FnOnce(&mut Document)) {
        if self.focus_and_blur {
            doc.focus(node);
        }
        mutate(doc);
        for event in INPUT_EVENTS {
            doc.dispatch(node, event);
        }
        if self.focus_and_blur {
            doc.blur(node);
        }
    }

    /// Restore every captured value. Fields whose element is gone are
    /// skipped. Returns the number of restored fields.
    pub fn restore(&self, doc: &mut Document, snapshot: &FillSnapshot) -> usize {
        let mut undone = 0;

        for entry in snapshot.entries() {
            let Some(node) = locator::resolve(doc, &entry.field_id) else {
                debug!("Undo target {} no longer exists", entry.field_id);
                continue;
            };
            let is_toggle = doc.element(node).is_some_and(|el| {
                el.tag() == "input" && matches!(el.input_type().as_str(), "checkbox" | "radio")
            });

            if is_toggle {
                let checked = entry.previous_value == "true";
                doc.set_checked(node, checked);
            } else {
                doc.set_value(node, &entry.previous_value);
            }
            for event in INPUT_EVENTS {
                doc.dispatch(node, event);
            }
            undone += 1;
        }

        undone
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
