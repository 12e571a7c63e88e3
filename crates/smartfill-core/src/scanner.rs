//! Field scanner.

use smartfill_protocols::{FieldDescriptor, FieldType, SelectOption, TOP_FRAME};

use crate::dom::{normalize_whitespace, Document, NodeId};
use crate::locator;

/// Input types that are never offered for filling.
const EXCLUDED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button"];

/// Extract every fillable field of a document, in document order.
///
/// A field is an `input` (except hidden, submit and button), `textarea` or
/// `select` that is enabled and rendered. Descriptors carry frame 0; the
/// orchestrator re-tags them with the frame they came from.
pub fn scan(doc: &Document) -> Vec<FieldDescriptor> {
    doc.elements()
        .filter(|node| is_eligible(doc, *node))
        .map(|node| describe(doc, node))
        .collect()
}

fn is_eligible(doc: &Document, node: NodeId) -> bool {
    let Some(el) = doc.element(node) else {
        return false;
    };
    let candidate = match el.tag() {
        "input" => !EXCLUDED_INPUT_TYPES.contains(&el.input_type().as_str()),
        "textarea" | "select" => true,
        _ => false,
    };
    candidate && !doc.is_disabled(node) && doc.is_rendered(node)
}

fn describe(doc: &Document, node: NodeId) -> FieldDescriptor {
    let attr = |name: &str| {
        doc.element(node)
            .and_then(|el| el.attr(name))
            .unwrap_or_default()
            .to_string()
    };
    let tag_name = doc
        .element(node)
        .map(|el| el.tag().to_string())
        .unwrap_or_default();

    let field_type = match tag_name.as_str() {
        "select" => FieldType::Select,
        "textarea" => FieldType::Textarea,
        _ => FieldType::from(
            doc.element(node)
                .map(|el| el.input_type())
                .unwrap_or_default(),
        ),
    };

    let options = if field_type == FieldType::Select {
        doc.options(node)
            .into_iter()
            .map(|option| SelectOption {
                value: doc.option_value(option),
                text: doc.option_text(option),
                selected: doc.is_option_selected(node, option),
            })
            .collect()
    } else {
        Vec::new()
    };

    FieldDescriptor {
        id: locator::locate(doc, node),
        label: best_label(doc, node),
        name: attr("name"),
        field_type,
        tag_name,
        placeholder: attr("placeholder"),
        current_value: doc.value(node),
        required: doc.element(node).is_some_and(|el| el.has_attr("required")),
        options,
        frame_id: TOP_FRAME,
    }
}

/// Label cascade, first non-blank hit wins: linked `<label for>`, enclosing
/// `<label>`, placeholder, name, `aria-label`.
pub fn best_label(doc: &Document, node: NodeId) -> String {
    let Some(el) = doc.element(node) else {
        return String::new();
    };

    let linked = el.id().and_then(|id| {
        doc.elements().find(|candidate| {
            doc.element(*candidate)
                .is_some_and(|c| c.tag() == "label" && c.attr("for") == Some(id))
        })
    });
    let enclosing = doc.parent(node).and_then(|parent| doc.closest(parent, "label"));

    let candidates = [
        linked.map(|label| doc.text_content(label)),
        enclosing.map(|label| doc.text_content(label)),
        el.attr("placeholder").map(str::to_string),
        el.attr("name").map(str::to_string),
        el.attr("aria-label").map(str::to_string),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(|text| normalize_whitespace(&text))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
