//! Field identifiers.
//!
//! One scheme is used by the scanner, the fill executor and undo: an element
//! whose `id` attribute is unique in its document is addressed as
//! `//*[@id="…"]`, anything else by its positional path from the document
//! element (`/html[1]/body[1]/form[1]/input[2]`, 1-indexed among siblings of
//! the same tag). Both forms are XPath, so a live page resolves them with
//! `document.evaluate`.

use crate::dom::{Document, NodeId};

const ID_PREFIX: &str = "//*[@id=";

/// Compute the locator of an element.
pub fn locate(doc: &Document, node: NodeId) -> String {
    if let Some(id) = doc.element(node).and_then(|el| el.id()) {
        if doc.is_unique_id(id) {
            if !id.contains('"') {
                return format!("{}\"{}\"]", ID_PREFIX, id);
            }
            if !id.contains('\'') {
                return format!("{}'{}']", ID_PREFIX, id);
            }
        }
    }
    positional_path(doc, node)
}

fn positional_path(doc: &Document, node: NodeId) -> String {
    let mut steps = Vec::new();
    let mut current = Some(node);

    while let Some(id) = current {
        let Some(el) = doc.element(id) else {
            break;
        };
        let parent = doc.parent(id);
        let index = match parent {
            Some(parent) => {
                doc.child_elements(parent)
                    .take_while(|sibling| *sibling != id)
                    .filter(|sibling| doc.element(*sibling).is_some_and(|s| s.tag() == el.tag()))
                    .count()
                    + 1
            }
            None => 1,
        };
        steps.push(format!("{}[{}]", el.tag(), index));
        current = parent;
    }

    steps.reverse();
    format!("/{}", steps.join("/"))
}

/// Resolve a locator back to an element.
pub fn resolve(doc: &Document, locator: &str) -> Option<NodeId> {
    if let Some(rest) = locator.strip_prefix(ID_PREFIX) {
        let quoted = rest.strip_suffix(']')?;
        let quote = quoted.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let id = quoted.strip_prefix(quote)?.strip_suffix(quote)?;
        if id.is_empty() || id.contains(quote) {
            return None;
        }
        return doc.element_by_id(id);
    }

    let path = locator.strip_prefix('/')?;
    let mut current: Option<NodeId> = None;

    for step in path.split('/') {
        let (tag, index) = parse_step(step)?;
        current = match current {
            None => {
                let root = doc.root();
                let matches = doc.element(root).is_some_and(|el| el.tag() == tag);
                if !matches || index != 1 {
                    return None;
                }
                Some(root)
            }
            Some(parent) => doc
                .child_elements(parent)
                .filter(|child| doc.element(*child).is_some_and(|el| el.tag() == tag))
                .nth(index - 1),
        };
        current?;
    }

    current
}

fn parse_step(step: &str) -> Option<(&str, usize)> {
    let (tag, rest) = step.split_once('[')?;
    let index: usize = rest.strip_suffix(']')?.parse().ok()?;
    if tag.is_empty() || index == 0 {
        return None;
    }
    Some((tag, index))
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
