//! Document model.
//!
//! An arena of element and text nodes carrying the live properties the fill
//! engine reads and writes (value, checked, selected, disabled, rendered).
//! Every write is also appended to a mutation journal so a document captured
//! from a live page can be written back to it.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use smartfill_protocols::PageContext;

use crate::locator;

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;

/// Index of a node in its document.
pub type NodeId = usize;

/// Serialized node tree, as produced by the page capture script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializedNode {
    Text {
        text: String,
    },
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selected: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        disabled: Option<bool>,
        #[serde(default = "default_rendered", skip_serializing_if = "is_true")]
        rendered: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<SerializedNode>,
    },
}

fn default_rendered() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

impl SerializedNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            value: None,
            checked: None,
            selected: None,
            disabled: None,
            rendered: true,
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Set an attribute. No-op on text nodes.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Element { attrs, .. } = &mut self {
            attrs.insert(name.into(), value.into());
        }
        self
    }

    pub fn child(mut self, node: SerializedNode) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = SerializedNode>) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    /// Mark the element as having no layout box.
    pub fn hidden(mut self) -> Self {
        if let Self::Element { rendered, .. } = &mut self {
            *rendered = false;
        }
        self
    }

    pub fn disabled(mut self) -> Self {
        if let Self::Element { disabled, .. } = &mut self {
            *disabled = Some(true);
        }
        self
    }

    pub fn value(mut self, live: impl Into<String>) -> Self {
        if let Self::Element { value, .. } = &mut self {
            *value = Some(live.into());
        }
        self
    }

    pub fn checked(mut self, state: bool) -> Self {
        if let Self::Element { checked, .. } = &mut self {
            *checked = Some(state);
        }
        self
    }

    pub fn selected(mut self, state: bool) -> Self {
        if let Self::Element { selected, .. } = &mut self {
            *selected = Some(state);
        }
        self
    }
}

/// A captured page: one frame's document plus its child frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCapture {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub root: SerializedNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<PageCapture>,
}

/// A recorded write against the live page, addressed by locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    SetValue { target: String, value: String },
    SetChecked { target: String, checked: bool },
    Dispatch { target: String, event: String },
    Focus { target: String },
    Blur { target: String },
}

impl Mutation {
    pub fn target(&self) -> &str {
        match self {
            Self::SetValue { target, .. }
            | Self::SetChecked { target, .. }
            | Self::Dispatch { target, .. }
            | Self::Focus { target }
            | Self::Blur { target } => target,
        }
    }
}

/// Element data.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    value: Option<String>,
    checked: Option<bool>,
    selected: Option<bool>,
    disabled: Option<bool>,
    rendered: bool,
}

impl Element {
    /// Lowercase tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|v| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// The `id` attribute, when non-empty.
    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// Lowercased `type` of an input (`text` when absent).
    pub fn input_type(&self) -> String {
        match self.attr("type") {
            Some(t) if !t.trim().is_empty() => t.trim().to_ascii_lowercase(),
            _ => "text".to_string(),
        }
    }

    fn is_input_of(&self, kind: &str) -> bool {
        self.tag == "input" && self.input_type() == kind
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// One frame's document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    url: String,
    title: String,
    id_counts: HashMap<String, usize>,
    journal: Vec<Mutation>,
}

impl Document {
    /// Build a document from a serialized tree. A text root is wrapped in an
    /// `html` element.
    pub fn new(url: impl Into<String>, title: impl Into<String>, root: &SerializedNode) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            url: url.into(),
            title: title.into(),
            id_counts: HashMap::new(),
            journal: Vec::new(),
        };

        match root {
            SerializedNode::Element { .. } => {
                doc.insert(None, root);
            }
            SerializedNode::Text { .. } => {
                let html = doc.insert(None, &SerializedNode::element("html"));
                doc.insert(Some(html), root);
            }
        }
        doc
    }

    pub fn from_capture(capture: &PageCapture) -> Self {
        Self::new(capture.url.clone(), capture.title.clone(), &capture.root)
    }

    fn insert(&mut self, parent: Option<NodeId>, node: &SerializedNode) -> NodeId {
        let id = self.nodes.len();
        match node {
            SerializedNode::Text { text } => {
                self.nodes.push(Node {
                    parent,
                    children: Vec::new(),
                    data: NodeData::Text(text.clone()),
                });
            }
            SerializedNode::Element {
                tag,
                attrs,
                value,
                checked,
                selected,
                disabled,
                rendered,
                children,
            } => {
                let element = Element {
                    tag: tag.to_ascii_lowercase(),
                    attrs: attrs.clone(),
                    value: value.clone(),
                    checked: *checked,
                    selected: *selected,
                    disabled: *disabled,
                    rendered: *rendered,
                };
                if let Some(element_id) = element.id() {
                    *self.id_counts.entry(element_id.to_string()).or_insert(0) += 1;
                }
                self.nodes.push(Node {
                    parent,
                    children: Vec::new(),
                    data: NodeData::Element(element),
                });
                for child in children {
                    let child_id = self.insert(Some(id), child);
                    self.nodes[id].children.push(child_id);
                }
            }
        }
        id
    }

    /// Export the current state (live properties included) as a tree.
    pub fn to_serialized(&self) -> SerializedNode {
        self.serialize_node(self.root())
    }

    fn serialize_node(&self, id: NodeId) -> SerializedNode {
        let node = &self.nodes[id];
        match &node.data {
            NodeData::Text(text) => SerializedNode::text(text.clone()),
            NodeData::Element(el) => SerializedNode::Element {
                tag: el.tag.clone(),
                attrs: el.attrs.clone(),
                value: el.value.clone(),
                checked: el.checked,
                selected: el.selected,
                disabled: el.disabled,
                rendered: el.rendered,
                children: node
                    .children
                    .iter()
                    .map(|child| self.serialize_node(*child))
                    .collect(),
            },
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page_context(&self) -> PageContext {
        PageContext {
            url: self.url.clone(),
            title: self.title.clone(),
        }
    }

    /// The document element.
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id).map(|n| &n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Element children, in order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
    }

    /// Every element in document order. Arena indices are assigned in
    /// pre-order, so this is a plain scan.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).filter(|id| self.element(*id).is_some())
    }

    /// Elements below `id` in document order, `id` excluded.
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(id) {
            for child in &node.children {
                if self.element(*child).is_some() {
                    out.push(*child);
                    self.collect_descendants(*child, out);
                }
            }
        }
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Nearest inclusive ancestor with the given tag.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.element(node).is_some_and(|el| el.tag == tag) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Whether the id attribute value occurs exactly once.
    pub fn is_unique_id(&self, id: &str) -> bool {
        self.id_counts.get(id) == Some(&1)
    }

    /// First element carrying the given id, in document order.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        if !self.id_counts.contains_key(id) {
            return None;
        }
        self.elements()
            .find(|node| self.element(*node).and_then(|el| el.id()) == Some(id))
    }

    /// The element and every ancestor have a layout box.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(el) = self.element(node) {
                if !el.rendered {
                    return false;
                }
            }
            current = self.parent(node);
        }
        true
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.element(id)
            .map(|el| el.disabled.unwrap_or_else(|| el.has_attr("disabled")))
            .unwrap_or(false)
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.element(id)
            .map(|el| el.checked.unwrap_or_else(|| el.has_attr("checked")))
            .unwrap_or(false)
    }

    /// `<option>` elements of a select, in order.
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendant_elements(select)
            .into_iter()
            .filter(|node| self.element(*node).is_some_and(|el| el.tag == "option"))
            .collect()
    }

    /// Display text of an option (whitespace collapsed).
    pub fn option_text(&self, option: NodeId) -> String {
        normalize_whitespace(&self.text_content(option))
    }

    pub fn option_value(&self, option: NodeId) -> String {
        match self.element(option).and_then(|el| el.attr("value")) {
            Some(value) => value.to_string(),
            None => self.option_text(option),
        }
    }

    fn option_flag(&self, option: NodeId) -> bool {
        self.element(option)
            .map(|el| el.selected.unwrap_or_else(|| el.has_attr("selected")))
            .unwrap_or(false)
    }

    /// The option a single-select displays: the first flagged one, else the
    /// first option.
    pub fn selected_option(&self, select: NodeId) -> Option<NodeId> {
        let options = self.options(select);
        options
            .iter()
            .copied()
            .find(|option| self.option_flag(*option))
            .or_else(|| options.first().copied())
    }

    pub fn is_option_selected(&self, select: NodeId, option: NodeId) -> bool {
        self.selected_option(select) == Some(option)
    }

    /// Live value of a form control.
    pub fn value(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return String::new();
        };
        match el.tag.as_str() {
            "select" => self
                .selected_option(id)
                .map(|option| self.option_value(option))
                .unwrap_or_default(),
            "textarea" => el.value.clone().unwrap_or_else(|| self.text_content(id)),
            "option" => self.option_value(id),
            _ if el.is_input_of("checkbox") || el.is_input_of("radio") => el
                .attr("value")
                .map(|v| v.to_string())
                .unwrap_or_else(|| "on".to_string()),
            _ => el
                .value
                .clone()
                .or_else(|| el.attr("value").map(|v| v.to_string()))
                .unwrap_or_default(),
        }
    }

    /// The form an element belongs to: the `form` attribute target, else the
    /// nearest ancestor form.
    pub fn form_owner(&self, id: NodeId) -> Option<NodeId> {
        let el = self.element(id)?;
        if let Some(form_id) = el.attr("form").filter(|f| !f.is_empty()) {
            return self
                .element_by_id(form_id)
                .filter(|form| self.element(*form).is_some_and(|f| f.tag == "form"));
        }
        self.parent(id).and_then(|parent| self.closest(parent, "form"))
    }

    /// Other radios sharing this radio's group (same name, same form owner).
    pub fn radio_group_peers(&self, id: NodeId) -> Vec<NodeId> {
        let Some(name) = self
            .element(id)
            .and_then(|el| el.attr("name"))
            .filter(|n| !n.is_empty())
        else {
            return Vec::new();
        };
        let owner = self.form_owner(id);
        self.elements()
            .filter(|other| *other != id)
            .filter(|other| {
                self.element(*other).is_some_and(|el| {
                    el.is_input_of("radio") && el.attr("name") == Some(name)
                })
            })
            .filter(|other| self.form_owner(*other) == owner)
            .collect()
    }

    /// Assign the value property. For a select this picks the first option
    /// with that value (none when nothing matches).
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        let is_select = self.element(id).is_some_and(|el| el.tag == "select");
        if is_select {
            let mut matched = false;
            for option in self.options(id) {
                let hit = !matched && self.option_value(option) == value;
                matched |= hit;
                if let Some(el) = self.element_mut(option) {
                    el.selected = Some(hit);
                }
            }
        } else if let Some(el) = self.element_mut(id) {
            el.value = Some(value.to_string());
        }
        self.record(id, |target| Mutation::SetValue {
            target,
            value: value.to_string(),
        });
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        if let Some(el) = self.element_mut(id) {
            el.checked = Some(checked);
        }
        self.record(id, |target| Mutation::SetChecked { target, checked });
    }

    /// Record a synthesized bubbling event.
    pub fn dispatch(&mut self, id: NodeId, event: &str) {
        self.record(id, |target| Mutation::Dispatch {
            target,
            event: event.to_string(),
        });
    }

    pub fn focus(&mut self, id: NodeId) {
        self.record(id, |target| Mutation::Focus { target });
    }

    pub fn blur(&mut self, id: NodeId) {
        self.record(id, |target| Mutation::Blur { target });
    }

    fn record(&mut self, id: NodeId, build: impl FnOnce(String) -> Mutation) {
        let target = locator::locate(self, id);
        self.journal.push(build(target));
    }

    /// Mutations recorded so far, in order.
    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }
}

/// Collapse whitespace runs to a single space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
