//! Scripts evaluated inside a frame's isolated world.

use serde_json::Value;

use smartfill_core::Mutation;

/// Serializes the frame's document into `{url, title, root}`.
///
/// Controls carry their live state; a control is rendered when it has an
/// offset parent. Script, style and nested frame content is left out.
pub const CAPTURE_JS: &str = r#"(() => {
  const SKIP = new Set(['script', 'style', 'noscript', 'template']);
  const CONTROLS = new Set(['input', 'select', 'textarea']);
  const walk = (node) => {
    if (node.nodeType === Node.TEXT_NODE) {
      return node.nodeValue.trim() === '' ? null : { text: node.nodeValue };
    }
    if (node.nodeType !== Node.ELEMENT_NODE) return null;
    const tag = node.localName.toLowerCase();
    if (SKIP.has(tag)) return null;
    const out = { tag };
    if (node.attributes.length) {
      out.attrs = {};
      for (const attr of node.attributes) out.attrs[attr.name] = attr.value;
    }
    if (CONTROLS.has(tag)) {
      out.disabled = node.disabled === true;
      out.rendered = node.offsetParent !== null;
      if (tag !== 'select') out.value = node.value;
      if (tag === 'input' && (node.type === 'checkbox' || node.type === 'radio')) {
        out.checked = node.checked;
      }
    }
    if (tag === 'option') out.selected = node.selected;
    if (tag !== 'iframe' && tag !== 'frame') {
      const children = [];
      for (const child of node.childNodes) {
        const serialized = walk(child);
        if (serialized) children.push(serialized);
      }
      if (children.length) out.children = children;
    }
    return out;
  };
  return { url: location.href, title: document.title, root: walk(document.documentElement) };
})()"#;

/// Replays a mutation journal on the live elements. Returns the locators it
/// could not resolve.
const APPLY_FN: &str = r#"((journal) => {
  const find = (xpath) => document.evaluate(
    xpath, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null
  ).singleNodeValue;
  const missing = new Set();
  for (const m of journal) {
    const el = find(m.target);
    if (!el) { missing.add(m.target); continue; }
    switch (m.op) {
      case 'setValue': el.value = m.value; break;
      case 'setChecked': el.checked = m.checked; break;
      case 'dispatch': el.dispatchEvent(new Event(m.event, { bubbles: true })); break;
      case 'focus': el.focus(); break;
      case 'blur': el.blur(); break;
    }
  }
  return Array.from(missing);
})"#;

/// Expression applying `journal` to the document.
pub fn apply_expression(journal: &[Mutation]) -> Result<String, serde_json::Error> {
    Ok(format!("{}({})", APPLY_FN, serde_json::to_string(journal)?))
}

/// Locators reported unresolved by the apply script.
pub fn unresolved(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
