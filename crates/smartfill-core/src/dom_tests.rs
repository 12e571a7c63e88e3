use super::*;
use serde_json::json;

use SerializedNode as N;

fn select_doc() -> Document {
    let root = N::element("html").child(
        N::element("body").child(
            N::element("select")
                .attr("id", "size")
                .child(N::element("option").attr("value", "s").child(N::text("Small")))
                .child(
                    N::element("optgroup").child(
                        N::element("option")
                            .attr("value", "m")
                            .attr("selected", "")
                            .child(N::text("  Medium \n size ")),
                    ),
                )
                .child(N::element("option").child(N::text("Large"))),
        ),
    );
    Document::new("https://shop.example", "Shop", &root)
}

fn by_id(doc: &Document, id: &str) -> NodeId {
    doc.element_by_id(id).unwrap()
}

#[test]
fn test_serialized_node_from_capture_json() {
    let node: SerializedNode = serde_json::from_value(json!({
        "tag": "input",
        "attrs": {"id": "email", "type": "email"},
        "value": "a@b.c",
        "rendered": false,
        "children": [{"text": "ignored"}]
    }))
    .unwrap();

    let doc = Document::new("", "", &node);
    let input = doc.root();
    assert_eq!(doc.element(input).unwrap().input_type(), "email");
    assert_eq!(doc.value(input), "a@b.c");
    assert!(!doc.is_rendered(input));
}

#[test]
fn test_text_root_is_wrapped() {
    let doc = Document::new("", "", &N::text("hello"));
    assert_eq!(doc.element(doc.root()).unwrap().tag(), "html");
    assert_eq!(doc.text_content(doc.root()), "hello");
}

#[test]
fn test_tags_are_lowercased() {
    let doc = Document::new("", "", &N::element("HTML").child(N::element("BODY")));
    assert_eq!(doc.element(doc.root()).unwrap().tag(), "html");
}

#[test]
fn test_select_value_follows_selected_option() {
    let doc = select_doc();
    let select = by_id(&doc, "size");
    assert_eq!(doc.options(select).len(), 3);
    assert_eq!(doc.value(select), "m");
}

#[test]
fn test_option_text_is_normalized_and_value_defaults_to_text() {
    let doc = select_doc();
    let options = doc.options(by_id(&doc, "size"));
    assert_eq!(doc.option_text(options[1]), "Medium size");
    assert_eq!(doc.option_value(options[2]), "Large");
}

#[test]
fn test_select_without_selection_shows_first_option() {
    let root = N::element("select")
        .child(N::element("option").attr("value", "a"))
        .child(N::element("option").attr("value", "b"));
    let doc = Document::new("", "", &root);
    assert_eq!(doc.value(doc.root()), "a");
}

#[test]
fn test_set_value_on_select_moves_selection() {
    let mut doc = select_doc();
    let select = by_id(&doc, "size");
    doc.set_value(select, "Large");

    assert_eq!(doc.value(select), "Large");
    assert_eq!(
        doc.journal(),
        &[Mutation::SetValue {
            target: "//*[@id=\"size\"]".to_string(),
            value: "Large".to_string(),
        }]
    );
}

#[test]
fn test_checkbox_value_defaults_to_on() {
    let root = N::element("input").attr("type", "checkbox");
    let doc = Document::new("", "", &root);
    assert_eq!(doc.value(doc.root()), "on");
    assert!(!doc.is_checked(doc.root()));
}

#[test]
fn test_checked_property_overrides_attribute() {
    let root = N::element("input")
        .attr("type", "checkbox")
        .attr("checked", "")
        .checked(false);
    let doc = Document::new("", "", &root);
    assert!(!doc.is_checked(doc.root()));
}

#[test]
fn test_textarea_value_defaults_to_text() {
    let root = N::element("textarea").child(N::text("Hello there"));
    let mut doc = Document::new("", "", &root);
    assert_eq!(doc.value(doc.root()), "Hello there");

    doc.set_value(doc.root(), "Bye");
    assert_eq!(doc.value(doc.root()), "Bye");
}

#[test]
fn test_disabled_from_attribute_or_property() {
    let root = N::element("form")
        .child(N::element("input").attr("id", "a").attr("disabled", ""))
        .child(N::element("input").attr("id", "b").disabled())
        .child(N::element("input").attr("id", "c"));
    let doc = Document::new("", "", &root);
    assert!(doc.is_disabled(by_id(&doc, "a")));
    assert!(doc.is_disabled(by_id(&doc, "b")));
    assert!(!doc.is_disabled(by_id(&doc, "c")));
}

#[test]
fn test_hidden_ancestor_hides_descendants() {
    let root = N::element("html").child(
        N::element("div")
            .hidden()
            .child(N::element("input").attr("id", "inner")),
    );
    let doc = Document::new("", "", &root);
    assert!(!doc.is_rendered(by_id(&doc, "inner")));
}

#[test]
fn test_radio_group_peers_respect_form_owner() {
    let root = N::element("body")
        .child(
            N::element("form")
                .attr("id", "f1")
                .child(N::element("input").attr("type", "radio").attr("name", "g").attr("id", "a"))
                .child(N::element("input").attr("type", "radio").attr("name", "g").attr("id", "b"))
                .child(N::element("input").attr("type", "radio").attr("name", "h").attr("id", "c")),
        )
        .child(
            N::element("form")
                .child(N::element("input").attr("type", "radio").attr("name", "g").attr("id", "d")),
        )
        .child(
            N::element("input")
                .attr("type", "radio")
                .attr("name", "g")
                .attr("form", "f1")
                .attr("id", "e"),
        );
    let doc = Document::new("", "", &root);

    let peers = doc.radio_group_peers(by_id(&doc, "a"));
    assert_eq!(peers, vec![by_id(&doc, "b"), by_id(&doc, "e")]);
}

#[test]
fn test_to_serialized_keeps_live_state() {
    let root = N::element("html").child(N::element("input").attr("id", "x"));
    let mut doc = Document::new("", "", &root);
    let input = by_id(&doc, "x");
    doc.set_value(input, "typed");

    let exported = doc.to_serialized();
    let reloaded = Document::new("", "", &exported);
    assert_eq!(reloaded.value(by_id(&reloaded, "x")), "typed");
    assert!(reloaded.journal().is_empty());
}

#[test]
fn test_take_journal_drains() {
    let root = N::element("input").attr("id", "x");
    let mut doc = Document::new("", "", &root);
    doc.focus(doc.root());
    doc.dispatch(doc.root(), "input");
    doc.blur(doc.root());

    let journal = doc.take_journal();
    assert_eq!(journal.len(), 3);
    assert_eq!(journal[1].target(), "//*[@id=\"x\"]");
    assert!(doc.journal().is_empty());
}

#[test]
fn test_mutation_wire_format() {
    let mutation = Mutation::SetChecked {
        target: "/html[1]".to_string(),
        checked: true,
    };
    assert_eq!(
        serde_json::to_value(&mutation).unwrap(),
        json!({"op": "setChecked", "target": "/html[1]", "checked": true})
    );
}

#[test]
fn test_page_capture_nested_frames() {
    let capture: PageCapture = serde_json::from_value(json!({
        "url": "https://a.example",
        "title": "A",
        "root": {"tag": "html"},
        "frames": [{"url": "https://b.example", "root": {"tag": "html"}}]
    }))
    .unwrap();
    assert_eq!(capture.frames.len(), 1);
    assert_eq!(capture.frames[0].title, "");

    let doc = Document::from_capture(&capture);
    assert_eq!(doc.page_context().url, "https://a.example");
}

#[test]
fn test_normalize_whitespace() {
    assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
    assert_eq!(normalize_whitespace(" \n "), "");
}
