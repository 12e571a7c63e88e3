use super::*;

fn descriptor(frame_id: FrameId) -> FieldDescriptor {
    FieldDescriptor {
        id: "//*[@id=\"email\"]".to_string(),
        label: "Email".to_string(),
        name: "email".to_string(),
        field_type: FieldType::Email,
        tag_name: "input".to_string(),
        placeholder: String::new(),
        current_value: String::new(),
        required: true,
        options: vec![],
        frame_id,
    }
}

#[test]
fn test_field_type_parsing() {
    assert_eq!(FieldType::from("EMAIL"), FieldType::Email);
    assert_eq!(FieldType::from(""), FieldType::Text);
    assert_eq!(FieldType::from("select-one"), FieldType::Select);
    assert_eq!(FieldType::from("color"), FieldType::Other("color".to_string()));
}

#[test]
fn test_field_type_serializes_as_string() {
    let json = serde_json::to_string(&FieldType::Checkbox).unwrap();
    assert_eq!(json, "\"checkbox\"");
    let parsed: FieldType = serde_json::from_str("\"range\"").unwrap();
    assert_eq!(parsed.as_str(), "range");
}

#[test]
fn test_field_key_top_frame_keeps_id() {
    let field = descriptor(0);
    assert_eq!(field.key(), "//*[@id=\"email\"]");
}

#[test]
fn test_field_key_nested_frame_is_prefixed() {
    let field = descriptor(3);
    assert_eq!(field.key(), "frame-3:://*[@id=\"email\"]");
}

#[test]
fn test_descriptor_camel_case_wire_format() {
    let json = serde_json::to_value(descriptor(0)).unwrap();
    assert_eq!(json["tagName"], "input");
    assert_eq!(json["currentValue"], "");
    assert_eq!(json["type"], "email");
    assert_eq!(json["frameId"], 0);
    assert!(json.get("options").is_none());
}

#[test]
fn test_display_label_fallbacks() {
    let mut field = descriptor(0);
    assert_eq!(field.display_label(), "Email");
    field.label.clear();
    assert_eq!(field.display_label(), "email");
    field.name.clear();
    assert_eq!(field.display_label(), "//*[@id=\"email\"]");
}

#[test]
fn test_simplified_uses_page_key() {
    let simplified = descriptor(2).simplified();
    assert_eq!(simplified.id, "frame-2:://*[@id=\"email\"]");
    assert_eq!(simplified.field_type, FieldType::Email);
}
