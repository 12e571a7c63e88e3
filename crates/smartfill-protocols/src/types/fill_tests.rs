use super::*;

#[test]
fn test_fill_result_merge() {
    let mut total = FillResult::default();
    total.merge(FillResult {
        filled_count: 2,
        errors: vec!["a".to_string()],
    });
    total.merge(FillResult {
        filled_count: 3,
        errors: vec!["b".to_string()],
    });
    assert_eq!(total.filled_count, 5);
    assert_eq!(total.errors, vec!["a", "b"]);
}

#[test]
fn test_snapshot_keeps_first_capture() {
    let mut snapshot = FillSnapshot::new();
    assert!(snapshot.capture("name", "Ada"));
    assert!(!snapshot.capture("name", "Grace"));
    assert_eq!(snapshot.get("name"), Some("Ada"));
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn test_snapshot_preserves_capture_order() {
    let mut snapshot = FillSnapshot::new();
    snapshot.capture("b", "1");
    snapshot.capture("a", "2");
    let ids: Vec<_> = snapshot.entries().iter().map(|e| e.field_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn test_frame_fill_wire_format() {
    let mut snapshot = FillSnapshot::new();
    snapshot.capture("x", "old");
    let fill = FrameFill {
        result: FillResult {
            filled_count: 1,
            errors: vec![],
        },
        snapshot,
    };
    let json = serde_json::to_value(&fill).unwrap();
    assert_eq!(json["filledCount"], 1);
    assert_eq!(json["snapshot"][0]["fieldId"], "x");
    assert_eq!(json["snapshot"][0]["previousValue"], "old");
}

#[test]
fn test_last_fill_field_count() {
    let mut a = FillSnapshot::new();
    a.capture("x", "");
    a.capture("y", "");
    let mut b = FillSnapshot::new();
    b.capture("z", "");
    let last = LastFill {
        tab_id: "tab".to_string(),
        url: "https://example.com".to_string(),
        filled_at: Utc::now(),
        frames: vec![
            FrameSnapshot {
                frame_id: 0,
                document_id: "0:1".to_string(),
                snapshot: a,
            },
            FrameSnapshot {
                frame_id: 1,
                document_id: "1:1".to_string(),
                snapshot: b,
            },
        ],
    };
    assert_eq!(last.field_count(), 3);
}
