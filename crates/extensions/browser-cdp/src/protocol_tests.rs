use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "Page.getFrameTree".to_string(),
        params: None,
        session_id: Some("S1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("Page.getFrameTree"));
    assert!(json.contains("\"sessionId\":\"S1\""));
    assert!(!json.contains("params"));
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"executionContextId": 7}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert_eq!(resp.result.unwrap()["executionContextId"], 7);
}

#[test]
fn test_browser_version_deserialize() {
    let json = r#"{
        "Browser": "Chrome/126.0.0.0",
        "Protocol-Version": "1.3",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.browser, "Chrome/126.0.0.0");
}

#[test]
fn test_frame_tree_flattens_depth_first() {
    let json = r#"{
        "frame": {"id": "main", "loaderId": "L0", "url": "https://top.example"},
        "childFrames": [
            {
                "frame": {"id": "a", "parentId": "main", "loaderId": "L1", "url": "https://a.example"},
                "childFrames": [
                    {"frame": {"id": "a1", "parentId": "a", "loaderId": "L2", "url": "about:blank"}}
                ]
            },
            {"frame": {"id": "b", "parentId": "main", "loaderId": "L3", "url": "https://b.example"}}
        ]
    }"#;
    let tree: FrameTree = serde_json::from_str(json).unwrap();
    let ids: Vec<String> = tree.flatten().into_iter().map(|f| f.id).collect();
    assert_eq!(ids, vec!["main", "a", "a1", "b"]);
}
