use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "Runtime.evaluate".to_string(),
        params: Some(serde_json::json!({"expression": "1 + 1"})),
        session_id: Some("sess1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("Runtime.evaluate"));
    assert!(json.contains("\"sessionId\":\"sess1\""));
}

#[test]
fn test_cdp_request_omits_empty_fields() {
    let req = CdpRequest {
        id: 2,
        method: "Runtime.enable".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("params"));
    assert!(!json.contains("sessionId"));
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"result": {"type": "number", "value": 2}}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
    assert!(resp.error.is_none());
}

#[test]
fn test_page_info_workbench_detection() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "proj - editor",
        "url": "vscode-file://vscode-app/resources/app/out/vs/code/electron-sandbox/workbench/workbench.html",
        "webSocketDebuggerUrl": "ws://localhost:9000/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert!(info.is_workbench());

    let json = r#"{"id": "sw1", "type": "service_worker", "title": "", "url": "chrome-extension://x/workbench.html"}"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert!(!info.is_workbench());
}

#[test]
fn test_browser_version_deserialize() {
    let json = r#"{
        "Browser": "Chrome/128.0.0.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "V8-Version": "12.8",
        "webSocketDebuggerUrl": "ws://localhost:9000/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.protocol_version, "1.3");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}
