//! Edge case integration tests for netops-agent-mcp.

use std::sync::Arc;

use serde_json::{json, Value};

use netops_agent_mcp::config::ServerConfig;
use netops_agent_mcp::protocol::ProtocolHandler;
use netops_agent_mcp::session::NetOpsSessionManager;
use netops_agent_mcp::tools::ToolRegistry;
use netops_agent_mcp::transport::framing;
use netops_agent_mcp::types::*;

// ─────────────────────── helpers ───────────────────────

fn handler(dir: &tempfile::TempDir, seed: u64) -> ProtocolHandler {
    let config = ServerConfig::with_data_dir(dir.path(), Some(seed));
    let session = NetOpsSessionManager::open(&config).unwrap();
    ProtocolHandler::new(session, Arc::new(ToolRegistry::with_defaults().unwrap()))
}

async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    let parsed = framing::parse_message(&msg.to_string()).unwrap();
    handler
        .handle_message(parsed)
        .await
        .map(|out| serde_json::to_value(out).unwrap())
}

async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

fn init_request(version: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 0,
        "method": "initialize",
        "params": {
            "protocolVersion": version,
            "capabilities": {},
            "clientInfo": { "name": "edge-client", "version": "0.0.1" }
        }
    })
}

async fn ready(handler: &ProtocolHandler) {
    send_unwrap(handler, init_request(MCP_VERSION)).await;
    send(handler, json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })).await;
}

fn call(id: Value, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}

fn payload(response: &Value) -> Value {
    serde_json::from_str(response["result"]["content"][0]["text"].as_str().unwrap()).unwrap()
}

// ─────────────────────── protocol ───────────────────────

#[tokio::test]
async fn test_future_protocol_version_is_answered_with_ours() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    let resp = send_unwrap(&h, init_request("2099-01-01")).await;
    assert_eq!(resp["result"]["protocolVersion"], MCP_VERSION);
}

#[tokio::test]
async fn test_second_initialize_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    ready(&h).await;
    let resp = send_unwrap(&h, init_request(MCP_VERSION)).await;
    assert_eq!(resp["error"]["code"], -32600);

    // The session stays usable.
    let resp = send_unwrap(&h, json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" })).await;
    assert!(resp["result"]["tools"].is_array());
}

#[tokio::test]
async fn test_initialize_without_params() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    let resp = send_unwrap(&h, json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" })).await;
    assert_eq!(resp["error"]["code"], -32602);
}

#[tokio::test]
async fn test_initialized_before_initialize_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    assert!(send(&h, json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
        .await
        .is_none());
    let resp = send_unwrap(&h, call(json!(1), "get_port_telemetry", json!({}))).await;
    assert_eq!(resp["error"]["code"], -32002);
}

#[tokio::test]
async fn test_wrong_jsonrpc_version() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    let resp = send_unwrap(&h, json!({ "jsonrpc": "1.0", "id": 4, "method": "ping" })).await;
    assert_eq!(resp["id"], 4);
    assert_eq!(resp["error"]["code"], -32600);
}

#[tokio::test]
async fn test_ids_are_echoed_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    ready(&h).await;

    for id in [json!(i64::MAX), json!("req-\u{1F680}"), json!(-1), Value::Null] {
        let resp = send_unwrap(&h, call(id.clone(), "get_network_topology", json!({}))).await;
        assert_eq!(resp["id"], id);
        assert!(resp.get("result").is_some() ^ resp.get("error").is_some());
    }
}

#[tokio::test]
async fn test_unknown_and_cancel_notifications_have_no_reply() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    ready(&h).await;
    assert!(send(&h, json!({ "jsonrpc": "2.0", "method": "notifications/whatever" }))
        .await
        .is_none());
    assert!(send(
        &h,
        json!({
            "jsonrpc": "2.0",
            "method": "notifications/cancelled",
            "params": { "requestId": 3, "reason": "user aborted" }
        })
    )
    .await
    .is_none());
}

// ─────────────────────── arguments ───────────────────────

#[tokio::test]
async fn test_string_numbers_are_coerced() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    ready(&h).await;

    let resp = send_unwrap(
        &h,
        call(json!(1), "predict_link_health", json!({ "rx_errors": "3", "tx_errors": 2.0, "utilization": "0.5" })),
    )
    .await;
    let p = payload(&resp);
    assert_eq!(p["inputs"], json!({ "rx_errors": 3, "tx_errors": 2, "utilization": 0.5 }));
}

#[tokio::test]
async fn test_extra_arguments_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    ready(&h).await;
    let resp = send_unwrap(&h, call(json!(1), "get_port_telemetry", json!({ "switch": "other" }))).await;
    assert_eq!(payload(&resp)["switch"], "sonic-leaf-01");
}

#[tokio::test]
async fn test_arguments_must_be_an_object() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    ready(&h).await;
    let resp = send_unwrap(&h, call(json!(1), "remediate_link", json!(["Ethernet1"]))).await;
    assert_eq!(resp["error"]["code"], -32602);
    assert_eq!(resp["error"]["data"]["field"], "arguments");
}

#[tokio::test]
async fn test_null_argument_counts_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    ready(&h).await;
    let resp = send_unwrap(&h, call(json!(1), "remediate_link", json!({ "interface": null }))).await;
    assert_eq!(resp["error"]["data"]["field"], "interface");
}

// ─────────────────────── boundary values ───────────────────────

#[tokio::test]
async fn test_health_extremes_stay_in_range() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    ready(&h).await;

    let cases = [
        json!({ "rx_errors": 0, "tx_errors": 0, "utilization": -5.0 }),
        json!({ "rx_errors": i64::MAX, "tx_errors": i64::MAX, "utilization": 1.0 }),
        json!({ "rx_errors": i64::MIN, "tx_errors": 0, "utilization": 0.0 }),
    ];
    for (i, args) in cases.into_iter().enumerate() {
        let resp = send_unwrap(&h, call(json!(i), "predict_link_health", args)).await;
        let p = payload(&resp);
        let score = p["health_score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score), "case {i}: {score}");
        let util = p["inputs"]["utilization"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&util));
    }
}

#[tokio::test]
async fn test_more_errors_never_raise_the_score() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    ready(&h).await;

    let mut previous = f64::INFINITY;
    for errors in [0, 1, 2, 5, 10, 50] {
        let resp = send_unwrap(
            &h,
            call(json!(errors), "predict_link_health", json!({ "rx_errors": errors, "tx_errors": 0, "utilization": 0.6 })),
        )
        .await;
        let score = payload(&resp)["health_score"].as_f64().unwrap();
        assert!(score <= previous);
        previous = score;
    }
}

#[tokio::test]
async fn test_unicode_interface_name() {
    let dir = tempfile::tempdir().unwrap();
    let h = handler(&dir, 1);
    ready(&h).await;
    let resp = send_unwrap(&h, call(json!(1), "remediate_link", json!({ "interface": "Ethernet\u{00e9}/1" }))).await;
    assert_eq!(payload(&resp)["interface"], "Ethernet\u{00e9}/1");
}

#[tokio::test]
async fn test_absolute_build_path() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("elsewhere.json");
    std::fs::write(&file, json!({ "platform": "sonic-vs", "version": "1" }).to_string()).unwrap();

    let h = handler(&dir, 1);
    ready(&h).await;
    let resp = send_unwrap(
        &h,
        call(json!(1), "validate_build_metadata", json!({ "build_json_path": file.to_str().unwrap() })),
    )
    .await;
    let p = payload(&resp);
    assert_eq!(p["device_type"], "SONiC");
    assert_eq!(p["missing_fields"], json!(["kernel_version", "build_date"]));
}

#[tokio::test]
async fn test_build_file_holding_an_array() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("array.json");
    std::fs::write(&file, "[1, 2, 3]").unwrap();

    let h = handler(&dir, 1);
    ready(&h).await;
    let resp = send_unwrap(
        &h,
        call(json!(1), "validate_build_metadata", json!({ "build_json_path": file.to_str().unwrap() })),
    )
    .await;
    let p = payload(&resp);
    assert_eq!(p["error"], "Validation failed");
    assert_eq!(p["valid"], false);
}

#[tokio::test]
async fn test_same_seed_same_remediation_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let a = handler(&dir, 99);
    let b = handler(&dir, 99);
    ready(&a).await;
    ready(&b).await;

    for id in 0..5 {
        let ra = payload(&send_unwrap(&a, call(json!(id), "remediate_link", json!({ "interface": "Ethernet4" }))).await);
        let rb = payload(&send_unwrap(&b, call(json!(id), "remediate_link", json!({ "interface": "Ethernet8" }))).await);
        assert_eq!(ra["recommended_action"], rb["recommended_action"]);
        assert_eq!(ra["confidence"], rb["confidence"]);
    }
}
