//! Handshake, listing and tool-call flow through the protocol handler.

use std::sync::Arc;

use assert_json_diff::assert_json_include;
use serde_json::{json, Value};

use netops_agent_mcp::config::ServerConfig;
use netops_agent_mcp::protocol::negotiation::SessionPhase;
use netops_agent_mcp::protocol::ProtocolHandler;
use netops_agent_mcp::session::NetOpsSessionManager;
use netops_agent_mcp::tools::ToolRegistry;
use netops_agent_mcp::transport::framing;

// ─────────────────────── helpers ───────────────────────

/// Data directory with a few build files.
fn data_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let builds = dir.path().join("builds");
    std::fs::create_dir_all(&builds).unwrap();

    std::fs::write(
        builds.join("arista_partial.json"),
        json!({ "platform": "x86_64-arista_7170_64c", "version": "202311.1" }).to_string(),
    )
    .unwrap();
    std::fs::write(
        builds.join("sonic_build.json"),
        json!({
            "type": "SONiC",
            "version": "202305.1",
            "platform": "x86_64-mlnx_msn2700-r0",
            "kernel_version": "5.10.0-18-2-amd64",
            "build_date": "2023-06-15",
            "serial_number": "MT2015X07654",
            "mac_address": "98:03:9b:4a:2c:10",
            "hostname": "sonic-leaf-01"
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        builds.join("cisco_build.json"),
        json!({
            "vendor": "Cisco",
            "model": "Nexus 9336C-FX2",
            "os_version": "NX-OS 10.2(3)",
            "hostname": "cisco-core-01"
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(builds.join("broken.json"), "{ not json").unwrap();

    dir
}

fn handler(dir: &tempfile::TempDir) -> ProtocolHandler {
    let config = ServerConfig::with_data_dir(dir.path(), Some(42));
    let session = NetOpsSessionManager::open(&config).unwrap();
    ProtocolHandler::new(session, Arc::new(ToolRegistry::with_defaults().unwrap()))
}

/// Build an MCP JSON-RPC request.
fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

fn init_request() -> Value {
    mcp_request(
        0,
        "initialize",
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }),
    )
}

fn initialized_notification() -> Value {
    json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })
}

fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

/// Send a JSON-RPC message through the handler and return the response.
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

async fn ready_handler(dir: &tempfile::TempDir) -> ProtocolHandler {
    let h = handler(dir);
    send_unwrap(&h, init_request()).await;
    assert!(send(&h, initialized_notification()).await.is_none());
    h
}

/// Decode the JSON text carried in a tools/call result.
fn tool_payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("text content");
    serde_json::from_str(text).expect("content text is JSON")
}

// ─────────────────────── handshake ───────────────────────

#[tokio::test]
async fn test_initialize_result() {
    let dir = data_dir();
    let h = handler(&dir);

    let resp = send_unwrap(&h, init_request()).await;
    assert_eq!(resp["id"], 0);
    assert_eq!(resp["result"]["serverInfo"]["name"], "netops-agent-mcp");
    assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
    assert!(resp["result"]["capabilities"]["tools"].is_object());
    assert!(resp.get("error").is_none());
    assert_eq!(h.phase().await, SessionPhase::Initializing);

    send(&h, initialized_notification()).await;
    assert_eq!(h.phase().await, SessionPhase::Ready);
}

#[tokio::test]
async fn test_tools_call_before_handshake_is_not_ready() {
    let dir = data_dir();
    let h = handler(&dir);

    let resp = send_unwrap(&h, tool_call(1, "get_port_telemetry", json!({}))).await;
    assert_eq!(resp["id"], 1);
    assert_eq!(resp["error"]["code"], -32002);
    assert!(resp.get("result").is_none());

    // Initialized but not yet acknowledged: still not ready.
    send_unwrap(&h, init_request()).await;
    let resp = send_unwrap(&h, mcp_request(2, "tools/list", json!({}))).await;
    assert_eq!(resp["error"]["code"], -32002);
}

#[tokio::test]
async fn test_rejected_call_has_no_side_effect() {
    let dir = data_dir();

    // Same seed: a handler whose first draw was rejected must produce the
    // same telemetry as a fresh one.
    let early = handler(&dir);
    send_unwrap(&early, tool_call(1, "get_port_telemetry", json!({}))).await;
    send_unwrap(&early, init_request()).await;
    send(&early, initialized_notification()).await;
    let a = send_unwrap(&early, tool_call(2, "get_port_telemetry", json!({}))).await;

    let fresh = ready_handler(&dir).await;
    let b = send_unwrap(&fresh, tool_call(2, "get_port_telemetry", json!({}))).await;

    assert_eq!(tool_payload(&a), tool_payload(&b));
}

#[tokio::test]
async fn test_ping_before_initialize() {
    let dir = data_dir();
    let h = handler(&dir);
    let resp = send_unwrap(&h, mcp_request(5, "ping", Value::Null)).await;
    assert_eq!(resp["result"], json!({}));
}

#[tokio::test]
async fn test_unknown_method() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;
    let resp = send_unwrap(&h, mcp_request(3, "resources/list", json!({}))).await;
    assert_eq!(resp["error"]["code"], -32601);
}

// ─────────────────────── tools/list ───────────────────────

#[tokio::test]
async fn test_tools_list_names_are_exact_and_stable() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;

    let expected = vec![
        "get_port_telemetry",
        "get_network_topology",
        "predict_link_health",
        "validate_build_metadata",
        "remediate_link",
        "validate_system_health",
    ];

    for id in 1..=3 {
        let resp = send_unwrap(&h, mcp_request(id, "tools/list", json!({}))).await;
        let names: Vec<&str> = resp["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, expected);
    }
}

#[tokio::test]
async fn test_tool_schemas() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;
    let resp = send_unwrap(&h, mcp_request(1, "tools/list", json!({}))).await;
    let tools = resp["result"]["tools"].as_array().unwrap();

    let health = tools
        .iter()
        .find(|t| t["name"] == "predict_link_health")
        .unwrap();
    assert_json_include!(
        actual: health["inputSchema"].clone(),
        expected: json!({
            "type": "object",
            "properties": {
                "rx_errors": { "type": "integer" },
                "tx_errors": { "type": "integer" },
                "utilization": { "type": "number" }
            },
            "required": ["rx_errors", "tx_errors", "utilization"]
        })
    );

    for tool in tools {
        assert!(tool["description"].as_str().is_some_and(|d| !d.is_empty()));
    }
}

// ─────────────────────── tools/call ───────────────────────

#[tokio::test]
async fn test_port_telemetry_ranges() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;

    for id in 0..20 {
        let resp = send_unwrap(&h, tool_call(id, "get_port_telemetry", json!({}))).await;
        assert_eq!(resp["result"]["content"][0]["type"], "text");
        let t = tool_payload(&resp);
        assert_eq!(t["switch"], "sonic-leaf-01");
        assert_eq!(t["interface"], "Ethernet12");
        for key in ["rx_bytes", "tx_bytes"] {
            let v = t[key].as_u64().unwrap();
            assert!((10_000..=10_000_000).contains(&v), "{key}={v}");
        }
        for key in ["rx_errors", "tx_errors"] {
            assert!(t[key].as_u64().unwrap() <= 10);
        }
        let util = t["utilization"].as_f64().unwrap();
        assert!((0.2..=0.95).contains(&util));
    }
}

#[tokio::test]
async fn test_network_topology() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;
    let resp = send_unwrap(&h, tool_call(1, "get_network_topology", json!({}))).await;
    let topo = tool_payload(&resp);

    assert_eq!(topo["devices"].as_array().unwrap().len(), 5);
    assert_eq!(topo["links"].as_array().unwrap().len(), 4);
    assert_json_include!(
        actual: topo["statistics"].clone(),
        expected: json!({ "total_devices": 5, "total_links": 4 })
    );
    assert!(topo["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_predict_link_health_normalizes_inputs() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;

    let args = json!({ "rx_errors": -2, "tx_errors": 5, "utilization": 1.5 });
    let first = tool_payload(&send_unwrap(&h, tool_call(1, "predict_link_health", args.clone())).await);
    let second = tool_payload(&send_unwrap(&h, tool_call(2, "predict_link_health", args)).await);

    assert_eq!(
        first["inputs"],
        json!({ "rx_errors": 2, "tx_errors": 5, "utilization": 1.0 })
    );
    assert_eq!(first["health_score"], second["health_score"]);
    assert_eq!(first["status"], second["status"]);

    let score = first["health_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));
}

#[tokio::test]
async fn test_predict_link_health_clean_link_is_healthy() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;
    let resp = send_unwrap(
        &h,
        tool_call(1, "predict_link_health", json!({ "rx_errors": 0, "tx_errors": 0, "utilization": 0.9 })),
    )
    .await;
    assert_eq!(tool_payload(&resp)["status"], "healthy");
}

#[tokio::test]
async fn test_validate_build_sonic_platform_missing_fields() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;

    let resp = send_unwrap(
        &h,
        tool_call(1, "validate_build_metadata", json!({ "build_json_path": "arista_partial.json" })),
    )
    .await;
    let v = tool_payload(&resp);
    assert_eq!(v["valid"], false);
    assert_eq!(v["device_type"], "SONiC");
    assert_eq!(
        v["errors"],
        json!(["Missing required fields: kernel_version, build_date"])
    );
    assert_eq!(v["missing_fields"], json!(["kernel_version", "build_date"]));
    assert_eq!(v["warnings"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_validate_build_complete_and_non_sonic() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;

    let sonic = tool_payload(
        &send_unwrap(&h, tool_call(1, "validate_build_metadata", json!({ "path": "sonic_build.json" }))).await,
    );
    assert_eq!(sonic["valid"], true);
    assert_eq!(sonic["errors"], json!([]));
    assert_eq!(sonic["warnings"], json!([]));

    let cisco = tool_payload(
        &send_unwrap(
            &h,
            tool_call(2, "validate_build_metadata", json!({ "build_json_path": "cisco_build.json" })),
        )
        .await,
    );
    assert_eq!(cisco["device_type"], "non-SONiC");
    assert_eq!(cisco["missing_fields"], json!(["firmware_version"]));
    assert_eq!(
        cisco["warnings"],
        json!([
            "Recommended field missing: serial_number",
            "Recommended field missing: mac_address"
        ])
    );
}

#[tokio::test]
async fn test_validate_build_missing_file_is_handler_failure() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;

    let resp = send_unwrap(
        &h,
        tool_call(1, "validate_build_metadata", json!({ "build_json_path": "nope.json" })),
    )
    .await;
    assert!(resp.get("error").is_none(), "handler failures are not protocol errors");

    let v = tool_payload(&resp);
    assert_eq!(v["error"], "Validation failed");
    assert_eq!(v["valid"], false);
    assert_eq!(v["warnings"], json!([]));
    assert_eq!(v["errors"].as_array().unwrap().len(), 1);
    assert!(v["message"].as_str().unwrap().contains("nope.json"));
}

#[tokio::test]
async fn test_validate_build_unparseable_file_is_handler_failure() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;
    let resp = send_unwrap(
        &h,
        tool_call(1, "validate_build_metadata", json!({ "build_json_path": "broken.json" })),
    )
    .await;
    let v = tool_payload(&resp);
    assert_eq!(v["error"], "Validation failed");
    assert_eq!(v["valid"], false);
}

#[tokio::test]
async fn test_remediate_link() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;

    let resp = send_unwrap(&h, tool_call(1, "remediate_link", json!({ "interface": "Ethernet12" }))).await;
    let r = tool_payload(&resp);
    assert_eq!(r["interface"], "Ethernet12");
    assert!([
        "restart_port",
        "reapply_config",
        "clear_counters",
        "no_remediation_needed"
    ]
    .contains(&r["recommended_action"].as_str().unwrap()));
    assert_eq!(r["next_steps"].as_array().unwrap().len(), 3);
    assert!(r["confidence"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_remediate_empty_interface() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;

    for interface in ["", "   "] {
        let resp = send_unwrap(&h, tool_call(1, "remediate_link", json!({ "interface": interface }))).await;
        assert!(resp.get("error").is_none());
        let r = tool_payload(&resp);
        assert_eq!(r["error"], "Invalid interface parameter");
        assert_eq!(r["recommended_action"], Value::Null);
        assert_eq!(r["interface"], interface);
    }
}

#[tokio::test]
async fn test_unknown_tool() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;
    let resp = send_unwrap(&h, tool_call(9, "reboot_everything", json!({}))).await;
    assert_eq!(resp["id"], 9);
    assert_eq!(resp["error"]["code"], -32803);
    assert!(resp.get("result").is_none());
}

#[tokio::test]
async fn test_invalid_arguments_name_the_field() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;

    let resp = send_unwrap(
        &h,
        tool_call(1, "predict_link_health", json!({ "rx_errors": 1, "utilization": 0.3 })),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);
    assert_eq!(resp["error"]["data"]["field"], "tx_errors");

    let resp = send_unwrap(
        &h,
        tool_call(2, "predict_link_health", json!({ "rx_errors": "lots", "tx_errors": 0, "utilization": 0.3 })),
    )
    .await;
    assert_eq!(resp["error"]["data"]["field"], "rx_errors");

    let resp = send_unwrap(&h, tool_call(3, "remediate_link", json!({ "interface": 12 }))).await;
    assert_eq!(resp["error"]["data"]["field"], "interface");
}

#[tokio::test]
async fn test_tools_call_without_params() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;
    let resp = send_unwrap(&h, json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/call" })).await;
    assert_eq!(resp["error"]["code"], -32602);
}

#[tokio::test]
async fn test_system_health_reports_failures_not_errors() {
    let dir = data_dir();
    let config = {
        let mut c = ServerConfig::with_data_dir(dir.path(), Some(1));
        c.probe_settings.http_timeout = std::time::Duration::from_millis(500);
        c.probe_settings.elk_timeout = std::time::Duration::from_millis(500);
        c
    };
    let h = ProtocolHandler::new(
        NetOpsSessionManager::open(&config).unwrap(),
        Arc::new(ToolRegistry::with_defaults().unwrap()),
    );
    send_unwrap(&h, init_request()).await;
    send(&h, initialized_notification()).await;

    // Nothing listens on port 9 locally; every HTTP probe fails fast.
    let resp = send_unwrap(
        &h,
        tool_call(
            1,
            "validate_system_health",
            json!({
                "elk_endpoint": "http://127.0.0.1:9",
                "servicenow_url": "http://127.0.0.1:9",
                "zendesk_url": "http://127.0.0.1:9"
            }),
        ),
    )
    .await;
    assert!(resp.get("error").is_none());
    let report = tool_payload(&resp);
    assert_eq!(report["Syslog"]["status"], "Failed");
    assert_eq!(report["ServiceNow"]["status"], "Failed");
    assert_eq!(report["Zendesk"]["status"], "Failed");
    assert_eq!(report["FlowAnalytics"]["status"], "Not Run");
    assert_eq!(report["FlowAnalytics"]["reason"], "missing license");
    // No sample inventory in the temp dir.
    assert_eq!(report["NetBox"]["status"], "Failed");
    assert_eq!(report["Total"]["NotRun"], 1);
    assert_eq!(report["Total"]["Failed"], 4);
}

#[tokio::test]
async fn test_close_marks_session_closed() {
    let dir = data_dir();
    let h = ready_handler(&dir).await;
    h.close().await;
    assert_eq!(h.phase().await, SessionPhase::Closed);
    assert!(h.session().lock().await.is_closed());

    let resp = send_unwrap(&h, tool_call(1, "get_port_telemetry", json!({}))).await;
    assert_eq!(resp["error"]["code"], -32002);
}

#[tokio::test]
async fn test_system_health_against_live_endpoints() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_cluster/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "green" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/cmdb_ci"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = data_dir();
    std::fs::write(
        dir.path().join("netbox_sample.json"),
        json!({
            "devices": [
                { "name": "sonic-leaf-01" },
                { "name": "sonic-spine-01" },
                { "name": "cisco-core-01" },
                { "name": "fortigate-fw-01" },
                { "name": "edgecore-spine-02" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let h = ready_handler(&dir).await;
    let resp = send_unwrap(
        &h,
        tool_call(
            1,
            "validate_system_health",
            json!({
                "elk_endpoint": server.uri(),
                "servicenow_url": server.uri(),
                "zendesk_url": server.uri()
            }),
        ),
    )
    .await;

    let report = tool_payload(&resp);
    assert_eq!(report["NetBox"]["status"], "Passed");
    assert_eq!(report["Syslog"]["status"], "Passed");
    assert_eq!(report["ServiceNow"]["status"], "Passed");
    assert_eq!(report["Zendesk"]["status"], "Failed");
    assert_json_include!(
        actual: report["Total"].clone(),
        expected: json!({ "Passed": 3, "Failed": 1, "NotRun": 1 })
    );
}
