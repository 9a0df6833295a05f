//! Message framing for newline-delimited JSON.

use serde_json::Value;

use crate::types::{
    IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest, McpError, McpResult,
    OutgoingMessage, RequestId,
};

/// Parse a single line of text as a JSON-RPC request or notification.
///
/// A message carrying an `id` member (even `null`) is a request; anything
/// else is a notification.
pub fn parse_message(line: &str) -> McpResult<IncomingMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))?;

    let obj = match &value {
        Value::Object(obj) => obj,
        Value::Array(_) => {
            return Err(McpError::ParseError(
                "Batch messages are not supported".to_string(),
            ));
        }
        _ => {
            return Err(McpError::ParseError(
                "Message must be a JSON object".to_string(),
            ));
        }
    };

    if !obj.get("method").is_some_and(Value::is_string) {
        return Err(McpError::ParseError(
            "Message has no string \"method\" member".to_string(),
        ));
    }

    if obj.contains_key("id") {
        serde_json::from_value::<JsonRpcRequest>(value)
            .map(IncomingMessage::Request)
            .map_err(|e| McpError::InvalidRequest(e.to_string()))
    } else {
        serde_json::from_value::<JsonRpcNotification>(value)
            .map(IncomingMessage::Notification)
            .map_err(|e| McpError::InvalidRequest(e.to_string()))
    }
}

/// Best-effort recovery of the request id from a line that failed to decode.
pub fn recover_id(line: &str) -> RequestId {
    serde_json::from_str::<Value>(line.trim())
        .ok()
        .and_then(|v| v.get("id").cloned())
        .and_then(|id| serde_json::from_value(id).ok())
        .unwrap_or(RequestId::Null)
}

/// Serialize an outgoing message as one line, trailing newline included.
///
/// Never fails: an unserializable payload is replaced by an internal-error
/// response carrying the same id.
pub fn encode(message: &OutgoingMessage) -> String {
    let mut line = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to encode response {}: {e}", message.id());
            let fallback = McpError::InternalError(format!("Failed to encode response: {e}"))
                .to_json_rpc_error(message.id().clone());
            encode_error(&fallback)
        }
    };
    line.push('\n');
    line
}

fn encode_error(error: &JsonRpcError) -> String {
    serde_json::to_string(error).unwrap_or_else(|_| {
        r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Internal error"}}"#
            .to_string()
    })
}
