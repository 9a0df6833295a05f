//! Error types and JSON-RPC error codes for the MCP server.

use serde_json::json;

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    /// Server: request arrived before the initialize handshake completed.
    pub const SERVER_NOT_INITIALIZED: i32 = -32002;
    pub const TOOL_NOT_FOUND: i32 = -32803;
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// A tool argument failed schema validation.
    #[error("Invalid arguments: '{field}' {reason}")]
    InvalidArguments { field: String, reason: String },

    #[error("Internal error: {0}")]
    InternalError(String),

    /// Tool or tool listing requested before the handshake completed.
    #[error("Server not initialized: {0}")]
    NotReady(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Two tools registered under the same name.
    #[error("Duplicate tool registration: {0}")]
    DuplicateTool(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service error: {0}")]
    Service(String),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) | McpError::InvalidArguments { .. } => INVALID_PARAMS,
            McpError::InternalError(_) => INTERNAL_ERROR,
            McpError::NotReady(_) => SERVER_NOT_INITIALIZED,
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::DuplicateTool(_) | McpError::Service(_) => INTERNAL_ERROR,
            McpError::Transport(_) | McpError::Io(_) => INTERNAL_ERROR,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        let data = match self {
            McpError::InvalidArguments { field, .. } => Some(json!({ "field": field })),
            _ => None,
        };

        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data,
            },
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arguments_names_field() {
        let err = McpError::InvalidArguments {
            field: "rx_errors".to_string(),
            reason: "is required".to_string(),
        };
        let rpc = err.to_json_rpc_error(RequestId::Number(4));
        assert_eq!(rpc.error.code, -32602);
        assert!(rpc.error.message.contains("rx_errors"));
        assert_eq!(rpc.error.data.unwrap()["field"], "rx_errors");
    }

    #[test]
    fn test_not_ready_code() {
        let err = McpError::NotReady("tools/call".to_string());
        assert_eq!(err.code(), -32002);
    }
}
