//! Session phase tracking and capability negotiation during initialization.

use crate::types::{
    ClientCapabilities, Implementation, InitializeParams, InitializeResult, McpError, McpResult,
    MCP_VERSION,
};

/// Lifecycle of one client connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing received yet.
    #[default]
    Uninitialized,
    /// `initialize` answered, waiting for `notifications/initialized`.
    Initializing,
    /// Handshake complete; tools may be listed and called.
    Ready,
    /// Transport closed.
    Closed,
}

/// Handshake state and what the client told us about itself.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    pub phase: SessionPhase,
    pub client: ClientCapabilities,
    pub client_info: Option<Implementation>,
    pub client_protocol_version: Option<String>,
}

impl NegotiatedCapabilities {
    pub fn negotiate(&mut self, params: InitializeParams) -> McpResult<InitializeResult> {
        match self.phase {
            SessionPhase::Uninitialized => {}
            SessionPhase::Closed => {
                return Err(McpError::InvalidRequest("Session is closed".to_string()));
            }
            SessionPhase::Initializing | SessionPhase::Ready => {
                return Err(McpError::InvalidRequest(
                    "initialize has already been received for this session".to_string(),
                ));
            }
        }

        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {}, server supports {}. Proceeding with server version.",
                params.protocol_version,
                MCP_VERSION
            );
        }

        tracing::info!(
            "Initialized with client: {} v{}",
            params.client_info.name,
            params.client_info.version
        );

        self.client = params.capabilities;
        self.client_info = Some(params.client_info);
        self.client_protocol_version = Some(params.protocol_version);
        self.phase = SessionPhase::Initializing;

        Ok(InitializeResult::default_result())
    }

    pub fn mark_initialized(&mut self) -> McpResult<()> {
        match self.phase {
            SessionPhase::Initializing => {
                self.phase = SessionPhase::Ready;
                tracing::info!("MCP handshake complete");
                Ok(())
            }
            SessionPhase::Ready => {
                tracing::debug!("Duplicate initialized notification ignored");
                Ok(())
            }
            SessionPhase::Uninitialized => Err(McpError::InvalidRequest(
                "initialized notification received before initialize".to_string(),
            )),
            SessionPhase::Closed => Err(McpError::InvalidRequest("Session is closed".to_string())),
        }
    }

    /// Gate for methods that need a completed handshake.
    pub fn require_ready(&self, method: &str) -> McpResult<()> {
        match self.phase {
            SessionPhase::Ready => Ok(()),
            SessionPhase::Closed => Err(McpError::NotReady(format!(
                "{method} received after the session closed"
            ))),
            SessionPhase::Uninitialized | SessionPhase::Initializing => {
                Err(McpError::NotReady(format!(
                    "{method} requires a completed initialize handshake"
                )))
            }
        }
    }

    pub fn close(&mut self) {
        self.phase = SessionPhase::Closed;
    }
}
