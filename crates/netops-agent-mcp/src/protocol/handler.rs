//! Main request dispatcher — receives JSON-RPC messages, routes to handlers.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::Value;

use crate::session::NetOpsSessionManager;
use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::{NegotiatedCapabilities, SessionPhase};
use super::validator::validate_request;

/// Dispatches the messages of one session, in arrival order.
pub struct ProtocolHandler {
    session: Arc<Mutex<NetOpsSessionManager>>,
    registry: Arc<ToolRegistry>,
    capabilities: Mutex<NegotiatedCapabilities>,
}

impl ProtocolHandler {
    pub fn new(session: NetOpsSessionManager, registry: Arc<ToolRegistry>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            registry,
            capabilities: Mutex::new(NegotiatedCapabilities::default()),
        }
    }

    pub fn session(&self) -> &Arc<Mutex<NetOpsSessionManager>> {
        &self.session
    }

    pub async fn phase(&self) -> SessionPhase {
        self.capabilities.lock().await.phase
    }

    /// Handle one inbound message. Notifications never produce a reply.
    pub async fn handle_message(&self, msg: IncomingMessage) -> Option<OutgoingMessage> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> OutgoingMessage {
        if let Err(e) = validate_request(&request) {
            return OutgoingMessage::Error(e.to_json_rpc_error(request.id));
        }

        let id = request.id.clone();
        tracing::debug!("Request {id}: {}", request.method);

        match self.dispatch_request(&request).await {
            Ok(value) => OutgoingMessage::Response(JsonRpcResponse::new(id, value)),
            Err(e) => {
                tracing::warn!("Request {id} ({}) failed: {e}", request.method);
                OutgoingMessage::Error(e.to_json_rpc_error(id))
            }
        }
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params.clone()).await,
            "ping" => Ok(Value::Object(serde_json::Map::new())),

            "tools/list" => {
                self.capabilities.lock().await.require_ready("tools/list")?;
                self.handle_tools_list()
            }
            "tools/call" => {
                self.capabilities.lock().await.require_ready("tools/call")?;
                self.handle_tools_call(request.params.clone()).await
            }

            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => {
                let mut caps = self.capabilities.lock().await;
                if let Err(e) = caps.mark_initialized() {
                    tracing::error!("Failed to mark initialized: {e}");
                }
            }
            "notifications/cancelled" => {
                let cancel = notification
                    .params
                    .and_then(|p| serde_json::from_value::<CancelRequestParams>(p).ok());
                match cancel {
                    Some(c) => tracing::info!(
                        "Client cancelled request {}{}",
                        c.request_id,
                        c.reason.map(|r| format!(": {r}")).unwrap_or_default()
                    ),
                    None => tracing::info!("Received cancellation notification"),
                }
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Initialize params required".to_string()))?;

        let mut caps = self.capabilities.lock().await;
        let result = caps.negotiate(init_params)?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self.registry.list_tools(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call_params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Tool call params required".to_string()))?;

        tracing::info!("Calling tool {}", call_params.name);
        let result = self
            .registry
            .call(&call_params.name, call_params.arguments, &self.session)
            .await?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    /// Transport closed: move to `Closed` and release session services.
    pub async fn close(&self) {
        self.capabilities.lock().await.close();
        let mut session = self.session.lock().await;
        session.close();
    }
}
