//! Tool registration and dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::Value;

use crate::protocol::validator::validate_arguments;
use crate::session::NetOpsSessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition, ToolSpec};

use super::{
    get_network_topology::GetNetworkTopology, get_port_telemetry::GetPortTelemetry,
    predict_link_health::PredictLinkHealth, remediate_link::RemediateLink,
    validate_build_metadata::ValidateBuildMetadata,
    validate_system_health::ValidateSystemHealth, ToolHandler,
};

struct RegisteredTool {
    spec: ToolSpec,
    handler: Arc<dyn ToolHandler>,
}

/// Immutable-after-startup set of tools, listed in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    by_name: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool.
    pub fn with_defaults() -> McpResult<Self> {
        let mut registry = Self::new();
        registry.register(GetPortTelemetry)?;
        registry.register(GetNetworkTopology)?;
        registry.register(PredictLinkHealth)?;
        registry.register(ValidateBuildMetadata)?;
        registry.register(RemediateLink)?;
        registry.register(ValidateSystemHealth)?;
        Ok(registry)
    }

    pub fn register(&mut self, handler: impl ToolHandler + 'static) -> McpResult<()> {
        let spec = handler.spec();
        if self.by_name.contains_key(spec.name) {
            return Err(McpError::DuplicateTool(spec.name.to_string()));
        }
        tracing::debug!("Registered tool {}", spec.name);
        self.by_name.insert(spec.name, self.tools.len());
        self.tools.push(RegisteredTool {
            spec,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.spec.definition()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.spec.name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate arguments and run the named tool.
    ///
    /// Handler failures come back as `Ok` with an error payload; only lookup
    /// and argument problems are protocol errors.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
        session: &Arc<Mutex<NetOpsSessionManager>>,
    ) -> McpResult<ToolCallResult> {
        let tool = self
            .by_name
            .get(name)
            .map(|&idx| &self.tools[idx])
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        let args = validate_arguments(&tool.spec.params, arguments)?;

        match tool.handler.execute(&args, session).await {
            Ok(output) => ToolCallResult::json(&output),
            Err(e) => {
                tracing::error!("Tool {name} failed: {e}");
                ToolCallResult::json(&tool.handler.failure(&args, &e))
            }
        }
    }
}
