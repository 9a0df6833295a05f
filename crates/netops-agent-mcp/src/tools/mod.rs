//! MCP tool implementations.

use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use netops_agent::{NetOpsError, NetOpsResult, ToolOutput};

use crate::protocol::validator::ValidatedArgs;
use crate::session::NetOpsSessionManager;
use crate::types::ToolSpec;

pub mod get_network_topology;
pub mod get_port_telemetry;
pub mod predict_link_health;
pub mod registry;
pub mod remediate_link;
pub mod validate_build_metadata;
pub mod validate_system_health;

pub use registry::ToolRegistry;

/// Business logic behind one registered tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Name, description and parameters advertised through `tools/list`.
    fn spec(&self) -> ToolSpec;

    async fn execute(
        &self,
        args: &ValidatedArgs,
        session: &Arc<Mutex<NetOpsSessionManager>>,
    ) -> NetOpsResult<ToolOutput>;

    /// Application-level error object returned when `execute` fails.
    fn failure(&self, args: &ValidatedArgs, err: &NetOpsError) -> ToolFailure;
}

/// `{"error": <summary>, "message": <detail>, ...}` payload for a failed tool run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolFailure {
    pub error: String,
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolFailure {
    pub fn new(summary: impl Into<String>, err: &NetOpsError) -> Self {
        Self {
            error: summary.into(),
            message: err.to_string(),
            extra: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}
