//! Tool: get_network_topology — Multi-vendor device and link inventory.

use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use netops_agent::{NetOpsError, NetOpsResult, ToolOutput};

use crate::protocol::validator::ValidatedArgs;
use crate::session::NetOpsSessionManager;
use crate::types::ToolSpec;

use super::{ToolFailure, ToolHandler};

pub struct GetNetworkTopology;

#[async_trait]
impl ToolHandler for GetNetworkTopology {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "get_network_topology",
            description: "Get the multi-vendor network topology: devices, links and summary statistics",
            params: vec![],
        }
    }

    async fn execute(
        &self,
        _args: &ValidatedArgs,
        session: &Arc<Mutex<NetOpsSessionManager>>,
    ) -> NetOpsResult<ToolOutput> {
        let session = session.lock().await;
        session.topology().map(ToolOutput::Topology)
    }

    fn failure(&self, _args: &ValidatedArgs, err: &NetOpsError) -> ToolFailure {
        ToolFailure::new("Topology generation failed", err)
            .with("devices", json!([]))
            .with("links", json!([]))
            .with("statistics", json!({}))
    }
}
