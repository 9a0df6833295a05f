//! Tool: get_port_telemetry — Synthetic SONiC port counters.

use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;

use netops_agent::{NetOpsError, NetOpsResult, ToolOutput};

use crate::protocol::validator::ValidatedArgs;
use crate::session::NetOpsSessionManager;
use crate::types::ToolSpec;

use super::{ToolFailure, ToolHandler};

pub struct GetPortTelemetry;

#[async_trait]
impl ToolHandler for GetPortTelemetry {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "get_port_telemetry",
            description: "Collect port telemetry (byte, error and utilization counters) from a SONiC switch",
            params: vec![],
        }
    }

    async fn execute(
        &self,
        _args: &ValidatedArgs,
        session: &Arc<Mutex<NetOpsSessionManager>>,
    ) -> NetOpsResult<ToolOutput> {
        let mut session = session.lock().await;
        session.port_telemetry().map(ToolOutput::Telemetry)
    }

    fn failure(&self, _args: &ValidatedArgs, err: &NetOpsError) -> ToolFailure {
        ToolFailure::new("Telemetry collection failed", err)
    }
}
