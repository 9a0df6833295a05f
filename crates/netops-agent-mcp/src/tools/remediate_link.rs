//! Tool: remediate_link — Recommend a closed-loop remediation for an interface.

use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use netops_agent::{NetOpsError, NetOpsResult, ToolOutput};

use crate::protocol::validator::ValidatedArgs;
use crate::session::NetOpsSessionManager;
use crate::types::{ParamSpec, ParamType, ToolSpec};

use super::{ToolFailure, ToolHandler};

pub struct RemediateLink;

#[async_trait]
impl ToolHandler for RemediateLink {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "remediate_link",
            description: "Recommend a remediation action (restart, reapply config, clear counters) for an interface",
            params: vec![ParamSpec::required(
                "interface",
                ParamType::String,
                "Interface name, e.g. \"Ethernet12\" or \"GigabitEthernet0/1\"",
            )],
        }
    }

    async fn execute(
        &self,
        args: &ValidatedArgs,
        session: &Arc<Mutex<NetOpsSessionManager>>,
    ) -> NetOpsResult<ToolOutput> {
        let interface = args
            .str("interface")
            .map_err(|e| NetOpsError::InvalidInput(e.to_string()))?;

        let mut session = session.lock().await;
        session.remediate(interface).map(ToolOutput::Remediation)
    }

    fn failure(&self, args: &ValidatedArgs, err: &NetOpsError) -> ToolFailure {
        let summary = match err {
            NetOpsError::InvalidInput(_) => "Invalid interface parameter",
            _ => "Remediation analysis failed",
        };
        ToolFailure::new(summary, err)
            .with(
                "interface",
                args.get("interface").cloned().unwrap_or(Value::Null),
            )
            .with("recommended_action", Value::Null)
    }
}
