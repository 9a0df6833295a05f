//! Tool: validate_system_health — Probe NetBox, ELK, ServiceNow, Zendesk and
//! FlowAnalytics and summarize the results.

use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;

use netops_agent::{NetOpsError, NetOpsResult, ProbeTargets, ToolOutput};

use crate::protocol::validator::ValidatedArgs;
use crate::session::NetOpsSessionManager;
use crate::types::{ParamSpec, ParamType, ToolSpec};

use super::{ToolFailure, ToolHandler};

pub struct ValidateSystemHealth;

#[async_trait]
impl ToolHandler for ValidateSystemHealth {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "validate_system_health",
            description: "Validate integration health (NetBox inventory, Syslog/ELK, ServiceNow, Zendesk, FlowAnalytics license)",
            params: vec![
                ParamSpec::optional("netbox_url", ParamType::String, None, "NetBox instance URL"),
                ParamSpec::optional(
                    "netbox_token",
                    ParamType::String,
                    None,
                    "NetBox API token; sample inventory is checked when absent",
                ),
                ParamSpec::optional("elk_endpoint", ParamType::String, None, "ELK/Syslog endpoint URL"),
                ParamSpec::optional("servicenow_url", ParamType::String, None, "ServiceNow instance URL"),
                ParamSpec::optional("zendesk_url", ParamType::String, None, "Zendesk API URL"),
            ],
        }
    }

    async fn execute(
        &self,
        args: &ValidatedArgs,
        session: &Arc<Mutex<NetOpsSessionManager>>,
    ) -> NetOpsResult<ToolOutput> {
        let session = session.lock().await;
        let targets = merge_targets(session.probe_targets(), args);
        session
            .system_health(&targets)
            .await
            .map(ToolOutput::SystemHealth)
    }

    fn failure(&self, _args: &ValidatedArgs, err: &NetOpsError) -> ToolFailure {
        ToolFailure::new("System health validation failed", err)
    }
}

/// Arguments override the configured endpoints; an empty token means none.
fn merge_targets(configured: &ProbeTargets, args: &ValidatedArgs) -> ProbeTargets {
    let netbox_token = match args.get("netbox_token").and_then(|v| v.as_str()) {
        Some(token) if token.trim().is_empty() => None,
        Some(token) => Some(token.to_string()),
        None => configured.netbox_token.clone(),
    };

    ProbeTargets {
        netbox_url: args.str_or("netbox_url", &configured.netbox_url).to_string(),
        netbox_token,
        elk_endpoint: args.str_or("elk_endpoint", &configured.elk_endpoint).to_string(),
        servicenow_url: args
            .str_or("servicenow_url", &configured.servicenow_url)
            .to_string(),
        zendesk_url: args.str_or("zendesk_url", &configured.zendesk_url).to_string(),
    }
}
