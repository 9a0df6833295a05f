//! Tool: predict_link_health — Score a link from its error counters and load.

use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use netops_agent::{NetOpsError, NetOpsResult, ToolOutput};

use crate::protocol::validator::ValidatedArgs;
use crate::session::NetOpsSessionManager;
use crate::types::{ParamSpec, ParamType, ToolSpec};

use super::{ToolFailure, ToolHandler};

pub struct PredictLinkHealth;

#[async_trait]
impl ToolHandler for PredictLinkHealth {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "predict_link_health",
            description: "Predict link health from telemetry. Returns a score in [0, 1] and healthy/warning status",
            params: vec![
                ParamSpec::required("rx_errors", ParamType::Integer, "Number of receive errors"),
                ParamSpec::required("tx_errors", ParamType::Integer, "Number of transmit errors"),
                ParamSpec::required(
                    "utilization",
                    ParamType::Number,
                    "Link utilization (0.0 to 1.0)",
                ),
            ],
        }
    }

    async fn execute(
        &self,
        args: &ValidatedArgs,
        session: &Arc<Mutex<NetOpsSessionManager>>,
    ) -> NetOpsResult<ToolOutput> {
        let rx_errors = args.i64("rx_errors").map_err(invalid)?;
        let tx_errors = args.i64("tx_errors").map_err(invalid)?;
        let utilization = args.f64("utilization").map_err(invalid)?;

        let session = session.lock().await;
        session
            .predict_link_health(rx_errors, tx_errors, utilization)
            .map(ToolOutput::Health)
    }

    fn failure(&self, _args: &ValidatedArgs, err: &NetOpsError) -> ToolFailure {
        ToolFailure::new("Health prediction failed", err)
            .with("health_score", Value::Null)
            .with("status", Value::String("error".to_string()))
    }
}

fn invalid(e: crate::types::McpError) -> NetOpsError {
    NetOpsError::InvalidInput(e.to_string())
}
