//! Tool: validate_build_metadata — Check a SONiC or non-SONiC build JSON file.

use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use netops_agent::{NetOpsError, NetOpsResult, ToolOutput};

use crate::protocol::validator::ValidatedArgs;
use crate::session::NetOpsSessionManager;
use crate::types::{ParamSpec, ParamType, ToolSpec};

use super::{ToolFailure, ToolHandler};

pub struct ValidateBuildMetadata;

#[async_trait]
impl ToolHandler for ValidateBuildMetadata {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "validate_build_metadata",
            description: "Validate a SONiC or non-SONiC build JSON file for required and recommended fields",
            params: vec![ParamSpec::required(
                "build_json_path",
                ParamType::String,
                "Path to the build JSON file (relative paths resolve against the builds directory)",
            )
            .with_aliases(&["path"])],
        }
    }

    async fn execute(
        &self,
        args: &ValidatedArgs,
        session: &Arc<Mutex<NetOpsSessionManager>>,
    ) -> NetOpsResult<ToolOutput> {
        let path = args
            .str("build_json_path")
            .map_err(|e| NetOpsError::InvalidInput(e.to_string()))?;

        let session = session.lock().await;
        let validation = session.validate_build(path)?;
        tracing::info!(
            "Build {path}: {} ({} errors, {} warnings)",
            if validation.valid { "valid" } else { "invalid" },
            validation.errors.len(),
            validation.warnings.len()
        );
        Ok(ToolOutput::Build(validation))
    }

    fn failure(&self, _args: &ValidatedArgs, err: &NetOpsError) -> ToolFailure {
        ToolFailure::new("Validation failed", err)
            .with("valid", Value::Bool(false))
            .with("errors", json!([err.to_string()]))
            .with("warnings", json!([]))
    }
}
