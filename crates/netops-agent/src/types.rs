//! Core data types for telemetry, topology, health, builds and remediation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Synthetic counters for one switch port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortTelemetry {
    pub switch: String,
    pub interface: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_errors: u32,
    pub tx_errors: u32,
    pub utilization: f64,
}

/// Vendor family of a network device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(rename = "SONiC")]
    Sonic,
    Cisco,
    FortiGate,
}

/// A single interface on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInterface {
    pub name: String,
    pub status: String,
    pub speed: String,
}

/// A device in the network topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub vendor: String,
    pub model: String,
    pub role: String,
    pub status: String,
    pub interfaces: Vec<DeviceInterface>,
}

/// A point-to-point link between two device ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub source_port: String,
    pub target: String,
    pub target_port: String,
    pub bandwidth: String,
    pub status: String,
}

/// Counts derived from the device and link lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyStatistics {
    pub total_devices: usize,
    pub sonic_devices: usize,
    pub non_sonic_devices: usize,
    pub total_links: usize,
    pub active_links: usize,
}

/// Multi-vendor network graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkTopology {
    pub timestamp: String,
    pub devices: Vec<Device>,
    pub links: Vec<Link>,
    pub statistics: TopologyStatistics,
}

/// Health classification of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
}

/// Normalized inputs that were actually scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthInputs {
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub utilization: f64,
}

/// Output of the link health model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkHealth {
    pub health_score: f64,
    pub status: HealthStatus,
    pub inputs: HealthInputs,
}

/// Build family, decided from the `type` and `platform` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildKind {
    #[serde(rename = "SONiC")]
    Sonic,
    #[serde(rename = "non-SONiC")]
    NonSonic,
}

/// Result of validating one build metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildValidation {
    pub valid: bool,
    pub device_type: BuildKind,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub missing_fields: Vec<String>,
    pub metadata: Value,
}

/// Closed set of remediation actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationAction {
    RestartPort,
    ReapplyConfig,
    ClearCounters,
    NoRemediationNeeded,
}

/// Recommended remediation for an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remediation {
    pub interface: String,
    pub recommended_action: RemediationAction,
    pub reason: String,
    pub confidence: f64,
    pub estimated_downtime_seconds: u32,
    pub device_type: String,
    pub timestamp: String,
    pub next_steps: Vec<String>,
}

/// Outcome of one external integration check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Passed,
    Failed,
    #[serde(rename = "Not Run")]
    NotRun,
}

/// Status and explanation for one checked component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentCheck {
    pub status: CheckStatus,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ComponentCheck {
    pub fn passed(details: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Passed,
            details: details.into(),
            reason: None,
        }
    }

    pub fn failed(details: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Failed,
            details: details.into(),
            reason: None,
        }
    }

    pub fn not_run(details: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::NotRun,
            details: details.into(),
            reason: Some(reason.into()),
        }
    }
}

/// Tally of component statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTotals {
    #[serde(rename = "Passed")]
    pub passed: usize,
    #[serde(rename = "Failed")]
    pub failed: usize,
    #[serde(rename = "NotRun")]
    pub not_run: usize,
}

/// Aggregate report over all integration checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealthReport {
    #[serde(rename = "NetBox")]
    pub netbox: ComponentCheck,
    #[serde(rename = "Syslog")]
    pub syslog: ComponentCheck,
    #[serde(rename = "ServiceNow")]
    pub servicenow: ComponentCheck,
    #[serde(rename = "Zendesk")]
    pub zendesk: ComponentCheck,
    #[serde(rename = "FlowAnalytics")]
    pub flowanalytics: ComponentCheck,
    #[serde(rename = "Total")]
    pub total: StatusTotals,
}

impl SystemHealthReport {
    /// Build a report and compute the totals from the component checks.
    pub fn new(
        netbox: ComponentCheck,
        syslog: ComponentCheck,
        servicenow: ComponentCheck,
        zendesk: ComponentCheck,
        flowanalytics: ComponentCheck,
    ) -> Self {
        let mut total = StatusTotals::default();
        for check in [&netbox, &syslog, &servicenow, &zendesk, &flowanalytics] {
            match check.status {
                CheckStatus::Passed => total.passed += 1,
                CheckStatus::Failed => total.failed += 1,
                CheckStatus::NotRun => total.not_run += 1,
            }
        }

        Self {
            netbox,
            syslog,
            servicenow,
            zendesk,
            flowanalytics,
            total,
        }
    }
}

/// Every shape a tool can return. Serializes to the bare payload, without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Telemetry(PortTelemetry),
    Topology(NetworkTopology),
    Health(LinkHealth),
    Build(BuildValidation),
    Remediation(Remediation),
    SystemHealth(SystemHealthReport),
}

/// Errors that can occur in the network operations library.
#[derive(thiserror::Error, Debug)]
pub enum NetOpsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Build file not found: {0}")]
    BuildNotFound(String),

    #[error("Invalid build file {path}: {reason}")]
    InvalidBuild { path: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Sample data error: {0}")]
    SampleData(String),
}

/// Convenience result type.
pub type NetOpsResult<T> = Result<T, NetOpsError>;
