//! System health probes for the integrations around the network: NetBox,
//! the ELK syslog pipeline, ServiceNow, Zendesk and FlowAnalytics.
//!
//! Every outbound call is a single GET bounded by an explicit timeout.
//! Connection failures and timeouts become `Failed` checks, never errors.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use crate::types::{ComponentCheck, NetOpsError, NetOpsResult, SystemHealthReport};

pub const DEFAULT_NETBOX_URL: &str = "https://netbox.example.com";
pub const DEFAULT_ELK_ENDPOINT: &str = "http://elk.example.com:9200";
pub const DEFAULT_SERVICENOW_URL: &str = "https://example.service-now.com";
pub const DEFAULT_ZENDESK_URL: &str = "https://example.zendesk.com/api/v2";

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_ELK_TIMEOUT: Duration = Duration::from_secs(3);

/// Devices the NetBox sample inventory is expected to hold.
const EXPECTED_NETBOX_DEVICES: usize = 5;
const CRITICAL_DEVICES: [&str; 2] = ["sonic-leaf-01", "sonic-spine-01"];
const PLACEHOLDER_TOKEN: &str = "your-api-token-here";

/// Endpoints to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTargets {
    pub netbox_url: String,
    pub netbox_token: Option<String>,
    pub elk_endpoint: String,
    pub servicenow_url: String,
    pub zendesk_url: String,
}

impl Default for ProbeTargets {
    fn default() -> Self {
        Self {
            netbox_url: DEFAULT_NETBOX_URL.to_string(),
            netbox_token: None,
            elk_endpoint: DEFAULT_ELK_ENDPOINT.to_string(),
            servicenow_url: DEFAULT_SERVICENOW_URL.to_string(),
            zendesk_url: DEFAULT_ZENDESK_URL.to_string(),
        }
    }
}

/// Timeouts, license state and sample-data location for the probes.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub http_timeout: Duration,
    pub elk_timeout: Duration,
    pub flowanalytics_licensed: bool,
    pub netbox_sample: PathBuf,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            elk_timeout: DEFAULT_ELK_TIMEOUT,
            flowanalytics_licensed: false,
            netbox_sample: PathBuf::from("data/netbox_sample.json"),
        }
    }
}

/// HTTP prober shared by all checks of one session.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    client: reqwest::Client,
    settings: ProbeSettings,
}

impl SystemProbe {
    pub fn new(settings: ProbeSettings) -> NetOpsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .user_agent(concat!("netops-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NetOpsError::Probe(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    /// Run every check and tally the results.
    pub async fn validate_all(&self, targets: &ProbeTargets) -> SystemHealthReport {
        tracing::info!("Starting system health validation");

        let report = SystemHealthReport::new(
            self.check_netbox(&targets.netbox_url, targets.netbox_token.as_deref())
                .await,
            self.check_syslog(&targets.elk_endpoint).await,
            self.check_servicenow(&targets.servicenow_url).await,
            self.check_zendesk(&targets.zendesk_url).await,
            self.check_flowanalytics(),
        );

        tracing::info!(
            "System health validation complete: {} passed, {} failed, {} not run",
            report.total.passed,
            report.total.failed,
            report.total.not_run
        );
        report
    }

    /// NetBox inventory. Without a usable token the bundled sample inventory is checked.
    pub async fn check_netbox(&self, base_url: &str, token: Option<&str>) -> ComponentCheck {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != PLACEHOLDER_TOKEN);

        let check = match token {
            None => self.check_netbox_sample(),
            Some(token) => {
                let url = format!("{}/api/dcim/devices/", base_url.trim_end_matches('/'));
                let request = self
                    .client
                    .get(&url)
                    .header("Authorization", format!("Token {token}"))
                    .header("Accept", "application/json")
                    .timeout(self.settings.http_timeout);

                match request.send().await {
                    Ok(resp) if resp.status().is_success() => {
                        let count = resp
                            .json::<Value>()
                            .await
                            .ok()
                            .and_then(|v| v.get("results").and_then(Value::as_array).map(Vec::len))
                            .unwrap_or(0);
                        ComponentCheck::passed(format!(
                            "NetBox API accessible, {count} devices found"
                        ))
                    }
                    Ok(resp) if resp.status() == reqwest::StatusCode::UNAUTHORIZED => {
                        ComponentCheck::failed("NetBox authentication failed - invalid token")
                    }
                    Ok(resp) => ComponentCheck::failed(format!(
                        "NetBox API error: {}",
                        resp.status().as_u16()
                    )),
                    Err(e) => transport_failure("NetBox API", &e),
                }
            }
        };

        tracing::info!("NetBox validation: {:?}", check.status);
        check
    }

    fn check_netbox_sample(&self) -> ComponentCheck {
        let path = &self.settings.netbox_sample;
        if !path.exists() {
            return ComponentCheck::failed("NetBox sample data not available");
        }

        match load_sample_devices(path) {
            Ok(devices) => netbox_inventory_check(&devices),
            Err(e) => {
                tracing::error!("NetBox validation error: {e}");
                ComponentCheck::failed(format!("Error validating NetBox sample data: {e}"))
            }
        }
    }

    /// ELK cluster health endpoint.
    pub async fn check_syslog(&self, endpoint: &str) -> ComponentCheck {
        let url = format!("{}/_cluster/health", endpoint.trim_end_matches('/'));
        let check = match self
            .client
            .get(&url)
            .timeout(self.settings.elk_timeout)
            .send()
            .await
        {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                ComponentCheck::passed("ELK cluster healthy and accessible")
            }
            Ok(resp) => ComponentCheck::failed(format!(
                "ELK cluster unhealthy - status code: {}",
                resp.status().as_u16()
            )),
            Err(e) => transport_failure("ELK cluster", &e),
        };

        tracing::info!("Syslog validation: {:?}", check.status);
        check
    }

    /// ServiceNow CMDB table endpoint.
    pub async fn check_servicenow(&self, instance_url: &str) -> ComponentCheck {
        let url = format!(
            "{}/api/now/table/cmdb_ci",
            instance_url.trim_end_matches('/')
        );
        let check = self.check_api("ServiceNow", &url).await;
        tracing::info!("ServiceNow validation: {:?}", check.status);
        check
    }

    /// Zendesk current-user endpoint.
    pub async fn check_zendesk(&self, api_url: &str) -> ComponentCheck {
        let url = format!("{}/users/me.json", api_url.trim_end_matches('/'));
        let check = self.check_api("Zendesk", &url).await;
        tracing::info!("Zendesk validation: {:?}", check.status);
        check
    }

    /// FlowAnalytics is gated on a license rather than an endpoint.
    pub fn check_flowanalytics(&self) -> ComponentCheck {
        if self.settings.flowanalytics_licensed {
            ComponentCheck::passed("FlowAnalytics license valid")
        } else {
            ComponentCheck::not_run(
                "FlowAnalytics license missing - validation skipped",
                "missing license",
            )
        }
    }

    async fn check_api(&self, name: &str, url: &str) -> ComponentCheck {
        match self
            .client
            .get(url)
            .timeout(self.settings.http_timeout)
            .send()
            .await
        {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                ComponentCheck::passed(format!("{name} API accessible"))
            }
            Ok(resp) if resp.status() == reqwest::StatusCode::UNAUTHORIZED => {
                ComponentCheck::failed(format!("{name} authentication failed"))
            }
            Ok(resp) => ComponentCheck::failed(format!(
                "{name} API error: {}",
                resp.status().as_u16()
            )),
            Err(e) => transport_failure(&format!("{name} API"), &e),
        }
    }
}

fn transport_failure(target: &str, err: &reqwest::Error) -> ComponentCheck {
    tracing::warn!("{target} probe failed: {err}");
    if err.is_timeout() {
        ComponentCheck::failed(format!("{target} timeout - server did not respond"))
    } else if err.is_connect() {
        ComponentCheck::failed(format!("Cannot connect to {target} - connection refused"))
    } else {
        ComponentCheck::failed(format!("{target} request failed: {err}"))
    }
}

fn load_sample_devices(path: &std::path::Path) -> NetOpsResult<Vec<Value>> {
    let contents = std::fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&contents)?;
    data.get("devices")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| NetOpsError::SampleData("missing \"devices\" array".to_string()))
}

/// Count and critical-device checks over a NetBox device list.
pub fn netbox_inventory_check(devices: &[Value]) -> ComponentCheck {
    let actual = devices.len();
    if actual != EXPECTED_NETBOX_DEVICES {
        return ComponentCheck::failed(format!(
            "Device count mismatch: found {actual}, expected {EXPECTED_NETBOX_DEVICES}"
        ));
    }

    let missing: Vec<&str> = CRITICAL_DEVICES
        .iter()
        .copied()
        .filter(|name| {
            !devices
                .iter()
                .any(|d| d.get("name").and_then(Value::as_str) == Some(*name))
        })
        .collect();

    if missing.is_empty() {
        ComponentCheck::passed(format!("All {actual} devices present and validated"))
    } else {
        ComponentCheck::failed(format!(
            "Missing critical devices: {}",
            missing.join(", ")
        ))
    }
}
