//! Configuration loading and resolution.

use std::path::PathBuf;
use std::time::Duration;

use netops_agent::{ProbeSettings, ProbeTargets};

/// Everything a session needs to construct its services.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub seed: Option<u64>,
    pub probe_targets: ProbeTargets,
    pub probe_settings: ProbeSettings,
}

impl ServerConfig {
    /// Resolve configuration from explicit values, then the environment.
    pub fn resolve(data_dir: Option<&str>, seed: Option<u64>) -> Self {
        let data_dir = resolve_data_dir(data_dir);
        let seed = seed.or_else(|| env_parse("NETOPS_SEED"));

        let defaults = ProbeTargets::default();
        let probe_targets = ProbeTargets {
            netbox_url: env_or("NETBOX_URL", defaults.netbox_url),
            netbox_token: std::env::var("NETBOX_TOKEN").ok(),
            elk_endpoint: env_or("ELK_ENDPOINT", defaults.elk_endpoint),
            servicenow_url: env_or("SERVICENOW_URL", defaults.servicenow_url),
            zendesk_url: env_or("ZENDESK_URL", defaults.zendesk_url),
        };

        let base = ProbeSettings::default();
        let probe_settings = ProbeSettings {
            http_timeout: env_parse("NETOPS_PROBE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(base.http_timeout),
            elk_timeout: base.elk_timeout,
            flowanalytics_licensed: env_flag("FLOWANALYTICS_LICENSE"),
            netbox_sample: data_dir.join("netbox_sample.json"),
        };

        Self {
            data_dir,
            seed,
            probe_targets,
            probe_settings,
        }
    }

    /// Configuration rooted at an explicit data directory, ignoring the environment.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>, seed: Option<u64>) -> Self {
        let data_dir = data_dir.into();
        let probe_settings = ProbeSettings {
            netbox_sample: data_dir.join("netbox_sample.json"),
            ..ProbeSettings::default()
        };
        Self {
            data_dir,
            seed,
            probe_targets: ProbeTargets::default(),
            probe_settings,
        }
    }

    pub fn builds_dir(&self) -> PathBuf {
        self.data_dir.join("builds")
    }
}

/// Resolve the sample data directory.
pub fn resolve_data_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var("NETOPS_DATA_DIR") {
        return PathBuf::from(env_path);
    }

    let cwd_data = PathBuf::from("data");
    if cwd_data.is_dir() {
        return cwd_data;
    }

    resolve_default_data_dir()
}

fn resolve_default_data_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(format!("{home}/.netops-agent/data"))
}

fn env_or(key: &str, fallback: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(fallback)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {key}={raw}");
            None
        }
    }
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
