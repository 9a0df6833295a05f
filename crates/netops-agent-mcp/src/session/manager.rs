//! Per-session service object: random source, health model, build catalog
//! and integration probes.

use chrono::{SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use netops_agent::{
    build_topology, recommend, sample_port_telemetry, BuildCatalog, BuildValidation,
    LinkHealth, LinkHealthModel, NetOpsError, NetOpsResult, NetworkTopology, PortTelemetry,
    ProbeTargets, Remediation, SystemHealthReport, SystemProbe,
};

use crate::config::ServerConfig;
use crate::types::{McpError, McpResult};

/// Owns every service a tool handler may touch during one session.
pub struct NetOpsSessionManager {
    session_id: String,
    rng: StdRng,
    health_model: LinkHealthModel,
    builds: BuildCatalog,
    probe: SystemProbe,
    probe_targets: ProbeTargets,
    closed: bool,
}

impl NetOpsSessionManager {
    /// Construct the services for a new session.
    pub fn open(config: &ServerConfig) -> McpResult<Self> {
        let session_id = uuid::Uuid::new_v4().to_string();

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let probe = SystemProbe::new(config.probe_settings.clone()).map_err(|e| {
            McpError::Service(format!("Failed to initialize integration probes: {e}"))
        })?;

        let builds = BuildCatalog::new(config.builds_dir());
        if !builds.builds_dir().is_dir() {
            tracing::warn!(
                "Builds directory {} does not exist; only absolute or cwd-relative paths will resolve",
                builds.builds_dir().display()
            );
        }

        tracing::info!(
            session = %session_id,
            "Session services ready. Data dir: {}. Random source: {}",
            config.data_dir.display(),
            if config.seed.is_some() { "seeded" } else { "entropy" }
        );

        Ok(Self {
            session_id,
            rng,
            health_model: LinkHealthModel::default(),
            builds,
            probe,
            probe_targets: config.probe_targets.clone(),
            closed: false,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn builds(&self) -> &BuildCatalog {
        &self.builds
    }

    pub fn probe_targets(&self) -> &ProbeTargets {
        &self.probe_targets
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn port_telemetry(&mut self) -> NetOpsResult<PortTelemetry> {
        self.ensure_open()?;
        tracing::info!("Collecting SONiC port telemetry");
        Ok(sample_port_telemetry(&mut self.rng))
    }

    pub fn topology(&self) -> NetOpsResult<NetworkTopology> {
        self.ensure_open()?;
        Ok(build_topology(now_timestamp()))
    }

    pub fn predict_link_health(
        &self,
        rx_errors: i64,
        tx_errors: i64,
        utilization: f64,
    ) -> NetOpsResult<LinkHealth> {
        self.ensure_open()?;
        tracing::info!(
            "Predicting link health: rx_errors={rx_errors}, tx_errors={tx_errors}, utilization={utilization}"
        );
        Ok(self.health_model.predict(rx_errors, tx_errors, utilization))
    }

    pub fn validate_build(&self, path: &str) -> NetOpsResult<BuildValidation> {
        self.ensure_open()?;
        self.builds.validate(path)
    }

    pub fn remediate(&mut self, interface: &str) -> NetOpsResult<Remediation> {
        self.ensure_open()?;
        recommend(interface, &mut self.rng, now_timestamp())
    }

    pub async fn system_health(&self, targets: &ProbeTargets) -> NetOpsResult<SystemHealthReport> {
        self.ensure_open()?;
        Ok(self.probe.validate_all(targets).await)
    }

    /// Release session resources. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        tracing::info!(session = %self.session_id, "Session services released");
    }

    fn ensure_open(&self) -> NetOpsResult<()> {
        if self.closed {
            return Err(NetOpsError::InvalidInput(format!(
                "session {} is closed",
                self.session_id
            )));
        }
        Ok(())
    }
}

impl Drop for NetOpsSessionManager {
    fn drop(&mut self) {
        self.close();
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(seed: u64) -> NetOpsSessionManager {
        let dir = tempfile::tempdir().unwrap();
        NetOpsSessionManager::open(&ServerConfig::with_data_dir(dir.path(), Some(seed))).unwrap()
    }

    #[test]
    fn test_seeded_sessions_agree() {
        let mut a = manager(21);
        let mut b = manager(21);
        assert_eq!(a.port_telemetry().unwrap(), b.port_telemetry().unwrap());
        assert_eq!(
            a.remediate("Ethernet12").unwrap().recommended_action,
            b.remediate("Ethernet12").unwrap().recommended_action
        );
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_closed_session_refuses_work() {
        let mut m = manager(1);
        m.close();
        m.close();
        assert!(m.is_closed());
        assert!(m.port_telemetry().is_err());
        assert!(m.topology().is_err());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-01-15T10:30:00Z".len());
    }
}
