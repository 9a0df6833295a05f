//! Mock closed-loop remediation planner.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{NetOpsError, NetOpsResult, Remediation, RemediationAction};

/// One canned remediation outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemediationScenario {
    pub action: RemediationAction,
    pub reason: &'static str,
    pub confidence: f64,
    pub estimated_downtime_seconds: u32,
    pub device_type: &'static str,
}

pub const SCENARIOS: [RemediationScenario; 4] = [
    RemediationScenario {
        action: RemediationAction::RestartPort,
        reason: "High error rate detected. Interface restart recommended.",
        confidence: 0.85,
        estimated_downtime_seconds: 5,
        device_type: "SONiC",
    },
    RemediationScenario {
        action: RemediationAction::ReapplyConfig,
        reason: "Configuration drift detected. Reapplying interface configuration.",
        confidence: 0.92,
        estimated_downtime_seconds: 2,
        device_type: "Cisco",
    },
    RemediationScenario {
        action: RemediationAction::ClearCounters,
        reason: "Counter overflow suspected. Clearing and monitoring.",
        confidence: 0.78,
        estimated_downtime_seconds: 1,
        device_type: "SONiC",
    },
    RemediationScenario {
        action: RemediationAction::NoRemediationNeeded,
        reason: "Interface health is within acceptable parameters.",
        confidence: 0.95,
        estimated_downtime_seconds: 0,
        device_type: "any",
    },
];

const NEXT_STEPS: [&str; 3] = [
    "Review telemetry data",
    "Execute remediation if approved",
    "Monitor interface post-remediation",
];

/// Pick a scenario for `interface`. The interface name does not influence the choice.
pub fn recommend<R: Rng + ?Sized>(
    interface: &str,
    rng: &mut R,
    timestamp: String,
) -> NetOpsResult<Remediation> {
    tracing::info!("Analyzing remediation for interface: {interface}");

    if interface.trim().is_empty() {
        return Err(NetOpsError::InvalidInput(
            "interface must be a non-empty string".to_string(),
        ));
    }

    let scenario = SCENARIOS
        .choose(rng)
        .ok_or_else(|| NetOpsError::SampleData("no remediation scenarios".to_string()))?;

    tracing::info!(
        "Remediation recommendation: {:?} for {interface}",
        scenario.action
    );

    Ok(Remediation {
        interface: interface.to_string(),
        recommended_action: scenario.action,
        reason: scenario.reason.to_string(),
        confidence: scenario.confidence,
        estimated_downtime_seconds: scenario.estimated_downtime_seconds,
        device_type: scenario.device_type.to_string(),
        timestamp,
        next_steps: NEXT_STEPS.iter().map(|s| s.to_string()).collect(),
    })
}
