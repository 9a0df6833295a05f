//! Deterministic link health scoring.
//!
//! The score is a logistic function of the total error count, with
//! utilization acting only through its interaction with errors. An error-free
//! link therefore scores the same at any utilization.

use crate::telemetry::round_to;
use crate::types::{HealthInputs, HealthStatus, LinkHealth};

const DEFAULT_BIAS: f64 = 2.5;
const DEFAULT_ERROR_WEIGHT: f64 = 0.25;
const DEFAULT_INTERACTION_WEIGHT: f64 = 0.25;
const DEFAULT_HEALTHY_THRESHOLD: f64 = 0.7;

/// Fixed-weight logistic model over (rx_errors, tx_errors, utilization).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkHealthModel {
    pub bias: f64,
    pub error_weight: f64,
    pub interaction_weight: f64,
    pub healthy_threshold: f64,
}

impl Default for LinkHealthModel {
    fn default() -> Self {
        Self {
            bias: DEFAULT_BIAS,
            error_weight: DEFAULT_ERROR_WEIGHT,
            interaction_weight: DEFAULT_INTERACTION_WEIGHT,
            healthy_threshold: DEFAULT_HEALTHY_THRESHOLD,
        }
    }
}

impl LinkHealthModel {
    /// Clamp utilization into [0, 1] and take absolute error counts.
    pub fn normalize(rx_errors: i64, tx_errors: i64, utilization: f64) -> HealthInputs {
        let utilization = if utilization.is_nan() {
            0.0
        } else {
            utilization.clamp(0.0, 1.0)
        };

        HealthInputs {
            rx_errors: rx_errors.unsigned_abs(),
            tx_errors: tx_errors.unsigned_abs(),
            utilization,
        }
    }

    /// Raw score in [0, 1] for already-normalized inputs.
    pub fn score(&self, inputs: &HealthInputs) -> f64 {
        let errors = inputs.rx_errors as f64 + inputs.tx_errors as f64;
        let z = self.bias
            - self.error_weight * errors
            - self.interaction_weight * errors * inputs.utilization;
        sigmoid(z)
    }

    /// Normalize, score and classify.
    pub fn predict(&self, rx_errors: i64, tx_errors: i64, utilization: f64) -> LinkHealth {
        if !(0.0..=1.0).contains(&utilization) {
            tracing::warn!("Utilization out of range: {utilization}, clamping to [0, 1]");
        }
        if rx_errors < 0 || tx_errors < 0 {
            tracing::warn!("Negative error counts detected, using absolute values");
        }

        let inputs = Self::normalize(rx_errors, tx_errors, utilization);
        let score = self.score(&inputs);
        let status = if score > self.healthy_threshold {
            HealthStatus::Healthy
        } else {
            HealthStatus::Warning
        };

        tracing::debug!(score, ?status, "Link health predicted");

        LinkHealth {
            health_score: round_to(score, 3),
            status,
            inputs,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
