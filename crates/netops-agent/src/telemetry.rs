//! Synthetic port telemetry generation.

use rand::Rng;

use crate::types::PortTelemetry;

/// Switch the mock counters are attributed to.
pub const TELEMETRY_SWITCH: &str = "sonic-leaf-01";

/// Interface the mock counters are attributed to.
pub const TELEMETRY_INTERFACE: &str = "Ethernet12";

const BYTES_RANGE: std::ops::RangeInclusive<u64> = 10_000..=10_000_000;
const ERRORS_RANGE: std::ops::RangeInclusive<u32> = 0..=10;
const UTILIZATION_MIN: f64 = 0.20;
const UTILIZATION_MAX: f64 = 0.95;

/// Draw one set of port counters from the given random source.
pub fn sample_port_telemetry<R: Rng + ?Sized>(rng: &mut R) -> PortTelemetry {
    let utilization = round_to(rng.gen_range(UTILIZATION_MIN..=UTILIZATION_MAX), 2);

    let telemetry = PortTelemetry {
        switch: TELEMETRY_SWITCH.to_string(),
        interface: TELEMETRY_INTERFACE.to_string(),
        rx_bytes: rng.gen_range(BYTES_RANGE),
        tx_bytes: rng.gen_range(BYTES_RANGE),
        rx_errors: rng.gen_range(ERRORS_RANGE),
        tx_errors: rng.gen_range(ERRORS_RANGE),
        utilization,
    };

    tracing::debug!(
        rx_errors = telemetry.rx_errors,
        tx_errors = telemetry.tx_errors,
        utilization = telemetry.utilization,
        "Sampled port telemetry"
    );
    telemetry
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
