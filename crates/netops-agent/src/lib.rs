//! NetOps Agent — core library for mock network operations: port telemetry,
//! topology, link health scoring, build validation, remediation and
//! integration health probes.

pub mod build;
pub mod health;
pub mod remediation;
pub mod system;
pub mod telemetry;
pub mod topology;
pub mod types;

pub use build::{classify, validate_metadata, BuildCatalog};
pub use health::LinkHealthModel;
pub use remediation::recommend;
pub use system::{ProbeSettings, ProbeTargets, SystemProbe};
pub use telemetry::sample_port_telemetry;
pub use topology::build_topology;
pub use types::*;
