//! Fixed multi-vendor network topology.

use crate::types::{
    Device, DeviceInterface, DeviceKind, Link, NetworkTopology, TopologyStatistics,
};

fn interface(name: &str, speed: &str) -> DeviceInterface {
    DeviceInterface {
        name: name.to_string(),
        status: "up".to_string(),
        speed: speed.to_string(),
    }
}

fn device(
    id: &str,
    kind: DeviceKind,
    vendor: &str,
    model: &str,
    role: &str,
    interfaces: [(&str, &str); 2],
) -> Device {
    Device {
        id: id.to_string(),
        kind,
        vendor: vendor.to_string(),
        model: model.to_string(),
        role: role.to_string(),
        status: "active".to_string(),
        interfaces: interfaces
            .iter()
            .map(|(name, speed)| interface(name, speed))
            .collect(),
    }
}

fn link(source: (&str, &str), target: (&str, &str), bandwidth: &str) -> Link {
    Link {
        source: source.0.to_string(),
        source_port: source.1.to_string(),
        target: target.0.to_string(),
        target_port: target.1.to_string(),
        bandwidth: bandwidth.to_string(),
        status: "up".to_string(),
    }
}

/// The sample devices: three SONiC switches, a Cisco core and a FortiGate firewall.
pub fn sample_devices() -> Vec<Device> {
    vec![
        device(
            "sonic-leaf-01",
            DeviceKind::Sonic,
            "Dell",
            "S5248F-ON",
            "leaf",
            [("Ethernet12", "25G"), ("Ethernet24", "100G")],
        ),
        device(
            "sonic-spine-01",
            DeviceKind::Sonic,
            "Arista",
            "DCS-7280SR3",
            "spine",
            [("Ethernet1/1", "100G"), ("Ethernet1/2", "100G")],
        ),
        device(
            "cisco-core-01",
            DeviceKind::Cisco,
            "Cisco",
            "Nexus 9000",
            "core",
            [("GigabitEthernet0/1", "10G"), ("GigabitEthernet0/2", "10G")],
        ),
        device(
            "fortigate-fw-01",
            DeviceKind::FortiGate,
            "Fortinet",
            "FortiGate 100F",
            "firewall",
            [("port1", "1G"), ("port2", "1G")],
        ),
        device(
            "edgecore-spine-02",
            DeviceKind::Sonic,
            "EdgeCore",
            "AS7326-56X",
            "spine",
            [("Ethernet1", "100G"), ("Ethernet2", "100G")],
        ),
    ]
}

/// The sample links between the devices of [`sample_devices`].
pub fn sample_links() -> Vec<Link> {
    vec![
        link(
            ("sonic-leaf-01", "Ethernet24"),
            ("sonic-spine-01", "Ethernet1/1"),
            "100G",
        ),
        link(
            ("cisco-core-01", "GigabitEthernet0/1"),
            ("sonic-spine-01", "Ethernet1/2"),
            "10G",
        ),
        link(
            ("fortigate-fw-01", "port1"),
            ("cisco-core-01", "GigabitEthernet0/2"),
            "1G",
        ),
        link(
            ("edgecore-spine-02", "Ethernet1"),
            ("sonic-leaf-01", "Ethernet12"),
            "25G",
        ),
    ]
}

/// Derive topology counts from devices and links.
pub fn compute_statistics(devices: &[Device], links: &[Link]) -> TopologyStatistics {
    let sonic_devices = devices
        .iter()
        .filter(|d| d.kind == DeviceKind::Sonic)
        .count();

    TopologyStatistics {
        total_devices: devices.len(),
        sonic_devices,
        non_sonic_devices: devices.len() - sonic_devices,
        total_links: links.len(),
        active_links: links.iter().filter(|l| l.status == "up").count(),
    }
}

/// Build the multi-vendor topology stamped with the given timestamp.
pub fn build_topology(timestamp: String) -> NetworkTopology {
    let devices = sample_devices();
    let links = sample_links();
    let statistics = compute_statistics(&devices, &links);

    tracing::info!(
        "Topology built: {} devices, {} links",
        statistics.total_devices,
        statistics.total_links
    );

    NetworkTopology {
        timestamp,
        devices,
        links,
        statistics,
    }
}
