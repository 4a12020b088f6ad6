//! Unit tests for load balancer value objects

use rcs_domain::value_objects::{
    HealthMonitor, HttpMonitorSettings, LoadBalancer, LoadBalancerConfiguration,
    LoadBalancerStatus, LoadBalancerUpdate, MonitorTiming, Node, NodeCondition, NodeUpdate,
    VirtualIpConfiguration, VirtualIpId,
};
use serde_json::json;

fn timing() -> MonitorTiming {
    MonitorTiming {
        delay: 10,
        timeout: 5,
        attempts_before_deactivation: 2,
    }
}

#[test]
fn test_status_unknown_values_are_tolerated() {
    let status: LoadBalancerStatus = serde_json::from_value(json!("MIGRATING")).expect("status");
    assert_eq!(status, LoadBalancerStatus::Unknown);
    let status: LoadBalancerStatus =
        serde_json::from_value(json!("PENDING_UPDATE")).expect("status");
    assert_eq!(status, LoadBalancerStatus::PendingUpdate);
    assert!(!status.is_mutable());
    assert_eq!(status.to_string(), "PENDING_UPDATE");
}

#[test]
fn test_load_balancer_deserializes_numeric_ids() {
    let lb: LoadBalancer = serde_json::from_value(json!({
        "id": 2000,
        "name": "web",
        "protocol": "HTTP",
        "port": 80,
        "algorithm": "RANDOM",
        "status": "BUILD",
        "nodes": [{"id": 410, "address": "10.1.1.1", "port": 80,
                   "condition": "ENABLED", "status": "ONLINE"}],
        "virtualIps": [{"id": 1000, "address": "206.10.10.210",
                        "type": "PUBLIC", "ipVersion": "IPV4"}],
        "created": {"time": "2024-02-01T12:00:00Z"}
    }))
    .expect("load balancer");
    assert_eq!(lb.id.as_str(), "2000");
    assert_eq!(lb.nodes[0].id.as_str(), "410");
    assert_eq!(lb.virtual_ips[0].id, VirtualIpId::from(1000_u64));
    assert_eq!(lb.status, LoadBalancerStatus::Build);
}

#[test]
fn test_configuration_validation() {
    let config = LoadBalancerConfiguration::new("web", "HTTP", 80);
    assert!(config.validate().is_ok());

    let mut no_vip = config.clone();
    no_vip.virtual_ips.clear();
    assert!(no_vip.validate().is_err());

    let mut bad_timeout = config;
    bad_timeout.timeout = Some(500);
    assert!(bad_timeout.validate().is_err());
}

#[test]
fn test_virtual_ip_configuration_wire_format() {
    assert_eq!(
        serde_json::to_value(VirtualIpConfiguration::public()).expect("serialize"),
        json!({"type": "PUBLIC", "ipVersion": "IPV4"})
    );
    assert_eq!(
        serde_json::to_value(VirtualIpConfiguration::Shared {
            id: VirtualIpId::from(7_u64)
        })
        .expect("serialize"),
        json!({"id": 7})
    );
}

#[test]
fn test_health_monitor_tagged_by_type() {
    let monitor = HealthMonitor::Http(HttpMonitorSettings {
        timing: timing(),
        path: "/health".to_string(),
        status_regex: "^[234][0-9][0-9]$".to_string(),
        body_regex: None,
        host_header: None,
    });
    let value = serde_json::to_value(&monitor).expect("serialize");
    assert_eq!(value["type"], "HTTP");
    assert_eq!(value["attemptsBeforeDeactivation"], 2);
    assert_eq!(value["statusRegex"], "^[234][0-9][0-9]$");

    let back: HealthMonitor = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, monitor);
}

#[test]
fn test_health_monitor_validation() {
    assert!(HealthMonitor::Connect(timing()).validate().is_ok());
    let bad = HealthMonitor::Connect(MonitorTiming {
        attempts_before_deactivation: 0,
        ..timing()
    });
    assert!(bad.validate().is_err());
    let bad_path = HealthMonitor::Https(HttpMonitorSettings {
        timing: timing(),
        path: "health".to_string(),
        status_regex: ".*".to_string(),
        body_regex: None,
        host_header: None,
    });
    assert!(bad_path.validate().is_err());
}

#[test]
fn test_update_applies_only_set_fields() {
    let mut lb: LoadBalancer = serde_json::from_value(json!({
        "id": 1, "name": "a", "protocol": "HTTP", "port": 80,
        "algorithm": "RANDOM", "status": "ACTIVE", "timeout": 30
    }))
    .expect("load balancer");
    let update = LoadBalancerUpdate {
        name: Some("b".to_string()),
        ..Default::default()
    };
    assert!(!update.is_empty());
    update.apply_to(&mut lb);
    assert_eq!(lb.name, "b");
    assert_eq!(lb.timeout, Some(30));
    assert!(LoadBalancerUpdate::default().is_empty());
}

#[test]
fn test_node_update() {
    let mut node: Node = serde_json::from_value(json!({
        "id": 1, "address": "10.0.0.1", "port": 80, "condition": "ENABLED"
    }))
    .expect("node");
    NodeUpdate {
        condition: Some(NodeCondition::Draining),
        weight: Some(5),
        ..Default::default()
    }
    .apply_to(&mut node);
    assert_eq!(node.condition, NodeCondition::Draining);
    assert_eq!(node.weight, Some(5));
}
