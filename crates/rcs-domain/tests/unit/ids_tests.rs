//! Unit tests for resource identifiers

use rcs_domain::value_objects::{LoadBalancerId, NodeId, ScalingGroupId};

#[test]
fn test_string_id_display_and_serde() {
    let id = ScalingGroupId::new("605e13f6-1452-4588-b5da-ac6bb468c5bf");
    assert_eq!(id.to_string(), "605e13f6-1452-4588-b5da-ac6bb468c5bf");

    let json = serde_json::to_string(&id).expect("serialize");
    assert_eq!(json, "\"605e13f6-1452-4588-b5da-ac6bb468c5bf\"");

    let back: ScalingGroupId = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, id);
}

#[test]
fn test_numeric_id_accepts_number_and_string() {
    let from_number: LoadBalancerId = serde_json::from_str("71").expect("number");
    let from_string: LoadBalancerId = serde_json::from_str("\"71\"").expect("string");
    assert_eq!(from_number, from_string);
    assert_eq!(from_number.as_str(), "71");
}

#[test]
fn test_numeric_id_serializes_as_number() {
    let id = NodeId::from(410_u64);
    assert_eq!(serde_json::to_string(&id).expect("serialize"), "410");
}

#[test]
fn test_non_numeric_id_serializes_as_string() {
    let id = LoadBalancerId::new("lb-1");
    assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"lb-1\"");
}
