//! Unit tests for object storage value objects

use rcs_domain::value_objects::{
    ArchiveFormat, ContainerObject, Metadata, TempUrlMethod, validate_container_name,
    validate_object_name,
};
use serde_json::json;

#[test]
fn test_container_name_rules() {
    assert!(validate_container_name("backups").is_ok());
    assert!(validate_container_name("").is_err());
    assert!(validate_container_name("/leading").is_err());
    assert!(validate_container_name("a/b").is_err());
    assert!(validate_container_name(&"x".repeat(257)).is_err());
    assert!(validate_container_name(&"x".repeat(256)).is_ok());
}

#[test]
fn test_object_name_rules() {
    assert!(validate_object_name("photos/2024/cat.jpg").is_ok());
    assert!(validate_object_name("").is_err());
    assert!(validate_object_name(&"x".repeat(1025)).is_err());
}

#[test]
fn test_metadata_keys_are_case_insensitive() {
    let mut metadata = Metadata::new().with("Color", "blue");
    assert_eq!(metadata.get("COLOR"), Some("blue"));
    assert!(metadata.contains_key("color"));
    assert_eq!(metadata.insert("color", "red"), Some("blue".to_string()));
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata.remove("CoLoR"), Some("red".to_string()));
    assert!(metadata.is_empty());
}

#[test]
fn test_metadata_merge_and_collect() {
    let mut base: Metadata = [("a", "1"), ("b", "2")].into_iter().collect();
    base.merge(&Metadata::new().with("B", "3").with("c", "4"));
    let pairs: Vec<(&str, &str)> = base.iter().collect();
    assert_eq!(pairs, vec![("a", "1"), ("b", "3"), ("c", "4")]);
}

#[test]
fn test_listing_entry_with_naive_timestamp() {
    let object: ContainerObject = serde_json::from_value(json!({
        "name": "photos/cat.jpg",
        "hash": "451e372e48e0f6b1114fa0724aa79fa1",
        "bytes": 14,
        "content_type": "image/jpeg",
        "last_modified": "2024-05-01T12:34:56.789012"
    }))
    .expect("object");
    assert!(!object.is_directory());
    assert_eq!(object.bytes, 14);
    assert!(object.last_modified.is_some());
}

#[test]
fn test_subdir_entry_is_directory() {
    let object: ContainerObject =
        serde_json::from_value(json!({"subdir": "photos/"})).expect("subdir");
    assert_eq!(object.name, "photos/");
    assert!(object.is_directory());
}

#[test]
fn test_enum_wire_names() {
    assert_eq!(ArchiveFormat::TarGz.as_str(), "tar.gz");
    assert_eq!(ArchiveFormat::TarBz2.to_string(), "tar.bz2");
    assert_eq!(TempUrlMethod::Put.as_str(), "PUT");
}
