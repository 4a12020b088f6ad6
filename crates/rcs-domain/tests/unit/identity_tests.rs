//! Unit tests for identity value objects

use chrono::{Duration, Utc};
use rcs_domain::value_objects::{AuthToken, CatalogEntry, Endpoint, ServiceCatalog};

fn endpoint(region: Option<&str>, public: &str, internal: Option<&str>) -> Endpoint {
    Endpoint {
        region: region.map(str::to_string),
        tenant_id: Some("123456".to_string()),
        public_url: public.to_string(),
        internal_url: internal.map(str::to_string),
    }
}

fn catalog() -> ServiceCatalog {
    ServiceCatalog::new(vec![
        CatalogEntry {
            name: "cloudFiles".to_string(),
            service_type: "object-store".to_string(),
            endpoints: vec![
                endpoint(
                    Some("DFW"),
                    "https://storage.dfw.example.com/v1/MossoCloudFS_1/",
                    Some("https://snet-storage.dfw.example.com/v1/MossoCloudFS_1"),
                ),
                endpoint(Some("ORD"), "https://storage.ord.example.com/v1/MossoCloudFS_1", None),
            ],
        },
        CatalogEntry {
            name: "cloudMonitoring".to_string(),
            service_type: "rax:monitor".to_string(),
            endpoints: vec![endpoint(None, "https://monitoring.example.com/v1.0/1", None)],
        },
    ])
}

#[test]
fn test_resolve_explicit_region_case_insensitive() {
    let url = catalog()
        .resolve("object-store", Some("ord"), Some("DFW"), false)
        .expect("ORD endpoint");
    assert_eq!(url, "https://storage.ord.example.com/v1/MossoCloudFS_1");
}

#[test]
fn test_resolve_falls_back_to_default_region_and_trims_slash() {
    let url = catalog()
        .resolve("object-store", None, Some("DFW"), false)
        .expect("DFW endpoint");
    assert_eq!(url, "https://storage.dfw.example.com/v1/MossoCloudFS_1");
}

#[test]
fn test_resolve_internal_url() {
    let url = catalog()
        .resolve("object-store", Some("DFW"), None, true)
        .expect("internal endpoint");
    assert!(url.starts_with("https://snet-storage"));

    let url = catalog()
        .resolve("object-store", Some("ORD"), None, true)
        .expect("public fallback");
    assert!(url.starts_with("https://storage.ord"));
}

#[test]
fn test_resolve_global_service_in_any_region() {
    let url = catalog()
        .resolve("rax:monitor", Some("IAD"), None, false)
        .expect("global endpoint");
    assert_eq!(url, "https://monitoring.example.com/v1.0/1");
}

#[test]
fn test_resolve_unknown_service_or_region() {
    assert!(
        catalog()
            .resolve("rax:autoscale", None, Some("DFW"), false)
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        catalog()
            .resolve("object-store", Some("SYD"), None, false)
            .unwrap_err()
            .is_not_found()
    );
}

#[test]
fn test_token_refresh_margin() {
    let now = Utc::now();
    let fresh = AuthToken {
        id: "t".to_string(),
        expires: now + Duration::hours(1),
        tenant: None,
    };
    let stale = AuthToken {
        expires: now + Duration::seconds(60),
        ..fresh.clone()
    };
    assert!(!fresh.needs_refresh(now));
    assert!(stale.needs_refresh(now));
}

#[test]
fn test_catalog_deserializes_wire_names() {
    let json = r#"[{"name":"cloudFiles","type":"object-store","endpoints":[
        {"region":"DFW","tenantId":"1","publicURL":"https://a","internalURL":"https://b"}]}]"#;
    let catalog: ServiceCatalog = serde_json::from_str(json).expect("catalog");
    assert_eq!(catalog.entries()[0].endpoints[0].internal_url.as_deref(), Some("https://b"));
}
