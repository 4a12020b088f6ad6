//! In-memory load balancer service tests

use std::time::Duration;

use rcs_domain::error::Error;
use rcs_domain::ports::LoadBalancerService;
use rcs_domain::value_objects::{
    LoadBalancerConfiguration, LoadBalancerId, LoadBalancerStatus, LoadBalancerUpdate,
    MetadataItem, NetworkItem, NetworkItemType, NodeCondition, NodeConfiguration, NodeUpdate,
    VirtualIpConfiguration, VirtualIpType,
};
use rcs_providers::load_balancer::{
    InMemoryLoadBalancerService, wait_for_load_balancer_deletion, wait_for_load_balancer_status,
};
use rcs_providers::utils::PollOptions;

fn fast_poll() -> PollOptions {
    PollOptions::new(Duration::from_millis(1), Duration::from_secs(2))
}

async fn active_lb(service: &InMemoryLoadBalancerService, name: &str) -> LoadBalancerId {
    let mut config = LoadBalancerConfiguration::new(name, "HTTP", 80);
    config.nodes.push(NodeConfiguration::new("10.0.0.10", 8080));
    let lb = service.create_load_balancer(&config).await.unwrap();
    wait_for_load_balancer_status(service, &lb.id, LoadBalancerStatus::Active, &fast_poll())
        .await
        .unwrap();
    lb.id
}

#[tokio::test]
async fn test_new_balancer_builds_then_becomes_active() {
    let service = InMemoryLoadBalancerService::new();
    let created = service
        .create_load_balancer(&LoadBalancerConfiguration::new("web", "HTTPS", 443))
        .await
        .unwrap();
    assert_eq!(created.status, LoadBalancerStatus::Build);
    assert_eq!(created.algorithm, "RANDOM");
    assert_eq!(created.virtual_ips.len(), 1);

    let lb = wait_for_load_balancer_status(
        &service,
        &created.id,
        LoadBalancerStatus::Active,
        &fast_poll(),
    )
    .await
    .unwrap();
    assert_eq!(lb.port, 443);
}

#[tokio::test]
async fn test_changes_rejected_while_not_active() {
    let service = InMemoryLoadBalancerService::new();
    let created = service
        .create_load_balancer(&LoadBalancerConfiguration::new("web", "HTTP", 80))
        .await
        .unwrap();

    let err = service
        .set_error_page(&created.id, "<html>sorry</html>")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_mutation_passes_through_pending_update() {
    let service = InMemoryLoadBalancerService::new();
    let id = active_lb(&service, "web").await;

    service
        .update_load_balancer(
            &id,
            &LoadBalancerUpdate {
                name: Some("renamed".to_string()),
                algorithm: Some("ROUND_ROBIN".to_string()),
                ..LoadBalancerUpdate::default()
            },
        )
        .await
        .unwrap();
    // a second change before the first settles is refused
    assert!(
        service
            .set_connection_logging(&id, true)
            .await
            .unwrap_err()
            .is_conflict()
    );

    let lb = wait_for_load_balancer_status(&service, &id, LoadBalancerStatus::Active, &fast_poll())
        .await
        .unwrap();
    assert_eq!(lb.name, "renamed");
    assert_eq!(lb.algorithm, "ROUND_ROBIN");
}

#[tokio::test]
async fn test_unknown_protocol_and_algorithm_rejected() {
    let service = InMemoryLoadBalancerService::new();
    let err = service
        .create_load_balancer(&LoadBalancerConfiguration::new("web", "GOPHER", 70))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let mut config = LoadBalancerConfiguration::new("web", "HTTP", 80);
    config.algorithm = Some("FASTEST".to_string());
    assert!(service.create_load_balancer(&config).await.is_err());
}

#[tokio::test]
async fn test_node_lifecycle() {
    let service = InMemoryLoadBalancerService::new();
    let id = active_lb(&service, "web").await;

    let added = service
        .add_nodes(&id, &[NodeConfiguration::new("10.0.0.11", 8080)])
        .await
        .unwrap();
    assert_eq!(added.len(), 1);
    wait_for_load_balancer_status(&service, &id, LoadBalancerStatus::Active, &fast_poll())
        .await
        .unwrap();

    // same address and port twice
    let err = service
        .add_nodes(&id, &[NodeConfiguration::new("10.0.0.11", 8080)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));

    service
        .update_node(
            &id,
            &added[0].id,
            &NodeUpdate {
                condition: Some(NodeCondition::Draining),
                ..NodeUpdate::default()
            },
        )
        .await
        .unwrap();
    let node = service.get_node(&id, &added[0].id).await.unwrap();
    assert_eq!(node.condition, NodeCondition::Draining);

    wait_for_load_balancer_status(&service, &id, LoadBalancerStatus::Active, &fast_poll())
        .await
        .unwrap();
    service.remove_node(&id, &added[0].id).await.unwrap();
    assert_eq!(service.list_all_nodes(&id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_last_virtual_ip_cannot_be_removed() {
    let service = InMemoryLoadBalancerService::new();
    let id = active_lb(&service, "web").await;
    let vips = service.list_virtual_addresses(&id).await.unwrap();

    let err = service
        .remove_virtual_address(&id, &vips[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let added = service
        .add_virtual_address(
            &id,
            &VirtualIpConfiguration::New {
                ip_type: VirtualIpType::Public,
                ip_version: None,
            },
        )
        .await
        .unwrap();
    assert!(added.address.contains(':'));
}

#[tokio::test]
async fn test_shared_virtual_ip_must_exist() {
    let service = InMemoryLoadBalancerService::new();
    let first = active_lb(&service, "first").await;
    let vip = service.list_virtual_addresses(&first).await.unwrap()[0].clone();

    let mut config = LoadBalancerConfiguration::new("second", "HTTP", 8080);
    config.virtual_ips = vec![VirtualIpConfiguration::Shared { id: vip.id.clone() }];
    let second = service.create_load_balancer(&config).await.unwrap();
    assert_eq!(second.virtual_ips[0].address, vip.address);

    config.virtual_ips = vec![VirtualIpConfiguration::Shared {
        id: 999_999_u64.into(),
    }];
    assert!(service.create_load_balancer(&config).await.is_err());
}

#[tokio::test]
async fn test_access_list_and_metadata() {
    let service = InMemoryLoadBalancerService::new();
    let id = active_lb(&service, "web").await;

    service
        .add_access_list(
            &id,
            &[
                NetworkItem::new("192.0.2.0/24", NetworkItemType::Deny),
                NetworkItem::new("192.0.2.7", NetworkItemType::Allow),
            ],
        )
        .await
        .unwrap();
    let list = service.get_access_list(&id).await.unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|item| item.id.is_some()));

    // metadata is not gated on status
    let created = service
        .add_metadata(&id, &[MetadataItem::new("owner", "team-a")])
        .await
        .unwrap();
    assert!(
        service
            .add_metadata(&id, &[MetadataItem::new("owner", "team-b")])
            .await
            .is_err()
    );
    let metadata_id = created[0].id.clone().unwrap();
    service
        .remove_metadata(&id, &[metadata_id.clone()])
        .await
        .unwrap();
    assert!(service.list_metadata(&id).await.unwrap().is_empty());

    // removing it again is reported like any other missing sub-resource
    let err = service
        .remove_metadata(&id, &[metadata_id])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_deletion_reaches_deleted_then_disappears() {
    let service = InMemoryLoadBalancerService::new();
    let id = active_lb(&service, "web").await;

    service.delete_load_balancer(&id).await.unwrap();
    wait_for_load_balancer_deletion(&service, &id, &fast_poll())
        .await
        .unwrap();
    assert!(service.get_load_balancer(&id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_bulk_delete_is_all_or_nothing() {
    let service = InMemoryLoadBalancerService::new();
    let ready = active_lb(&service, "ready").await;
    let building = service
        .create_load_balancer(&LoadBalancerConfiguration::new("building", "HTTP", 80))
        .await
        .unwrap();

    let err = service
        .delete_load_balancers(&[ready.clone(), building.id.clone()])
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(
        service.get_load_balancer(&ready).await.unwrap().status,
        LoadBalancerStatus::Active
    );
}

#[tokio::test]
async fn test_listing_pages_by_numeric_id() {
    let service = InMemoryLoadBalancerService::new();
    for n in 0..12 {
        service
            .create_load_balancer(&LoadBalancerConfiguration::new(format!("lb-{n}"), "HTTP", 80))
            .await
            .unwrap();
    }

    let all = service.list_all_load_balancers().await.unwrap();
    let ids: Vec<u64> = all
        .iter()
        .map(|lb| lb.id.as_str().parse().unwrap())
        .collect();
    assert_eq!(ids, (1..=12).collect::<Vec<u64>>());
    assert!(all.iter().all(|lb| lb.nodes.is_empty()));
}

#[tokio::test]
async fn test_wait_times_out_on_stuck_status() {
    let service = InMemoryLoadBalancerService::new();
    let id = active_lb(&service, "web").await;

    let err = wait_for_load_balancer_status(
        &service,
        &id,
        LoadBalancerStatus::Suspended,
        &PollOptions::new(Duration::from_millis(1), Duration::from_millis(20)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
}
