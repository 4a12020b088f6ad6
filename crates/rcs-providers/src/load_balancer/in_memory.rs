//! In-memory Cloud Load Balancers service
//!
//! Balancers move through the same statuses as on the live service, one
//! step per read of the balancer (`get_load_balancer` or a listing):
//!
//! | Status | Next read |
//! |--------|-----------|
//! | `BUILD` | `ACTIVE` |
//! | `PENDING_UPDATE` | `ACTIVE` |
//! | `PENDING_DELETE` | `DELETED` |
//! | `DELETED` | removed, `NotFound` |
//!
//! Configuration changes are only accepted while `ACTIVE` and leave the
//! balancer in `PENDING_UPDATE`, so callers have to wait between changes.
//! Metadata changes are not status-gated.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use rcs_domain::error::{Error, Result};
use rcs_domain::pagination::{Page, PageRequest};
use rcs_domain::ports::LoadBalancerService;
use rcs_domain::value_objects::{
    ConnectionThrottles, HealthMonitor, IpVersion, LoadBalancer, LoadBalancerConfiguration,
    LoadBalancerId, LoadBalancerStatus, LoadBalancerUpdate, LoadBalancerVirtualAddress,
    LoadBalancingAlgorithm, LoadBalancingProtocol, MetadataId, MetadataItem, NetworkItem,
    NetworkItemId, Node, NodeConfiguration, NodeId, NodeType, NodeUpdate, SessionPersistence, Timestamp,
    Toggle, VirtualIpConfiguration, VirtualIpId, VirtualIpType,
};

use crate::utils::page_by_key;

const PROTOCOLS: &[(&str, u16)] = &[
    ("DNS_TCP", 53),
    ("DNS_UDP", 53),
    ("FTP", 21),
    ("HTTP", 80),
    ("HTTPS", 443),
    ("IMAPS", 993),
    ("IMAPv4", 143),
    ("LDAP", 389),
    ("LDAPS", 636),
    ("MYSQL", 3306),
    ("POP3", 110),
    ("POP3S", 995),
    ("SMTP", 25),
    ("TCP", 0),
    ("TCP_CLIENT_FIRST", 0),
    ("UDP", 0),
    ("UDP_STREAM", 0),
    ("SFTP", 22),
];

const ALGORITHMS: &[&str] = &[
    "LEAST_CONNECTIONS",
    "RANDOM",
    "ROUND_ROBIN",
    "WEIGHTED_LEAST_CONNECTIONS",
    "WEIGHTED_ROUND_ROBIN",
];

const DEFAULT_ALGORITHM: &str = "RANDOM";

struct LbRecord {
    lb: LoadBalancer,
    access_list: Vec<NetworkItem>,
    health_monitor: Option<HealthMonitor>,
    session_persistence: Option<SessionPersistence>,
    throttles: Option<ConnectionThrottles>,
    error_page: Option<String>,
    metadata: Vec<MetadataItem>,
}

enum Advance {
    Present,
    Gone,
}

impl LbRecord {
    fn advance(&mut self) -> Advance {
        let next = match self.lb.status {
            LoadBalancerStatus::Build | LoadBalancerStatus::PendingUpdate => {
                LoadBalancerStatus::Active
            }
            LoadBalancerStatus::PendingDelete => LoadBalancerStatus::Deleted,
            LoadBalancerStatus::Deleted => return Advance::Gone,
            ref other => other.clone(),
        };
        self.lb.status = next;
        Advance::Present
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.lb.status.is_mutable() {
            Ok(())
        } else {
            Err(Error::conflict(format!(
                "load balancer {} is {} and cannot be modified",
                self.lb.id, self.lb.status
            )))
        }
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node> {
        self.lb
            .nodes
            .iter_mut()
            .find(|n| n.id == *id)
            .ok_or_else(|| Error::not_found(format!("node {id}")))
    }
}

fn validate_node(node: &NodeConfiguration) -> Result<()> {
    if node.address.trim().is_empty() {
        return Err(Error::invalid_argument("node address cannot be empty"));
    }
    if node.weight.is_some_and(|w| !(1..=100).contains(&w)) {
        return Err(Error::invalid_argument("node weight must be 1-100"));
    }
    Ok(())
}

fn validate_metadata(item: &MetadataItem) -> Result<()> {
    if item.key.is_empty() || item.key.len() > 256 || item.value.len() > 256 {
        return Err(Error::invalid_argument(
            "metadata keys must be 1-256 characters and values at most 256",
        ));
    }
    Ok(())
}

/// In-memory Cloud Load Balancers service
#[derive(Default)]
pub struct InMemoryLoadBalancerService {
    balancers: DashMap<LoadBalancerId, LbRecord>,
    next_lb_id: AtomicU64,
    next_item_id: AtomicU64,
}

impl InMemoryLoadBalancerService {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    fn next_item(&self) -> u64 {
        self.next_item_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn allocate_vip(&self, ip_type: VirtualIpType, ip_version: IpVersion) -> LoadBalancerVirtualAddress {
        let n = self.next_item();
        let address = match ip_version {
            IpVersion::Ipv4 => format!("198.51.{}.{}", (n / 254) % 256, n % 254 + 1),
            IpVersion::Ipv6 => format!("2001:db8::{n:x}"),
        };
        LoadBalancerVirtualAddress {
            id: VirtualIpId::from(n),
            address,
            ip_type,
            ip_version,
        }
    }

    fn resolve_vip(&self, config: &VirtualIpConfiguration) -> Result<LoadBalancerVirtualAddress> {
        match config {
            VirtualIpConfiguration::New {
                ip_type,
                ip_version,
            } => Ok(self.allocate_vip(*ip_type, ip_version.unwrap_or(IpVersion::Ipv4))),
            VirtualIpConfiguration::Shared { id } => self
                .balancers
                .iter()
                .find_map(|entry| {
                    entry
                        .value()
                        .lb
                        .virtual_ips
                        .iter()
                        .find(|vip| vip.id == *id)
                        .cloned()
                })
                .ok_or_else(|| Error::invalid_argument(format!("virtual IP {id} does not exist"))),
        }
    }

    fn make_nodes(&self, nodes: &[NodeConfiguration]) -> Result<Vec<Node>> {
        nodes.iter().try_for_each(validate_node)?;
        Ok(nodes
            .iter()
            .map(|config| Node {
                id: NodeId::from(self.next_item()),
                address: config.address.clone(),
                port: config.port,
                condition: config.condition,
                node_type: Some(config.node_type.unwrap_or(NodeType::Primary)),
                weight: config.weight,
                status: Some("ONLINE".to_string()),
            })
            .collect())
    }

    fn with_record<T>(
        &self,
        id: &LoadBalancerId,
        f: impl FnOnce(&mut LbRecord) -> Result<T>,
    ) -> Result<T> {
        let mut record = self
            .balancers
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("load balancer {id}")))?;
        f(&mut record)
    }

    /// Apply a configuration change to an `ACTIVE` balancer
    fn mutate<T>(
        &self,
        id: &LoadBalancerId,
        f: impl FnOnce(&mut LbRecord) -> Result<T>,
    ) -> Result<T> {
        self.with_record(id, |record| {
            record.ensure_mutable()?;
            let value = f(record)?;
            record.lb.status = LoadBalancerStatus::PendingUpdate;
            record.lb.updated = Some(Timestamp { time: Utc::now() });
            Ok(value)
        })
    }

    /// Read the balancer, advancing its status one step
    fn read(&self, id: &LoadBalancerId) -> Result<LoadBalancer> {
        {
            let mut record = self
                .balancers
                .get_mut(id)
                .ok_or_else(|| Error::not_found(format!("load balancer {id}")))?;
            if let Advance::Present = record.advance() {
                return Ok(record.lb.clone());
            }
        }
        self.balancers.remove(id);
        Err(Error::not_found(format!("load balancer {id}")))
    }
}

#[async_trait]
impl LoadBalancerService for InMemoryLoadBalancerService {
    async fn list_load_balancers(&self, page: PageRequest) -> Result<Page<LoadBalancer>> {
        let ids: Vec<LoadBalancerId> = self.balancers.iter().map(|e| e.key().clone()).collect();
        let balancers: Vec<LoadBalancer> = ids
            .iter()
            .filter_map(|id| self.read(id).ok())
            .filter(|lb| lb.status != LoadBalancerStatus::Deleted)
            .map(|mut lb| {
                lb.nodes.clear();
                lb
            })
            .collect();
        Ok(page_by_key(balancers, &page, |lb| {
            lb.id.as_str().parse::<u64>().unwrap_or(u64::MAX)
        }))
    }

    async fn create_load_balancer(&self, config: &LoadBalancerConfiguration) -> Result<LoadBalancer> {
        config.validate()?;
        let default_port = PROTOCOLS
            .iter()
            .find(|(name, _)| *name == config.protocol)
            .map(|(_, port)| *port)
            .ok_or_else(|| {
                Error::invalid_argument(format!("unsupported protocol '{}'", config.protocol))
            })?;
        let algorithm = config
            .algorithm
            .clone()
            .unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());
        if !ALGORITHMS.contains(&algorithm.as_str()) {
            return Err(Error::invalid_argument(format!(
                "unsupported algorithm '{algorithm}'"
            )));
        }
        config.access_list.iter().try_for_each(|item| {
            if item.address.trim().is_empty() {
                Err(Error::invalid_argument("access list address cannot be empty"))
            } else {
                Ok(())
            }
        })?;
        config.metadata.iter().try_for_each(validate_metadata)?;

        let virtual_ips = config
            .virtual_ips
            .iter()
            .map(|vip| self.resolve_vip(vip))
            .collect::<Result<Vec<_>>>()?;
        let nodes = self.make_nodes(&config.nodes)?;
        let id = LoadBalancerId::from(self.next_lb_id.fetch_add(1, Ordering::Relaxed) + 1);
        let now = Timestamp { time: Utc::now() };

        let lb = LoadBalancer {
            id: id.clone(),
            name: config.name.clone(),
            protocol: config.protocol.clone(),
            port: config.port.unwrap_or(default_port),
            algorithm,
            status: LoadBalancerStatus::Build,
            timeout: Some(config.timeout.unwrap_or(30)),
            half_closed: Some(config.half_closed.unwrap_or(false)),
            nodes,
            virtual_ips,
            connection_logging: Some(Toggle { enabled: false }),
            content_caching: Some(Toggle { enabled: false }),
            created: Some(now),
            updated: Some(now),
        };
        let access_list = config
            .access_list
            .iter()
            .map(|item| NetworkItem {
                id: Some(NetworkItemId::from(self.next_item())),
                ..item.clone()
            })
            .collect();
        let metadata = config
            .metadata
            .iter()
            .map(|item| MetadataItem {
                id: Some(MetadataId::from(self.next_item())),
                ..item.clone()
            })
            .collect();

        self.balancers.insert(
            id.clone(),
            LbRecord {
                lb: lb.clone(),
                access_list,
                health_monitor: None,
                session_persistence: None,
                throttles: None,
                error_page: None,
                metadata,
            },
        );
        tracing::debug!(load_balancer = %id, "in-memory load balancer created");
        Ok(lb)
    }

    async fn get_load_balancer(&self, id: &LoadBalancerId) -> Result<LoadBalancer> {
        self.read(id)
    }

    async fn update_load_balancer(&self, id: &LoadBalancerId, update: &LoadBalancerUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        if let Some(algorithm) = &update.algorithm {
            if !ALGORITHMS.contains(&algorithm.as_str()) {
                return Err(Error::invalid_argument(format!(
                    "unsupported algorithm '{algorithm}'"
                )));
            }
        }
        if update.timeout.is_some_and(|t| !(1..=120).contains(&t)) {
            return Err(Error::invalid_argument("timeout must be 1-120 seconds"));
        }
        self.mutate(id, |record| {
            update.apply_to(&mut record.lb);
            Ok(())
        })
    }

    async fn delete_load_balancer(&self, id: &LoadBalancerId) -> Result<()> {
        self.with_record(id, |record| {
            record.ensure_mutable()?;
            record.lb.status = LoadBalancerStatus::PendingDelete;
            Ok(())
        })
    }

    async fn delete_load_balancers(&self, ids: &[LoadBalancerId]) -> Result<()> {
        for id in ids {
            self.with_record(id, |record| record.ensure_mutable())?;
        }
        for id in ids {
            self.delete_load_balancer(id).await?;
        }
        Ok(())
    }

    async fn list_nodes(&self, lb: &LoadBalancerId, page: PageRequest) -> Result<Page<Node>> {
        let nodes = self.with_record(lb, |record| Ok(record.lb.nodes.clone()))?;
        Ok(page_by_key(nodes, &page, |n| {
            n.id.as_str().parse::<u64>().unwrap_or(u64::MAX)
        }))
    }

    async fn add_nodes(&self, lb: &LoadBalancerId, nodes: &[NodeConfiguration]) -> Result<Vec<Node>> {
        if nodes.is_empty() {
            return Err(Error::invalid_argument("no nodes to add"));
        }
        self.mutate(lb, |record| {
            let duplicate = nodes.iter().find(|config| {
                record
                    .lb
                    .nodes
                    .iter()
                    .any(|n| n.address == config.address && n.port == config.port)
            });
            if let Some(config) = duplicate {
                return Err(Error::invalid_argument(format!(
                    "node {}:{} already exists",
                    config.address, config.port
                )));
            }
            let created = self.make_nodes(nodes)?;
            record.lb.nodes.extend(created.iter().cloned());
            Ok(created)
        })
    }

    async fn get_node(&self, lb: &LoadBalancerId, node: &NodeId) -> Result<Node> {
        self.with_record(lb, |record| record.node_mut(node).map(|n| (*n).clone()))
    }

    async fn update_node(&self, lb: &LoadBalancerId, node: &NodeId, update: &NodeUpdate) -> Result<()> {
        if update.weight.is_some_and(|w| !(1..=100).contains(&w)) {
            return Err(Error::invalid_argument("node weight must be 1-100"));
        }
        self.mutate(lb, |record| {
            update.apply_to(record.node_mut(node)?);
            Ok(())
        })
    }

    async fn remove_node(&self, lb: &LoadBalancerId, node: &NodeId) -> Result<()> {
        self.remove_nodes(lb, std::slice::from_ref(node)).await
    }

    async fn remove_nodes(&self, lb: &LoadBalancerId, nodes: &[NodeId]) -> Result<()> {
        self.mutate(lb, |record| {
            if let Some(missing) = nodes
                .iter()
                .find(|id| !record.lb.nodes.iter().any(|n| n.id == **id))
            {
                return Err(Error::not_found(format!("node {missing}")));
            }
            record.lb.nodes.retain(|n| !nodes.contains(&n.id));
            Ok(())
        })
    }

    async fn list_virtual_addresses(&self, lb: &LoadBalancerId) -> Result<Vec<LoadBalancerVirtualAddress>> {
        self.with_record(lb, |record| Ok(record.lb.virtual_ips.clone()))
    }

    async fn add_virtual_address(
        &self,
        lb: &LoadBalancerId,
        vip: &VirtualIpConfiguration,
    ) -> Result<LoadBalancerVirtualAddress> {
        let VirtualIpConfiguration::New {
            ip_type,
            ip_version,
        } = vip
        else {
            return Err(Error::invalid_argument(
                "only new virtual IPs can be added to an existing load balancer",
            ));
        };
        let address = self.allocate_vip(*ip_type, ip_version.unwrap_or(IpVersion::Ipv6));
        self.mutate(lb, |record| {
            record.lb.virtual_ips.push(address.clone());
            Ok(address)
        })
    }

    async fn remove_virtual_address(&self, lb: &LoadBalancerId, vip: &VirtualIpId) -> Result<()> {
        self.mutate(lb, |record| {
            if !record.lb.virtual_ips.iter().any(|v| v.id == *vip) {
                return Err(Error::not_found(format!("virtual IP {vip}")));
            }
            if record.lb.virtual_ips.len() == 1 {
                return Err(Error::invalid_argument(
                    "cannot remove the last virtual IP of a load balancer",
                ));
            }
            record.lb.virtual_ips.retain(|v| v.id != *vip);
            Ok(())
        })
    }

    async fn get_access_list(&self, lb: &LoadBalancerId) -> Result<Vec<NetworkItem>> {
        self.with_record(lb, |record| Ok(record.access_list.clone()))
    }

    async fn add_access_list(&self, lb: &LoadBalancerId, items: &[NetworkItem]) -> Result<()> {
        if items.iter().any(|item| item.address.trim().is_empty()) {
            return Err(Error::invalid_argument("access list address cannot be empty"));
        }
        self.mutate(lb, |record| {
            for item in items {
                record.access_list.push(NetworkItem {
                    id: Some(NetworkItemId::from(self.next_item())),
                    ..item.clone()
                });
            }
            Ok(())
        })
    }

    async fn remove_access_list_item(&self, lb: &LoadBalancerId, item: &NetworkItemId) -> Result<()> {
        self.mutate(lb, |record| {
            let before = record.access_list.len();
            record.access_list.retain(|i| i.id.as_ref() != Some(item));
            if record.access_list.len() == before {
                return Err(Error::not_found(format!("access list item {item}")));
            }
            Ok(())
        })
    }

    async fn clear_access_list(&self, lb: &LoadBalancerId) -> Result<()> {
        self.mutate(lb, |record| {
            record.access_list.clear();
            Ok(())
        })
    }

    async fn get_health_monitor(&self, lb: &LoadBalancerId) -> Result<Option<HealthMonitor>> {
        self.with_record(lb, |record| Ok(record.health_monitor.clone()))
    }

    async fn set_health_monitor(&self, lb: &LoadBalancerId, monitor: &HealthMonitor) -> Result<()> {
        monitor.validate()?;
        self.mutate(lb, |record| {
            record.health_monitor = Some(monitor.clone());
            Ok(())
        })
    }

    async fn remove_health_monitor(&self, lb: &LoadBalancerId) -> Result<()> {
        self.mutate(lb, |record| {
            record.health_monitor = None;
            Ok(())
        })
    }

    async fn get_session_persistence(&self, lb: &LoadBalancerId) -> Result<Option<SessionPersistence>> {
        self.with_record(lb, |record| Ok(record.session_persistence))
    }

    async fn set_session_persistence(
        &self,
        lb: &LoadBalancerId,
        persistence: &SessionPersistence,
    ) -> Result<()> {
        self.mutate(lb, |record| {
            record.session_persistence = Some(*persistence);
            Ok(())
        })
    }

    async fn remove_session_persistence(&self, lb: &LoadBalancerId) -> Result<()> {
        self.mutate(lb, |record| {
            record.session_persistence = None;
            Ok(())
        })
    }

    async fn get_connection_logging(&self, lb: &LoadBalancerId) -> Result<bool> {
        self.with_record(lb, |record| {
            Ok(record.lb.connection_logging.is_some_and(|t| t.enabled))
        })
    }

    async fn set_connection_logging(&self, lb: &LoadBalancerId, enabled: bool) -> Result<()> {
        self.mutate(lb, |record| {
            record.lb.connection_logging = Some(Toggle { enabled });
            Ok(())
        })
    }

    async fn get_connection_throttles(&self, lb: &LoadBalancerId) -> Result<Option<ConnectionThrottles>> {
        self.with_record(lb, |record| Ok(record.throttles))
    }

    async fn set_connection_throttles(
        &self,
        lb: &LoadBalancerId,
        throttles: &ConnectionThrottles,
    ) -> Result<()> {
        if *throttles == ConnectionThrottles::default() {
            return Err(Error::invalid_argument("at least one throttle must be set"));
        }
        self.mutate(lb, |record| {
            record.throttles = Some(*throttles);
            Ok(())
        })
    }

    async fn remove_connection_throttles(&self, lb: &LoadBalancerId) -> Result<()> {
        self.mutate(lb, |record| {
            record.throttles = None;
            Ok(())
        })
    }

    async fn get_content_caching(&self, lb: &LoadBalancerId) -> Result<bool> {
        self.with_record(lb, |record| {
            Ok(record.lb.content_caching.is_some_and(|t| t.enabled))
        })
    }

    async fn set_content_caching(&self, lb: &LoadBalancerId, enabled: bool) -> Result<()> {
        self.mutate(lb, |record| {
            record.lb.content_caching = Some(Toggle { enabled });
            Ok(())
        })
    }

    async fn get_error_page(&self, lb: &LoadBalancerId) -> Result<Option<String>> {
        self.with_record(lb, |record| Ok(record.error_page.clone()))
    }

    async fn set_error_page(&self, lb: &LoadBalancerId, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::invalid_argument("error page content cannot be empty"));
        }
        self.mutate(lb, |record| {
            record.error_page = Some(content.to_string());
            Ok(())
        })
    }

    async fn remove_error_page(&self, lb: &LoadBalancerId) -> Result<()> {
        self.mutate(lb, |record| {
            record.error_page = None;
            Ok(())
        })
    }

    async fn list_metadata(&self, lb: &LoadBalancerId) -> Result<Vec<MetadataItem>> {
        self.with_record(lb, |record| Ok(record.metadata.clone()))
    }

    async fn add_metadata(&self, lb: &LoadBalancerId, items: &[MetadataItem]) -> Result<Vec<MetadataItem>> {
        items.iter().try_for_each(validate_metadata)?;
        self.with_record(lb, |record| {
            if let Some(item) = items
                .iter()
                .find(|item| record.metadata.iter().any(|m| m.key == item.key))
            {
                return Err(Error::invalid_argument(format!(
                    "metadata key '{}' already exists",
                    item.key
                )));
            }
            let created: Vec<MetadataItem> = items
                .iter()
                .map(|item| MetadataItem {
                    id: Some(MetadataId::from(self.next_item())),
                    ..item.clone()
                })
                .collect();
            record.metadata.extend(created.iter().cloned());
            Ok(created)
        })
    }

    async fn remove_metadata(&self, lb: &LoadBalancerId, ids: &[MetadataId]) -> Result<()> {
        self.with_record(lb, |record| {
            if let Some(missing) = ids
                .iter()
                .find(|id| !record.metadata.iter().any(|m| m.id.as_ref() == Some(*id)))
            {
                return Err(Error::not_found(format!("metadata item {missing}")));
            }
            record
                .metadata
                .retain(|m| m.id.as_ref().is_none_or(|id| !ids.contains(id)));
            Ok(())
        })
    }

    async fn list_protocols(&self) -> Result<Vec<LoadBalancingProtocol>> {
        Ok(PROTOCOLS
            .iter()
            .map(|(name, port)| LoadBalancingProtocol {
                name: (*name).to_string(),
                port: *port,
            })
            .collect())
    }

    async fn list_algorithms(&self) -> Result<Vec<LoadBalancingAlgorithm>> {
        Ok(ALGORITHMS
            .iter()
            .map(|name| LoadBalancingAlgorithm {
                name: (*name).to_string(),
            })
            .collect())
    }

    fn provider_name(&self) -> &str {
        "in_memory"
    }
}
