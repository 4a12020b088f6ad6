//! Cloud Load Balancers Value Objects
//!
//! | Type | Wire key |
//! |------|----------|
//! | [`LoadBalancer`] | `loadBalancer` |
//! | [`Node`] | `node` / `nodes` |
//! | [`LoadBalancerVirtualAddress`] | `virtualIps` |
//! | [`NetworkItem`] | `accessList` |
//! | [`HealthMonitor`] | `healthMonitor` |
//! | [`SessionPersistence`] | `sessionPersistence` |
//! | [`ConnectionThrottles`] | `connectionThrottle` |
//! | [`MetadataItem`] | `metadata` |

use crate::error::{Error, Result};
use crate::value_objects::ids::{LoadBalancerId, MetadataId, NetworkItemId, NodeId, VirtualIpId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// STATUS
// ============================================================================

/// Lifecycle status of a load balancer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadBalancerStatus {
    /// Ready for use and configuration changes
    Active,
    /// Being provisioned
    Build,
    /// Applying a configuration change
    PendingUpdate,
    /// Being removed
    PendingDelete,
    /// Suspended by the provider
    Suspended,
    /// Provisioning or update failed
    Error,
    /// Removed
    Deleted,
    /// Any status this client does not know yet
    #[serde(other)]
    Unknown,
}

impl LoadBalancerStatus {
    /// Whether configuration changes are accepted in this status
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether the balancer will never leave this status on its own
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error | Self::Deleted)
    }
}

impl fmt::Display for LoadBalancerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Build => "BUILD",
            Self::PendingUpdate => "PENDING_UPDATE",
            Self::PendingDelete => "PENDING_DELETE",
            Self::Suspended => "SUSPENDED",
            Self::Error => "ERROR",
            Self::Deleted => "DELETED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

// ============================================================================
// NODES
// ============================================================================

/// Whether a node receives traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeCondition {
    /// Receives new connections
    Enabled,
    /// Receives no traffic
    Disabled,
    /// Finishes existing connections only
    Draining,
}

/// Role of a node in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    /// Serves traffic normally
    Primary,
    /// Only serves when every primary node is down
    Secondary,
}

/// Value Object: Node Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfiguration {
    /// IP address of the back-end server
    pub address: String,
    /// Port of the back-end server
    pub port: u16,
    /// Traffic condition
    pub condition: NodeCondition,
    /// Node role
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    /// Weight for weighted algorithms (1-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl NodeConfiguration {
    /// Enabled node at `address:port`
    pub fn new<S: Into<String>>(address: S, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            condition: NodeCondition::Enabled,
            node_type: None,
            weight: None,
        }
    }
}

/// Entity: Load Balancer Node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier
    pub id: NodeId,
    /// IP address of the back-end server
    pub address: String,
    /// Port of the back-end server
    pub port: u16,
    /// Traffic condition
    pub condition: NodeCondition,
    /// Node role
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    /// Weight for weighted algorithms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    /// Health status reported by the service (`ONLINE`, `OFFLINE`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Value Object: Node Update (only set fields are sent)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUpdate {
    /// New condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<NodeCondition>,
    /// New role
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    /// New weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl NodeUpdate {
    /// Apply the set fields to `node`
    pub fn apply_to(&self, node: &mut Node) {
        if let Some(condition) = self.condition {
            node.condition = condition;
        }
        if self.node_type.is_some() {
            node.node_type = self.node_type;
        }
        if self.weight.is_some() {
            node.weight = self.weight;
        }
    }
}

// ============================================================================
// VIRTUAL ADDRESSES
// ============================================================================

/// Network a virtual IP is published on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VirtualIpType {
    /// Internet-facing
    Public,
    /// Internal network only
    Servicenet,
}

/// IP version of a virtual IP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IpVersion {
    /// IPv4
    Ipv4,
    /// IPv6
    Ipv6,
}

/// Virtual IP requested when creating a load balancer
///
/// Either a new address of some type, or an existing virtual IP shared
/// with another balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VirtualIpConfiguration {
    /// Allocate a new address
    New {
        /// Network to publish on
        #[serde(rename = "type")]
        ip_type: VirtualIpType,
        /// IP version
        #[serde(rename = "ipVersion", default, skip_serializing_if = "Option::is_none")]
        ip_version: Option<IpVersion>,
    },
    /// Share an existing virtual IP
    Shared {
        /// Virtual IP to share
        id: VirtualIpId,
    },
}

impl VirtualIpConfiguration {
    /// New public IPv4 address
    pub fn public() -> Self {
        Self::New {
            ip_type: VirtualIpType::Public,
            ip_version: Some(IpVersion::Ipv4),
        }
    }
}

/// Entity: Virtual Address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerVirtualAddress {
    /// Virtual IP identifier
    pub id: VirtualIpId,
    /// Assigned address
    pub address: String,
    /// Network type
    #[serde(rename = "type")]
    pub ip_type: VirtualIpType,
    /// IP version
    pub ip_version: IpVersion,
}

// ============================================================================
// ACCESS LIST
// ============================================================================

/// Access list rule action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NetworkItemType {
    /// Always let traffic through
    Allow,
    /// Reject traffic
    Deny,
}

/// Value Object: Access List Rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkItem {
    /// Assigned by the service; absent when adding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NetworkItemId>,
    /// Address or CIDR range
    pub address: String,
    /// Rule action
    #[serde(rename = "type")]
    pub item_type: NetworkItemType,
}

impl NetworkItem {
    /// Rule to add to an access list
    pub fn new<S: Into<String>>(address: S, item_type: NetworkItemType) -> Self {
        Self {
            id: None,
            address: address.into(),
            item_type,
        }
    }
}

// ============================================================================
// HEALTH MONITOR
// ============================================================================

/// Settings shared by every health monitor type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorTiming {
    /// Seconds between health checks
    pub delay: u32,
    /// Seconds to wait for a health check response
    pub timeout: u32,
    /// Failed health checks before a node is taken out
    pub attempts_before_deactivation: u32,
}

/// Settings of HTTP and HTTPS health monitors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpMonitorSettings {
    /// Health check timing
    #[serde(flatten)]
    pub timing: MonitorTiming,
    /// Path requested by the health check
    pub path: String,
    /// Regex the response status must match
    pub status_regex: String,
    /// Regex the response body must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_regex: Option<String>,
    /// Host header sent by the health check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_header: Option<String>,
}

/// Value Object: Health Monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum HealthMonitor {
    /// TCP connect check
    Connect(MonitorTiming),
    /// HTTP request check
    Http(HttpMonitorSettings),
    /// HTTPS request check
    Https(HttpMonitorSettings),
}

impl HealthMonitor {
    /// Check the monitor settings before sending them
    pub fn validate(&self) -> Result<()> {
        let timing = match self {
            Self::Connect(timing) => timing,
            Self::Http(http) | Self::Https(http) => {
                if !http.path.starts_with('/') {
                    return Err(Error::invalid_argument(
                        "health monitor path must start with '/'",
                    ));
                }
                &http.timing
            }
        };
        if !(1..=3600).contains(&timing.delay) || !(1..=300).contains(&timing.timeout) {
            return Err(Error::invalid_argument(
                "health monitor delay must be 1-3600s and timeout 1-300s",
            ));
        }
        if !(1..=10).contains(&timing.attempts_before_deactivation) {
            return Err(Error::invalid_argument(
                "attemptsBeforeDeactivation must be between 1 and 10",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// OTHER SETTINGS
// ============================================================================

/// Session stickiness mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPersistenceType {
    /// Sticky by inserted HTTP cookie
    HttpCookie,
    /// Sticky by client address
    SourceIp,
}

/// Value Object: Session Persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPersistence {
    /// Persistence mode
    pub persistence_type: SessionPersistenceType,
}

/// Value Object: Connection Throttles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionThrottles {
    /// Connections allowed per address before throttling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    /// Connections per address per rate interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connection_rate: Option<u32>,
    /// Rate interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_interval: Option<u32>,
    /// Connections per address before throttling starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,
}

/// Key/value metadata entry of a load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    /// Assigned by the service; absent when adding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MetadataId>,
    /// Key
    pub key: String,
    /// Value
    pub value: String,
}

impl MetadataItem {
    /// Entry to add
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Self {
            id: None,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Switch wrapper used by `connectionLogging` and `contentCaching`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Toggle {
    /// Whether the feature is on
    pub enabled: bool,
}

/// Protocol a load balancer can serve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancingProtocol {
    /// Protocol name (`HTTP`, `HTTPS`, `TCP`, ...)
    pub name: String,
    /// Default port
    pub port: u16,
}

/// Algorithm a load balancer can distribute with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancingAlgorithm {
    /// Algorithm name (`ROUND_ROBIN`, `LEAST_CONNECTIONS`, ...)
    pub name: String,
}

/// Created/updated timestamps as the service wraps them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    /// Instant
    pub time: DateTime<Utc>,
}

// ============================================================================
// LOAD BALANCER
// ============================================================================

/// Entity: Load Balancer
///
/// Listings return the summary fields only; `nodes` and the feature blocks
/// are filled in by a single-balancer read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    /// Load balancer identifier
    pub id: LoadBalancerId,
    /// Name
    pub name: String,
    /// Protocol served
    pub protocol: String,
    /// Port served
    pub port: u16,
    /// Distribution algorithm
    pub algorithm: String,
    /// Lifecycle status
    pub status: LoadBalancerStatus,
    /// Idle timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Whether half-closed TCP connections are supported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_closed: Option<bool>,
    /// Back-end nodes
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Published addresses
    #[serde(default)]
    pub virtual_ips: Vec<LoadBalancerVirtualAddress>,
    /// Connection logging switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_logging: Option<Toggle>,
    /// Content caching switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_caching: Option<Toggle>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
}

/// Value Object: Load Balancer Creation Request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerConfiguration {
    /// Name
    pub name: String,
    /// Protocol served
    pub protocol: String,
    /// Port served; defaults to the protocol's port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Distribution algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Idle timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Half-closed TCP support
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_closed: Option<bool>,
    /// Addresses to publish
    pub virtual_ips: Vec<VirtualIpConfiguration>,
    /// Initial nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeConfiguration>,
    /// Initial access list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access_list: Vec<NetworkItem>,
    /// Initial metadata
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataItem>,
}

impl LoadBalancerConfiguration {
    /// Public IPv4 balancer without nodes
    pub fn new<N: Into<String>, P: Into<String>>(name: N, protocol: P, port: u16) -> Self {
        Self {
            name: name.into(),
            protocol: protocol.into(),
            port: Some(port),
            algorithm: None,
            timeout: None,
            half_closed: None,
            virtual_ips: vec![VirtualIpConfiguration::public()],
            nodes: Vec::new(),
            access_list: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Check the request before sending it
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.name.len() > 128 {
            return Err(Error::invalid_argument(
                "load balancer name must be 1-128 characters",
            ));
        }
        if self.virtual_ips.is_empty() {
            return Err(Error::invalid_argument(
                "a load balancer needs at least one virtual IP",
            ));
        }
        if self.timeout.is_some_and(|t| !(1..=120).contains(&t)) {
            return Err(Error::invalid_argument("timeout must be 1-120 seconds"));
        }
        Ok(())
    }
}

/// Value Object: Load Balancer Update (only set fields are sent)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerUpdate {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New protocol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// New port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// New algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// New idle timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// New half-closed setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_closed: Option<bool>,
}

impl LoadBalancerUpdate {
    /// Whether nothing would change
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the set fields to `lb`
    pub fn apply_to(&self, lb: &mut LoadBalancer) {
        if let Some(name) = &self.name {
            lb.name.clone_from(name);
        }
        if let Some(protocol) = &self.protocol {
            lb.protocol.clone_from(protocol);
        }
        if let Some(port) = self.port {
            lb.port = port;
        }
        if let Some(algorithm) = &self.algorithm {
            lb.algorithm.clone_from(algorithm);
        }
        if self.timeout.is_some() {
            lb.timeout = self.timeout;
        }
        if self.half_closed.is_some() {
            lb.half_closed = self.half_closed;
        }
    }
}
