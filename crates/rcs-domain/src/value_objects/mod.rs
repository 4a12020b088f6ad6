//! Domain Value Objects
//!
//! Resource models of the four services plus identity and identifiers.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ids`] | Strongly-typed resource identifiers |
//! | [`identity`] | Auth token and service catalog |
//! | [`autoscale`] | Scaling groups, policies, webhooks |
//! | [`load_balancer`] | Load balancers, nodes, virtual IPs and their settings |
//! | [`monitoring`] | Entities, checks, alarms, notifications |
//! | [`object_storage`] | Containers, objects, metadata, CDN, temp URLs |

/// Auto Scale models
pub mod autoscale;
/// Identity models
pub mod identity;
/// Resource identifiers
pub mod ids;
/// Cloud Load Balancers models
pub mod load_balancer;
/// Cloud Monitoring models
pub mod monitoring;
/// Object storage models
pub mod object_storage;

pub use autoscale::{
    ActiveServer, DiskConfig, GroupConfiguration, GroupState, LaunchConfiguration,
    LoadBalancerArgument, Link, Personality, Policy, PolicyAdjustment, PolicyArguments,
    PolicyConfiguration, PolicyType, ScalingGroup, ScalingGroupConfiguration, ServerArgument,
    ServerLaunchArguments, ServerNetwork, Webhook, WebhookConfiguration,
};
pub use identity::{AccessInfo, AuthToken, CatalogEntry, Endpoint, ServiceCatalog, Tenant};
pub use ids::{
    AlarmId, CheckId, CheckTypeId, EntityId, LoadBalancerId, MetadataId, MonitoringZoneId,
    NetworkItemId, NodeId, NotificationId, NotificationPlanId, NotificationTypeId, PolicyId,
    ScalingGroupId, VirtualIpId, WebhookId,
};
pub use load_balancer::{
    ConnectionThrottles, HealthMonitor, HttpMonitorSettings, IpVersion, LoadBalancer,
    LoadBalancerConfiguration, LoadBalancerStatus, LoadBalancerUpdate,
    LoadBalancerVirtualAddress, LoadBalancingAlgorithm, LoadBalancingProtocol, MetadataItem,
    MonitorTiming, NetworkItem, NetworkItemType, Node, NodeCondition, NodeConfiguration,
    NodeType, NodeUpdate, SessionPersistence, SessionPersistenceType, Timestamp, Toggle,
    VirtualIpConfiguration, VirtualIpType,
};
pub use monitoring::{
    Alarm, AlarmConfiguration, Check, CheckConfiguration, CheckData, CheckMetric, CheckType,
    CheckTypeField, Entity, EntityConfiguration, MonitoringZone, Notification,
    NotificationConfiguration, NotificationPlan, NotificationPlanConfiguration,
    NotificationType,
};
pub use object_storage::{
    AccountHeaders, ArchiveFormat, BulkDeleteResult, BulkFailure, CdnContainer, Container,
    ContainerCreated, ContainerHeaders, ContainerObject, CreateObjectOptions,
    ExtractArchiveResult, Metadata, ObjectContent, ObjectHeaders, ObjectListOptions,
    TempUrlDigest, TempUrlMethod, TempUrlRequest, validate_container_name,
    validate_object_name,
};
