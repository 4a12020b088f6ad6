use crate::constants::DEFAULT_PAGE_SIZE;
use crate::error::Result;
use crate::pagination::{Page, PageRequest, collect_all};
use crate::value_objects::{
    ConnectionThrottles, HealthMonitor, LoadBalancer, LoadBalancerConfiguration, LoadBalancerId,
    LoadBalancerUpdate, LoadBalancerVirtualAddress, LoadBalancingAlgorithm, LoadBalancingProtocol,
    MetadataId, MetadataItem, NetworkItem, NetworkItemId, Node, NodeConfiguration, NodeId,
    NodeUpdate, SessionPersistence, VirtualIpConfiguration, VirtualIpId,
};
use async_trait::async_trait;

/// Cloud Load Balancers Service Interface
///
/// Every mutating call moves the balancer to `PENDING_UPDATE` for a while;
/// the service rejects further mutations with `Conflict` until it is
/// `ACTIVE` again. Callers wait in between with
/// `rcs_providers::wait_for_load_balancer_status`.
///
/// # Example
///
/// ```ignore
/// let lb = service.create_load_balancer(&config).await?;
/// let lb = wait_for_load_balancer_status(&*service, &lb.id, LoadBalancerStatus::Active, &poll).await?;
/// service.add_nodes(&lb.id, &[NodeConfiguration::new("10.0.0.1", 80)]).await?;
/// ```
#[async_trait]
pub trait LoadBalancerService: Send + Sync {
    // ========================================================================
    // LOAD BALANCERS
    // ========================================================================

    /// List one page of load balancers
    async fn list_load_balancers(&self, page: PageRequest) -> Result<Page<LoadBalancer>>;

    /// Create a load balancer (initially in `BUILD`)
    async fn create_load_balancer(&self, config: &LoadBalancerConfiguration)
    -> Result<LoadBalancer>;

    /// Get a load balancer with its nodes and settings
    async fn get_load_balancer(&self, id: &LoadBalancerId) -> Result<LoadBalancer>;

    /// Change name, protocol, port, algorithm, timeout or half-closed
    async fn update_load_balancer(
        &self,
        id: &LoadBalancerId,
        update: &LoadBalancerUpdate,
    ) -> Result<()>;

    /// Delete a load balancer
    async fn delete_load_balancer(&self, id: &LoadBalancerId) -> Result<()>;

    /// Delete several load balancers in one request
    async fn delete_load_balancers(&self, ids: &[LoadBalancerId]) -> Result<()>;

    // ========================================================================
    // NODES
    // ========================================================================

    /// List one page of nodes
    async fn list_nodes(&self, lb: &LoadBalancerId, page: PageRequest) -> Result<Page<Node>>;

    /// Add nodes, returning them with their assigned IDs
    async fn add_nodes(&self, lb: &LoadBalancerId, nodes: &[NodeConfiguration])
    -> Result<Vec<Node>>;

    /// Get a node
    async fn get_node(&self, lb: &LoadBalancerId, node: &NodeId) -> Result<Node>;

    /// Change a node's condition, type or weight
    async fn update_node(&self, lb: &LoadBalancerId, node: &NodeId, update: &NodeUpdate)
    -> Result<()>;

    /// Remove a node
    async fn remove_node(&self, lb: &LoadBalancerId, node: &NodeId) -> Result<()>;

    /// Remove several nodes in one request
    async fn remove_nodes(&self, lb: &LoadBalancerId, nodes: &[NodeId]) -> Result<()>;

    // ========================================================================
    // VIRTUAL ADDRESSES
    // ========================================================================

    /// List the virtual addresses of a load balancer
    async fn list_virtual_addresses(
        &self,
        lb: &LoadBalancerId,
    ) -> Result<Vec<LoadBalancerVirtualAddress>>;

    /// Add a virtual address
    async fn add_virtual_address(
        &self,
        lb: &LoadBalancerId,
        config: &VirtualIpConfiguration,
    ) -> Result<LoadBalancerVirtualAddress>;

    /// Remove a virtual address; the last one cannot be removed
    async fn remove_virtual_address(&self, lb: &LoadBalancerId, vip: &VirtualIpId) -> Result<()>;

    // ========================================================================
    // ACCESS LIST
    // ========================================================================

    /// Get the access list
    async fn get_access_list(&self, lb: &LoadBalancerId) -> Result<Vec<NetworkItem>>;

    /// Append rules to the access list
    async fn add_access_list(&self, lb: &LoadBalancerId, items: &[NetworkItem]) -> Result<()>;

    /// Remove one rule
    async fn remove_access_list_item(&self, lb: &LoadBalancerId, item: &NetworkItemId)
    -> Result<()>;

    /// Remove every rule
    async fn clear_access_list(&self, lb: &LoadBalancerId) -> Result<()>;

    // ========================================================================
    // FEATURE SETTINGS
    // ========================================================================

    /// Get the health monitor; `None` when none is configured
    async fn get_health_monitor(&self, lb: &LoadBalancerId) -> Result<Option<HealthMonitor>>;

    /// Set the health monitor
    async fn set_health_monitor(&self, lb: &LoadBalancerId, monitor: &HealthMonitor)
    -> Result<()>;

    /// Remove the health monitor
    async fn remove_health_monitor(&self, lb: &LoadBalancerId) -> Result<()>;

    /// Get session persistence; `None` when disabled
    async fn get_session_persistence(&self, lb: &LoadBalancerId)
    -> Result<Option<SessionPersistence>>;

    /// Enable session persistence
    async fn set_session_persistence(
        &self,
        lb: &LoadBalancerId,
        persistence: &SessionPersistence,
    ) -> Result<()>;

    /// Disable session persistence
    async fn remove_session_persistence(&self, lb: &LoadBalancerId) -> Result<()>;

    /// Whether connection logging is enabled
    async fn get_connection_logging(&self, lb: &LoadBalancerId) -> Result<bool>;

    /// Enable or disable connection logging
    async fn set_connection_logging(&self, lb: &LoadBalancerId, enabled: bool) -> Result<()>;

    /// Get connection throttles; `None` when not configured
    async fn get_connection_throttles(
        &self,
        lb: &LoadBalancerId,
    ) -> Result<Option<ConnectionThrottles>>;

    /// Set connection throttles
    async fn set_connection_throttles(
        &self,
        lb: &LoadBalancerId,
        throttles: &ConnectionThrottles,
    ) -> Result<()>;

    /// Remove connection throttles
    async fn remove_connection_throttles(&self, lb: &LoadBalancerId) -> Result<()>;

    /// Whether content caching is enabled
    async fn get_content_caching(&self, lb: &LoadBalancerId) -> Result<bool>;

    /// Enable or disable content caching
    async fn set_content_caching(&self, lb: &LoadBalancerId, enabled: bool) -> Result<()>;

    /// Get the custom error page; `None` when the default page is served
    async fn get_error_page(&self, lb: &LoadBalancerId) -> Result<Option<String>>;

    /// Set a custom error page (HTML)
    async fn set_error_page(&self, lb: &LoadBalancerId, content: &str) -> Result<()>;

    /// Restore the default error page
    async fn remove_error_page(&self, lb: &LoadBalancerId) -> Result<()>;

    // ========================================================================
    // METADATA
    // ========================================================================

    /// List the metadata of a load balancer
    async fn list_metadata(&self, lb: &LoadBalancerId) -> Result<Vec<MetadataItem>>;

    /// Add metadata entries, returning them with their assigned IDs
    async fn add_metadata(&self, lb: &LoadBalancerId, items: &[MetadataItem])
    -> Result<Vec<MetadataItem>>;

    /// Remove metadata entries
    async fn remove_metadata(&self, lb: &LoadBalancerId, ids: &[MetadataId]) -> Result<()>;

    // ========================================================================
    // CATALOGS
    // ========================================================================

    /// Protocols the service supports
    async fn list_protocols(&self) -> Result<Vec<LoadBalancingProtocol>>;

    /// Algorithms the service supports
    async fn list_algorithms(&self) -> Result<Vec<LoadBalancingAlgorithm>>;

    /// Name of this provider (e.g. "cloud", "in_memory")
    fn provider_name(&self) -> &str;

    /// Every load balancer, following markers until the last page
    async fn list_all_load_balancers(&self) -> Result<Vec<LoadBalancer>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_load_balancers(page)).await
    }

    /// Every node of a load balancer
    async fn list_all_nodes(&self, lb: &LoadBalancerId) -> Result<Vec<Node>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_nodes(lb, page)).await
    }
}
