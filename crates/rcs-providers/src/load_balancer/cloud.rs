//! Cloud Load Balancers v1.0 provider
//!
//! Every sub-resource lives under `loadbalancers/{id}/...`. Optional feature
//! blocks (health monitor, session persistence, throttles) come back as an
//! empty object when unset and are reported as `None`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use rcs_domain::constants::SERVICE_TYPE_LOAD_BALANCER;
use rcs_domain::error::Result;
use rcs_domain::pagination::{Page, PageRequest};
use rcs_domain::ports::{LoadBalancerService, SharedIdentityProvider};
use rcs_domain::value_objects::{
    ConnectionThrottles, HealthMonitor, LoadBalancer, LoadBalancerConfiguration, LoadBalancerId,
    LoadBalancerUpdate, LoadBalancerVirtualAddress, LoadBalancingAlgorithm,
    LoadBalancingProtocol, MetadataId, MetadataItem, NetworkItem, NetworkItemId, Node,
    NodeConfiguration, NodeId, NodeUpdate, SessionPersistence, Toggle, VirtualIpConfiguration,
    VirtualIpId,
};

use crate::constants::LB_BULK_DELETE_MAX_IDS;
use crate::http::{HttpClientConfig, RestClient, RestRequest};

/// Decode an optional feature block, treating `{}` as unset
fn optional_block<T: DeserializeOwned>(value: Value) -> Result<Option<T>> {
    match &value {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        _ => Ok(Some(serde_json::from_value(value)?)),
    }
}

/// Cloud Load Balancers provider
#[derive(Debug, Clone)]
pub struct CloudLoadBalancerProvider {
    client: RestClient,
}

impl CloudLoadBalancerProvider {
    /// Create a provider over an existing REST client
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Resolve the load balancer endpoint and create a provider
    pub async fn connect(
        identity: SharedIdentityProvider,
        region: Option<&str>,
        config: &HttpClientConfig,
    ) -> Result<Self> {
        let client = RestClient::from_catalog(
            "load_balancer",
            SERVICE_TYPE_LOAD_BALANCER,
            region,
            false,
            identity,
            config,
        )
        .await?;
        Ok(Self::new(client))
    }

    fn lb(method: reqwest::Method, id: &LoadBalancerId) -> RestRequest {
        RestRequest::new(method, ["loadbalancers".to_string(), id.to_string()])
    }

    fn get(id: &LoadBalancerId, sub: &str) -> RestRequest {
        Self::lb(reqwest::Method::GET, id).path(sub)
    }

    fn put(id: &LoadBalancerId, sub: &str) -> RestRequest {
        Self::lb(reqwest::Method::PUT, id).path(sub)
    }

    fn delete(id: &LoadBalancerId, sub: &str) -> RestRequest {
        Self::lb(reqwest::Method::DELETE, id).path(sub)
    }

    /// Delete `ids` in batches with repeated `id` query parameters
    async fn delete_batched<I: ToString>(&self, base: &RestRequest, ids: &[I]) -> Result<()> {
        for chunk in ids.chunks(LB_BULK_DELETE_MAX_IDS) {
            let request = chunk
                .iter()
                .fold(base.clone(), |request, id| request.query("id", id.to_string()));
            self.client.send_empty(request).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl LoadBalancerService for CloudLoadBalancerProvider {
    async fn list_load_balancers(&self, page: PageRequest) -> Result<Page<LoadBalancer>> {
        let items: Vec<LoadBalancer> = self
            .client
            .send_field(RestRequest::get(["loadbalancers"]).page(&page), "loadBalancers")
            .await?;
        Ok(Page::from_full_page(items, page.limit, |lb| lb.id.to_string()))
    }

    async fn create_load_balancer(&self, config: &LoadBalancerConfiguration) -> Result<LoadBalancer> {
        config.validate()?;
        let request =
            RestRequest::post(["loadbalancers"]).json(&json!({ "loadBalancer": config }))?;
        let lb: LoadBalancer = self.client.send_field(request, "loadBalancer").await?;
        tracing::info!(load_balancer = %lb.id, name = %lb.name, status = %lb.status, "load balancer created");
        Ok(lb)
    }

    async fn get_load_balancer(&self, id: &LoadBalancerId) -> Result<LoadBalancer> {
        self.client
            .send_field(Self::lb(reqwest::Method::GET, id), "loadBalancer")
            .await
    }

    async fn update_load_balancer(
        &self,
        id: &LoadBalancerId,
        update: &LoadBalancerUpdate,
    ) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        let request =
            Self::lb(reqwest::Method::PUT, id).json(&json!({ "loadBalancer": update }))?;
        self.client.send_empty(request).await
    }

    async fn delete_load_balancer(&self, id: &LoadBalancerId) -> Result<()> {
        self.client
            .send_empty(Self::lb(reqwest::Method::DELETE, id))
            .await?;
        tracing::info!(load_balancer = %id, "load balancer deletion requested");
        Ok(())
    }

    async fn delete_load_balancers(&self, ids: &[LoadBalancerId]) -> Result<()> {
        self.delete_batched(&RestRequest::delete(["loadbalancers"]), ids)
            .await
    }

    async fn list_nodes(&self, lb: &LoadBalancerId, page: PageRequest) -> Result<Page<Node>> {
        let items: Vec<Node> = self
            .client
            .send_field(Self::get(lb, "nodes").page(&page), "nodes")
            .await?;
        Ok(Page::from_full_page(items, page.limit, |n| n.id.to_string()))
    }

    async fn add_nodes(&self, lb: &LoadBalancerId, nodes: &[NodeConfiguration]) -> Result<Vec<Node>> {
        let request = Self::lb(reqwest::Method::POST, lb)
            .path("nodes")
            .json(&json!({ "nodes": nodes }))?;
        self.client.send_field(request, "nodes").await
    }

    async fn get_node(&self, lb: &LoadBalancerId, node: &NodeId) -> Result<Node> {
        self.client
            .send_field(Self::get(lb, "nodes").path(node.as_str()), "node")
            .await
    }

    async fn update_node(&self, lb: &LoadBalancerId, node: &NodeId, update: &NodeUpdate) -> Result<()> {
        let request = Self::put(lb, "nodes")
            .path(node.as_str())
            .json(&json!({ "node": update }))?;
        self.client.send_empty(request).await
    }

    async fn remove_node(&self, lb: &LoadBalancerId, node: &NodeId) -> Result<()> {
        self.client
            .send_empty(Self::delete(lb, "nodes").path(node.as_str()))
            .await
    }

    async fn remove_nodes(&self, lb: &LoadBalancerId, nodes: &[NodeId]) -> Result<()> {
        self.delete_batched(&Self::delete(lb, "nodes"), nodes).await
    }

    async fn list_virtual_addresses(
        &self,
        lb: &LoadBalancerId,
    ) -> Result<Vec<LoadBalancerVirtualAddress>> {
        self.client
            .send_field(Self::get(lb, "virtualips"), "virtualIps")
            .await
    }

    async fn add_virtual_address(
        &self,
        lb: &LoadBalancerId,
        vip: &VirtualIpConfiguration,
    ) -> Result<LoadBalancerVirtualAddress> {
        let request = Self::lb(reqwest::Method::POST, lb)
            .path("virtualips")
            .json(vip)?;
        self.client.send_json(request).await
    }

    async fn remove_virtual_address(&self, lb: &LoadBalancerId, vip: &VirtualIpId) -> Result<()> {
        self.client
            .send_empty(Self::delete(lb, "virtualips").path(vip.as_str()))
            .await
    }

    async fn get_access_list(&self, lb: &LoadBalancerId) -> Result<Vec<NetworkItem>> {
        self.client
            .send_field(Self::get(lb, "accesslist"), "accessList")
            .await
    }

    async fn add_access_list(&self, lb: &LoadBalancerId, items: &[NetworkItem]) -> Result<()> {
        let request = Self::lb(reqwest::Method::POST, lb)
            .path("accesslist")
            .json(&json!({ "accessList": items }))?;
        self.client.send_empty(request).await
    }

    async fn remove_access_list_item(&self, lb: &LoadBalancerId, item: &NetworkItemId) -> Result<()> {
        self.client
            .send_empty(Self::delete(lb, "accesslist").path(item.as_str()))
            .await
    }

    async fn clear_access_list(&self, lb: &LoadBalancerId) -> Result<()> {
        self.client.send_empty(Self::delete(lb, "accesslist")).await
    }

    async fn get_health_monitor(&self, lb: &LoadBalancerId) -> Result<Option<HealthMonitor>> {
        let block = self
            .client
            .send_field(Self::get(lb, "healthmonitor"), "healthMonitor")
            .await?;
        optional_block(block)
    }

    async fn set_health_monitor(&self, lb: &LoadBalancerId, monitor: &HealthMonitor) -> Result<()> {
        monitor.validate()?;
        let request = Self::put(lb, "healthmonitor").json(&json!({ "healthMonitor": monitor }))?;
        self.client.send_empty(request).await
    }

    async fn remove_health_monitor(&self, lb: &LoadBalancerId) -> Result<()> {
        self.client.send_empty(Self::delete(lb, "healthmonitor")).await
    }

    async fn get_session_persistence(&self, lb: &LoadBalancerId) -> Result<Option<SessionPersistence>> {
        let block = self
            .client
            .send_field(Self::get(lb, "sessionpersistence"), "sessionPersistence")
            .await?;
        optional_block(block)
    }

    async fn set_session_persistence(
        &self,
        lb: &LoadBalancerId,
        persistence: &SessionPersistence,
    ) -> Result<()> {
        let request = Self::put(lb, "sessionpersistence")
            .json(&json!({ "sessionPersistence": persistence }))?;
        self.client.send_empty(request).await
    }

    async fn remove_session_persistence(&self, lb: &LoadBalancerId) -> Result<()> {
        self.client
            .send_empty(Self::delete(lb, "sessionpersistence"))
            .await
    }

    async fn get_connection_logging(&self, lb: &LoadBalancerId) -> Result<bool> {
        let toggle: Toggle = self
            .client
            .send_field(Self::get(lb, "connectionlogging"), "connectionLogging")
            .await?;
        Ok(toggle.enabled)
    }

    async fn set_connection_logging(&self, lb: &LoadBalancerId, enabled: bool) -> Result<()> {
        let request = Self::put(lb, "connectionlogging")
            .json(&json!({ "connectionLogging": Toggle { enabled } }))?;
        self.client.send_empty(request).await
    }

    async fn get_connection_throttles(
        &self,
        lb: &LoadBalancerId,
    ) -> Result<Option<ConnectionThrottles>> {
        let block = self
            .client
            .send_field(Self::get(lb, "connectionthrottle"), "connectionThrottle")
            .await?;
        Ok(optional_block::<ConnectionThrottles>(block)?
            .filter(|throttles| *throttles != ConnectionThrottles::default()))
    }

    async fn set_connection_throttles(
        &self,
        lb: &LoadBalancerId,
        throttles: &ConnectionThrottles,
    ) -> Result<()> {
        let request = Self::put(lb, "connectionthrottle")
            .json(&json!({ "connectionThrottle": throttles }))?;
        self.client.send_empty(request).await
    }

    async fn remove_connection_throttles(&self, lb: &LoadBalancerId) -> Result<()> {
        self.client
            .send_empty(Self::delete(lb, "connectionthrottle"))
            .await
    }

    async fn get_content_caching(&self, lb: &LoadBalancerId) -> Result<bool> {
        let toggle: Toggle = self
            .client
            .send_field(Self::get(lb, "contentcaching"), "contentCaching")
            .await?;
        Ok(toggle.enabled)
    }

    async fn set_content_caching(&self, lb: &LoadBalancerId, enabled: bool) -> Result<()> {
        let request = Self::put(lb, "contentcaching")
            .json(&json!({ "contentCaching": Toggle { enabled } }))?;
        self.client.send_empty(request).await
    }

    async fn get_error_page(&self, lb: &LoadBalancerId) -> Result<Option<String>> {
        let page: Value = self
            .client
            .send_field(Self::get(lb, "errorpage"), "errorpage")
            .await?;
        Ok(page
            .get("content")
            .and_then(Value::as_str)
            .filter(|content| !content.is_empty())
            .map(str::to_string))
    }

    async fn set_error_page(&self, lb: &LoadBalancerId, content: &str) -> Result<()> {
        let request =
            Self::put(lb, "errorpage").json(&json!({ "errorpage": { "content": content } }))?;
        self.client.send_empty(request).await
    }

    async fn remove_error_page(&self, lb: &LoadBalancerId) -> Result<()> {
        self.client.send_empty(Self::delete(lb, "errorpage")).await
    }

    async fn list_metadata(&self, lb: &LoadBalancerId) -> Result<Vec<MetadataItem>> {
        self.client
            .send_field(Self::get(lb, "metadata"), "metadata")
            .await
    }

    async fn add_metadata(&self, lb: &LoadBalancerId, items: &[MetadataItem]) -> Result<Vec<MetadataItem>> {
        let request = Self::lb(reqwest::Method::POST, lb)
            .path("metadata")
            .json(&json!({ "metadata": items }))?;
        self.client.send_field(request, "metadata").await
    }

    async fn remove_metadata(&self, lb: &LoadBalancerId, ids: &[MetadataId]) -> Result<()> {
        self.delete_batched(&Self::delete(lb, "metadata"), ids).await
    }

    async fn list_protocols(&self) -> Result<Vec<LoadBalancingProtocol>> {
        self.client
            .send_field(RestRequest::get(["loadbalancers", "protocols"]), "protocols")
            .await
    }

    async fn list_algorithms(&self) -> Result<Vec<LoadBalancingAlgorithm>> {
        self.client
            .send_field(RestRequest::get(["loadbalancers", "algorithms"]), "algorithms")
            .await
    }

    fn provider_name(&self) -> &str {
        "cloud"
    }
}
