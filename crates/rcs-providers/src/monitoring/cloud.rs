//! Cloud Monitoring v1.0 provider
//!
//! Listings come back as `{"values": [...], "metadata": {"next_marker": ...}}`
//! and the marker is forwarded verbatim. Creation answers `201 Created` with
//! the new resource in `Location`; only its ID is returned.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use rcs_domain::constants::SERVICE_TYPE_MONITORING;
use rcs_domain::error::{Error, Result};
use rcs_domain::pagination::{Page, PageRequest};
use rcs_domain::ports::{MonitoringService, SharedIdentityProvider};
use rcs_domain::value_objects::{
    Alarm, AlarmConfiguration, AlarmId, Check, CheckConfiguration, CheckData, CheckId, CheckType,
    CheckTypeId, Entity, EntityConfiguration, EntityId, MonitoringZone, MonitoringZoneId,
    Notification, NotificationConfiguration, NotificationId, NotificationPlan,
    NotificationPlanConfiguration, NotificationPlanId, NotificationType,
};

use crate::http::{HttpClientConfig, RestClient, RestRequest};

#[derive(Deserialize)]
struct ListingMetadata {
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Deserialize)]
struct Listing<T> {
    values: Vec<T>,
    metadata: Option<ListingMetadata>,
}

/// Cloud Monitoring provider
#[derive(Debug, Clone)]
pub struct CloudMonitoringProvider {
    client: RestClient,
}

impl CloudMonitoringProvider {
    /// Create a provider over an existing REST client
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Resolve the monitoring endpoint and create a provider
    pub async fn connect(
        identity: SharedIdentityProvider,
        region: Option<&str>,
        config: &HttpClientConfig,
    ) -> Result<Self> {
        let client = RestClient::from_catalog(
            "monitoring",
            SERVICE_TYPE_MONITORING,
            region,
            false,
            identity,
            config,
        )
        .await?;
        Ok(Self::new(client))
    }

    async fn list<T: DeserializeOwned>(&self, request: RestRequest, page: &PageRequest) -> Result<Page<T>> {
        let listing: Listing<T> = self.client.send_json(request.page(page)).await?;
        let marker = listing.metadata.and_then(|m| m.next_marker);
        Ok(Page::new(listing.values, marker))
    }

    async fn create(&self, request: RestRequest, kind: &str) -> Result<String> {
        let response = self.client.send(request).await?;
        let id = response
            .created_id()
            .ok_or_else(|| Error::internal(format!("{kind} creation returned no location")))?;
        tracing::info!(kind, id = %id, "monitoring resource created");
        Ok(id)
    }

    fn entity(method: reqwest::Method, id: &EntityId) -> RestRequest {
        RestRequest::new(method, ["entities", id.as_str()])
    }
}

#[async_trait]
impl MonitoringService for CloudMonitoringProvider {
    async fn list_entities(&self, page: PageRequest) -> Result<Page<Entity>> {
        self.list(RestRequest::get(["entities"]), &page).await
    }

    async fn create_entity(&self, config: &EntityConfiguration) -> Result<EntityId> {
        let request = RestRequest::post(["entities"]).json(config)?;
        self.create(request, "entity").await.map(EntityId::from)
    }

    async fn get_entity(&self, id: &EntityId) -> Result<Entity> {
        self.client
            .send_json(Self::entity(reqwest::Method::GET, id))
            .await
    }

    async fn update_entity(&self, id: &EntityId, config: &EntityConfiguration) -> Result<()> {
        self.client
            .send_empty(Self::entity(reqwest::Method::PUT, id).json(config)?)
            .await
    }

    async fn delete_entity(&self, id: &EntityId) -> Result<()> {
        self.client
            .send_empty(Self::entity(reqwest::Method::DELETE, id))
            .await
    }

    async fn list_checks(&self, entity: &EntityId, page: PageRequest) -> Result<Page<Check>> {
        self.list(Self::entity(reqwest::Method::GET, entity).path("checks"), &page)
            .await
    }

    async fn create_check(&self, entity: &EntityId, config: &CheckConfiguration) -> Result<CheckId> {
        config.validate()?;
        let request = Self::entity(reqwest::Method::POST, entity)
            .path("checks")
            .json(config)?;
        self.create(request, "check").await.map(CheckId::from)
    }

    async fn get_check(&self, entity: &EntityId, id: &CheckId) -> Result<Check> {
        let request = Self::entity(reqwest::Method::GET, entity)
            .path("checks")
            .path(id.as_str());
        self.client.send_json(request).await
    }

    async fn update_check(
        &self,
        entity: &EntityId,
        id: &CheckId,
        config: &CheckConfiguration,
    ) -> Result<()> {
        config.validate()?;
        let request = Self::entity(reqwest::Method::PUT, entity)
            .path("checks")
            .path(id.as_str())
            .json(config)?;
        self.client.send_empty(request).await
    }

    async fn delete_check(&self, entity: &EntityId, id: &CheckId) -> Result<()> {
        let request = Self::entity(reqwest::Method::DELETE, entity)
            .path("checks")
            .path(id.as_str());
        self.client.send_empty(request).await
    }

    async fn test_check(&self, entity: &EntityId, config: &CheckConfiguration) -> Result<Vec<CheckData>> {
        config.validate()?;
        let request = Self::entity(reqwest::Method::POST, entity)
            .path("test-check")
            .json(config)?;
        self.client.send_json(request).await
    }

    async fn list_alarms(&self, entity: &EntityId, page: PageRequest) -> Result<Page<Alarm>> {
        self.list(Self::entity(reqwest::Method::GET, entity).path("alarms"), &page)
            .await
    }

    async fn create_alarm(&self, entity: &EntityId, config: &AlarmConfiguration) -> Result<AlarmId> {
        let request = Self::entity(reqwest::Method::POST, entity)
            .path("alarms")
            .json(config)?;
        self.create(request, "alarm").await.map(AlarmId::from)
    }

    async fn get_alarm(&self, entity: &EntityId, id: &AlarmId) -> Result<Alarm> {
        let request = Self::entity(reqwest::Method::GET, entity)
            .path("alarms")
            .path(id.as_str());
        self.client.send_json(request).await
    }

    async fn update_alarm(
        &self,
        entity: &EntityId,
        id: &AlarmId,
        config: &AlarmConfiguration,
    ) -> Result<()> {
        let request = Self::entity(reqwest::Method::PUT, entity)
            .path("alarms")
            .path(id.as_str())
            .json(config)?;
        self.client.send_empty(request).await
    }

    async fn delete_alarm(&self, entity: &EntityId, id: &AlarmId) -> Result<()> {
        let request = Self::entity(reqwest::Method::DELETE, entity)
            .path("alarms")
            .path(id.as_str());
        self.client.send_empty(request).await
    }

    async fn list_notifications(&self, page: PageRequest) -> Result<Page<Notification>> {
        self.list(RestRequest::get(["notifications"]), &page).await
    }

    async fn create_notification(&self, config: &NotificationConfiguration) -> Result<NotificationId> {
        let request = RestRequest::post(["notifications"]).json(config)?;
        self.create(request, "notification")
            .await
            .map(NotificationId::from)
    }

    async fn get_notification(&self, id: &NotificationId) -> Result<Notification> {
        self.client
            .send_json(RestRequest::get(["notifications", id.as_str()]))
            .await
    }

    async fn update_notification(&self, id: &NotificationId, config: &NotificationConfiguration) -> Result<()> {
        let request = RestRequest::put(["notifications", id.as_str()]).json(config)?;
        self.client.send_empty(request).await
    }

    async fn delete_notification(&self, id: &NotificationId) -> Result<()> {
        self.client
            .send_empty(RestRequest::delete(["notifications", id.as_str()]))
            .await
    }

    async fn list_notification_plans(&self, page: PageRequest) -> Result<Page<NotificationPlan>> {
        self.list(RestRequest::get(["notification_plans"]), &page)
            .await
    }

    async fn create_notification_plan(
        &self,
        config: &NotificationPlanConfiguration,
    ) -> Result<NotificationPlanId> {
        let request = RestRequest::post(["notification_plans"]).json(config)?;
        self.create(request, "notification plan")
            .await
            .map(NotificationPlanId::from)
    }

    async fn get_notification_plan(&self, id: &NotificationPlanId) -> Result<NotificationPlan> {
        self.client
            .send_json(RestRequest::get(["notification_plans", id.as_str()]))
            .await
    }

    async fn update_notification_plan(
        &self,
        id: &NotificationPlanId,
        config: &NotificationPlanConfiguration,
    ) -> Result<()> {
        let request = RestRequest::put(["notification_plans", id.as_str()]).json(config)?;
        self.client.send_empty(request).await
    }

    async fn delete_notification_plan(&self, id: &NotificationPlanId) -> Result<()> {
        self.client
            .send_empty(RestRequest::delete(["notification_plans", id.as_str()]))
            .await
    }

    async fn list_monitoring_zones(&self, page: PageRequest) -> Result<Page<MonitoringZone>> {
        self.list(RestRequest::get(["monitoring_zones"]), &page)
            .await
    }

    async fn get_monitoring_zone(&self, id: &MonitoringZoneId) -> Result<MonitoringZone> {
        self.client
            .send_json(RestRequest::get(["monitoring_zones", id.as_str()]))
            .await
    }

    async fn list_check_types(&self, page: PageRequest) -> Result<Page<CheckType>> {
        self.list(RestRequest::get(["check_types"]), &page).await
    }

    async fn get_check_type(&self, id: &CheckTypeId) -> Result<CheckType> {
        self.client
            .send_json(RestRequest::get(["check_types", id.as_str()]))
            .await
    }

    async fn list_notification_types(&self, page: PageRequest) -> Result<Page<NotificationType>> {
        self.list(RestRequest::get(["notification_types"]), &page)
            .await
    }

    fn provider_name(&self) -> &str {
        "cloud"
    }
}
