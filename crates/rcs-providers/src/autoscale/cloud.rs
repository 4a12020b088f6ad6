//! Auto Scale v1.0 provider
//!
//! Implements the `AutoScaleService` port over the Auto Scale REST API.
//! Listings are paged through `*_links` entries whose `next` link carries the
//! marker for the following page.

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::json;

use rcs_domain::constants::SERVICE_TYPE_AUTOSCALE;
use rcs_domain::error::{Error, Result};
use rcs_domain::pagination::{Page, PageRequest};
use rcs_domain::ports::{AutoScaleService, SharedIdentityProvider};
use rcs_domain::value_objects::{
    GroupConfiguration, GroupState, LaunchConfiguration, Link, Policy, PolicyConfiguration,
    PolicyId, ScalingGroup, ScalingGroupConfiguration, ScalingGroupId, Webhook,
    WebhookConfiguration, WebhookId,
};

use crate::http::{HttpClientConfig, RestClient, RestRequest};

/// Marker of the `next` link, if any
fn next_marker(links: &[Link]) -> Option<String> {
    let next = links.iter().find(|l| l.rel == "next")?;
    let url = Url::parse(&next.href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "marker")
        .map(|(_, value)| value.into_owned())
}

struct Listing<T> {
    items: Vec<T>,
    links: Vec<Link>,
}

impl<T> Listing<T> {
    fn into_page(self) -> Page<T> {
        let marker = next_marker(&self.links);
        Page::new(self.items, marker)
    }
}

/// Auto Scale provider
///
/// # Example
///
/// ```ignore
/// let autoscale = CloudAutoScaleProvider::connect(identity, Some("DFW"), &HttpClientConfig::default()).await?;
/// let groups = autoscale.list_all_scaling_groups().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CloudAutoScaleProvider {
    client: RestClient,
}

impl CloudAutoScaleProvider {
    /// Create a provider over an existing REST client
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Resolve the Auto Scale endpoint and create a provider
    pub async fn connect(
        identity: SharedIdentityProvider,
        region: Option<&str>,
        config: &HttpClientConfig,
    ) -> Result<Self> {
        let client = RestClient::from_catalog(
            "autoscale",
            SERVICE_TYPE_AUTOSCALE,
            region,
            false,
            identity,
            config,
        )
        .await?;
        Ok(Self::new(client))
    }

    async fn list<T: DeserializeOwned>(
        &self,
        request: RestRequest,
        key: &str,
    ) -> Result<Page<T>> {
        let response = self.client.send(request).await?;
        let links_key = format!("{key}_links");
        let listing = Listing {
            items: response.json_field(key)?,
            links: response.json_field_opt(&links_key)?.unwrap_or_default(),
        };
        Ok(listing.into_page())
    }

    fn group(id: &ScalingGroupId) -> RestRequest {
        RestRequest::get(["groups", id.as_str()])
    }

    fn policy_path(group: &ScalingGroupId, policy: &PolicyId) -> [String; 4] {
        [
            "groups".to_string(),
            group.to_string(),
            "policies".to_string(),
            policy.to_string(),
        ]
    }
}

#[async_trait]
impl AutoScaleService for CloudAutoScaleProvider {
    async fn list_scaling_groups(&self, page: PageRequest) -> Result<Page<ScalingGroup>> {
        self.list(RestRequest::get(["groups"]).page(&page), "groups")
            .await
    }

    async fn create_group(&self, config: &ScalingGroupConfiguration) -> Result<ScalingGroup> {
        config.validate()?;
        let group: ScalingGroup = self
            .client
            .send_field(RestRequest::post(["groups"]).json(config)?, "group")
            .await?;
        tracing::info!(group = %group.id, name = %config.group_configuration.name, "scaling group created");
        Ok(group)
    }

    async fn get_group(&self, id: &ScalingGroupId) -> Result<ScalingGroup> {
        self.client.send_field(Self::group(id), "group").await
    }

    async fn delete_group(&self, id: &ScalingGroupId, force: bool) -> Result<()> {
        let mut request = RestRequest::delete(["groups", id.as_str()]);
        if force {
            request = request.query("force", "true");
        }
        self.client.send_empty(request).await?;
        tracing::info!(group = %id, force, "scaling group deleted");
        Ok(())
    }

    async fn get_group_state(&self, id: &ScalingGroupId) -> Result<GroupState> {
        self.client
            .send_field(RestRequest::get(["groups", id.as_str(), "state"]), "group")
            .await
    }

    async fn pause_group(&self, id: &ScalingGroupId) -> Result<()> {
        self.client
            .send_empty(RestRequest::post(["groups", id.as_str(), "pause"]))
            .await
    }

    async fn resume_group(&self, id: &ScalingGroupId) -> Result<()> {
        self.client
            .send_empty(RestRequest::post(["groups", id.as_str(), "resume"]))
            .await
    }

    async fn get_group_configuration(&self, id: &ScalingGroupId) -> Result<GroupConfiguration> {
        self.client
            .send_field(
                RestRequest::get(["groups", id.as_str(), "config"]),
                "groupConfiguration",
            )
            .await
    }

    async fn set_group_configuration(
        &self,
        id: &ScalingGroupId,
        config: &GroupConfiguration,
    ) -> Result<()> {
        config.validate()?;
        self.client
            .send_empty(RestRequest::put(["groups", id.as_str(), "config"]).json(config)?)
            .await
    }

    async fn get_launch_configuration(&self, id: &ScalingGroupId) -> Result<LaunchConfiguration> {
        self.client
            .send_field(
                RestRequest::get(["groups", id.as_str(), "launch"]),
                "launchConfiguration",
            )
            .await
    }

    async fn set_launch_configuration(
        &self,
        id: &ScalingGroupId,
        config: &LaunchConfiguration,
    ) -> Result<()> {
        self.client
            .send_empty(RestRequest::put(["groups", id.as_str(), "launch"]).json(config)?)
            .await
    }

    async fn list_policies(
        &self,
        group: &ScalingGroupId,
        page: PageRequest,
    ) -> Result<Page<Policy>> {
        self.list(
            RestRequest::get(["groups", group.as_str(), "policies"]).page(&page),
            "policies",
        )
        .await
    }

    async fn create_policy(
        &self,
        group: &ScalingGroupId,
        config: &PolicyConfiguration,
    ) -> Result<Policy> {
        config.validate()?;
        let request =
            RestRequest::post(["groups", group.as_str(), "policies"]).json(&json!([config]))?;
        let mut created: Vec<Policy> = self.client.send_field(request, "policies").await?;
        created
            .pop()
            .ok_or_else(|| Error::internal("policy creation returned no policy"))
    }

    async fn get_policy(&self, group: &ScalingGroupId, id: &PolicyId) -> Result<Policy> {
        self.client
            .send_field(RestRequest::get(Self::policy_path(group, id)), "policy")
            .await
    }

    async fn set_policy(
        &self,
        group: &ScalingGroupId,
        id: &PolicyId,
        config: &PolicyConfiguration,
    ) -> Result<()> {
        config.validate()?;
        self.client
            .send_empty(RestRequest::put(Self::policy_path(group, id)).json(config)?)
            .await
    }

    async fn delete_policy(&self, group: &ScalingGroupId, id: &PolicyId) -> Result<()> {
        self.client
            .send_empty(RestRequest::delete(Self::policy_path(group, id)))
            .await
    }

    async fn execute_policy(&self, group: &ScalingGroupId, id: &PolicyId) -> Result<()> {
        self.client
            .send_empty(RestRequest::post(Self::policy_path(group, id)).path("execute"))
            .await?;
        tracing::info!(group = %group, policy = %id, "policy executed");
        Ok(())
    }

    async fn list_webhooks(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        page: PageRequest,
    ) -> Result<Page<Webhook>> {
        self.list(
            RestRequest::get(Self::policy_path(group, policy))
                .path("webhooks")
                .page(&page),
            "webhooks",
        )
        .await
    }

    async fn create_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        config: &WebhookConfiguration,
    ) -> Result<Webhook> {
        let request = RestRequest::post(Self::policy_path(group, policy))
            .path("webhooks")
            .json(&json!([config]))?;
        let mut created: Vec<Webhook> = self.client.send_field(request, "webhooks").await?;
        created
            .pop()
            .ok_or_else(|| Error::internal("webhook creation returned no webhook"))
    }

    async fn get_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        id: &WebhookId,
    ) -> Result<Webhook> {
        let request = RestRequest::get(Self::policy_path(group, policy))
            .path("webhooks")
            .path(id.as_str());
        self.client.send_field(request, "webhook").await
    }

    async fn update_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        id: &WebhookId,
        config: &WebhookConfiguration,
    ) -> Result<()> {
        let request = RestRequest::put(Self::policy_path(group, policy))
            .path("webhooks")
            .path(id.as_str())
            .json(config)?;
        self.client.send_empty(request).await
    }

    async fn delete_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        id: &WebhookId,
    ) -> Result<()> {
        let request = RestRequest::delete(Self::policy_path(group, policy))
            .path("webhooks")
            .path(id.as_str());
        self.client.send_empty(request).await
    }

    fn provider_name(&self) -> &str {
        "cloud"
    }
}
