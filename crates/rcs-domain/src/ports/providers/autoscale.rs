use crate::constants::DEFAULT_PAGE_SIZE;
use crate::error::Result;
use crate::pagination::{Page, PageRequest, collect_all};
use crate::value_objects::{
    GroupConfiguration, GroupState, LaunchConfiguration, Policy, PolicyConfiguration, PolicyId,
    ScalingGroup, ScalingGroupConfiguration, ScalingGroupId, Webhook, WebhookConfiguration,
    WebhookId,
};
use async_trait::async_trait;

/// Auto Scale Service Interface
///
/// Manages scaling groups, their policies and the webhooks that trigger those
/// policies.
///
/// # Example
///
/// ```ignore
/// use rcs_domain::ports::AutoScaleService;
///
/// let group = service.create_group(&config).await?;
/// let policy = service.create_policy(&group.id, &policy_config).await?;
/// service.execute_policy(&group.id, &policy.id).await?;
/// service.delete_group(&group.id, true).await?;
/// ```
#[async_trait]
pub trait AutoScaleService: Send + Sync {
    // ========================================================================
    // SCALING GROUPS
    // ========================================================================

    /// List one page of scaling groups
    async fn list_scaling_groups(&self, page: PageRequest) -> Result<Page<ScalingGroup>>;

    /// Create a scaling group with its initial policies
    ///
    /// The group configuration is validated before any request is made.
    async fn create_group(&self, config: &ScalingGroupConfiguration) -> Result<ScalingGroup>;

    /// Get a scaling group with its configuration, policies and state
    async fn get_group(&self, id: &ScalingGroupId) -> Result<ScalingGroup>;

    /// Delete a scaling group
    ///
    /// # Arguments
    /// * `id` - Group to delete
    /// * `force` - Also delete the group's servers; without it a group that
    ///   still has servers is rejected with `Conflict`
    async fn delete_group(&self, id: &ScalingGroupId, force: bool) -> Result<()>;

    /// Get the current state of a scaling group
    async fn get_group_state(&self, id: &ScalingGroupId) -> Result<GroupState>;

    /// Stop executing policies for a group
    async fn pause_group(&self, id: &ScalingGroupId) -> Result<()>;

    /// Resume executing policies for a group
    async fn resume_group(&self, id: &ScalingGroupId) -> Result<()>;

    /// Get the group configuration
    async fn get_group_configuration(&self, id: &ScalingGroupId) -> Result<GroupConfiguration>;

    /// Replace the group configuration
    async fn set_group_configuration(
        &self,
        id: &ScalingGroupId,
        config: &GroupConfiguration,
    ) -> Result<()>;

    /// Get the launch configuration
    async fn get_launch_configuration(&self, id: &ScalingGroupId) -> Result<LaunchConfiguration>;

    /// Replace the launch configuration
    async fn set_launch_configuration(
        &self,
        id: &ScalingGroupId,
        config: &LaunchConfiguration,
    ) -> Result<()>;

    // ========================================================================
    // POLICIES
    // ========================================================================

    /// List one page of policies of a group
    async fn list_policies(
        &self,
        group: &ScalingGroupId,
        page: PageRequest,
    ) -> Result<Page<Policy>>;

    /// Create a policy
    async fn create_policy(
        &self,
        group: &ScalingGroupId,
        config: &PolicyConfiguration,
    ) -> Result<Policy>;

    /// Get a policy
    async fn get_policy(&self, group: &ScalingGroupId, id: &PolicyId) -> Result<Policy>;

    /// Replace a policy's configuration
    async fn set_policy(
        &self,
        group: &ScalingGroupId,
        id: &PolicyId,
        config: &PolicyConfiguration,
    ) -> Result<()>;

    /// Delete a policy and its webhooks
    async fn delete_policy(&self, group: &ScalingGroupId, id: &PolicyId) -> Result<()>;

    /// Execute a policy now
    async fn execute_policy(&self, group: &ScalingGroupId, id: &PolicyId) -> Result<()>;

    // ========================================================================
    // WEBHOOKS
    // ========================================================================

    /// List one page of webhooks of a policy
    async fn list_webhooks(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        page: PageRequest,
    ) -> Result<Page<Webhook>>;

    /// Create a webhook
    async fn create_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        config: &WebhookConfiguration,
    ) -> Result<Webhook>;

    /// Get a webhook
    async fn get_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        id: &WebhookId,
    ) -> Result<Webhook>;

    /// Replace a webhook's name and metadata
    async fn update_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        id: &WebhookId,
        config: &WebhookConfiguration,
    ) -> Result<()>;

    /// Delete a webhook
    async fn delete_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        id: &WebhookId,
    ) -> Result<()>;

    /// Name of this provider (e.g. "cloud", "in_memory")
    fn provider_name(&self) -> &str;

    // ========================================================================
    // AGGREGATING LISTINGS
    // ========================================================================

    /// Every scaling group, following markers until the last page
    async fn list_all_scaling_groups(&self) -> Result<Vec<ScalingGroup>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_scaling_groups(page)).await
    }

    /// Every policy of a group
    async fn list_all_policies(&self, group: &ScalingGroupId) -> Result<Vec<Policy>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_policies(group, page)).await
    }

    /// Every webhook of a policy
    async fn list_all_webhooks(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
    ) -> Result<Vec<Webhook>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| {
            self.list_webhooks(group, policy, page)
        })
        .await
    }
}
