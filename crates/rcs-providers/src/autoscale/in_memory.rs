//! In-memory Auto Scale service
//!
//! Keeps scaling groups in a `DashMap` and simulates capacity: a group
//! starts with `min_entities` active servers and executing a policy resizes
//! the server list immediately, clamped to the group bounds.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use rcs_domain::constants::AUTOSCALE_MAX_ENTITIES;
use rcs_domain::error::{Error, Result};
use rcs_domain::pagination::{Page, PageRequest};
use rcs_domain::ports::AutoScaleService;
use rcs_domain::value_objects::{
    ActiveServer, GroupConfiguration, GroupState, LaunchConfiguration, Link, Policy,
    PolicyAdjustment, PolicyConfiguration, PolicyId, ScalingGroup, ScalingGroupConfiguration,
    ScalingGroupId, Webhook, WebhookConfiguration, WebhookId,
};

use crate::constants::IN_MEMORY_AUTOSCALE_URL;
use crate::utils::page_by_key;

struct PolicyRecord {
    configuration: PolicyConfiguration,
    webhooks: BTreeMap<WebhookId, WebhookConfiguration>,
}

struct GroupRecord {
    configuration: GroupConfiguration,
    launch: LaunchConfiguration,
    policies: BTreeMap<PolicyId, PolicyRecord>,
    active: Vec<ActiveServer>,
    paused: bool,
}

impl GroupRecord {
    fn max_entities(&self) -> u32 {
        self.configuration
            .max_entities
            .unwrap_or(AUTOSCALE_MAX_ENTITIES)
    }

    fn desired(&self) -> u32 {
        u32::try_from(self.active.len()).unwrap_or(u32::MAX)
    }

    fn resize(&mut self, desired: u32) {
        let desired = desired.clamp(self.configuration.min_entities, self.max_entities());
        let desired = usize::try_from(desired).unwrap_or(usize::MAX);
        self.active.truncate(desired);
        while self.active.len() < desired {
            self.active.push(ActiveServer {
                id: Uuid::new_v4().to_string(),
                links: Vec::new(),
            });
        }
    }

    fn state(&self) -> GroupState {
        GroupState {
            active: self.active.clone(),
            active_capacity: self.desired(),
            desired_capacity: self.desired(),
            pending_capacity: 0,
            paused: self.paused,
            name: Some(self.configuration.name.clone()),
        }
    }

    fn policy(&self, id: &PolicyId) -> Result<&PolicyRecord> {
        self.policies
            .get(id)
            .ok_or_else(|| Error::not_found(format!("policy {id}")))
    }

    fn policy_mut(&mut self, id: &PolicyId) -> Result<&mut PolicyRecord> {
        self.policies
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("policy {id}")))
    }
}

fn self_link(path: &str) -> Vec<Link> {
    vec![Link {
        href: format!("{IN_MEMORY_AUTOSCALE_URL}/{path}/"),
        rel: "self".to_string(),
    }]
}

fn to_policy(group: &ScalingGroupId, id: &PolicyId, record: &PolicyRecord) -> Policy {
    Policy {
        id: id.clone(),
        links: self_link(&format!("groups/{group}/policies/{id}")),
        configuration: record.configuration.clone(),
    }
}

fn to_webhook(
    group: &ScalingGroupId,
    policy: &PolicyId,
    id: &WebhookId,
    configuration: &WebhookConfiguration,
) -> Webhook {
    let mut links = self_link(&format!("groups/{group}/policies/{policy}/webhooks/{id}"));
    links.push(Link {
        href: format!("{IN_MEMORY_AUTOSCALE_URL}/execute/1/{id}/"),
        rel: "capability".to_string(),
    });
    Webhook {
        id: id.clone(),
        links,
        configuration: configuration.clone(),
    }
}

/// Target capacity after applying an adjustment to `current`
///
/// Percentage changes round away from zero so a non-zero percentage always
/// moves the group by at least one server.
fn apply_adjustment(current: u32, adjustment: PolicyAdjustment) -> u32 {
    let current_signed = i64::from(current);
    let target = match adjustment {
        PolicyAdjustment::Change(change) => current_signed + i64::from(change),
        PolicyAdjustment::ChangePercent(percent) => {
            let delta = f64::from(current) * percent / 100.0;
            let delta = if delta >= 0.0 { delta.ceil() } else { delta.floor() };
            #[allow(clippy::cast_possible_truncation)]
            let delta = delta as i64;
            current_signed + delta
        }
        PolicyAdjustment::DesiredCapacity(capacity) => i64::from(capacity),
    };
    u32::try_from(target.max(0)).unwrap_or(u32::MAX)
}

/// In-memory Auto Scale service
#[derive(Default)]
pub struct InMemoryAutoScaleService {
    groups: DashMap<ScalingGroupId, GroupRecord>,
}

impl InMemoryAutoScaleService {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    fn with_group<T>(
        &self,
        id: &ScalingGroupId,
        f: impl FnOnce(&GroupRecord) -> Result<T>,
    ) -> Result<T> {
        let group = self
            .groups
            .get(id)
            .ok_or_else(|| Error::not_found(format!("scaling group {id}")))?;
        f(&group)
    }

    fn with_group_mut<T>(
        &self,
        id: &ScalingGroupId,
        f: impl FnOnce(&mut GroupRecord) -> Result<T>,
    ) -> Result<T> {
        let mut group = self
            .groups
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("scaling group {id}")))?;
        f(&mut group)
    }

    fn to_group(id: &ScalingGroupId, record: &GroupRecord) -> ScalingGroup {
        ScalingGroup {
            id: id.clone(),
            links: self_link(&format!("groups/{id}")),
            group_configuration: Some(record.configuration.clone()),
            launch_configuration: Some(record.launch.clone()),
            scaling_policies: record
                .policies
                .iter()
                .map(|(policy_id, policy)| to_policy(id, policy_id, policy))
                .collect(),
            state: Some(record.state()),
        }
    }
}

#[async_trait]
impl AutoScaleService for InMemoryAutoScaleService {
    async fn list_scaling_groups(&self, page: PageRequest) -> Result<Page<ScalingGroup>> {
        let groups: Vec<ScalingGroup> = self
            .groups
            .iter()
            .map(|entry| ScalingGroup {
                id: entry.key().clone(),
                links: self_link(&format!("groups/{}", entry.key())),
                group_configuration: None,
                launch_configuration: None,
                scaling_policies: Vec::new(),
                state: Some(entry.value().state()),
            })
            .collect();
        Ok(page_by_key(groups, &page, |g| g.id.to_string()))
    }

    async fn create_group(&self, config: &ScalingGroupConfiguration) -> Result<ScalingGroup> {
        config.validate()?;
        let id = ScalingGroupId::new(Uuid::new_v4().to_string());
        let mut record = GroupRecord {
            configuration: config.group_configuration.clone(),
            launch: config.launch_configuration.clone(),
            policies: BTreeMap::new(),
            active: Vec::new(),
            paused: false,
        };
        for policy in &config.scaling_policies {
            record.policies.insert(
                PolicyId::new(Uuid::new_v4().to_string()),
                PolicyRecord {
                    configuration: policy.clone(),
                    webhooks: BTreeMap::new(),
                },
            );
        }
        record.resize(config.group_configuration.min_entities);
        let group = Self::to_group(&id, &record);
        self.groups.insert(id.clone(), record);
        tracing::debug!(group = %id, "in-memory scaling group created");
        Ok(group)
    }

    async fn get_group(&self, id: &ScalingGroupId) -> Result<ScalingGroup> {
        self.with_group(id, |record| Ok(Self::to_group(id, record)))
    }

    async fn delete_group(&self, id: &ScalingGroupId, force: bool) -> Result<()> {
        let active = self.with_group(id, |record| Ok(record.active.len()))?;
        if active > 0 && !force {
            return Err(Error::conflict(format!(
                "scaling group {id} still has {active} active server(s); delete with force"
            )));
        }
        self.groups.remove(id);
        Ok(())
    }

    async fn get_group_state(&self, id: &ScalingGroupId) -> Result<GroupState> {
        self.with_group(id, |record| Ok(record.state()))
    }

    async fn pause_group(&self, id: &ScalingGroupId) -> Result<()> {
        self.with_group_mut(id, |record| {
            record.paused = true;
            Ok(())
        })
    }

    async fn resume_group(&self, id: &ScalingGroupId) -> Result<()> {
        self.with_group_mut(id, |record| {
            record.paused = false;
            Ok(())
        })
    }

    async fn get_group_configuration(&self, id: &ScalingGroupId) -> Result<GroupConfiguration> {
        self.with_group(id, |record| Ok(record.configuration.clone()))
    }

    async fn set_group_configuration(
        &self,
        id: &ScalingGroupId,
        config: &GroupConfiguration,
    ) -> Result<()> {
        config.validate()?;
        self.with_group_mut(id, |record| {
            let desired = record.desired();
            record.configuration = config.clone();
            record.resize(desired);
            Ok(())
        })
    }

    async fn get_launch_configuration(&self, id: &ScalingGroupId) -> Result<LaunchConfiguration> {
        self.with_group(id, |record| Ok(record.launch.clone()))
    }

    async fn set_launch_configuration(
        &self,
        id: &ScalingGroupId,
        config: &LaunchConfiguration,
    ) -> Result<()> {
        self.with_group_mut(id, |record| {
            record.launch = config.clone();
            Ok(())
        })
    }

    async fn list_policies(
        &self,
        group: &ScalingGroupId,
        page: PageRequest,
    ) -> Result<Page<Policy>> {
        let policies = self.with_group(group, |record| {
            Ok(record
                .policies
                .iter()
                .map(|(id, policy)| to_policy(group, id, policy))
                .collect::<Vec<_>>())
        })?;
        Ok(page_by_key(policies, &page, |p| p.id.to_string()))
    }

    async fn create_policy(
        &self,
        group: &ScalingGroupId,
        config: &PolicyConfiguration,
    ) -> Result<Policy> {
        config.validate()?;
        self.with_group_mut(group, |record| {
            let id = PolicyId::new(Uuid::new_v4().to_string());
            let policy = PolicyRecord {
                configuration: config.clone(),
                webhooks: BTreeMap::new(),
            };
            let created = to_policy(group, &id, &policy);
            record.policies.insert(id, policy);
            Ok(created)
        })
    }

    async fn get_policy(&self, group: &ScalingGroupId, id: &PolicyId) -> Result<Policy> {
        self.with_group(group, |record| Ok(to_policy(group, id, record.policy(id)?)))
    }

    async fn set_policy(
        &self,
        group: &ScalingGroupId,
        id: &PolicyId,
        config: &PolicyConfiguration,
    ) -> Result<()> {
        config.validate()?;
        self.with_group_mut(group, |record| {
            record.policy_mut(id)?.configuration = config.clone();
            Ok(())
        })
    }

    async fn delete_policy(&self, group: &ScalingGroupId, id: &PolicyId) -> Result<()> {
        self.with_group_mut(group, |record| {
            record
                .policies
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| Error::not_found(format!("policy {id}")))
        })
    }

    async fn execute_policy(&self, group: &ScalingGroupId, id: &PolicyId) -> Result<()> {
        self.with_group_mut(group, |record| {
            if record.paused {
                return Err(Error::conflict(format!(
                    "scaling group {group} is paused"
                )));
            }
            let adjustment = record
                .policy(id)?
                .configuration
                .adjustment()
                .ok_or_else(|| Error::invalid_argument(format!("policy {id} has no adjustment")))?;
            let target = apply_adjustment(record.desired(), adjustment);
            record.resize(target);
            tracing::debug!(group = %group, policy = %id, desired = record.desired(), "in-memory policy executed");
            Ok(())
        })
    }

    async fn list_webhooks(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        page: PageRequest,
    ) -> Result<Page<Webhook>> {
        let webhooks = self.with_group(group, |record| {
            Ok(record
                .policy(policy)?
                .webhooks
                .iter()
                .map(|(id, config)| to_webhook(group, policy, id, config))
                .collect::<Vec<_>>())
        })?;
        Ok(page_by_key(webhooks, &page, |w| w.id.to_string()))
    }

    async fn create_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        config: &WebhookConfiguration,
    ) -> Result<Webhook> {
        if config.name.trim().is_empty() {
            return Err(Error::invalid_argument("webhook name cannot be empty"));
        }
        self.with_group_mut(group, |record| {
            let id = WebhookId::new(Uuid::new_v4().to_string());
            let created = to_webhook(group, policy, &id, config);
            record
                .policy_mut(policy)?
                .webhooks
                .insert(id, config.clone());
            Ok(created)
        })
    }

    async fn get_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        id: &WebhookId,
    ) -> Result<Webhook> {
        self.with_group(group, |record| {
            let config = record
                .policy(policy)?
                .webhooks
                .get(id)
                .ok_or_else(|| Error::not_found(format!("webhook {id}")))?;
            Ok(to_webhook(group, policy, id, config))
        })
    }

    async fn update_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        id: &WebhookId,
        config: &WebhookConfiguration,
    ) -> Result<()> {
        self.with_group_mut(group, |record| {
            let existing = record
                .policy_mut(policy)?
                .webhooks
                .get_mut(id)
                .ok_or_else(|| Error::not_found(format!("webhook {id}")))?;
            *existing = config.clone();
            Ok(())
        })
    }

    async fn delete_webhook(
        &self,
        group: &ScalingGroupId,
        policy: &PolicyId,
        id: &WebhookId,
    ) -> Result<()> {
        self.with_group_mut(group, |record| {
            record
                .policy_mut(policy)?
                .webhooks
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| Error::not_found(format!("webhook {id}")))
        })
    }

    fn provider_name(&self) -> &str {
        "in_memory"
    }
}
