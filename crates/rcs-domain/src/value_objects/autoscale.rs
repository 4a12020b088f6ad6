//! Auto Scale Value Objects
//!
//! Scaling groups, their configurations, scaling policies and webhooks,
//! shaped after the Auto Scale v1.0 wire format (camelCase keys).

use crate::constants::{AUTOSCALE_MAX_COOLDOWN_SECS, AUTOSCALE_MAX_ENTITIES};
use crate::error::{Error, Result};
use crate::value_objects::ids::{LoadBalancerId, PolicyId, ScalingGroupId, WebhookId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hyperlink attached to Auto Scale resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URL
    pub href: String,
    /// Relation (`self`, `capability`, ...)
    pub rel: String,
}

/// Value Object: Group Configuration
///
/// ## Business Rules
///
/// - `min_entities` never exceeds `max_entities`
/// - Cooldown is at most one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfiguration {
    /// Group name
    pub name: String,
    /// Seconds to wait between scaling operations
    pub cooldown: u32,
    /// Minimum number of servers
    pub min_entities: u32,
    /// Maximum number of servers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entities: Option<u32>,
    /// Arbitrary key/value metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl GroupConfiguration {
    /// Create a group configuration without metadata
    pub fn new<S: Into<String>>(
        name: S,
        cooldown: u32,
        min_entities: u32,
        max_entities: Option<u32>,
    ) -> Self {
        Self {
            name: name.into(),
            cooldown,
            min_entities,
            max_entities,
            metadata: HashMap::new(),
        }
    }

    /// Check the configuration before sending it
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_argument("group name cannot be empty"));
        }
        if self.cooldown > AUTOSCALE_MAX_COOLDOWN_SECS {
            return Err(Error::invalid_argument(format!(
                "cooldown {} exceeds {AUTOSCALE_MAX_COOLDOWN_SECS} seconds",
                self.cooldown
            )));
        }
        let max = self.max_entities.unwrap_or(AUTOSCALE_MAX_ENTITIES);
        if self.min_entities > max {
            return Err(Error::invalid_argument(format!(
                "minEntities ({}) cannot exceed maxEntities ({max})",
                self.min_entities
            )));
        }
        if max > AUTOSCALE_MAX_ENTITIES {
            return Err(Error::invalid_argument(format!(
                "maxEntities cannot exceed {AUTOSCALE_MAX_ENTITIES}"
            )));
        }
        Ok(())
    }
}

/// Disk partitioning mode for launched servers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiskConfig {
    /// Expand the root partition to the full disk
    Auto,
    /// Keep the image's partition layout
    Manual,
}

/// Network attached to launched servers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerNetwork {
    /// Network UUID
    pub uuid: String,
}

/// File injected into launched servers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    /// Destination path
    pub path: String,
    /// Base64-encoded contents
    pub contents: String,
}

/// Server template used when scaling up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerArgument {
    /// Server name prefix
    pub name: String,
    /// Image to boot
    #[serde(rename = "imageRef")]
    pub image_ref: String,
    /// Flavor to boot
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
    /// Disk configuration
    #[serde(
        rename = "OS-DCF:diskConfig",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub disk_config: Option<DiskConfig>,
    /// Server metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    /// Attached networks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<ServerNetwork>,
    /// Injected files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personality: Vec<Personality>,
}

/// Load balancer that new servers join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerArgument {
    /// Load balancer to join
    pub load_balancer_id: LoadBalancerId,
    /// Port the server listens on
    pub port: u16,
}

/// Arguments of a `launch_server` launch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerLaunchArguments {
    /// Server template
    pub server: ServerArgument,
    /// Load balancers to join
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_balancers: Vec<LoadBalancerArgument>,
}

/// Value Object: Launch Configuration
///
/// What the group does when it scales up. Only server launches exist today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "args")]
pub enum LaunchConfiguration {
    /// Boot a server from a template
    #[serde(rename = "launch_server")]
    LaunchServer(ServerLaunchArguments),
}

impl LaunchConfiguration {
    /// Launch configuration booting `image_ref` with `flavor_ref`
    pub fn server<N, I, F>(name: N, image_ref: I, flavor_ref: F) -> Self
    where
        N: Into<String>,
        I: Into<String>,
        F: Into<String>,
    {
        Self::LaunchServer(ServerLaunchArguments {
            server: ServerArgument {
                name: name.into(),
                image_ref: image_ref.into(),
                flavor_ref: flavor_ref.into(),
                disk_config: None,
                metadata: HashMap::new(),
                networks: Vec::new(),
                personality: Vec::new(),
            },
            load_balancers: Vec::new(),
        })
    }

    /// Server template of this launch configuration
    pub fn server_argument(&self) -> &ServerArgument {
        match self {
            Self::LaunchServer(args) => &args.server,
        }
    }
}

/// How a policy is triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    /// Executed through webhooks or the execute endpoint
    Webhook,
    /// Executed on a schedule
    Schedule,
}

/// Schedule of a `schedule` policy: exactly one of `cron` or `at`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyArguments {
    /// Recurring cron expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    /// One-off ISO-8601 instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
}

/// Capacity change applied by a policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicyAdjustment {
    /// Add (or remove, if negative) a number of servers
    Change(i32),
    /// Add (or remove) a percentage of the current capacity
    ChangePercent(f64),
    /// Set the desired capacity outright
    DesiredCapacity(u32),
}

/// Value Object: Policy Configuration
///
/// ## Business Rules
///
/// - Exactly one of `change`, `change_percent` or `desired_capacity` is set
/// - Schedule policies carry exactly one of `cron` / `at`; webhook policies carry none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfiguration {
    /// Policy name
    pub name: String,
    /// Seconds to wait before this policy may run again
    pub cooldown: u32,
    /// Trigger type
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    /// Absolute server delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<i32>,
    /// Relative server delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
    /// Target capacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_capacity: Option<u32>,
    /// Schedule arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<PolicyArguments>,
}

impl PolicyConfiguration {
    /// Webhook-triggered policy
    pub fn webhook<S: Into<String>>(name: S, cooldown: u32, adjustment: PolicyAdjustment) -> Self {
        let mut config = Self {
            name: name.into(),
            cooldown,
            policy_type: PolicyType::Webhook,
            change: None,
            change_percent: None,
            desired_capacity: None,
            args: None,
        };
        config.set_adjustment(adjustment);
        config
    }

    /// Recurring schedule policy
    pub fn cron<S: Into<String>, C: Into<String>>(
        name: S,
        cooldown: u32,
        adjustment: PolicyAdjustment,
        cron: C,
    ) -> Self {
        let mut config = Self::webhook(name, cooldown, adjustment);
        config.policy_type = PolicyType::Schedule;
        config.args = Some(PolicyArguments {
            cron: Some(cron.into()),
            at: None,
        });
        config
    }

    /// The capacity change, if exactly one is configured
    pub fn adjustment(&self) -> Option<PolicyAdjustment> {
        match (self.change, self.change_percent, self.desired_capacity) {
            (Some(change), None, None) => Some(PolicyAdjustment::Change(change)),
            (None, Some(percent), None) => Some(PolicyAdjustment::ChangePercent(percent)),
            (None, None, Some(capacity)) => Some(PolicyAdjustment::DesiredCapacity(capacity)),
            _ => None,
        }
    }

    /// Replace the capacity change
    pub fn set_adjustment(&mut self, adjustment: PolicyAdjustment) {
        self.change = None;
        self.change_percent = None;
        self.desired_capacity = None;
        match adjustment {
            PolicyAdjustment::Change(change) => self.change = Some(change),
            PolicyAdjustment::ChangePercent(percent) => self.change_percent = Some(percent),
            PolicyAdjustment::DesiredCapacity(capacity) => self.desired_capacity = Some(capacity),
        }
    }

    /// Check the configuration before sending it
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_argument("policy name cannot be empty"));
        }
        if self.adjustment().is_none() {
            return Err(Error::invalid_argument(
                "policy must set exactly one of change, changePercent or desiredCapacity",
            ));
        }
        match (self.policy_type, &self.args) {
            (PolicyType::Webhook, None) => Ok(()),
            (PolicyType::Webhook, Some(_)) => Err(Error::invalid_argument(
                "webhook policies do not take schedule arguments",
            )),
            (PolicyType::Schedule, Some(args)) if args.cron.is_some() != args.at.is_some() => {
                Ok(())
            }
            (PolicyType::Schedule, _) => Err(Error::invalid_argument(
                "schedule policies need exactly one of cron or at",
            )),
        }
    }
}

/// Entity: Scaling Policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy identifier
    pub id: PolicyId,
    /// Resource links
    #[serde(default)]
    pub links: Vec<Link>,
    /// Policy settings
    #[serde(flatten)]
    pub configuration: PolicyConfiguration,
}

/// Value Object: Webhook Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfiguration {
    /// Webhook name
    pub name: String,
    /// Arbitrary key/value metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl WebhookConfiguration {
    /// Webhook without metadata
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            metadata: HashMap::new(),
        }
    }
}

/// Entity: Policy Webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    /// Webhook identifier
    pub id: WebhookId,
    /// Resource links, including the anonymous `capability` URL
    #[serde(default)]
    pub links: Vec<Link>,
    /// Webhook settings
    #[serde(flatten)]
    pub configuration: WebhookConfiguration,
}

impl Webhook {
    /// Anonymous URL that executes the policy
    pub fn capability_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == "capability")
            .map(|l| l.href.as_str())
    }
}

/// Server currently active in a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveServer {
    /// Server identifier
    pub id: String,
    /// Resource links
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Value Object: Group State
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupState {
    /// Servers that are up
    #[serde(default)]
    pub active: Vec<ActiveServer>,
    /// Number of servers that are up
    pub active_capacity: u32,
    /// Number of servers the group wants
    pub desired_capacity: u32,
    /// Number of servers being built
    pub pending_capacity: u32,
    /// Whether policy execution is suspended
    #[serde(default)]
    pub paused: bool,
    /// Group name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Value Object: Scaling Group Creation Request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingGroupConfiguration {
    /// Group settings
    pub group_configuration: GroupConfiguration,
    /// Server template
    pub launch_configuration: LaunchConfiguration,
    /// Policies created with the group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scaling_policies: Vec<PolicyConfiguration>,
}

impl ScalingGroupConfiguration {
    /// Check every part of the request before sending it
    pub fn validate(&self) -> Result<()> {
        self.group_configuration.validate()?;
        self.scaling_policies
            .iter()
            .try_for_each(PolicyConfiguration::validate)
    }
}

/// Entity: Scaling Group
///
/// Listings only carry `id`, `links` and `state`; a single-group read
/// carries everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingGroup {
    /// Group identifier
    pub id: ScalingGroupId,
    /// Resource links
    #[serde(default)]
    pub links: Vec<Link>,
    /// Group settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_configuration: Option<GroupConfiguration>,
    /// Server template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_configuration: Option<LaunchConfiguration>,
    /// Policies of the group
    #[serde(default)]
    pub scaling_policies: Vec<Policy>,
    /// Current state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<GroupState>,
}
