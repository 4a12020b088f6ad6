//! Cloud Monitoring Value Objects
//!
//! Entities are the things being monitored, checks poll them from
//! monitoring zones (or through an agent), alarms evaluate check results
//! and notification plans decide who hears about state changes.
//!
//! Keys are snake_case on the wire. Read models carry the server-assigned
//! `id` plus `created_at`/`updated_at` timestamps in epoch milliseconds.

use crate::error::{Error, Result};
use crate::value_objects::ids::{
    AlarmId, CheckId, CheckTypeId, EntityId, MonitoringZoneId, NotificationId,
    NotificationPlanId, NotificationTypeId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// ENTITIES
// ============================================================================

/// Value Object: Entity Configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfiguration {
    /// Display label
    pub label: String,
    /// Named addresses checks can target via `target_alias`
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub ip_addresses: HashMap<String, String>,
    /// Arbitrary key/value metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    /// Monitoring agent bound to the entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl EntityConfiguration {
    /// Entity with only a label
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Add a named address
    #[must_use]
    pub fn with_ip_address<K: Into<String>, V: Into<String>>(mut self, alias: K, ip: V) -> Self {
        self.ip_addresses.insert(alias.into(), ip.into());
        self
    }
}

/// Entity: Monitored Entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity identifier
    pub id: EntityId,
    /// Entity settings
    #[serde(flatten)]
    pub configuration: EntityConfiguration,
    /// Provider-managed URI (cloud servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Whether the entity is managed by another product
    #[serde(default)]
    pub managed: bool,
    /// Creation time (epoch ms)
    #[serde(default)]
    pub created_at: i64,
    /// Last update time (epoch ms)
    #[serde(default)]
    pub updated_at: i64,
}

// ============================================================================
// CHECKS
// ============================================================================

/// Value Object: Check Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfiguration {
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Check type (e.g. `remote.http`, `agent.cpu`)
    #[serde(rename = "type")]
    pub check_type: CheckTypeId,
    /// Type-specific settings
    #[serde(default)]
    pub details: Value,
    /// Zones remote checks run from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitoring_zones_poll: Vec<MonitoringZoneId>,
    /// Seconds between runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    /// Seconds before a run is abandoned; must be below `period`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Entity `ip_addresses` key to target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_alias: Option<String>,
    /// Hostname to target instead of an alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_hostname: Option<String>,
    /// Resolver preference for `target_hostname`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_resolver: Option<String>,
    /// Whether the check is paused
    #[serde(default)]
    pub disabled: bool,
    /// Arbitrary key/value metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl CheckConfiguration {
    /// Check of `check_type` with the given details
    pub fn new<T: Into<CheckTypeId>>(check_type: T, details: Value) -> Self {
        Self {
            label: None,
            check_type: check_type.into(),
            details,
            monitoring_zones_poll: Vec::new(),
            period: None,
            timeout: None,
            target_alias: None,
            target_hostname: None,
            target_resolver: None,
            disabled: false,
            metadata: HashMap::new(),
        }
    }

    /// Whether the check runs from monitoring zones rather than an agent
    pub fn is_remote(&self) -> bool {
        self.check_type.as_str().starts_with("remote.")
    }

    /// Check the configuration before sending it
    pub fn validate(&self) -> Result<()> {
        if let (Some(period), Some(timeout)) = (self.period, self.timeout) {
            if timeout >= period {
                return Err(Error::invalid_argument(format!(
                    "check timeout ({timeout}s) must be lower than its period ({period}s)"
                )));
            }
        }
        if self.is_remote() {
            if self.monitoring_zones_poll.is_empty() {
                return Err(Error::invalid_argument(
                    "remote checks need at least one monitoring zone",
                ));
            }
            if self.target_alias.is_some() == self.target_hostname.is_some() {
                return Err(Error::invalid_argument(
                    "remote checks need exactly one of target_alias or target_hostname",
                ));
            }
        }
        Ok(())
    }
}

/// Entity: Check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// Check identifier
    pub id: CheckId,
    /// Check settings
    #[serde(flatten)]
    pub configuration: CheckConfiguration,
    /// Creation time (epoch ms)
    #[serde(default)]
    pub created_at: i64,
    /// Last update time (epoch ms)
    #[serde(default)]
    pub updated_at: i64,
}

/// Result of a test-check run from one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckData {
    /// Zone the check ran from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_zone_id: Option<MonitoringZoneId>,
    /// Whether the check could run
    pub available: bool,
    /// Human-readable status
    #[serde(default)]
    pub status: String,
    /// Run time (epoch ms)
    #[serde(default)]
    pub timestamp: i64,
    /// Collected metrics by name
    #[serde(default)]
    pub metrics: HashMap<String, CheckMetric>,
}

/// One metric collected by a check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckMetric {
    /// Metric type code (`i`, `n`, `s`, ...)
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Metric value
    pub data: Value,
}

// ============================================================================
// ALARMS
// ============================================================================

/// Value Object: Alarm Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmConfiguration {
    /// Check evaluated by the alarm
    pub check_id: CheckId,
    /// Plan notified on state changes
    pub notification_plan_id: NotificationPlanId,
    /// Alarm DSL criteria; absent means "always OK"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<String>,
    /// Whether the alarm is paused
    #[serde(default)]
    pub disabled: bool,
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Arbitrary key/value metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl AlarmConfiguration {
    /// Alarm tying `check_id` to `notification_plan_id`
    pub fn new<C: Into<CheckId>, P: Into<NotificationPlanId>>(check_id: C, plan: P) -> Self {
        Self {
            check_id: check_id.into(),
            notification_plan_id: plan.into(),
            criteria: None,
            disabled: false,
            label: None,
            metadata: HashMap::new(),
        }
    }
}

/// Entity: Alarm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    /// Alarm identifier
    pub id: AlarmId,
    /// Alarm settings
    #[serde(flatten)]
    pub configuration: AlarmConfiguration,
    /// Creation time (epoch ms)
    #[serde(default)]
    pub created_at: i64,
    /// Last update time (epoch ms)
    #[serde(default)]
    pub updated_at: i64,
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

/// Value Object: Notification Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfiguration {
    /// Display label
    pub label: String,
    /// Notification type (`email`, `webhook`, `pagerduty`, ...)
    #[serde(rename = "type")]
    pub notification_type: NotificationTypeId,
    /// Type-specific settings
    #[serde(default)]
    pub details: Value,
}

impl NotificationConfiguration {
    /// Notification mailing `address`
    pub fn email<L: Into<String>, A: Into<String>>(label: L, address: A) -> Self {
        Self {
            label: label.into(),
            notification_type: NotificationTypeId::new("email"),
            details: serde_json::json!({ "address": address.into() }),
        }
    }

    /// Notification posting to `url`
    pub fn webhook<L: Into<String>, U: Into<String>>(label: L, url: U) -> Self {
        Self {
            label: label.into(),
            notification_type: NotificationTypeId::new("webhook"),
            details: serde_json::json!({ "url": url.into() }),
        }
    }
}

/// Entity: Notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier
    pub id: NotificationId,
    /// Notification settings
    #[serde(flatten)]
    pub configuration: NotificationConfiguration,
}

/// Value Object: Notification Plan Configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPlanConfiguration {
    /// Display label
    pub label: String,
    /// Notified when an alarm turns CRITICAL
    #[serde(default)]
    pub critical_state: Vec<NotificationId>,
    /// Notified when an alarm turns WARNING
    #[serde(default)]
    pub warning_state: Vec<NotificationId>,
    /// Notified when an alarm turns OK
    #[serde(default)]
    pub ok_state: Vec<NotificationId>,
}

impl NotificationPlanConfiguration {
    /// Plan with no notifications attached
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Every notification referenced by the plan
    pub fn notifications(&self) -> impl Iterator<Item = &NotificationId> {
        self.critical_state
            .iter()
            .chain(&self.warning_state)
            .chain(&self.ok_state)
    }
}

/// Entity: Notification Plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPlan {
    /// Plan identifier
    pub id: NotificationPlanId,
    /// Plan settings
    #[serde(flatten)]
    pub configuration: NotificationPlanConfiguration,
}

// ============================================================================
// CATALOGS
// ============================================================================

/// Region checks can run from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringZone {
    /// Zone identifier (e.g. `mzdfw`)
    pub id: MonitoringZoneId,
    /// Display label
    pub label: String,
    /// Country code
    #[serde(default)]
    pub country_code: String,
    /// Source address ranges checks come from
    #[serde(default)]
    pub source_ips: Vec<String>,
}

/// Field accepted in a check type's details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckTypeField {
    /// Field name
    pub name: String,
    /// Field description
    #[serde(default)]
    pub description: String,
    /// Whether the field may be omitted
    #[serde(default)]
    pub optional: bool,
}

/// Kind of check the service can run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckType {
    /// Type identifier
    pub id: CheckTypeId,
    /// `remote` or `agent`
    #[serde(rename = "type")]
    pub category: String,
    /// Fields accepted in `details`
    #[serde(default)]
    pub fields: Vec<CheckTypeField>,
}

/// Kind of notification the service can send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationType {
    /// Type identifier
    pub id: NotificationTypeId,
    /// Fields accepted in `details`
    #[serde(default)]
    pub fields: Vec<CheckTypeField>,
}
