//! In-memory Cloud Monitoring service
//!
//! Enforces the referential rules of the live service: checks belong to an
//! entity and alarms tie a check to a notification plan, so
//!
//! - an entity with checks cannot be deleted,
//! - deleting a check removes its alarms,
//! - a plan used by an alarm, or a notification used by a plan, cannot be deleted.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::json;
use uuid::Uuid;

use rcs_domain::error::{Error, Result};
use rcs_domain::pagination::{Page, PageRequest};
use rcs_domain::ports::MonitoringService;
use rcs_domain::value_objects::{
    Alarm, AlarmConfiguration, AlarmId, Check, CheckConfiguration, CheckData, CheckId,
    CheckMetric, CheckType, CheckTypeField, CheckTypeId, Entity, EntityConfiguration, EntityId,
    MonitoringZone, MonitoringZoneId, Notification, NotificationConfiguration, NotificationId,
    NotificationPlan, NotificationPlanConfiguration, NotificationPlanId, NotificationType,
    NotificationTypeId,
};

use crate::utils::page_by_key;

const ZONES: &[(&str, &str, &str)] = &[
    ("mzdfw", "Dallas Fort Worth (DFW)", "US"),
    ("mzord", "Chicago (ORD)", "US"),
    ("mziad", "Northern Virginia (IAD)", "US"),
    ("mzlon", "London (LON)", "GB"),
    ("mzhkg", "Hong Kong (HKG)", "HK"),
    ("mzsyd", "Sydney (SYD)", "AU"),
];

/// `(id, required details field, optional details fields)`
const CHECK_TYPES: &[(&str, &[&str], &[&str])] = &[
    ("remote.http", &["url"], &["method", "body", "headers", "follow_redirects"]),
    ("remote.ping", &[], &["count"]),
    ("remote.tcp", &["port"], &["banner_match", "send_body"]),
    ("remote.dns", &["query", "record_type"], &["port"]),
    ("remote.ssh", &[], &["port"]),
    ("agent.cpu", &[], &[]),
    ("agent.memory", &[], &[]),
    ("agent.load_average", &[], &[]),
    ("agent.filesystem", &["target"], &[]),
];

const NOTIFICATION_TYPES: &[(&str, &str)] = &[
    ("email", "address"),
    ("webhook", "url"),
    ("pagerduty", "service_key"),
    ("sms", "phone_number"),
];

fn new_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &raw[..10])
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn check_types() -> Vec<CheckType> {
    CHECK_TYPES
        .iter()
        .map(|(id, required, optional)| CheckType {
            id: CheckTypeId::new(*id),
            category: id.split('.').next().unwrap_or_default().to_string(),
            fields: required
                .iter()
                .map(|name| (name, false))
                .chain(optional.iter().map(|name| (name, true)))
                .map(|(name, optional)| CheckTypeField {
                    name: (*name).to_string(),
                    description: String::new(),
                    optional,
                })
                .collect(),
        })
        .collect()
}

fn zones() -> Vec<MonitoringZone> {
    ZONES
        .iter()
        .enumerate()
        .map(|(i, (id, label, country))| MonitoringZone {
            id: MonitoringZoneId::new(*id),
            label: (*label).to_string(),
            country_code: (*country).to_string(),
            source_ips: vec![format!("192.0.2.{}/32", i + 1)],
        })
        .collect()
}

fn validate_check(entity: &Entity, config: &CheckConfiguration) -> Result<()> {
    config.validate()?;
    let check_type = check_types()
        .into_iter()
        .find(|t| t.id == config.check_type)
        .ok_or_else(|| {
            Error::invalid_argument(format!("unknown check type '{}'", config.check_type))
        })?;
    if let Some(field) = check_type
        .fields
        .iter()
        .find(|f| !f.optional && config.details.get(&f.name).is_none())
    {
        return Err(Error::invalid_argument(format!(
            "{} checks need details.{}",
            check_type.id, field.name
        )));
    }
    if let Some(zone) = config
        .monitoring_zones_poll
        .iter()
        .find(|z| !ZONES.iter().any(|(id, _, _)| *id == z.as_str()))
    {
        return Err(Error::invalid_argument(format!(
            "unknown monitoring zone '{zone}'"
        )));
    }
    if let Some(alias) = &config.target_alias {
        if !entity.configuration.ip_addresses.contains_key(alias) {
            return Err(Error::invalid_argument(format!(
                "entity {} has no ip address aliased '{alias}'",
                entity.id
            )));
        }
    }
    Ok(())
}

fn validate_notification(config: &NotificationConfiguration) -> Result<()> {
    if config.label.trim().is_empty() {
        return Err(Error::invalid_argument("notification label cannot be empty"));
    }
    let (_, field) = NOTIFICATION_TYPES
        .iter()
        .find(|(id, _)| *id == config.notification_type.as_str())
        .ok_or_else(|| {
            Error::invalid_argument(format!(
                "unknown notification type '{}'",
                config.notification_type
            ))
        })?;
    if config.details.get(*field).is_none() {
        return Err(Error::invalid_argument(format!(
            "{} notifications need details.{field}",
            config.notification_type
        )));
    }
    Ok(())
}

struct EntityRecord {
    entity: Entity,
    checks: BTreeMap<CheckId, Check>,
    alarms: BTreeMap<AlarmId, Alarm>,
}

/// In-memory Cloud Monitoring service
#[derive(Default)]
pub struct InMemoryMonitoringService {
    entities: DashMap<EntityId, EntityRecord>,
    notifications: DashMap<NotificationId, Notification>,
    plans: DashMap<NotificationPlanId, NotificationPlan>,
}

impl InMemoryMonitoringService {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entity<T>(
        &self,
        id: &EntityId,
        f: impl FnOnce(&mut EntityRecord) -> Result<T>,
    ) -> Result<T> {
        let mut record = self
            .entities
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("entity {id}")))?;
        f(&mut record)
    }

    fn ensure_plan(&self, id: &NotificationPlanId) -> Result<()> {
        if self.plans.contains_key(id) {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "notification plan {id} does not exist"
            )))
        }
    }

    fn validate_plan(&self, config: &NotificationPlanConfiguration) -> Result<()> {
        if config.label.trim().is_empty() {
            return Err(Error::invalid_argument("notification plan label cannot be empty"));
        }
        match config
            .notifications()
            .find(|id| !self.notifications.contains_key(*id))
        {
            Some(missing) => Err(Error::invalid_argument(format!(
                "notification {missing} does not exist"
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MonitoringService for InMemoryMonitoringService {
    async fn list_entities(&self, page: PageRequest) -> Result<Page<Entity>> {
        let entities = self
            .entities
            .iter()
            .map(|e| e.value().entity.clone())
            .collect();
        Ok(page_by_key(entities, &page, |e: &Entity| e.id.to_string()))
    }

    async fn create_entity(&self, config: &EntityConfiguration) -> Result<EntityId> {
        if config.label.trim().is_empty() {
            return Err(Error::invalid_argument("entity label cannot be empty"));
        }
        let id = EntityId::new(new_id("en"));
        let now = now_millis();
        self.entities.insert(
            id.clone(),
            EntityRecord {
                entity: Entity {
                    id: id.clone(),
                    configuration: config.clone(),
                    uri: None,
                    managed: false,
                    created_at: now,
                    updated_at: now,
                },
                checks: BTreeMap::new(),
                alarms: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    async fn get_entity(&self, id: &EntityId) -> Result<Entity> {
        self.with_entity(id, |record| Ok(record.entity.clone()))
    }

    async fn update_entity(&self, id: &EntityId, config: &EntityConfiguration) -> Result<()> {
        if config.label.trim().is_empty() {
            return Err(Error::invalid_argument("entity label cannot be empty"));
        }
        self.with_entity(id, |record| {
            record.entity.configuration = config.clone();
            record.entity.updated_at = now_millis();
            Ok(())
        })
    }

    async fn delete_entity(&self, id: &EntityId) -> Result<()> {
        let checks = self.with_entity(id, |record| Ok(record.checks.len()))?;
        if checks > 0 {
            return Err(Error::conflict(format!(
                "entity {id} still has {checks} check(s)"
            )));
        }
        self.entities.remove(id);
        Ok(())
    }

    async fn list_checks(&self, entity: &EntityId, page: PageRequest) -> Result<Page<Check>> {
        let checks = self.with_entity(entity, |record| {
            Ok(record.checks.values().cloned().collect::<Vec<_>>())
        })?;
        Ok(page_by_key(checks, &page, |c| c.id.to_string()))
    }

    async fn create_check(&self, entity: &EntityId, config: &CheckConfiguration) -> Result<CheckId> {
        self.with_entity(entity, |record| {
            validate_check(&record.entity, config)?;
            let id = CheckId::new(new_id("ch"));
            let now = now_millis();
            record.checks.insert(
                id.clone(),
                Check {
                    id: id.clone(),
                    configuration: config.clone(),
                    created_at: now,
                    updated_at: now,
                },
            );
            Ok(id)
        })
    }

    async fn get_check(&self, entity: &EntityId, id: &CheckId) -> Result<Check> {
        self.with_entity(entity, |record| {
            record
                .checks
                .get(id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("check {id}")))
        })
    }

    async fn update_check(
        &self,
        entity: &EntityId,
        id: &CheckId,
        config: &CheckConfiguration,
    ) -> Result<()> {
        self.with_entity(entity, |record| {
            validate_check(&record.entity, config)?;
            let check = record
                .checks
                .get_mut(id)
                .ok_or_else(|| Error::not_found(format!("check {id}")))?;
            check.configuration = config.clone();
            check.updated_at = now_millis();
            Ok(())
        })
    }

    async fn delete_check(&self, entity: &EntityId, id: &CheckId) -> Result<()> {
        self.with_entity(entity, |record| {
            record
                .checks
                .remove(id)
                .ok_or_else(|| Error::not_found(format!("check {id}")))?;
            record
                .alarms
                .retain(|_, alarm| alarm.configuration.check_id != *id);
            Ok(())
        })
    }

    async fn test_check(&self, entity: &EntityId, config: &CheckConfiguration) -> Result<Vec<CheckData>> {
        self.with_entity(entity, |record| validate_check(&record.entity, config))?;
        let timestamp = now_millis();
        let metrics: HashMap<String, CheckMetric> = [(
            "duration".to_string(),
            CheckMetric {
                metric_type: "I".to_string(),
                data: json!(42),
            },
        )]
        .into_iter()
        .collect();
        let data = |zone: Option<MonitoringZoneId>| CheckData {
            monitoring_zone_id: zone,
            available: true,
            status: "success".to_string(),
            timestamp,
            metrics: metrics.clone(),
        };
        if config.is_remote() {
            Ok(config
                .monitoring_zones_poll
                .iter()
                .cloned()
                .map(|zone| data(Some(zone)))
                .collect())
        } else {
            Ok(vec![data(None)])
        }
    }

    async fn list_alarms(&self, entity: &EntityId, page: PageRequest) -> Result<Page<Alarm>> {
        let alarms = self.with_entity(entity, |record| {
            Ok(record.alarms.values().cloned().collect::<Vec<_>>())
        })?;
        Ok(page_by_key(alarms, &page, |a| a.id.to_string()))
    }

    async fn create_alarm(&self, entity: &EntityId, config: &AlarmConfiguration) -> Result<AlarmId> {
        self.ensure_plan(&config.notification_plan_id)?;
        self.with_entity(entity, |record| {
            if !record.checks.contains_key(&config.check_id) {
                return Err(Error::invalid_argument(format!(
                    "check {} does not exist on entity {entity}",
                    config.check_id
                )));
            }
            let id = AlarmId::new(new_id("al"));
            let now = now_millis();
            record.alarms.insert(
                id.clone(),
                Alarm {
                    id: id.clone(),
                    configuration: config.clone(),
                    created_at: now,
                    updated_at: now,
                },
            );
            Ok(id)
        })
    }

    async fn get_alarm(&self, entity: &EntityId, id: &AlarmId) -> Result<Alarm> {
        self.with_entity(entity, |record| {
            record
                .alarms
                .get(id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("alarm {id}")))
        })
    }

    async fn update_alarm(
        &self,
        entity: &EntityId,
        id: &AlarmId,
        config: &AlarmConfiguration,
    ) -> Result<()> {
        self.ensure_plan(&config.notification_plan_id)?;
        self.with_entity(entity, |record| {
            if !record.checks.contains_key(&config.check_id) {
                return Err(Error::invalid_argument(format!(
                    "check {} does not exist on entity {entity}",
                    config.check_id
                )));
            }
            let alarm = record
                .alarms
                .get_mut(id)
                .ok_or_else(|| Error::not_found(format!("alarm {id}")))?;
            alarm.configuration = config.clone();
            alarm.updated_at = now_millis();
            Ok(())
        })
    }

    async fn delete_alarm(&self, entity: &EntityId, id: &AlarmId) -> Result<()> {
        self.with_entity(entity, |record| {
            record
                .alarms
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| Error::not_found(format!("alarm {id}")))
        })
    }

    async fn list_notifications(&self, page: PageRequest) -> Result<Page<Notification>> {
        let notifications = self.notifications.iter().map(|n| n.value().clone()).collect();
        Ok(page_by_key(notifications, &page, |n: &Notification| {
            n.id.to_string()
        }))
    }

    async fn create_notification(&self, config: &NotificationConfiguration) -> Result<NotificationId> {
        validate_notification(config)?;
        let id = NotificationId::new(new_id("nt"));
        self.notifications.insert(
            id.clone(),
            Notification {
                id: id.clone(),
                configuration: config.clone(),
            },
        );
        Ok(id)
    }

    async fn get_notification(&self, id: &NotificationId) -> Result<Notification> {
        self.notifications
            .get(id)
            .map(|n| n.value().clone())
            .ok_or_else(|| Error::not_found(format!("notification {id}")))
    }

    async fn update_notification(&self, id: &NotificationId, config: &NotificationConfiguration) -> Result<()> {
        validate_notification(config)?;
        let mut notification = self
            .notifications
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("notification {id}")))?;
        notification.configuration = config.clone();
        Ok(())
    }

    async fn delete_notification(&self, id: &NotificationId) -> Result<()> {
        let used_by = self
            .plans
            .iter()
            .find(|plan| plan.configuration.notifications().any(|n| n == id))
            .map(|plan| plan.id.clone());
        if let Some(plan) = used_by {
            return Err(Error::conflict(format!(
                "notification {id} is used by notification plan {plan}"
            )));
        }
        self.notifications
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("notification {id}")))
    }

    async fn list_notification_plans(&self, page: PageRequest) -> Result<Page<NotificationPlan>> {
        let plans = self.plans.iter().map(|p| p.value().clone()).collect();
        Ok(page_by_key(plans, &page, |p: &NotificationPlan| {
            p.id.to_string()
        }))
    }

    async fn create_notification_plan(
        &self,
        config: &NotificationPlanConfiguration,
    ) -> Result<NotificationPlanId> {
        self.validate_plan(config)?;
        let id = NotificationPlanId::new(new_id("np"));
        self.plans.insert(
            id.clone(),
            NotificationPlan {
                id: id.clone(),
                configuration: config.clone(),
            },
        );
        Ok(id)
    }

    async fn get_notification_plan(&self, id: &NotificationPlanId) -> Result<NotificationPlan> {
        self.plans
            .get(id)
            .map(|p| p.value().clone())
            .ok_or_else(|| Error::not_found(format!("notification plan {id}")))
    }

    async fn update_notification_plan(
        &self,
        id: &NotificationPlanId,
        config: &NotificationPlanConfiguration,
    ) -> Result<()> {
        self.validate_plan(config)?;
        let mut plan = self
            .plans
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("notification plan {id}")))?;
        plan.configuration = config.clone();
        Ok(())
    }

    async fn delete_notification_plan(&self, id: &NotificationPlanId) -> Result<()> {
        let in_use = self.entities.iter().any(|record| {
            record
                .alarms
                .values()
                .any(|alarm| alarm.configuration.notification_plan_id == *id)
        });
        if in_use {
            return Err(Error::conflict(format!(
                "notification plan {id} is used by an alarm"
            )));
        }
        self.plans
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("notification plan {id}")))
    }

    async fn list_monitoring_zones(&self, page: PageRequest) -> Result<Page<MonitoringZone>> {
        Ok(page_by_key(zones(), &page, |z| z.id.to_string()))
    }

    async fn get_monitoring_zone(&self, id: &MonitoringZoneId) -> Result<MonitoringZone> {
        zones()
            .into_iter()
            .find(|z| z.id == *id)
            .ok_or_else(|| Error::not_found(format!("monitoring zone {id}")))
    }

    async fn list_check_types(&self, page: PageRequest) -> Result<Page<CheckType>> {
        Ok(page_by_key(check_types(), &page, |t| t.id.to_string()))
    }

    async fn get_check_type(&self, id: &CheckTypeId) -> Result<CheckType> {
        check_types()
            .into_iter()
            .find(|t| t.id == *id)
            .ok_or_else(|| Error::not_found(format!("check type {id}")))
    }

    async fn list_notification_types(&self, page: PageRequest) -> Result<Page<NotificationType>> {
        let types = NOTIFICATION_TYPES
            .iter()
            .map(|(id, field)| NotificationType {
                id: NotificationTypeId::new(*id),
                fields: vec![CheckTypeField {
                    name: (*field).to_string(),
                    description: String::new(),
                    optional: false,
                }],
            })
            .collect();
        Ok(page_by_key(types, &page, |t: &NotificationType| {
            t.id.to_string()
        }))
    }

    fn provider_name(&self) -> &str {
        "in_memory"
    }
}
