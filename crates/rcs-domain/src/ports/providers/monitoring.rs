use crate::constants::DEFAULT_PAGE_SIZE;
use crate::error::Result;
use crate::pagination::{Page, PageRequest, collect_all};
use crate::value_objects::{
    Alarm, AlarmConfiguration, AlarmId, Check, CheckConfiguration, CheckData, CheckId, CheckType,
    CheckTypeId, Entity, EntityConfiguration, EntityId, MonitoringZone, MonitoringZoneId,
    Notification, NotificationConfiguration, NotificationId, NotificationPlan,
    NotificationPlanConfiguration, NotificationPlanId, NotificationType,
};
use async_trait::async_trait;

/// Cloud Monitoring Service Interface
///
/// Creation calls return only the new identifier (the service answers
/// `201 Created` with a `Location` header and no body); read the resource
/// back when its server-side fields are needed.
///
/// Checks and alarms live under an entity, so their operations take the
/// entity as the first argument.
#[async_trait]
pub trait MonitoringService: Send + Sync {
    // ========================================================================
    // ENTITIES
    // ========================================================================

    /// List one page of entities
    async fn list_entities(&self, page: PageRequest) -> Result<Page<Entity>>;

    /// Create an entity
    async fn create_entity(&self, config: &EntityConfiguration) -> Result<EntityId>;

    /// Get an entity
    async fn get_entity(&self, id: &EntityId) -> Result<Entity>;

    /// Replace an entity's settings
    async fn update_entity(&self, id: &EntityId, config: &EntityConfiguration) -> Result<()>;

    /// Delete an entity; rejected with `Conflict` while it still has checks
    async fn delete_entity(&self, id: &EntityId) -> Result<()>;

    // ========================================================================
    // CHECKS
    // ========================================================================

    /// List one page of checks of an entity
    async fn list_checks(&self, entity: &EntityId, page: PageRequest) -> Result<Page<Check>>;

    /// Create a check
    async fn create_check(&self, entity: &EntityId, config: &CheckConfiguration)
    -> Result<CheckId>;

    /// Get a check
    async fn get_check(&self, entity: &EntityId, id: &CheckId) -> Result<Check>;

    /// Replace a check's settings
    async fn update_check(
        &self,
        entity: &EntityId,
        id: &CheckId,
        config: &CheckConfiguration,
    ) -> Result<()>;

    /// Delete a check and the alarms that evaluate it
    async fn delete_check(&self, entity: &EntityId, id: &CheckId) -> Result<()>;

    /// Run a check once without saving it, returning one result per zone
    async fn test_check(
        &self,
        entity: &EntityId,
        config: &CheckConfiguration,
    ) -> Result<Vec<CheckData>>;

    // ========================================================================
    // ALARMS
    // ========================================================================

    /// List one page of alarms of an entity
    async fn list_alarms(&self, entity: &EntityId, page: PageRequest) -> Result<Page<Alarm>>;

    /// Create an alarm
    async fn create_alarm(&self, entity: &EntityId, config: &AlarmConfiguration)
    -> Result<AlarmId>;

    /// Get an alarm
    async fn get_alarm(&self, entity: &EntityId, id: &AlarmId) -> Result<Alarm>;

    /// Replace an alarm's settings
    async fn update_alarm(
        &self,
        entity: &EntityId,
        id: &AlarmId,
        config: &AlarmConfiguration,
    ) -> Result<()>;

    /// Delete an alarm
    async fn delete_alarm(&self, entity: &EntityId, id: &AlarmId) -> Result<()>;

    // ========================================================================
    // NOTIFICATIONS
    // ========================================================================

    /// List one page of notifications
    async fn list_notifications(&self, page: PageRequest) -> Result<Page<Notification>>;

    /// Create a notification
    async fn create_notification(&self, config: &NotificationConfiguration)
    -> Result<NotificationId>;

    /// Get a notification
    async fn get_notification(&self, id: &NotificationId) -> Result<Notification>;

    /// Replace a notification's settings
    async fn update_notification(
        &self,
        id: &NotificationId,
        config: &NotificationConfiguration,
    ) -> Result<()>;

    /// Delete a notification
    async fn delete_notification(&self, id: &NotificationId) -> Result<()>;

    // ========================================================================
    // NOTIFICATION PLANS
    // ========================================================================

    /// List one page of notification plans
    async fn list_notification_plans(&self, page: PageRequest) -> Result<Page<NotificationPlan>>;

    /// Create a notification plan
    async fn create_notification_plan(
        &self,
        config: &NotificationPlanConfiguration,
    ) -> Result<NotificationPlanId>;

    /// Get a notification plan
    async fn get_notification_plan(&self, id: &NotificationPlanId) -> Result<NotificationPlan>;

    /// Replace a notification plan's settings
    async fn update_notification_plan(
        &self,
        id: &NotificationPlanId,
        config: &NotificationPlanConfiguration,
    ) -> Result<()>;

    /// Delete a notification plan; rejected with `Conflict` while alarms use it
    async fn delete_notification_plan(&self, id: &NotificationPlanId) -> Result<()>;

    // ========================================================================
    // CATALOGS
    // ========================================================================

    /// List one page of monitoring zones
    async fn list_monitoring_zones(&self, page: PageRequest) -> Result<Page<MonitoringZone>>;

    /// Get a monitoring zone
    async fn get_monitoring_zone(&self, id: &MonitoringZoneId) -> Result<MonitoringZone>;

    /// List one page of check types
    async fn list_check_types(&self, page: PageRequest) -> Result<Page<CheckType>>;

    /// Get a check type
    async fn get_check_type(&self, id: &CheckTypeId) -> Result<CheckType>;

    /// List one page of notification types
    async fn list_notification_types(&self, page: PageRequest) -> Result<Page<NotificationType>>;

    /// Name of this provider (e.g. "cloud", "in_memory")
    fn provider_name(&self) -> &str;

    // ========================================================================
    // AGGREGATING LISTINGS
    // ========================================================================

    /// Every entity
    async fn list_all_entities(&self) -> Result<Vec<Entity>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_entities(page)).await
    }

    /// Every check of an entity
    async fn list_all_checks(&self, entity: &EntityId) -> Result<Vec<Check>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_checks(entity, page)).await
    }

    /// Every alarm of an entity
    async fn list_all_alarms(&self, entity: &EntityId) -> Result<Vec<Alarm>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_alarms(entity, page)).await
    }

    /// Every notification
    async fn list_all_notifications(&self) -> Result<Vec<Notification>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_notifications(page)).await
    }

    /// Every notification plan
    async fn list_all_notification_plans(&self) -> Result<Vec<NotificationPlan>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_notification_plans(page)).await
    }

    /// Every monitoring zone
    async fn list_all_monitoring_zones(&self) -> Result<Vec<MonitoringZone>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_monitoring_zones(page)).await
    }

    /// Every check type
    async fn list_all_check_types(&self) -> Result<Vec<CheckType>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_check_types(page)).await
    }

    /// Every notification type
    async fn list_all_notification_types(&self) -> Result<Vec<NotificationType>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_notification_types(page)).await
    }
}
