//! Monitoring cleanup
//!
//! Dependents go first: alarms reference checks and plans, checks live on
//! entities, plans reference notifications.

use rcs_domain::error::Result;
use rcs_domain::ports::MonitoringService;
use rcs_domain::value_objects::Entity;

use super::{Failures, owned};

/// Remove entities, plans and notifications whose label starts with `prefix`
pub async fn cleanup_monitoring(service: &dyn MonitoringService, prefix: &str) -> Result<()> {
    let mut failures = Failures::default();

    for entity in service.list_all_entities().await? {
        if owned(&entity.configuration.label, prefix) {
            let outcome = remove_entity(service, &entity).await;
            failures.record(&format!("entity {}", entity.id), outcome);
        }
    }

    for plan in service.list_all_notification_plans().await? {
        if owned(&plan.configuration.label, prefix) {
            let outcome = service.delete_notification_plan(&plan.id).await;
            failures.record(&format!("notification plan {}", plan.id), outcome);
        }
    }

    for notification in service.list_all_notifications().await? {
        if owned(&notification.configuration.label, prefix) {
            let outcome = service.delete_notification(&notification.id).await;
            failures.record(&format!("notification {}", notification.id), outcome);
        }
    }

    failures.finish()
}

async fn remove_entity(service: &dyn MonitoringService, entity: &Entity) -> Result<()> {
    for alarm in service.list_all_alarms(&entity.id).await? {
        service.delete_alarm(&entity.id, &alarm.id).await?;
    }
    for check in service.list_all_checks(&entity.id).await? {
        service.delete_check(&entity.id, &check.id).await?;
    }
    tracing::debug!(entity = %entity.id, "deleting entity");
    service.delete_entity(&entity.id).await
}
