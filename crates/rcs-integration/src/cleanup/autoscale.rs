//! Scaling group cleanup

use rcs_domain::error::Result;
use rcs_domain::ports::AutoScaleService;
use rcs_domain::value_objects::ScalingGroup;

use super::{Failures, owned};

fn group_name(group: &ScalingGroup) -> Option<&str> {
    group
        .group_configuration
        .as_ref()
        .map(|config| config.name.as_str())
        .or_else(|| group.state.as_ref().and_then(|state| state.name.as_deref()))
}

/// Force-delete every scaling group whose name starts with `prefix`
///
/// Forcing removes the servers a group still runs along with the group.
pub async fn cleanup_groups(service: &dyn AutoScaleService, prefix: &str) -> Result<()> {
    let mut failures = Failures::default();
    for group in service.list_all_scaling_groups().await? {
        if !group_name(&group).is_some_and(|name| owned(name, prefix)) {
            continue;
        }
        tracing::debug!(group = %group.id, "deleting scaling group");
        let outcome = service.delete_group(&group.id, true).await;
        failures.record(&format!("scaling group {}", group.id), outcome);
    }
    failures.finish()
}
