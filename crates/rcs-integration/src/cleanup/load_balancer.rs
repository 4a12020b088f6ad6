//! Load balancer cleanup

use rcs_domain::error::Result;
use rcs_domain::ports::LoadBalancerService;
use rcs_domain::value_objects::{LoadBalancer, LoadBalancerStatus};
use rcs_providers::{
    PollOptions, wait_for_load_balancer_deletion, wait_for_load_balancer_status,
};

use super::{Failures, owned};

/// Delete every load balancer whose name starts with `prefix`
///
/// A load balancer only accepts deletion once it is `ACTIVE` again, so each
/// one is waited on first; ones already being deleted are left alone.
pub async fn cleanup_load_balancers(
    service: &dyn LoadBalancerService,
    prefix: &str,
    poll: PollOptions,
) -> Result<()> {
    let mut failures = Failures::default();
    for lb in service.list_all_load_balancers().await? {
        if !owned(&lb.name, prefix) {
            continue;
        }
        if matches!(
            lb.status,
            LoadBalancerStatus::PendingDelete | LoadBalancerStatus::Deleted
        ) {
            continue;
        }
        let outcome = remove(service, &lb, &poll).await;
        failures.record(&format!("load balancer {}", lb.id), outcome);
    }
    failures.finish()
}

async fn remove(
    service: &dyn LoadBalancerService,
    lb: &LoadBalancer,
    poll: &PollOptions,
) -> Result<()> {
    if lb.status != LoadBalancerStatus::Active {
        wait_for_load_balancer_status(service, &lb.id, LoadBalancerStatus::Active, poll).await?;
    }
    tracing::debug!(load_balancer = %lb.id, "deleting load balancer");
    service.delete_load_balancer(&lb.id).await?;
    wait_for_load_balancer_deletion(service, &lb.id, poll).await
}
