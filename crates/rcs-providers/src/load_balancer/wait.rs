//! Waiting on load balancer status changes

use rcs_domain::error::{Error, Result};
use rcs_domain::ports::LoadBalancerService;
use rcs_domain::value_objects::{LoadBalancer, LoadBalancerId, LoadBalancerStatus};

use crate::utils::{Poll, PollOptions, poll_until};

/// Poll a load balancer until it reaches `status`
///
/// Returns the balancer as last read. Fails early when it lands in `ERROR`
/// (unless that is the wanted status) and with `Error::Timeout` when the
/// deadline passes first.
///
/// # Example
///
/// ```ignore
/// let lb = wait_for_load_balancer_status(&*service, &id, LoadBalancerStatus::Active, &PollOptions::default()).await?;
/// ```
pub async fn wait_for_load_balancer_status(
    service: &dyn LoadBalancerService,
    id: &LoadBalancerId,
    status: LoadBalancerStatus,
    options: &PollOptions,
) -> Result<LoadBalancer> {
    let operation = format!("load balancer {id} to become {status}");
    let wanted = &status;
    poll_until(&operation, *options, move || async move {
        let lb = service.get_load_balancer(id).await?;
        if lb.status == *wanted {
            return Ok(Poll::Ready(lb));
        }
        if lb.status == LoadBalancerStatus::Error {
            return Err(Error::service(
                500,
                format!("load balancer {id} entered ERROR while waiting for {wanted}"),
            ));
        }
        tracing::trace!(load_balancer = %id, current = %lb.status, %wanted, "waiting");
        Ok(Poll::Pending)
    })
    .await
}

/// Poll a load balancer until it is gone
///
/// Both `DELETED` and `NotFound` count as gone.
pub async fn wait_for_load_balancer_deletion(
    service: &dyn LoadBalancerService,
    id: &LoadBalancerId,
    options: &PollOptions,
) -> Result<()> {
    let operation = format!("load balancer {id} to be deleted");
    poll_until(&operation, *options, move || async move {
        match service.get_load_balancer(id).await {
            Ok(lb) if lb.status == LoadBalancerStatus::Deleted => Ok(Poll::Ready(())),
            Ok(_) => Ok(Poll::Pending),
            Err(e) if e.is_not_found() => Ok(Poll::Ready(())),
            Err(e) => Err(e),
        }
    })
    .await
}
