//! Status polling
//!
//! Resources such as load balancers change state asynchronously. Callers
//! poll until a predicate holds or a deadline passes.

use std::future::Future;
use std::time::Duration;

use rcs_domain::error::{Error, Result};
use tokio::time::Instant;

use crate::constants::{POLL_DEFAULT_INTERVAL_SECS, POLL_DEFAULT_TIMEOUT_SECS};

/// Polling cadence and deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between attempts
    pub interval: Duration,
    /// Give up after this long
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(POLL_DEFAULT_INTERVAL_SECS),
            timeout: Duration::from_secs(POLL_DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PollOptions {
    /// Options with the given interval and deadline
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Outcome of one poll
#[derive(Debug)]
pub enum Poll<T> {
    /// Done, stop polling
    Ready(T),
    /// Not yet, poll again after the interval
    Pending,
}

/// Poll `check` until it reports [`Poll::Ready`]
///
/// Errors returned by the check end polling immediately. When the deadline
/// passes first, `Error::Timeout` names `operation`.
///
/// # Example
///
/// ```ignore
/// let lb = poll_until("load balancer ACTIVE", options, || async {
///     let lb = service.get_load_balancer(&id).await?;
///     Ok(if lb.status == LoadBalancerStatus::Active { Poll::Ready(lb) } else { Poll::Pending })
/// }).await?;
/// ```
pub async fn poll_until<T, F, Fut>(operation: &str, options: PollOptions, mut check: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Poll<T>>>,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        if let Poll::Ready(value) = check().await? {
            tracing::debug!(operation, attempts, "poll completed");
            return Ok(value);
        }
        let elapsed = started.elapsed();
        if elapsed + options.interval > options.timeout {
            tracing::warn!(operation, attempts, ?elapsed, "poll deadline exceeded");
            return Err(Error::timeout(operation, elapsed));
        }
        tokio::time::sleep(options.interval).await;
    }
}
