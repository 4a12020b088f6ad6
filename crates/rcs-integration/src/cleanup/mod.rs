//! Removal of resources left behind by the suites
//!
//! Every routine selects resources by name prefix, so a cleanup pass also
//! collects leftovers of earlier runs that were interrupted. A resource that
//! disappears while being removed counts as removed; a listing that fails
//! does not, since nothing was removed.

pub mod autoscale;
pub mod load_balancer;
pub mod monitoring;
pub mod object_storage;

use futures::future::{BoxFuture, join_all};
use rcs_domain::error::{Error, Result};
use std::future::Future;

/// Box a cleanup routine so routines of different services share a list
pub fn boxed<'a, F>(routine: F) -> BoxFuture<'a, Result<()>>
where
    F: Future<Output = Result<()>> + Send + 'a,
{
    Box::pin(routine)
}

/// Run routines concurrently, reporting every failure
///
/// Routines settle missing resources themselves, so every error here is a
/// failure, `NotFound` included. Failures come back as one error, or as
/// [`Error::Aggregate`] when there are several.
pub async fn run_all<'a, I>(routines: I) -> Result<()>
where
    I: IntoIterator<Item = BoxFuture<'a, Result<()>>>,
{
    let failures = join_all(routines)
        .await
        .into_iter()
        .filter_map(Result::err)
        .collect();
    match Error::aggregate(failures) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Collects per-resource failures so one stuck resource does not stop the rest
///
/// A resource that is already gone counts as removed.
#[derive(Debug, Default)]
pub(crate) struct Failures(Vec<Error>);

impl Failures {
    pub(crate) fn record(&mut self, what: &str, outcome: Result<()>) {
        match outcome {
            Err(err) if err.is_not_found() => {
                tracing::debug!(resource = what, "already gone");
            }
            Err(err) => {
                tracing::warn!(resource = what, error = %err, "cleanup failed");
                self.0.push(err);
            }
            Ok(()) => {}
        }
    }

    pub(crate) fn finish(self) -> Result<()> {
        match Error::aggregate(self.0) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Whether a resource name belongs to the suites
pub(crate) fn owned(name: &str, prefix: &str) -> bool {
    name.starts_with(prefix)
}
