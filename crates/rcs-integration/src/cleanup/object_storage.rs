//! Container cleanup

use rcs_domain::error::Result;
use rcs_domain::ports::ObjectStorageProvider;
use rcs_domain::value_objects::CdnContainer;

use super::{Failures, owned};

/// CDN-enabled containers, or none when the account has no CDN endpoint
async fn cdn_containers(storage: &dyn ObjectStorageProvider) -> Result<Vec<CdnContainer>> {
    match storage.list_all_cdn_containers().await {
        Err(err) if err.is_not_found() => {
            tracing::debug!(error = %err, "no CDN service, skipping CDN cleanup");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Disable CDN on and delete every container whose name starts with `prefix`
///
/// Containers are emptied before deletion.
pub async fn cleanup_containers(storage: &dyn ObjectStorageProvider, prefix: &str) -> Result<()> {
    let mut failures = Failures::default();

    for cdn in cdn_containers(storage).await? {
        if cdn.cdn_enabled && owned(&cdn.name, prefix) {
            let outcome = storage.disable_cdn(&cdn.name).await;
            failures.record(&format!("cdn container {}", cdn.name), outcome);
        }
    }

    for container in storage.list_all_containers().await? {
        if owned(&container.name, prefix) {
            tracing::debug!(container = %container.name, "deleting container");
            let outcome = storage.delete_container(&container.name, true).await;
            failures.record(&format!("container {}", container.name), outcome);
        }
    }

    failures.finish()
}
