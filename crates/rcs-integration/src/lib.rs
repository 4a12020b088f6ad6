//! # RCS - Integration Harness
//!
//! Shared plumbing for the integration suites under `tests/`. Every
//! scenario is written once against the service ports and runs against
//! the in-memory backend; the live variant runs against the real cloud
//! when `RCS__PROVIDERS__BACKEND=cloud` and credentials are configured.
//!
//! ```ignore
//! use rcs_integration::TestHarness;
//!
//! let harness = TestHarness::in_memory();
//! let name = harness.unique_name("container");
//! harness.object_storage().create_container(&name, &Metadata::new()).await?;
//! harness.cleanup().await?;
//! ```

/// Removal of everything the suites created
pub mod cleanup;

/// Service handles, naming and polling for scenarios
pub mod harness;

pub use harness::{TEST_PREFIX, TestHarness};

/// Generate an in-memory test and an ignored live test for each scenario
///
/// Each name must refer to an `async fn(&TestHarness) -> Result<()>` in
/// the invoking module. The live variant cleans up even when the scenario
/// fails.
#[macro_export]
macro_rules! scenarios {
    ($($name:ident),+ $(,)?) => {
        mod in_memory {
            $(
                #[tokio::test]
                async fn $name() {
                    let harness = $crate::TestHarness::in_memory();
                    super::$name(&harness).await.unwrap();
                    harness.cleanup().await.unwrap();
                }
            )+
        }

        mod live {
            $(
                #[tokio::test]
                #[ignore = "needs cloud credentials and RCS__PROVIDERS__BACKEND=cloud"]
                async fn $name() {
                    let harness = $crate::TestHarness::live().await.unwrap();
                    let outcome = super::$name(&harness).await;
                    harness.cleanup().await.unwrap();
                    outcome.unwrap();
                }
            )+
        }
    };
}
