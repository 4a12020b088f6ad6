//! Object storage providers
//!
//! | Provider | Description |
//! |----------|-------------|
//! | [`CloudFilesProvider`] | Cloud Files / Swift REST API with the CDN management endpoint |
//! | [`InMemoryObjectStorage`] | Simulated account for tests and offline runs |
//!
//! [`TempUrlSigner`] is shared by both.

pub mod cloud;
pub mod in_memory;
pub mod temp_url;

pub use cloud::CloudFilesProvider;
pub use in_memory::InMemoryObjectStorage;
pub use temp_url::TempUrlSigner;
