//! Identity provider implementations
//!
//! | Provider | Description |
//! |----------|-------------|
//! | [`KeystoneIdentityProvider`] | Authenticates against an Identity v2.0 `/tokens` endpoint |
//! | [`StaticIdentityProvider`] | Pre-issued token and fixed endpoints |

pub mod keystone;
pub mod static_identity;

pub use keystone::{Credentials, KeystoneIdentityProvider};
pub use static_identity::StaticIdentityProvider;
