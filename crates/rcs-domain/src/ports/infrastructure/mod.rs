//! Infrastructure Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | [`IdentityProvider`] | Issues auth tokens and resolves service endpoints |

/// Identity provider port
pub mod identity;

pub use identity::{IdentityProvider, SharedIdentityProvider};
