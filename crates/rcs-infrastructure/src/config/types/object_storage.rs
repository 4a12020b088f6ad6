//! Object storage configuration types

use crate::constants::DEFAULT_SEGMENT_SIZE;
use serde::{Deserialize, Serialize};

/// Object storage settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObjectStorageConfig {
    /// Use the internal (ServiceNet) endpoint
    pub internal_url: bool,

    /// Segment size for segmented uploads in bytes
    pub segment_size: usize,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            internal_url: false,
            segment_size: DEFAULT_SEGMENT_SIZE,
        }
    }
}
