//! Tree limit configuration.

use serde::{Deserialize, Serialize};

/// Limits applied to the file-system tree of every space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum nesting depth of an entry below the space root. The root's
    /// direct children sit at depth 1; creating an entry whose depth would
    /// exceed this limit fails with `DepthExceeded`.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    20
}
