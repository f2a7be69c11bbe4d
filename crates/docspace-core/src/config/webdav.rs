//! WebDAV projection configuration.

use serde::{Deserialize, Serialize};

/// Settings for the WebDAV view of a space's tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDavConfig {
    /// Fixed API prefix prepended to every logical path when building
    /// response hrefs.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

impl Default for WebDavConfig {
    fn default() -> Self {
        Self {
            api_prefix: default_api_prefix(),
        }
    }
}

fn default_api_prefix() -> String {
    "/api/document-space".to_string()
}
