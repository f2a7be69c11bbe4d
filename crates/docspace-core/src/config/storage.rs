//! Object-storage configuration.

use serde::{Deserialize, Serialize};

/// Which object-store backend to wire in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    /// S3-compatible service (AWS, MinIO, Ceph RGW).
    #[default]
    S3,
    /// In-memory store for tests and single-node evaluation.
    Memory,
}

/// Top-level object-storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Selected backend.
    pub provider: StorageProvider,
    /// S3 settings, read when `provider` is [`StorageProvider::S3`].
    pub s3: S3StorageConfig,
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3StorageConfig {
    /// Endpoint URL override for non-AWS services like MinIO. `None`
    /// uses the SDK's default resolution.
    pub endpoint: Option<String>,
    /// AWS region.
    pub region: String,
    /// Bucket holding every space's objects.
    pub bucket: String,
    /// Static access key. `None` falls back to the ambient credential
    /// chain.
    pub access_key: Option<String>,
    /// Static secret key, paired with `access_key`.
    pub secret_key: Option<String>,
    /// Path-style addressing, required by most S3-compatible servers.
    pub force_path_style: bool,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: "us-east-1".to_string(),
            bucket: String::new(),
            access_key: None,
            secret_key: None,
            force_path_style: false,
        }
    }
}
