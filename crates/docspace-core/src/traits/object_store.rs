//! Object store trait for the S3-compatible backend holding file bytes.
//!
//! The metadata core addresses objects exclusively through keys produced
//! by the key translator; implementations only move bytes. Network retry
//! belongs to the implementation, never to the tree logic.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Metadata about a stored object, as returned by a prefix listing.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ObjectMeta {
    /// Full physical key of the object.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// ETag reported by the backend, if any.
    pub etag: Option<String>,
    /// Last modified timestamp, if known.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// Trait for flat, immutable-key object storage.
///
/// Implemented for S3-compatible services and for an in-memory backend
/// in `docspace-storage`. Keys have no rename; reorganizing the logical
/// namespace is the metadata layer's job.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "s3", "memory").
    fn provider_type(&self) -> &str;

    /// Store an object and return its etag.
    async fn put(&self, key: &str, data: Bytes) -> AppResult<String>;

    /// Fetch an object's bytes.
    async fn get(&self, key: &str) -> AppResult<Bytes>;

    /// Copy an object to a new key within the same backend.
    async fn copy(&self, src_key: &str, dst_key: &str) -> AppResult<()>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// List all objects under a key prefix.
    async fn list(&self, key_prefix: &str) -> AppResult<Vec<ObjectMeta>>;
}
