//! In-memory object store for tests and single-node deployments.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use docspace_core::error::AppError;
use docspace_core::result::AppResult;
use docspace_core::traits::{ObjectMeta, ObjectStore};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    etag: String,
    last_modified: DateTime<Utc>,
}

/// In-memory object store over a concurrent map. Keys are flat strings,
/// exactly like the S3 backend it stands in for.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, StoredObject>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Content-derived etag, stable for identical bytes.
fn compute_etag(data: &Bytes) -> String {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<String> {
        let etag = compute_etag(&data);
        debug!(key, bytes = data.len(), "Stored object");
        self.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                etag: etag.clone(),
                last_modified: Utc::now(),
            },
        );
        Ok(etag)
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        self.objects
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))
    }

    async fn copy(&self, src_key: &str, dst_key: &str) -> AppResult<()> {
        let source = self
            .objects
            .get(src_key)
            .map(|o| o.clone())
            .ok_or_else(|| AppError::not_found(format!("Object not found: {src_key}")))?;
        self.objects.insert(
            dst_key.to_string(),
            StoredObject {
                last_modified: Utc::now(),
                ..source
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.remove(key);
        Ok(())
    }

    async fn list(&self, key_prefix: &str) -> AppResult<Vec<ObjectMeta>> {
        let mut metas: Vec<ObjectMeta> = self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(key_prefix))
            .map(|entry| ObjectMeta {
                key: entry.key().clone(),
                size: entry.value().data.len() as u64,
                etag: Some(entry.value().etag.clone()),
                last_modified: Some(entry.value().last_modified),
            })
            .collect();
        metas.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(metas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryObjectStore::new();
        let data = Bytes::from("hello world");

        let etag = store.put("space/file.txt", data.clone()).await.unwrap();
        assert!(!etag.is_empty());

        let read_back = store.get("space/file.txt").await.unwrap();
        assert_eq!(read_back, data);

        store.delete("space/file.txt").await.unwrap();
        assert!(store.get("space/file.txt").await.is_err());
        // Deleting a missing key is not an error.
        store.delete("space/file.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_copy_keeps_source() {
        let store = MemoryObjectStore::new();
        store.put("a", Bytes::from("content")).await.unwrap();

        store.copy("a", "b").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), store.get("b").await.unwrap());

        let err = store.copy("missing", "c").await.unwrap_err();
        assert_eq!(err.kind, docspace_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let store = MemoryObjectStore::new();
        store.put("s1/a/x.txt", Bytes::from("1")).await.unwrap();
        store.put("s1/a/y.txt", Bytes::from("2")).await.unwrap();
        store.put("s1/b/z.txt", Bytes::from("3")).await.unwrap();

        let listed = store.list("s1/a/").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].key, "s1/a/x.txt");
        assert_eq!(listed[1].key, "s1/a/y.txt");
    }

    #[tokio::test]
    async fn test_etag_is_content_derived() {
        let store = MemoryObjectStore::new();
        let first = store.put("k1", Bytes::from("same")).await.unwrap();
        let second = store.put("k2", Bytes::from("same")).await.unwrap();
        let other = store.put("k3", Bytes::from("different")).await.unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
    }
}
