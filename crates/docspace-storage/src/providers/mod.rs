//! Object-store provider implementations and selection.

pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use docspace_core::config::storage::{StorageConfig, StorageProvider};
use docspace_core::result::AppResult;
use docspace_core::traits::ObjectStore;

/// Build the object store the configuration selects.
pub async fn connect_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    match config.provider {
        #[cfg(feature = "s3")]
        StorageProvider::S3 => Ok(Arc::new(s3::S3ObjectStore::new(&config.s3).await?)),
        #[cfg(not(feature = "s3"))]
        StorageProvider::S3 => Err(docspace_core::error::AppError::configuration(
            "S3 support is not compiled into this build",
        )),
        StorageProvider::Memory => Ok(Arc::new(memory::MemoryObjectStore::new())),
    }
}
