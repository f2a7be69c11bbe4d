//! Access record repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use docspace_core::error::{AppError, ErrorKind};
use docspace_core::result::AppResult;
use docspace_core::types::{EntryId, UserId};
use docspace_entity::access::FileSystemAccessRecord;

use crate::store::AccessRecordStore;

/// Repository for per-(entry, user) access records.
#[derive(Debug, Clone)]
pub struct AccessRecordRepository {
    pool: PgPool,
}

impl AccessRecordRepository {
    /// Create a new access record repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRecordStore for AccessRecordRepository {
    async fn upsert(
        &self,
        entry_id: EntryId,
        user_id: UserId,
    ) -> AppResult<FileSystemAccessRecord> {
        sqlx::query_as::<_, FileSystemAccessRecord>(
            "INSERT INTO file_system_access_records (entry_id, user_id, last_downloaded) \
             VALUES ($1, $2, NOW()) \
             ON CONFLICT (entry_id, user_id) DO UPDATE SET last_downloaded = NOW() \
             RETURNING *",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to upsert access record", e)
        })
    }

    async fn find(
        &self,
        entry_id: EntryId,
        user_id: UserId,
    ) -> AppResult<Option<FileSystemAccessRecord>> {
        sqlx::query_as::<_, FileSystemAccessRecord>(
            "SELECT * FROM file_system_access_records WHERE entry_id = $1 AND user_id = $2",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find access record", e))
    }

    async fn list_for_entry(&self, entry_id: EntryId) -> AppResult<Vec<FileSystemAccessRecord>> {
        sqlx::query_as::<_, FileSystemAccessRecord>(
            "SELECT * FROM file_system_access_records WHERE entry_id = $1",
        )
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list access records", e)
        })
    }
}
