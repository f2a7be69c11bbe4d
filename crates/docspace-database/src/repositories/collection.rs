//! User collection repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use docspace_core::error::{AppError, ErrorKind};
use docspace_core::result::AppResult;
use docspace_core::types::{CollectionId, EntryId, SpaceId, UserId};
use docspace_entity::collection::UserCollection;

use crate::store::CollectionStore;

/// Repository for user collections and their memberships.
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    pool: PgPool,
}

impl CollectionRepository {
    /// Create a new collection repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollectionStore for CollectionRepository {
    async fn get_or_create(
        &self,
        space_id: SpaceId,
        owner_user_id: UserId,
        name: &str,
    ) -> AppResult<UserCollection> {
        // ON CONFLICT DO NOTHING returns no row for the existing case, so
        // fall through to a plain lookup.
        let inserted = sqlx::query_as::<_, UserCollection>(
            "INSERT INTO user_collections (id, document_space_id, owner_user_id, name) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (document_space_id, owner_user_id, name) DO NOTHING \
             RETURNING *",
        )
        .bind(CollectionId::new())
        .bind(space_id)
        .bind(owner_user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create collection", e)
        })?;

        if let Some(collection) = inserted {
            return Ok(collection);
        }

        sqlx::query_as::<_, UserCollection>(
            "SELECT * FROM user_collections \
             WHERE document_space_id = $1 AND owner_user_id = $2 AND name = $3",
        )
        .bind(space_id)
        .bind(owner_user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find collection", e))?
        .ok_or_else(|| {
            AppError::database(format!(
                "Collection '{name}' vanished between insert and lookup"
            ))
        })
    }

    async fn find(&self, id: CollectionId) -> AppResult<Option<UserCollection>> {
        sqlx::query_as::<_, UserCollection>("SELECT * FROM user_collections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find collection", e))
    }

    async fn list_for_owner(
        &self,
        space_id: SpaceId,
        owner_user_id: UserId,
    ) -> AppResult<Vec<UserCollection>> {
        sqlx::query_as::<_, UserCollection>(
            "SELECT * FROM user_collections \
             WHERE document_space_id = $1 AND owner_user_id = $2 ORDER BY name ASC",
        )
        .bind(space_id)
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list collections", e))
    }

    async fn add_entry(&self, collection_id: CollectionId, entry_id: EntryId) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO user_collection_entries (collection_id, entry_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(collection_id)
        .bind(entry_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to add collection entry", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_entry(
        &self,
        collection_id: CollectionId,
        entry_id: EntryId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM user_collection_entries WHERE collection_id = $1 AND entry_id = $2",
        )
        .bind(collection_id)
        .bind(entry_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to remove collection entry", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn entries(&self, collection_id: CollectionId) -> AppResult<Vec<EntryId>> {
        sqlx::query_scalar::<_, EntryId>(
            "SELECT entry_id FROM user_collection_entries WHERE collection_id = $1",
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list collection entries", e)
        })
    }

    async fn remove_entry_everywhere(&self, entry_id: EntryId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_collection_entries WHERE entry_id = $1")
            .bind(entry_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge collection entry", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn delete_collection(&self, id: CollectionId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_collections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete collection", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
