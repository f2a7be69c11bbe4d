//! Document space repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use docspace_core::error::{AppError, ErrorKind};
use docspace_core::result::AppResult;
use docspace_core::types::SpaceId;
use docspace_entity::space::DocumentSpace;

use crate::store::SpaceStore;

/// Repository for document space CRUD.
#[derive(Debug, Clone)]
pub struct SpaceRepository {
    pool: PgPool,
}

impl SpaceRepository {
    /// Create a new space repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpaceStore for SpaceRepository {
    async fn create_space(&self, name: &str) -> AppResult<DocumentSpace> {
        sqlx::query_as::<_, DocumentSpace>(
            "INSERT INTO document_spaces (id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(SpaceId::new())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("document_spaces_name_key") =>
            {
                AppError::conflict(format!("Document space '{name}' already exists"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create space", e),
        })
    }

    async fn find_space(&self, id: SpaceId) -> AppResult<Option<DocumentSpace>> {
        sqlx::query_as::<_, DocumentSpace>("SELECT * FROM document_spaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find space", e))
    }

    async fn find_space_by_name(&self, name: &str) -> AppResult<Option<DocumentSpace>> {
        sqlx::query_as::<_, DocumentSpace>("SELECT * FROM document_spaces WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find space by name", e)
            })
    }

    async fn list_spaces(&self) -> AppResult<Vec<DocumentSpace>> {
        sqlx::query_as::<_, DocumentSpace>("SELECT * FROM document_spaces ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list spaces", e))
    }

    async fn delete_space(&self, id: SpaceId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM document_spaces WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete space", e))?;
        Ok(result.rows_affected() > 0)
    }
}
