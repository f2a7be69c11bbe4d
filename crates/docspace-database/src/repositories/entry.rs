//! File-system entry repository implementation.
//!
//! Every mutation that checks-then-writes runs inside a single
//! transaction and re-validates the sibling uniqueness scope before
//! committing; the partial-scope unique index backs the check up against
//! races, and its violation is mapped to `Conflict`.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use docspace_core::error::{AppError, ErrorKind};
use docspace_core::result::AppResult;
use docspace_core::types::{EntryId, PathId, SpaceId, UserId};
use docspace_entity::entry::{ChildFilter, FileSystemEntry, NewEntry};

use crate::store::EntryStore;

/// Repository for tree-node CRUD and subtree queries.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    pool: PgPool,
}

impl EntryRepository {
    /// Create a new entry repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load an entry inside a transaction, locking its row.
    async fn lock_entry(
        tx: &mut Transaction<'_, Postgres>,
        id: EntryId,
    ) -> AppResult<FileSystemEntry> {
        sqlx::query_as::<_, FileSystemEntry>(
            "SELECT * FROM file_system_entries WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load entry", e))?
        .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))
    }

    /// Fail with `Conflict` if a different entry occupies the given
    /// sibling-name slot.
    async fn check_sibling_slot(
        tx: &mut Transaction<'_, Postgres>,
        space_id: SpaceId,
        parent_path_id: PathId,
        item_name: &str,
        is_archived: bool,
        exclude: Option<EntryId>,
    ) -> AppResult<()> {
        let clash: Option<EntryId> = sqlx::query_scalar(
            "SELECT id FROM file_system_entries \
             WHERE document_space_id = $1 AND parent_path_id = $2 \
               AND item_name = $3 AND is_archived = $4",
        )
        .bind(space_id)
        .bind(parent_path_id)
        .bind(item_name)
        .bind(is_archived)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check siblings", e))?;

        match clash {
            Some(id) if Some(id) != exclude => Err(sibling_conflict(parent_path_id, item_name)),
            _ => Ok(()),
        }
    }
}

fn sibling_conflict(parent_path_id: PathId, item_name: &str) -> AppError {
    AppError::conflict(format!(
        "An item named '{item_name}' already exists under parent {parent_path_id}"
    ))
}

/// Map a unique-index violation raced past the in-transaction check.
fn map_write_error(e: sqlx::Error, parent_path_id: PathId, item_name: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some("file_system_entries_sibling_name_key") =>
        {
            sibling_conflict(parent_path_id, item_name)
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to write entry", e),
    }
}

async fn begin(pool: &PgPool) -> AppResult<Transaction<'_, Postgres>> {
    pool.begin()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))
}

async fn commit(tx: Transaction<'_, Postgres>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))
}

#[async_trait]
impl EntryStore for EntryRepository {
    async fn find_by_id(&self, id: EntryId) -> AppResult<Option<FileSystemEntry>> {
        sqlx::query_as::<_, FileSystemEntry>("SELECT * FROM file_system_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find entry", e))
    }

    async fn find_by_path_id(
        &self,
        space_id: SpaceId,
        path_id: PathId,
    ) -> AppResult<Option<FileSystemEntry>> {
        sqlx::query_as::<_, FileSystemEntry>(
            "SELECT * FROM file_system_entries WHERE document_space_id = $1 AND path_id = $2",
        )
        .bind(space_id)
        .bind(path_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find entry by path id", e)
        })
    }

    async fn find_live_child(
        &self,
        space_id: SpaceId,
        parent_path_id: PathId,
        item_name: &str,
    ) -> AppResult<Option<FileSystemEntry>> {
        sqlx::query_as::<_, FileSystemEntry>(
            "SELECT * FROM file_system_entries \
             WHERE document_space_id = $1 AND parent_path_id = $2 \
               AND item_name = $3 AND is_archived = FALSE",
        )
        .bind(space_id)
        .bind(parent_path_id)
        .bind(item_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find child", e))
    }

    async fn list_children(
        &self,
        space_id: SpaceId,
        parent_path_id: PathId,
        filter: ChildFilter,
    ) -> AppResult<Vec<FileSystemEntry>> {
        let sql = match filter {
            ChildFilter::Live => {
                "SELECT * FROM file_system_entries \
                 WHERE document_space_id = $1 AND parent_path_id = $2 AND is_archived = FALSE \
                 ORDER BY item_name ASC"
            }
            ChildFilter::Archived => {
                "SELECT * FROM file_system_entries \
                 WHERE document_space_id = $1 AND parent_path_id = $2 AND is_archived = TRUE \
                 ORDER BY item_name ASC"
            }
            ChildFilter::All => {
                "SELECT * FROM file_system_entries \
                 WHERE document_space_id = $1 AND parent_path_id = $2 \
                 ORDER BY item_name ASC"
            }
        };

        sqlx::query_as::<_, FileSystemEntry>(sql)
            .bind(space_id)
            .bind(parent_path_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn insert(&self, entry: NewEntry) -> AppResult<FileSystemEntry> {
        let mut tx = begin(&self.pool).await?;

        Self::check_sibling_slot(
            &mut tx,
            entry.document_space_id,
            entry.parent_path_id,
            &entry.item_name,
            false,
            None,
        )
        .await?;

        let created = sqlx::query_as::<_, FileSystemEntry>(
            "INSERT INTO file_system_entries \
               (id, document_space_id, parent_path_id, path_id, item_name, \
                is_folder, size, etag, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(EntryId::new())
        .bind(entry.document_space_id)
        .bind(entry.parent_path_id)
        .bind(PathId::new())
        .bind(&entry.item_name)
        .bind(entry.is_folder)
        .bind(entry.size)
        .bind(&entry.etag)
        .bind(entry.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, entry.parent_path_id, &entry.item_name))?;

        commit(tx).await?;
        Ok(created)
    }

    async fn rename(
        &self,
        id: EntryId,
        new_name: &str,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry> {
        let mut tx = begin(&self.pool).await?;
        let entry = Self::lock_entry(&mut tx, id).await?;

        Self::check_sibling_slot(
            &mut tx,
            entry.document_space_id,
            entry.parent_path_id,
            new_name,
            entry.is_archived,
            Some(id),
        )
        .await?;

        let updated = sqlx::query_as::<_, FileSystemEntry>(
            "UPDATE file_system_entries \
             SET item_name = $2, last_modified_by = $3, last_modified_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_name)
        .bind(modified_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, entry.parent_path_id, new_name))?;

        commit(tx).await?;
        Ok(updated)
    }

    async fn reparent(
        &self,
        id: EntryId,
        new_parent_path_id: PathId,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry> {
        let mut tx = begin(&self.pool).await?;
        let entry = Self::lock_entry(&mut tx, id).await?;

        Self::check_sibling_slot(
            &mut tx,
            entry.document_space_id,
            new_parent_path_id,
            &entry.item_name,
            entry.is_archived,
            Some(id),
        )
        .await?;

        let updated = sqlx::query_as::<_, FileSystemEntry>(
            "UPDATE file_system_entries \
             SET parent_path_id = $2, last_modified_by = $3, last_modified_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_parent_path_id)
        .bind(modified_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, new_parent_path_id, &entry.item_name))?;

        commit(tx).await?;
        Ok(updated)
    }

    async fn set_archived(
        &self,
        id: EntryId,
        archived: bool,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry> {
        let mut tx = begin(&self.pool).await?;
        let entry = Self::lock_entry(&mut tx, id).await?;

        if entry.is_archived == archived {
            commit(tx).await?;
            return Ok(entry);
        }

        // The target scope may already hold a same-name sibling.
        Self::check_sibling_slot(
            &mut tx,
            entry.document_space_id,
            entry.parent_path_id,
            &entry.item_name,
            archived,
            Some(id),
        )
        .await?;

        let updated = sqlx::query_as::<_, FileSystemEntry>(
            "UPDATE file_system_entries \
             SET is_archived = $2, last_modified_by = $3, last_modified_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(archived)
        .bind(modified_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, entry.parent_path_id, &entry.item_name))?;

        commit(tx).await?;
        Ok(updated)
    }

    async fn record_content(
        &self,
        id: EntryId,
        size: i64,
        etag: &str,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry> {
        sqlx::query_as::<_, FileSystemEntry>(
            "UPDATE file_system_entries \
             SET size = $2, etag = $3, last_modified_by = $4, last_modified_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(size)
        .bind(etag)
        .bind(modified_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record content", e))?
        .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))
    }

    async fn touch_activity(&self, id: EntryId) -> AppResult<()> {
        sqlx::query("UPDATE file_system_entries SET last_activity = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch entry", e))?;
        Ok(())
    }

    async fn delete_subtree(&self, id: EntryId) -> AppResult<Vec<EntryId>> {
        // Access records and collection memberships follow via ON DELETE
        // CASCADE.
        sqlx::query_scalar::<_, EntryId>(
            "WITH RECURSIVE doomed AS ( \
                SELECT id, path_id, document_space_id \
                FROM file_system_entries WHERE id = $1 \
                UNION ALL \
                SELECT f.id, f.path_id, f.document_space_id \
                FROM file_system_entries f \
                INNER JOIN doomed d \
                    ON f.document_space_id = d.document_space_id \
                   AND f.parent_path_id = d.path_id \
             ) \
             DELETE FROM file_system_entries \
             WHERE id IN (SELECT id FROM doomed) RETURNING id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete subtree", e))
    }
}
