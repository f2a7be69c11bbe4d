//! Last-download bookkeeping per (entry, user).

use std::sync::Arc;

use tracing::debug;

use docspace_core::error::AppError;
use docspace_core::result::AppResult;
use docspace_core::types::{EntryId, UserId};
use docspace_database::store::{AccessRecordStore, EntryStore};
use docspace_entity::access::FileSystemAccessRecord;

/// Tracks per-user access to entries.
///
/// Invoked by the download-serving path after a successful transfer, not
/// by create or rename; authorization already happened there.
#[derive(Clone)]
pub struct AccessTracker {
    /// Entry store, for existence checks and activity touches.
    entries: Arc<dyn EntryStore>,
    /// Access record store.
    access: Arc<dyn AccessRecordStore>,
}

impl std::fmt::Debug for AccessTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTracker").finish()
    }
}

impl AccessTracker {
    /// Creates a new access tracker.
    pub fn new(entries: Arc<dyn EntryStore>, access: Arc<dyn AccessRecordStore>) -> Self {
        Self { entries, access }
    }

    /// Record that `user_id` downloaded `entry_id` just now, and bump the
    /// entry's last-activity timestamp.
    pub async fn record_download(
        &self,
        entry_id: EntryId,
        user_id: UserId,
    ) -> AppResult<FileSystemAccessRecord> {
        self.entries
            .find_by_id(entry_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Entry {entry_id} not found")))?;

        let record = self.access.upsert(entry_id, user_id).await?;
        self.entries.touch_activity(entry_id).await?;

        debug!(entry_id = %entry_id, user_id = %user_id, "Download recorded");
        Ok(record)
    }

    /// When the user last downloaded the entry, if ever.
    pub async fn last_download(
        &self,
        entry_id: EntryId,
        user_id: UserId,
    ) -> AppResult<Option<FileSystemAccessRecord>> {
        self.access.find(entry_id, user_id).await
    }
}
