//! Access record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docspace_core::types::{EntryId, UserId};

/// Last-download bookkeeping for one (entry, user) pair. Removed
/// automatically when the owning entry is removed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileSystemAccessRecord {
    /// The entry that was accessed.
    pub entry_id: EntryId,
    /// The accessing user.
    pub user_id: UserId,
    /// When the user last downloaded the entry.
    pub last_downloaded: DateTime<Utc>,
}
