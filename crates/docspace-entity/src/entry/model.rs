//! File-system entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docspace_core::types::{EntryId, PathId, SpaceId, UserId};

/// A node of a space's tree: a folder or a file.
///
/// The entry carries two identifiers. `id` is the row identity; `path_id`
/// is the stable addressing identifier minted once at creation and
/// embedded in physical object-storage keys. Renames and moves touch
/// `item_name` and `parent_path_id` only — no store operation rewrites
/// `path_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileSystemEntry {
    /// Row identity.
    pub id: EntryId,
    /// The space this entry belongs to.
    pub document_space_id: SpaceId,
    /// Path identifier of the parent folder; [`PathId::NIL`] for entries
    /// directly under the space root.
    pub parent_path_id: PathId,
    /// Stable path identifier of this entry.
    pub path_id: PathId,
    /// Entry name within its parent.
    pub item_name: String,
    /// Whether this entry is a folder.
    pub is_folder: bool,
    /// File size in bytes (0 for folders).
    pub size: i64,
    /// ETag of the stored object (files only).
    pub etag: Option<String>,
    /// Soft-delete flag. Archived entries keep their row and object but
    /// are invisible to path resolution.
    pub is_archived: bool,
    /// The user who created the entry.
    pub created_by: UserId,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// The user who last modified the entry, if ever modified.
    pub last_modified_by: Option<UserId>,
    /// When the entry was last modified.
    pub last_modified_at: DateTime<Utc>,
    /// Last download or comparable activity against this entry.
    pub last_activity: DateTime<Utc>,
}

impl FileSystemEntry {
    /// Whether this entry sits directly under the space root.
    pub fn is_root_level(&self) -> bool {
        self.parent_path_id.is_nil()
    }
}

/// Data required to insert a new entry. The store mints the `path_id`
/// when the row is created; callers cannot supply one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    /// The space to insert into.
    pub document_space_id: SpaceId,
    /// Path identifier of the parent folder ([`PathId::NIL`] for the root).
    pub parent_path_id: PathId,
    /// Entry name within its parent.
    pub item_name: String,
    /// Whether this entry is a folder.
    pub is_folder: bool,
    /// File size in bytes (0 for folders).
    pub size: i64,
    /// ETag of the stored object (files only).
    pub etag: Option<String>,
    /// The creating user.
    pub created_by: UserId,
}

/// Archive-state filter for child listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildFilter {
    /// Live entries only (the default view).
    Live,
    /// Archived entries only.
    Archived,
    /// Live and archived entries.
    All,
}

impl ChildFilter {
    /// Whether an entry with the given archive flag passes this filter.
    pub fn matches(&self, is_archived: bool) -> bool {
        match self {
            Self::Live => !is_archived,
            Self::Archived => is_archived,
            Self::All => true,
        }
    }
}
