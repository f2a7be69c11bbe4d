//! User collection entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docspace_core::types::{CollectionId, EntryId, SpaceId, UserId};

/// A user-curated grouping of entries, independent of tree position.
/// Unique per (space, owner, name).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserCollection {
    /// Unique collection identifier.
    pub id: CollectionId,
    /// The space the collected entries live in.
    pub document_space_id: SpaceId,
    /// The owning user.
    pub owner_user_id: UserId,
    /// Collection name, unique per space and owner.
    pub name: String,
    /// When the collection was created.
    pub created_at: DateTime<Utc>,
}

/// Membership of one entry in one collection. Removed automatically when
/// either side is removed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CollectionMembership {
    /// The collection.
    pub collection_id: CollectionId,
    /// The member entry.
    pub entry_id: EntryId,
}
