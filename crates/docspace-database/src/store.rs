//! Store traits the tree core is written against.
//!
//! Every check-then-write runs inside one transaction of the backing
//! implementation and re-validates the `(document_space_id,
//! parent_path_id, item_name, is_archived)` uniqueness scope at commit;
//! the loser of a concurrent race receives `Conflict`. None of the
//! mutating operations exposes a way to rewrite an entry's `path_id`.

use async_trait::async_trait;

use docspace_core::result::AppResult;
use docspace_core::types::{CollectionId, EntryId, PathId, SpaceId, UserId};
use docspace_entity::access::FileSystemAccessRecord;
use docspace_entity::collection::UserCollection;
use docspace_entity::entry::{ChildFilter, FileSystemEntry, NewEntry};
use docspace_entity::space::DocumentSpace;

/// CRUD over document spaces.
#[async_trait]
pub trait SpaceStore: Send + Sync + 'static {
    /// Create a space with a unique name.
    async fn create_space(&self, name: &str) -> AppResult<DocumentSpace>;

    /// Find a space by id.
    async fn find_space(&self, id: SpaceId) -> AppResult<Option<DocumentSpace>>;

    /// Find a space by its unique name.
    async fn find_space_by_name(&self, name: &str) -> AppResult<Option<DocumentSpace>>;

    /// List all spaces.
    async fn list_spaces(&self) -> AppResult<Vec<DocumentSpace>>;

    /// Delete a space, cascading every entry and collection beneath it.
    /// Returns `true` if a space was deleted.
    async fn delete_space(&self, id: SpaceId) -> AppResult<bool>;
}

/// Persistent table of tree nodes.
#[async_trait]
pub trait EntryStore: Send + Sync + 'static {
    /// Find an entry by row identity.
    async fn find_by_id(&self, id: EntryId) -> AppResult<Option<FileSystemEntry>>;

    /// Find an entry by its stable path identifier.
    async fn find_by_path_id(
        &self,
        space_id: SpaceId,
        path_id: PathId,
    ) -> AppResult<Option<FileSystemEntry>>;

    /// Find the unique live child of a folder by name.
    async fn find_live_child(
        &self,
        space_id: SpaceId,
        parent_path_id: PathId,
        item_name: &str,
    ) -> AppResult<Option<FileSystemEntry>>;

    /// List the children of a folder, name-ordered.
    async fn list_children(
        &self,
        space_id: SpaceId,
        parent_path_id: PathId,
        filter: ChildFilter,
    ) -> AppResult<Vec<FileSystemEntry>>;

    /// Insert a new entry, minting its path identifier. Fails with
    /// `Conflict` if a sibling with the same name exists in the same
    /// archive scope.
    async fn insert(&self, entry: NewEntry) -> AppResult<FileSystemEntry>;

    /// Rename an entry, re-validating sibling uniqueness in its current
    /// archive scope.
    async fn rename(
        &self,
        id: EntryId,
        new_name: &str,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry>;

    /// Reparent an entry, re-validating uniqueness under the new parent.
    /// Only `parent_path_id` changes; the entry's own `path_id` and every
    /// descendant's are untouched.
    async fn reparent(
        &self,
        id: EntryId,
        new_parent_path_id: PathId,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry>;

    /// Flip the archive flag, re-validating uniqueness in the target
    /// scope (a same-name sibling already in that scope wins).
    async fn set_archived(
        &self,
        id: EntryId,
        archived: bool,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry>;

    /// Record new content metadata for a file after a re-upload.
    async fn record_content(
        &self,
        id: EntryId,
        size: i64,
        etag: &str,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry>;

    /// Bump the entry's last-activity timestamp.
    async fn touch_activity(&self, id: EntryId) -> AppResult<()>;

    /// Remove the entry and every descendant. Access records and
    /// collection memberships of the removed rows go with them. Returns
    /// the removed row identities.
    async fn delete_subtree(&self, id: EntryId) -> AppResult<Vec<EntryId>>;
}

/// Per-(entry, user) last-access bookkeeping.
#[async_trait]
pub trait AccessRecordStore: Send + Sync + 'static {
    /// Insert or refresh the record with the current time.
    async fn upsert(&self, entry_id: EntryId, user_id: UserId)
    -> AppResult<FileSystemAccessRecord>;

    /// Find the record for one (entry, user) pair.
    async fn find(
        &self,
        entry_id: EntryId,
        user_id: UserId,
    ) -> AppResult<Option<FileSystemAccessRecord>>;

    /// List every record for an entry.
    async fn list_for_entry(&self, entry_id: EntryId) -> AppResult<Vec<FileSystemAccessRecord>>;
}

/// User-curated collections of entries.
#[async_trait]
pub trait CollectionStore: Send + Sync + 'static {
    /// Fetch the collection with the unique (space, owner, name) key,
    /// creating it if absent.
    async fn get_or_create(
        &self,
        space_id: SpaceId,
        owner_user_id: UserId,
        name: &str,
    ) -> AppResult<UserCollection>;

    /// Find a collection by id.
    async fn find(&self, id: CollectionId) -> AppResult<Option<UserCollection>>;

    /// List an owner's collections in a space.
    async fn list_for_owner(
        &self,
        space_id: SpaceId,
        owner_user_id: UserId,
    ) -> AppResult<Vec<UserCollection>>;

    /// Add an entry to a collection. Returns `false` if it was already a
    /// member (a no-op, not an error).
    async fn add_entry(&self, collection_id: CollectionId, entry_id: EntryId) -> AppResult<bool>;

    /// Remove an entry from a collection. Returns `false` if it was not a
    /// member.
    async fn remove_entry(&self, collection_id: CollectionId, entry_id: EntryId)
    -> AppResult<bool>;

    /// List the member entries of a collection.
    async fn entries(&self, collection_id: CollectionId) -> AppResult<Vec<EntryId>>;

    /// Purge an entry from every collection. Returns the number of
    /// memberships removed.
    async fn remove_entry_everywhere(&self, entry_id: EntryId) -> AppResult<u64>;

    /// Delete a collection and its memberships. Returns `true` if a
    /// collection was deleted.
    async fn delete_collection(&self, id: CollectionId) -> AppResult<bool>;
}
