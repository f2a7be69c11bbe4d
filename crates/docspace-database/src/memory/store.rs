//! In-memory implementation of the metadata store traits.
//!
//! One Tokio mutex guards all tables, so every mutating operation is a
//! single critical section with the same check-then-write atomicity the
//! PostgreSQL repositories get from a transaction. Cascade behavior
//! (access records and collection memberships dying with their entries)
//! matches the schema's foreign keys.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use docspace_core::error::AppError;
use docspace_core::result::AppResult;
use docspace_core::types::{CollectionId, EntryId, PathId, SpaceId, UserId};
use docspace_entity::access::FileSystemAccessRecord;
use docspace_entity::collection::UserCollection;
use docspace_entity::entry::{ChildFilter, FileSystemEntry, NewEntry};
use docspace_entity::space::DocumentSpace;

use crate::store::{AccessRecordStore, CollectionStore, EntryStore, SpaceStore};

/// All tables of the metadata store.
#[derive(Debug, Default)]
struct State {
    spaces: HashMap<SpaceId, DocumentSpace>,
    entries: HashMap<EntryId, FileSystemEntry>,
    access: HashMap<(EntryId, UserId), FileSystemAccessRecord>,
    collections: HashMap<CollectionId, UserCollection>,
    memberships: HashMap<CollectionId, HashSet<EntryId>>,
}

impl State {
    fn sibling_occupied(
        &self,
        space_id: SpaceId,
        parent_path_id: PathId,
        item_name: &str,
        is_archived: bool,
        exclude: Option<EntryId>,
    ) -> bool {
        self.entries.values().any(|e| {
            e.document_space_id == space_id
                && e.parent_path_id == parent_path_id
                && e.item_name == item_name
                && e.is_archived == is_archived
                && Some(e.id) != exclude
        })
    }

    fn entry(&self, id: EntryId) -> AppResult<&FileSystemEntry> {
        self.entries
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))
    }

    /// The entry plus every descendant, by parent-path-id linkage.
    fn subtree_ids(&self, root: EntryId) -> Vec<EntryId> {
        let Some(root_entry) = self.entries.get(&root) else {
            return Vec::new();
        };
        let space = root_entry.document_space_id;

        let mut out = vec![root];
        let mut frontier = vec![root_entry.path_id];
        while let Some(parent) = frontier.pop() {
            for e in self.entries.values() {
                if e.document_space_id == space && e.parent_path_id == parent {
                    out.push(e.id);
                    frontier.push(e.path_id);
                }
            }
        }
        out
    }

    fn remove_entry_rows(&mut self, ids: &[EntryId]) {
        for id in ids {
            self.entries.remove(id);
            self.access.retain(|(entry_id, _), _| entry_id != id);
            for members in self.memberships.values_mut() {
                members.remove(id);
            }
        }
    }
}

fn sibling_conflict(parent_path_id: PathId, item_name: &str) -> AppError {
    AppError::conflict(format!(
        "An item named '{item_name}' already exists under parent {parent_path_id}"
    ))
}

/// In-memory metadata store. Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataStore {
    state: Arc<Mutex<State>>,
}

impl MemoryMetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpaceStore for MemoryMetadataStore {
    async fn create_space(&self, name: &str) -> AppResult<DocumentSpace> {
        let mut state = self.state.lock().await;
        if state.spaces.values().any(|s| s.name == name) {
            return Err(AppError::conflict(format!(
                "Document space '{name}' already exists"
            )));
        }
        let space = DocumentSpace {
            id: SpaceId::new(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.spaces.insert(space.id, space.clone());
        Ok(space)
    }

    async fn find_space(&self, id: SpaceId) -> AppResult<Option<DocumentSpace>> {
        Ok(self.state.lock().await.spaces.get(&id).cloned())
    }

    async fn find_space_by_name(&self, name: &str) -> AppResult<Option<DocumentSpace>> {
        Ok(self
            .state
            .lock()
            .await
            .spaces
            .values()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn list_spaces(&self) -> AppResult<Vec<DocumentSpace>> {
        let mut spaces: Vec<DocumentSpace> =
            self.state.lock().await.spaces.values().cloned().collect();
        spaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(spaces)
    }

    async fn delete_space(&self, id: SpaceId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.spaces.remove(&id).is_none() {
            return Ok(false);
        }

        let doomed: Vec<EntryId> = state
            .entries
            .values()
            .filter(|e| e.document_space_id == id)
            .map(|e| e.id)
            .collect();
        state.remove_entry_rows(&doomed);

        let dead_collections: Vec<CollectionId> = state
            .collections
            .values()
            .filter(|c| c.document_space_id == id)
            .map(|c| c.id)
            .collect();
        for collection_id in dead_collections {
            state.collections.remove(&collection_id);
            state.memberships.remove(&collection_id);
        }

        debug!(space_id = %id, entries = doomed.len(), "Space deleted");
        Ok(true)
    }
}

#[async_trait]
impl EntryStore for MemoryMetadataStore {
    async fn find_by_id(&self, id: EntryId) -> AppResult<Option<FileSystemEntry>> {
        Ok(self.state.lock().await.entries.get(&id).cloned())
    }

    async fn find_by_path_id(
        &self,
        space_id: SpaceId,
        path_id: PathId,
    ) -> AppResult<Option<FileSystemEntry>> {
        Ok(self
            .state
            .lock()
            .await
            .entries
            .values()
            .find(|e| e.document_space_id == space_id && e.path_id == path_id)
            .cloned())
    }

    async fn find_live_child(
        &self,
        space_id: SpaceId,
        parent_path_id: PathId,
        item_name: &str,
    ) -> AppResult<Option<FileSystemEntry>> {
        Ok(self
            .state
            .lock()
            .await
            .entries
            .values()
            .find(|e| {
                e.document_space_id == space_id
                    && e.parent_path_id == parent_path_id
                    && e.item_name == item_name
                    && !e.is_archived
            })
            .cloned())
    }

    async fn list_children(
        &self,
        space_id: SpaceId,
        parent_path_id: PathId,
        filter: ChildFilter,
    ) -> AppResult<Vec<FileSystemEntry>> {
        let state = self.state.lock().await;
        let mut children: Vec<FileSystemEntry> = state
            .entries
            .values()
            .filter(|e| {
                e.document_space_id == space_id
                    && e.parent_path_id == parent_path_id
                    && filter.matches(e.is_archived)
            })
            .cloned()
            .collect();
        children.sort_by(|a, b| a.item_name.cmp(&b.item_name));
        Ok(children)
    }

    async fn insert(&self, entry: NewEntry) -> AppResult<FileSystemEntry> {
        let mut state = self.state.lock().await;

        if !state.spaces.contains_key(&entry.document_space_id) {
            return Err(AppError::not_found(format!(
                "Document space {} not found",
                entry.document_space_id
            )));
        }
        if state.sibling_occupied(
            entry.document_space_id,
            entry.parent_path_id,
            &entry.item_name,
            false,
            None,
        ) {
            return Err(sibling_conflict(entry.parent_path_id, &entry.item_name));
        }

        let now = Utc::now();
        let created = FileSystemEntry {
            id: EntryId::new(),
            document_space_id: entry.document_space_id,
            parent_path_id: entry.parent_path_id,
            path_id: PathId::new(),
            item_name: entry.item_name,
            is_folder: entry.is_folder,
            size: entry.size,
            etag: entry.etag,
            is_archived: false,
            created_by: entry.created_by,
            created_at: now,
            last_modified_by: None,
            last_modified_at: now,
            last_activity: now,
        };
        state.entries.insert(created.id, created.clone());
        Ok(created)
    }

    async fn rename(
        &self,
        id: EntryId,
        new_name: &str,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry> {
        let mut state = self.state.lock().await;
        let entry = state.entry(id)?.clone();

        if state.sibling_occupied(
            entry.document_space_id,
            entry.parent_path_id,
            new_name,
            entry.is_archived,
            Some(id),
        ) {
            return Err(sibling_conflict(entry.parent_path_id, new_name));
        }

        let stored = state.entries.get_mut(&id).expect("checked above");
        stored.item_name = new_name.to_string();
        stored.last_modified_by = Some(modified_by);
        stored.last_modified_at = Utc::now();
        Ok(stored.clone())
    }

    async fn reparent(
        &self,
        id: EntryId,
        new_parent_path_id: PathId,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry> {
        let mut state = self.state.lock().await;
        let entry = state.entry(id)?.clone();

        if state.sibling_occupied(
            entry.document_space_id,
            new_parent_path_id,
            &entry.item_name,
            entry.is_archived,
            Some(id),
        ) {
            return Err(sibling_conflict(new_parent_path_id, &entry.item_name));
        }

        let stored = state.entries.get_mut(&id).expect("checked above");
        stored.parent_path_id = new_parent_path_id;
        stored.last_modified_by = Some(modified_by);
        stored.last_modified_at = Utc::now();
        Ok(stored.clone())
    }

    async fn set_archived(
        &self,
        id: EntryId,
        archived: bool,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry> {
        let mut state = self.state.lock().await;
        let entry = state.entry(id)?.clone();

        if entry.is_archived == archived {
            return Ok(entry);
        }
        if state.sibling_occupied(
            entry.document_space_id,
            entry.parent_path_id,
            &entry.item_name,
            archived,
            Some(id),
        ) {
            return Err(sibling_conflict(entry.parent_path_id, &entry.item_name));
        }

        let stored = state.entries.get_mut(&id).expect("checked above");
        stored.is_archived = archived;
        stored.last_modified_by = Some(modified_by);
        stored.last_modified_at = Utc::now();
        Ok(stored.clone())
    }

    async fn record_content(
        &self,
        id: EntryId,
        size: i64,
        etag: &str,
        modified_by: UserId,
    ) -> AppResult<FileSystemEntry> {
        let mut state = self.state.lock().await;
        state.entry(id)?;
        let stored = state.entries.get_mut(&id).expect("checked above");
        stored.size = size;
        stored.etag = Some(etag.to_string());
        stored.last_modified_by = Some(modified_by);
        stored.last_modified_at = Utc::now();
        Ok(stored.clone())
    }

    async fn touch_activity(&self, id: EntryId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(stored) = state.entries.get_mut(&id) {
            stored.last_activity = Utc::now();
        }
        Ok(())
    }

    async fn delete_subtree(&self, id: EntryId) -> AppResult<Vec<EntryId>> {
        let mut state = self.state.lock().await;
        state.entry(id)?;
        let doomed = state.subtree_ids(id);
        state.remove_entry_rows(&doomed);
        debug!(root = %id, removed = doomed.len(), "Subtree deleted");
        Ok(doomed)
    }
}

#[async_trait]
impl AccessRecordStore for MemoryMetadataStore {
    async fn upsert(
        &self,
        entry_id: EntryId,
        user_id: UserId,
    ) -> AppResult<FileSystemAccessRecord> {
        let mut state = self.state.lock().await;
        let record = FileSystemAccessRecord {
            entry_id,
            user_id,
            last_downloaded: Utc::now(),
        };
        state.access.insert((entry_id, user_id), record.clone());
        Ok(record)
    }

    async fn find(
        &self,
        entry_id: EntryId,
        user_id: UserId,
    ) -> AppResult<Option<FileSystemAccessRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .access
            .get(&(entry_id, user_id))
            .cloned())
    }

    async fn list_for_entry(&self, entry_id: EntryId) -> AppResult<Vec<FileSystemAccessRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .access
            .values()
            .filter(|r| r.entry_id == entry_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CollectionStore for MemoryMetadataStore {
    async fn get_or_create(
        &self,
        space_id: SpaceId,
        owner_user_id: UserId,
        name: &str,
    ) -> AppResult<UserCollection> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state
            .collections
            .values()
            .find(|c| {
                c.document_space_id == space_id
                    && c.owner_user_id == owner_user_id
                    && c.name == name
            })
            .cloned()
        {
            return Ok(existing);
        }

        let collection = UserCollection {
            id: CollectionId::new(),
            document_space_id: space_id,
            owner_user_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.collections.insert(collection.id, collection.clone());
        state.memberships.insert(collection.id, HashSet::new());
        Ok(collection)
    }

    async fn find(&self, id: CollectionId) -> AppResult<Option<UserCollection>> {
        Ok(self.state.lock().await.collections.get(&id).cloned())
    }

    async fn list_for_owner(
        &self,
        space_id: SpaceId,
        owner_user_id: UserId,
    ) -> AppResult<Vec<UserCollection>> {
        let state = self.state.lock().await;
        let mut collections: Vec<UserCollection> = state
            .collections
            .values()
            .filter(|c| c.document_space_id == space_id && c.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    async fn add_entry(&self, collection_id: CollectionId, entry_id: EntryId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if !state.collections.contains_key(&collection_id) {
            return Err(AppError::not_found(format!(
                "Collection {collection_id} not found"
            )));
        }
        Ok(state
            .memberships
            .entry(collection_id)
            .or_default()
            .insert(entry_id))
    }

    async fn remove_entry(
        &self,
        collection_id: CollectionId,
        entry_id: EntryId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .memberships
            .get_mut(&collection_id)
            .is_some_and(|members| members.remove(&entry_id)))
    }

    async fn entries(&self, collection_id: CollectionId) -> AppResult<Vec<EntryId>> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .get(&collection_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn remove_entry_everywhere(&self, entry_id: EntryId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut removed = 0u64;
        for members in state.memberships.values_mut() {
            if members.remove(&entry_id) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn delete_collection(&self, id: CollectionId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        state.memberships.remove(&id);
        Ok(state.collections.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use docspace_core::error::ErrorKind;

    use super::*;

    fn new_entry(space: SpaceId, parent: PathId, name: &str, is_folder: bool) -> NewEntry {
        NewEntry {
            document_space_id: space,
            parent_path_id: parent,
            item_name: name.to_string(),
            is_folder,
            size: 0,
            etag: None,
            created_by: UserId::new(),
        }
    }

    #[tokio::test]
    async fn test_live_sibling_conflict_and_archived_coexistence() {
        let store = MemoryMetadataStore::new();
        let space = store.create_space("engineering").await.unwrap();
        let user = UserId::new();

        let first = store
            .insert(new_entry(space.id, PathId::NIL, "q1.csv", false))
            .await
            .unwrap();

        let err = store
            .insert(new_entry(space.id, PathId::NIL, "q1.csv", false))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        store.set_archived(first.id, true, user).await.unwrap();
        let second = store
            .insert(new_entry(space.id, PathId::NIL, "q1.csv", false))
            .await
            .unwrap();
        assert_ne!(first.path_id, second.path_id);
    }

    #[tokio::test]
    async fn test_archive_into_occupied_scope_conflicts() {
        let store = MemoryMetadataStore::new();
        let space = store.create_space("s").await.unwrap();
        let user = UserId::new();

        let a = store
            .insert(new_entry(space.id, PathId::NIL, "notes.txt", false))
            .await
            .unwrap();
        store.set_archived(a.id, true, user).await.unwrap();

        let b = store
            .insert(new_entry(space.id, PathId::NIL, "notes.txt", false))
            .await
            .unwrap();
        let err = store.set_archived(b.id, true, user).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_rename_checks_uniqueness_and_keeps_path_id() {
        let store = MemoryMetadataStore::new();
        let space = store.create_space("s").await.unwrap();
        let user = UserId::new();

        let a = store
            .insert(new_entry(space.id, PathId::NIL, "a", true))
            .await
            .unwrap();
        store
            .insert(new_entry(space.id, PathId::NIL, "b", true))
            .await
            .unwrap();

        let err = store.rename(a.id, "b", user).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let renamed = store.rename(a.id, "c", user).await.unwrap();
        assert_eq!(renamed.path_id, a.path_id);
        assert_eq!(renamed.item_name, "c");
    }

    #[tokio::test]
    async fn test_delete_subtree_cascades_access_and_memberships() {
        let store = MemoryMetadataStore::new();
        let space = store.create_space("s").await.unwrap();
        let user = UserId::new();

        let folder = store
            .insert(new_entry(space.id, PathId::NIL, "docs", true))
            .await
            .unwrap();
        let file = store
            .insert(new_entry(space.id, folder.path_id, "a.txt", false))
            .await
            .unwrap();

        AccessRecordStore::upsert(&store, file.id, user).await.unwrap();
        let collection = store.get_or_create(space.id, user, "favs").await.unwrap();
        store.add_entry(collection.id, file.id).await.unwrap();

        let removed = store.delete_subtree(folder.id).await.unwrap();
        assert_eq!(removed.len(), 2);
        assert!(
            AccessRecordStore::find(&store, file.id, user)
                .await
                .unwrap()
                .is_none()
        );
        assert!(store.entries(collection.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_entry_is_idempotent() {
        let store = MemoryMetadataStore::new();
        let space = store.create_space("s").await.unwrap();
        let user = UserId::new();
        let file = store
            .insert(new_entry(space.id, PathId::NIL, "a.txt", false))
            .await
            .unwrap();

        let collection = store.get_or_create(space.id, user, "favs").await.unwrap();
        assert!(store.add_entry(collection.id, file.id).await.unwrap());
        assert!(!store.add_entry(collection.id, file.id).await.unwrap());
        assert_eq!(store.entries(collection.id).await.unwrap().len(), 1);

        let again = store.get_or_create(space.id, user, "favs").await.unwrap();
        assert_eq!(again.id, collection.id);
    }
}
