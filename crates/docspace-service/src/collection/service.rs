//! User collection operations.

use std::sync::Arc;

use tracing::{debug, info};

use docspace_core::error::AppError;
use docspace_core::result::AppResult;
use docspace_core::traits::{Capability, CapabilityChecker};
use docspace_core::types::{CollectionId, EntryId, SpaceId};
use docspace_database::store::{CollectionStore, EntryStore};
use docspace_entity::collection::UserCollection;

use crate::context::RequestContext;

/// Manages a user's own collections: groupings of entries independent of
/// tree position.
#[derive(Clone)]
pub struct CollectionService {
    /// Collection store.
    collections: Arc<dyn CollectionStore>,
    /// Entry store, for membership validation.
    entries: Arc<dyn EntryStore>,
    /// Capability checker.
    capabilities: Arc<dyn CapabilityChecker>,
}

impl std::fmt::Debug for CollectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionService").finish()
    }
}

impl CollectionService {
    /// Creates a new collection service.
    pub fn new(
        collections: Arc<dyn CollectionStore>,
        entries: Arc<dyn EntryStore>,
        capabilities: Arc<dyn CapabilityChecker>,
    ) -> Self {
        Self {
            collections,
            entries,
            capabilities,
        }
    }

    async fn require_read(&self, ctx: &RequestContext, space_id: SpaceId) -> AppResult<()> {
        if self
            .capabilities
            .allows(ctx.user_id, space_id, Capability::Read)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "User {} lacks Read on space {space_id}",
                ctx.user_id
            )))
        }
    }

    /// Load a collection the caller owns.
    async fn owned_collection(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
    ) -> AppResult<UserCollection> {
        let collection = self
            .collections
            .find(collection_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Collection {collection_id} not found")))?;
        if collection.owner_user_id != ctx.user_id {
            return Err(AppError::forbidden(format!(
                "Collection '{}' belongs to another user",
                collection.name
            )));
        }
        Ok(collection)
    }

    /// Add an entry to the caller's collection named `name`, creating the
    /// collection if it does not exist yet. Adding an entry that is
    /// already a member is a no-op, not an error.
    pub async fn add_to_collection(
        &self,
        ctx: &RequestContext,
        space_id: SpaceId,
        name: &str,
        entry_id: EntryId,
    ) -> AppResult<UserCollection> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Collection name cannot be empty"));
        }
        self.require_read(ctx, space_id).await?;

        let entry = self
            .entries
            .find_by_id(entry_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Entry {entry_id} not found")))?;
        if entry.document_space_id != space_id {
            return Err(AppError::validation(format!(
                "Entry '{}' belongs to a different space",
                entry.item_name
            )));
        }

        let collection = self
            .collections
            .get_or_create(space_id, ctx.user_id, name)
            .await?;
        let added = self.collections.add_entry(collection.id, entry_id).await?;
        if added {
            info!(
                user_id = %ctx.user_id,
                collection = %collection.name,
                entry_id = %entry_id,
                "Entry added to collection"
            );
        }
        Ok(collection)
    }

    /// List the caller's collections in a space.
    pub async fn list_collections(
        &self,
        ctx: &RequestContext,
        space_id: SpaceId,
    ) -> AppResult<Vec<UserCollection>> {
        self.require_read(ctx, space_id).await?;
        self.collections.list_for_owner(space_id, ctx.user_id).await
    }

    /// Fetch one of the caller's collections with its member entry ids.
    pub async fn get_collection(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
    ) -> AppResult<(UserCollection, Vec<EntryId>)> {
        let collection = self.owned_collection(ctx, collection_id).await?;
        let members = self.collections.entries(collection_id).await?;
        Ok((collection, members))
    }

    /// Remove an entry from one of the caller's collections. Returns
    /// `false` if it was not a member.
    pub async fn remove_from_collection(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
        entry_id: EntryId,
    ) -> AppResult<bool> {
        self.owned_collection(ctx, collection_id).await?;
        self.collections.remove_entry(collection_id, entry_id).await
    }

    /// Delete one of the caller's collections. The member entries are
    /// untouched.
    pub async fn delete_collection(
        &self,
        ctx: &RequestContext,
        collection_id: CollectionId,
    ) -> AppResult<bool> {
        let collection = self.owned_collection(ctx, collection_id).await?;
        let deleted = self.collections.delete_collection(collection_id).await?;
        if deleted {
            debug!(user_id = %ctx.user_id, collection = %collection.name, "Collection deleted");
        }
        Ok(deleted)
    }
}
