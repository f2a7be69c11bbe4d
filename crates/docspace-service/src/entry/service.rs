//! Tree mutation: create, rename, move, archive, and delete.
//!
//! Every mutating operation consults the capability checker first. The
//! check-then-write validation itself lives inside the entry store's
//! transaction; this layer sequences the object-store side effects so
//! that a crash mid-operation leaves at worst an orphaned object, never a
//! dangling metadata reference.

use std::sync::Arc;

use tracing::{info, warn};

use docspace_core::config::tree::TreeConfig;
use docspace_core::error::AppError;
use docspace_core::result::AppResult;
use docspace_core::traits::{Capability, CapabilityChecker, ObjectStore};
use docspace_core::types::{EntryId, SpaceId};
use docspace_database::store::{CollectionStore, EntryStore};
use docspace_entity::entry::{ChildFilter, FileSystemEntry, NewEntry, PathSpec};

use crate::context::RequestContext;
use crate::tree::resolver::PathResolver;

/// Mutates the file-system tree of a space.
#[derive(Clone)]
pub struct EntryService {
    /// Entry store.
    entries: Arc<dyn EntryStore>,
    /// Collection store, for purging references on delete.
    collections: Arc<dyn CollectionStore>,
    /// Object store.
    objects: Arc<dyn ObjectStore>,
    /// Capability checker.
    capabilities: Arc<dyn CapabilityChecker>,
    /// Path resolver.
    resolver: PathResolver,
    /// Tree limits.
    config: TreeConfig,
}

impl std::fmt::Debug for EntryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryService").finish()
    }
}

impl EntryService {
    /// Creates a new entry service.
    pub fn new(
        entries: Arc<dyn EntryStore>,
        collections: Arc<dyn CollectionStore>,
        objects: Arc<dyn ObjectStore>,
        capabilities: Arc<dyn CapabilityChecker>,
        config: TreeConfig,
    ) -> Self {
        Self {
            resolver: PathResolver::new(entries.clone()),
            entries,
            collections,
            objects,
            capabilities,
            config,
        }
    }

    /// The resolver this service walks paths with.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    async fn require(
        &self,
        ctx: &RequestContext,
        space_id: SpaceId,
        capability: Capability,
    ) -> AppResult<()> {
        if self
            .capabilities
            .allows(ctx.user_id, space_id, capability)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "User {} lacks {capability:?} on space {space_id}",
                ctx.user_id
            )))
        }
    }

    fn validate_name(name: &str) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Item name cannot be empty"));
        }
        if name.contains('/') || name == "." || name == ".." {
            return Err(AppError::validation(format!(
                "'{name}' is not a valid item name"
            )));
        }
        Ok(())
    }

    fn check_depth(&self, parent: &PathSpec, name: &str) -> AppResult<()> {
        let depth = parent.depth() + 1;
        if depth > self.config.max_depth {
            return Err(AppError::depth_exceeded(format!(
                "Creating '{name}' under '{}' would reach depth {depth}, \
                 exceeding the maximum of {}",
                parent.path, self.config.max_depth
            )));
        }
        Ok(())
    }

    async fn get_entry(&self, id: EntryId) -> AppResult<FileSystemEntry> {
        self.entries
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))
    }

    /// Resolve a path for a caller holding read access.
    pub async fn resolve_path(
        &self,
        ctx: &RequestContext,
        space_id: SpaceId,
        path: &str,
    ) -> AppResult<PathSpec> {
        self.require(ctx, space_id, Capability::Read).await?;
        self.resolver.resolve(space_id, path).await
    }

    /// List the children of a folder.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        space_id: SpaceId,
        folder_path: &str,
        filter: ChildFilter,
    ) -> AppResult<Vec<FileSystemEntry>> {
        self.require(ctx, space_id, Capability::Read).await?;
        let spec = self.resolver.resolve_folder(space_id, folder_path).await?;
        self.entries
            .list_children(space_id, spec.terminal_path_id(), filter)
            .await
    }

    /// Create a folder under `parent_path`.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        space_id: SpaceId,
        parent_path: &str,
        name: &str,
    ) -> AppResult<FileSystemEntry> {
        Self::validate_name(name)?;
        self.require(ctx, space_id, Capability::Write).await?;

        let parent = self.resolver.resolve_folder(space_id, parent_path).await?;
        self.check_depth(&parent, name)?;

        let created = self
            .entries
            .insert(NewEntry {
                document_space_id: space_id,
                parent_path_id: parent.terminal_path_id(),
                item_name: name.to_string(),
                is_folder: true,
                size: 0,
                etag: None,
                created_by: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            entry_id = %created.id,
            parent = %parent.path,
            name = %name,
            "Folder created"
        );
        Ok(created)
    }

    /// Record a file whose bytes are already durably stored at the key
    /// the parent folder's chain dictates. An archived row of the same
    /// name is left untouched and coexists with the new live one.
    pub async fn create_file_placeholder(
        &self,
        ctx: &RequestContext,
        space_id: SpaceId,
        parent_path: &str,
        name: &str,
        size: i64,
        etag: &str,
    ) -> AppResult<FileSystemEntry> {
        Self::validate_name(name)?;
        self.require(ctx, space_id, Capability::Write).await?;

        let parent = self.resolver.resolve_folder(space_id, parent_path).await?;
        self.check_depth(&parent, name)?;

        let created = self
            .entries
            .insert(NewEntry {
                document_space_id: space_id,
                parent_path_id: parent.terminal_path_id(),
                item_name: name.to_string(),
                is_folder: false,
                size,
                etag: Some(etag.to_string()),
                created_by: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            entry_id = %created.id,
            key = %parent.file_key_for_child(name),
            size,
            "File placeholder created"
        );
        Ok(created)
    }

    /// Update size and etag after a re-upload of an existing live file.
    pub async fn refresh_file_placeholder(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
        size: i64,
        etag: &str,
    ) -> AppResult<FileSystemEntry> {
        let entry = self.get_entry(entry_id).await?;
        self.require(ctx, entry.document_space_id, Capability::Write)
            .await?;
        if entry.is_folder {
            return Err(AppError::not_a_file(format!(
                "'{}' is a folder, not a file",
                entry.item_name
            )));
        }
        if entry.is_archived {
            return Err(AppError::validation(format!(
                "'{}' is archived and cannot be re-uploaded in place",
                entry.item_name
            )));
        }
        self.entries
            .record_content(entry_id, size, etag, ctx.user_id)
            .await
    }

    /// Rename an entry.
    ///
    /// A folder's physical key is built from path ids, so a folder rename
    /// is a pure metadata update and no descendant key changes. A file's
    /// name is embedded in its key, so the object is copied to the new
    /// key before the metadata commits, and the old object is deleted
    /// best-effort afterwards.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
        new_name: &str,
    ) -> AppResult<FileSystemEntry> {
        Self::validate_name(new_name)?;
        let entry = self.get_entry(entry_id).await?;
        self.require(ctx, entry.document_space_id, Capability::Write)
            .await?;
        if entry.is_archived {
            return Err(AppError::validation(format!(
                "'{}' is archived and cannot be renamed",
                entry.item_name
            )));
        }
        if entry.item_name == new_name {
            return Ok(entry);
        }

        if entry.is_folder {
            let renamed = self.entries.rename(entry_id, new_name, ctx.user_id).await?;
            info!(
                user_id = %ctx.user_id,
                entry_id = %entry_id,
                old_name = %entry.item_name,
                new_name = %new_name,
                "Folder renamed"
            );
            return Ok(renamed);
        }

        let spec = self.resolver.spec_for_entry(&entry).await?;
        let old_key = spec
            .file_key()
            .ok_or_else(|| AppError::internal("Resolved file spec has no terminal entry"))?;
        let new_key = spec
            .sibling_file_key(new_name)
            .ok_or_else(|| AppError::internal("Resolved file spec has no terminal entry"))?;

        // Copy first; if the metadata commit then fails, the old object
        // is still authoritative and the copy is a tolerable orphan.
        self.objects.copy(&old_key, &new_key).await?;
        let renamed = self.entries.rename(entry_id, new_name, ctx.user_id).await?;
        if let Err(e) = self.objects.delete(&old_key).await {
            warn!(key = %old_key, error = %e, "Old object left behind after file rename");
        }

        info!(
            user_id = %ctx.user_id,
            entry_id = %entry_id,
            old_key = %old_key,
            new_key = %new_key,
            "File renamed"
        );
        Ok(renamed)
    }

    /// Move an entry under a new parent folder.
    ///
    /// Only `parent_path_id` changes; the entry's path id and every
    /// descendant's are untouched, so a folder subtree moves in O(1).
    /// A file's key embeds its parent chain, so files follow the same
    /// copy, commit, delete sequence as renames.
    pub async fn move_entry(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
        new_parent_path: &str,
    ) -> AppResult<FileSystemEntry> {
        let entry = self.get_entry(entry_id).await?;
        self.require(ctx, entry.document_space_id, Capability::Write)
            .await?;
        if entry.is_archived {
            return Err(AppError::validation(format!(
                "'{}' is archived and cannot be moved",
                entry.item_name
            )));
        }

        let dest = self
            .resolver
            .resolve_folder(entry.document_space_id, new_parent_path)
            .await?;

        if dest.path_id_chain.contains(&entry.path_id) {
            return Err(AppError::validation(format!(
                "Cannot move '{}' into itself or one of its descendants",
                entry.item_name
            )));
        }
        if dest.depth() + 1 > self.config.max_depth {
            return Err(AppError::depth_exceeded(format!(
                "Moving '{}' under '{}' would exceed the maximum depth of {}",
                entry.item_name, dest.path, self.config.max_depth
            )));
        }
        if entry.parent_path_id == dest.terminal_path_id() {
            return Ok(entry);
        }

        if entry.is_folder {
            let moved = self
                .entries
                .reparent(entry_id, dest.terminal_path_id(), ctx.user_id)
                .await?;
            info!(
                user_id = %ctx.user_id,
                entry_id = %entry_id,
                destination = %dest.path,
                "Folder moved"
            );
            return Ok(moved);
        }

        let spec = self.resolver.spec_for_entry(&entry).await?;
        let old_key = spec
            .file_key()
            .ok_or_else(|| AppError::internal("Resolved file spec has no terminal entry"))?;
        let new_key = dest.file_key_for_child(&entry.item_name);

        self.objects.copy(&old_key, &new_key).await?;
        let moved = self
            .entries
            .reparent(entry_id, dest.terminal_path_id(), ctx.user_id)
            .await?;
        if let Err(e) = self.objects.delete(&old_key).await {
            warn!(key = %old_key, error = %e, "Old object left behind after file move");
        }

        info!(
            user_id = %ctx.user_id,
            entry_id = %entry_id,
            old_key = %old_key,
            new_key = %new_key,
            "File moved"
        );
        Ok(moved)
    }

    /// Archive an entry: the row and object stay, but the entry leaves
    /// the live uniqueness scope and path resolution stops seeing it.
    pub async fn archive(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
    ) -> AppResult<FileSystemEntry> {
        let entry = self.get_entry(entry_id).await?;
        self.require(ctx, entry.document_space_id, Capability::Write)
            .await?;
        if entry.is_archived {
            return Err(AppError::validation(format!(
                "'{}' is already archived",
                entry.item_name
            )));
        }

        let archived = self.entries.set_archived(entry_id, true, ctx.user_id).await?;
        info!(user_id = %ctx.user_id, entry_id = %entry_id, name = %entry.item_name, "Entry archived");
        Ok(archived)
    }

    /// Bring an archived entry back into the live scope. Fails with
    /// `Conflict` if a live sibling has taken the name since.
    pub async fn unarchive(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
    ) -> AppResult<FileSystemEntry> {
        let entry = self.get_entry(entry_id).await?;
        self.require(ctx, entry.document_space_id, Capability::Write)
            .await?;
        if !entry.is_archived {
            return Err(AppError::validation(format!(
                "'{}' is not archived",
                entry.item_name
            )));
        }

        let restored = self
            .entries
            .set_archived(entry_id, false, ctx.user_id)
            .await?;
        info!(user_id = %ctx.user_id, entry_id = %entry_id, name = %entry.item_name, "Entry unarchived");
        Ok(restored)
    }

    /// Remove an entry for good. Folders delete recursively; access
    /// records and collection memberships of every removed row go with
    /// them. Objects are deleted after the metadata commits, best-effort:
    /// an orphaned object is tolerable, a dangling row is not.
    pub async fn delete(&self, ctx: &RequestContext, entry_id: EntryId) -> AppResult<u64> {
        let entry = self.get_entry(entry_id).await?;
        self.require(ctx, entry.document_space_id, Capability::Write)
            .await?;

        let keys = self.collect_file_keys(&entry).await?;
        let removed = self.entries.delete_subtree(entry_id).await?;
        for id in &removed {
            self.collections.remove_entry_everywhere(*id).await?;
        }
        for key in &keys {
            if let Err(e) = self.objects.delete(key).await {
                warn!(key = %key, error = %e, "Object left behind after entry delete");
            }
        }

        info!(
            user_id = %ctx.user_id,
            entry_id = %entry_id,
            name = %entry.item_name,
            removed = removed.len(),
            objects = keys.len(),
            "Entry deleted"
        );
        Ok(removed.len() as u64)
    }

    /// Snapshot the physical keys of every file at or below an entry,
    /// before the metadata rows disappear.
    async fn collect_file_keys(&self, entry: &FileSystemEntry) -> AppResult<Vec<String>> {
        let spec = self.resolver.spec_for_entry(entry).await?;
        if !entry.is_folder {
            return Ok(spec.file_key().into_iter().collect());
        }

        let mut keys = Vec::new();
        let mut stack = vec![spec];
        while let Some(folder_spec) = stack.pop() {
            let children = self
                .entries
                .list_children(
                    entry.document_space_id,
                    folder_spec.terminal_path_id(),
                    ChildFilter::All,
                )
                .await?;
            for child in children {
                if child.is_folder {
                    stack.push(folder_spec.child(child));
                } else {
                    keys.push(folder_spec.file_key_for_child(&child.item_name));
                }
            }
        }
        Ok(keys)
    }
}
