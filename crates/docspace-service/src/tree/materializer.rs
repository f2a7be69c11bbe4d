//! Tree materialization with object-store drift detection.

use std::collections::HashSet;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::warn;

use docspace_core::result::AppResult;
use docspace_core::traits::ObjectStore;
use docspace_core::types::SpaceId;
use docspace_database::store::EntryStore;
use docspace_entity::entry::path::direct_child_name;
use docspace_entity::entry::{ChildFilter, FileSystemElementTree, Inconsistency, PathSpec};

use super::resolver::PathResolver;

/// Builds (partial) subtrees for listing and export, cross-checking file
/// rows against object-storage listings.
#[derive(Clone)]
pub struct TreeMaterializer {
    /// Entry store.
    entries: Arc<dyn EntryStore>,
    /// Object store, for drift detection.
    objects: Arc<dyn ObjectStore>,
    /// Path resolver.
    resolver: PathResolver,
}

impl std::fmt::Debug for TreeMaterializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeMaterializer").finish()
    }
}

impl TreeMaterializer {
    /// Depth value that materializes the whole subtree.
    pub const UNBOUNDED: u32 = u32::MAX;

    /// Creates a new materializer.
    pub fn new(entries: Arc<dyn EntryStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            resolver: PathResolver::new(entries.clone()),
            entries,
            objects,
        }
    }

    /// Materialize the subtree rooted at `root_path` down to `depth`
    /// levels of children (1 for a simple listing,
    /// [`Self::UNBOUNDED`] for export).
    ///
    /// Listing reads are not transactionally coupled to the object store;
    /// an object uploaded just after the metadata snapshot may surface as
    /// a one-off inconsistency. Drift is reported on the nodes, never
    /// auto-corrected.
    pub async fn build(
        &self,
        space_id: SpaceId,
        root_path: &str,
        depth: u32,
    ) -> AppResult<FileSystemElementTree> {
        let spec = self.resolver.resolve_folder(space_id, root_path).await?;
        self.build_node(spec, depth.max(1)).await
    }

    fn build_node(
        &self,
        spec: PathSpec,
        depth: u32,
    ) -> BoxFuture<'_, AppResult<FileSystemElementTree>> {
        async move {
            let space_id = spec.document_space_id;
            let children = self
                .entries
                .list_children(space_id, spec.terminal_path_id(), ChildFilter::All)
                .await?;

            let files: Vec<_> = children
                .iter()
                .filter(|c| !c.is_folder && !c.is_archived)
                .cloned()
                .collect();
            let inconsistencies = self.detect_drift(&spec, &children, &files).await?;

            let mut folders = Vec::new();
            if depth > 1 {
                for child in children {
                    if child.is_folder && !child.is_archived {
                        folders.push(
                            self.build_node(spec.child(child), depth.saturating_sub(1))
                                .await?,
                        );
                    }
                }
            }

            Ok(FileSystemElementTree {
                spec,
                folders,
                files,
                inconsistencies,
            })
        }
        .boxed()
    }

    /// Compare live file rows at this level against the object listing
    /// under the folder's key prefix.
    async fn detect_drift(
        &self,
        spec: &PathSpec,
        all_children: &[docspace_entity::entry::FileSystemEntry],
        live_files: &[docspace_entity::entry::FileSystemEntry],
    ) -> AppResult<Vec<Inconsistency>> {
        let prefix = spec.folder_key();
        let listing = self.objects.list(&prefix).await?;

        let object_names: HashSet<&str> = listing
            .iter()
            .filter_map(|meta| direct_child_name(&prefix, &meta.key))
            .collect();
        // Archived file rows still own their object; only a key matching
        // no file row at all is an orphan.
        let known_file_names: HashSet<&str> = all_children
            .iter()
            .filter(|c| !c.is_folder)
            .map(|c| c.item_name.as_str())
            .collect();

        let mut inconsistencies = Vec::new();
        for file in live_files {
            if !object_names.contains(file.item_name.as_str()) {
                let key = spec.file_key_for_child(&file.item_name);
                warn!(entry_id = %file.id, key = %key, "File row has no backing object");
                inconsistencies.push(Inconsistency::MissingObject {
                    entry_id: file.id,
                    key,
                });
            }
        }
        for name in object_names {
            if !known_file_names.contains(name) {
                let key = spec.file_key_for_child(name);
                warn!(key = %key, "Object has no file row");
                inconsistencies.push(Inconsistency::OrphanObject { key });
            }
        }

        Ok(inconsistencies)
    }
}

impl TreeMaterializer {
    /// The resolver this materializer walks paths with.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }
}
