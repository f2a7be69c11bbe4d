//! Human-path resolution against the entry store.

use std::sync::Arc;

use docspace_core::error::AppError;
use docspace_core::result::AppResult;
use docspace_core::types::SpaceId;
use docspace_database::store::EntryStore;
use docspace_entity::entry::{FileSystemEntry, PathSpec};

/// Walks slash-separated paths down the live tree, producing
/// [`PathSpec`]s.
#[derive(Clone)]
pub struct PathResolver {
    /// Entry store.
    entries: Arc<dyn EntryStore>,
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver").finish()
    }
}

impl PathResolver {
    /// Creates a new resolver.
    pub fn new(entries: Arc<dyn EntryStore>) -> Self {
        Self { entries }
    }

    /// Split a human path into segments, discarding empty and `.` parts.
    /// `..` is rejected outright so a path can never escape its space.
    pub fn split_segments(path: &str) -> AppResult<Vec<&str>> {
        let mut segments = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(AppError::validation(format!(
                        "Path '{path}' may not contain '..' segments"
                    )));
                }
                other => segments.push(other),
            }
        }
        Ok(segments)
    }

    /// Resolve a path to its chain of entries. The empty path and `/`
    /// resolve to the space root.
    pub async fn resolve(&self, space_id: SpaceId, path: &str) -> AppResult<PathSpec> {
        let segments = Self::split_segments(path)?;
        let mut spec = PathSpec::root(space_id);

        for segment in segments {
            if let Some(entry) = &spec.entry {
                if !entry.is_folder {
                    return Err(AppError::not_a_folder(format!(
                        "'{}' is a file, not a folder",
                        spec.path
                    )));
                }
            }

            let child = self
                .entries
                .find_live_child(space_id, spec.terminal_path_id(), segment)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("No item named '{segment}' under '{}'", spec.path))
                })?;
            spec = spec.child(child);
        }

        Ok(spec)
    }

    /// Resolve a path that must terminate in a folder (or the root).
    pub async fn resolve_folder(&self, space_id: SpaceId, path: &str) -> AppResult<PathSpec> {
        let spec = self.resolve(space_id, path).await?;
        if !spec.is_folder() {
            return Err(AppError::not_a_folder(format!(
                "'{}' is a file, not a folder",
                spec.path
            )));
        }
        Ok(spec)
    }

    /// Resolve a path that must terminate in a file.
    pub async fn resolve_file(&self, space_id: SpaceId, path: &str) -> AppResult<PathSpec> {
        let spec = self.resolve(space_id, path).await?;
        if spec.is_folder() {
            return Err(AppError::not_a_file(format!(
                "'{}' is a folder, not a file",
                spec.path
            )));
        }
        Ok(spec)
    }

    /// Build the spec for an entry held by id, walking its ancestors up
    /// to the root. Works for archived entries too, which path resolution
    /// cannot reach.
    pub async fn spec_for_entry(&self, entry: &FileSystemEntry) -> AppResult<PathSpec> {
        let mut names = vec![entry.item_name.clone()];
        let mut chain = vec![entry.path_id];

        let mut parent = entry.parent_path_id;
        while !parent.is_nil() {
            let ancestor = self
                .entries
                .find_by_path_id(entry.document_space_id, parent)
                .await?
                .ok_or_else(|| {
                    AppError::inconsistent_state(format!(
                        "Entry {} has a dangling parent link to path id {parent}",
                        entry.id
                    ))
                })?;
            names.push(ancestor.item_name.clone());
            chain.push(ancestor.path_id);
            parent = ancestor.parent_path_id;
        }

        names.reverse();
        chain.reverse();

        Ok(PathSpec {
            document_space_id: entry.document_space_id,
            entry: Some(entry.clone()),
            path: format!("/{}", names.join("/")),
            path_id_chain: chain,
        })
    }
}
