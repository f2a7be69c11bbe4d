//! In-memory tree materializations used for listing, export, and the
//! WebDAV projection.

use serde::{Deserialize, Serialize};

use docspace_core::types::EntryId;

use super::model::FileSystemEntry;
use super::path::PathSpec;

/// A possibly partial materialization of a space's tree, rooted at one
/// folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSystemElementTree {
    /// The resolved spec of this node.
    pub spec: PathSpec,
    /// Subfolder nodes, built down to the requested depth.
    pub folders: Vec<FileSystemElementTree>,
    /// Live file entries at this level.
    pub files: Vec<FileSystemEntry>,
    /// Metadata/object-store disagreements observed at this level.
    /// Reported to the caller, never auto-corrected.
    pub inconsistencies: Vec<Inconsistency>,
}

impl FileSystemElementTree {
    /// Total number of file entries in this subtree.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.folders.iter().map(|f| f.file_count()).sum::<usize>()
    }

    /// Collect every inconsistency in this subtree.
    pub fn all_inconsistencies(&self) -> Vec<&Inconsistency> {
        let mut out: Vec<&Inconsistency> = self.inconsistencies.iter().collect();
        for folder in &self.folders {
            out.extend(folder.all_inconsistencies());
        }
        out
    }
}

/// A single drift observation between the metadata store and the object
/// store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Inconsistency {
    /// A live file row exists but no object was found at its key.
    MissingObject {
        /// The row with no backing object.
        entry_id: EntryId,
        /// The key the object was expected at.
        key: String,
    },
    /// An object exists under the folder's prefix with no corresponding
    /// row (live or archived).
    OrphanObject {
        /// The unexpected object's key.
        key: String,
    },
}
