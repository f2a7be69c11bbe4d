//! Export manifests: the one place physical keys and human names are
//! reunited for a bulk, user-facing artifact.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use docspace_core::result::AppResult;
use docspace_core::traits::ObjectStore;
use docspace_core::types::SpaceId;
use docspace_entity::entry::FileSystemElementTree;

use super::materializer::TreeMaterializer;

/// One file of an export: where its bytes live, and what the archive
/// entry should be called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    /// Physical object-storage key to fetch.
    pub physical_key: String,
    /// Archive-relative path, reconstructed from item names along the
    /// walk — never from path ids.
    pub logical_path: String,
    /// File size in bytes.
    pub size: i64,
    /// ETag of the stored object, if known.
    pub etag: Option<String>,
}

/// The full fetch plan for exporting one folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    /// The space being exported from.
    pub document_space_id: SpaceId,
    /// Normalized path of the exported folder.
    pub root_path: String,
    /// Every file under the folder, at any depth.
    pub entries: Vec<ExportEntry>,
}

/// One fetched export object.
#[derive(Debug, Clone)]
pub struct ExportObject {
    /// Archive-relative path for the object.
    pub logical_path: String,
    /// The object's bytes.
    pub data: Bytes,
}

/// The result of fetching a manifest's objects.
#[derive(Debug)]
pub struct ExportPayload {
    /// Objects fetched so far, in manifest order.
    pub objects: Vec<ExportObject>,
    /// `false` if the fetch stopped early because the caller cancelled.
    pub complete: bool,
}

/// Gathers the objects under a folder, relabeled with logical names, for
/// zip packaging by the caller.
#[derive(Debug, Clone)]
pub struct ExportService {
    /// Materializer for the snapshot walk.
    materializer: TreeMaterializer,
    /// Object store for the fetch phase.
    objects: Arc<dyn ObjectStore>,
}

impl ExportService {
    /// Creates a new export service.
    pub fn new(materializer: TreeMaterializer, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            materializer,
            objects,
        }
    }

    /// Take a consistent tree snapshot of the folder at `folder_path` and
    /// flatten it into a fetch plan. No metadata transaction stays open
    /// afterward; the fetch phase runs purely against the object store.
    pub async fn build_export_manifest(
        &self,
        space_id: SpaceId,
        folder_path: &str,
    ) -> AppResult<ExportManifest> {
        let tree = self
            .materializer
            .build(space_id, folder_path, TreeMaterializer::UNBOUNDED)
            .await?;

        let mut entries = Vec::new();
        collect_entries(&tree, "", &mut entries);

        info!(
            space_id = %space_id,
            root = %tree.spec.path,
            files = entries.len(),
            "Export manifest built"
        );

        Ok(ExportManifest {
            document_space_id: space_id,
            root_path: tree.spec.path.clone(),
            entries,
        })
    }

    /// Fetch the manifest's objects one by one, honoring cancellation
    /// between fetches. A cancelled export returns what it has with
    /// `complete = false`.
    pub async fn fetch_objects(
        &self,
        manifest: &ExportManifest,
        cancel: &CancellationToken,
    ) -> AppResult<ExportPayload> {
        let mut objects = Vec::with_capacity(manifest.entries.len());

        for entry in &manifest.entries {
            if cancel.is_cancelled() {
                debug!(
                    fetched = objects.len(),
                    total = manifest.entries.len(),
                    "Export fetch cancelled"
                );
                return Ok(ExportPayload {
                    objects,
                    complete: false,
                });
            }

            let data = self.objects.get(&entry.physical_key).await?;
            objects.push(ExportObject {
                logical_path: entry.logical_path.clone(),
                data,
            });
        }

        Ok(ExportPayload {
            objects,
            complete: true,
        })
    }
}

fn collect_entries(node: &FileSystemElementTree, prefix: &str, out: &mut Vec<ExportEntry>) {
    for file in &node.files {
        let logical_path = if prefix.is_empty() {
            file.item_name.clone()
        } else {
            format!("{prefix}/{}", file.item_name)
        };
        out.push(ExportEntry {
            physical_key: node.spec.file_key_for_child(&file.item_name),
            logical_path,
            size: file.size,
            etag: file.etag.clone(),
        });
    }

    for folder in &node.folders {
        let name = folder.spec.item_name().unwrap_or_default();
        let sub_prefix = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        collect_entries(folder, &sub_prefix, out);
    }
}
