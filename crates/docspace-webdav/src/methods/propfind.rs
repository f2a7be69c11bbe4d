//! PROPFIND method implementation (RFC 4918 Section 9.1).

use chrono::Utc;
use http::{Response, StatusCode};
use tracing::debug;

use docspace_core::error::AppError;
use docspace_core::types::SpaceId;
use docspace_service::tree::materializer::TreeMaterializer;

use crate::properties::{Depth, DavResource, path_to_href, render_multistatus};

/// Handle a PROPFIND request against a space path.
///
/// Depth 0 reports the resource itself; anything deeper is served as a
/// depth-1 materialization, one response element per immediate child.
pub async fn handle_propfind(
    space_id: SpaceId,
    path: &str,
    depth: Depth,
    materializer: &TreeMaterializer,
    api_prefix: &str,
) -> Result<Response<String>, AppError> {
    debug!(space_id = %space_id, path, ?depth, "PROPFIND");

    let spec = materializer.resolver().resolve(space_id, path).await?;
    let mut resources = Vec::new();

    if !spec.is_folder() {
        // The entry is present whenever the spec is not a folder.
        let file = spec.entry.as_ref().ok_or_else(|| {
            AppError::internal("Resolved file spec has no terminal entry")
        })?;
        let href = format!("{}/{}", api_prefix, path_to_href(&spec.path));
        resources.push(DavResource::file(
            href,
            file.item_name.clone(),
            file.size.max(0) as u64,
            file.last_modified_at,
            file.created_at,
            file.etag.clone(),
        ));
        return multistatus(resources);
    }

    let folder_href = if spec.is_root() {
        format!("{api_prefix}/")
    } else {
        format!("{}/{}/", api_prefix, path_to_href(&spec.path))
    };
    // The root has no row; it reports the current instant like any
    // freshly listed virtual collection.
    let (name, modified, created) = match &spec.entry {
        Some(entry) => (
            entry.item_name.clone(),
            entry.last_modified_at,
            entry.created_at,
        ),
        None => (String::new(), Utc::now(), Utc::now()),
    };
    resources.push(DavResource::collection(
        folder_href.clone(),
        name,
        modified,
        created,
    ));

    if depth != Depth::Zero {
        let tree = materializer.build(space_id, path, 1).await?;

        for folder in &tree.folders {
            if let Some(entry) = &folder.spec.entry {
                resources.push(DavResource::collection(
                    format!("{}/{}/", api_prefix, path_to_href(&folder.spec.path)),
                    entry.item_name.clone(),
                    entry.last_modified_at,
                    entry.created_at,
                ));
            }
        }
        for file in &tree.files {
            let href = format!(
                "{}/{}",
                api_prefix,
                path_to_href(&tree.spec.child(file.clone()).path)
            );
            resources.push(DavResource::file(
                href,
                file.item_name.clone(),
                file.size.max(0) as u64,
                file.last_modified_at,
                file.created_at,
                file.etag.clone(),
            ));
        }
    }

    multistatus(resources)
}

fn multistatus(resources: Vec<DavResource>) -> Result<Response<String>, AppError> {
    Response::builder()
        .status(StatusCode::MULTI_STATUS)
        .header("Content-Type", "application/xml; charset=utf-8")
        .body(render_multistatus(&resources))
        .map_err(|e| AppError::internal(format!("Failed to build response: {e}")))
}
