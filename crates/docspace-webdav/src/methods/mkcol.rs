//! MKCOL method implementation (RFC 4918 Section 9.3).

use http::{Response, StatusCode};
use tracing::{debug, info};

use docspace_core::error::{AppError, ErrorKind};
use docspace_core::types::SpaceId;
use docspace_service::EntryService;
use docspace_service::context::RequestContext;

/// Handle a MKCOL request (create collection/folder).
///
/// Splits the path into (parent, name) and delegates to the entry
/// service; RFC 4918 status mapping is done here so the tree core stays
/// HTTP-free.
pub async fn handle_mkcol(
    ctx: &RequestContext,
    space_id: SpaceId,
    path: &str,
    body: &str,
    entries: &EntryService,
) -> Result<Response<String>, AppError> {
    debug!(space_id = %space_id, path, "MKCOL");

    if !body.is_empty() {
        return respond(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "MKCOL with a request body is not supported".to_string(),
        );
    }

    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return respond(
            StatusCode::METHOD_NOT_ALLOWED,
            "Cannot create the root collection".to_string(),
        );
    }

    let (parent_path, name) = match trimmed.rsplit_once('/') {
        Some((parent, name)) => (format!("/{parent}"), name),
        None => ("/".to_string(), trimmed),
    };

    match entries
        .create_folder(ctx, space_id, &parent_path, name)
        .await
    {
        Ok(_) => {
            info!(space_id = %space_id, path, "Collection created");
            respond(StatusCode::CREATED, String::new())
        }
        // RFC 4918: a missing parent collection is 409, an existing
        // resource at the target is 405.
        Err(e) if e.kind == ErrorKind::NotFound || e.kind == ErrorKind::NotAFolder => {
            respond(StatusCode::CONFLICT, e.message)
        }
        Err(e) if e.kind == ErrorKind::Conflict => {
            respond(StatusCode::METHOD_NOT_ALLOWED, e.message)
        }
        Err(e) if e.kind == ErrorKind::DepthExceeded || e.kind == ErrorKind::Forbidden => {
            respond(StatusCode::FORBIDDEN, e.message)
        }
        Err(e) if e.kind == ErrorKind::Validation => respond(StatusCode::BAD_REQUEST, e.message),
        Err(e) => Err(e),
    }
}

fn respond(status: StatusCode, body: String) -> Result<Response<String>, AppError> {
    Response::builder()
        .status(status)
        .body(body)
        .map_err(|e| AppError::internal(format!("Failed to build response: {e}")))
}
