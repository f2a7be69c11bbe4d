//! WebDAV request handler — dispatches HTTP methods to implementations.

use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use tracing::debug;

use docspace_core::config::webdav::WebDavConfig;
use docspace_core::error::{AppError, ErrorKind};
use docspace_core::types::SpaceId;
use docspace_service::context::RequestContext;
use docspace_service::{EntryService, TreeMaterializer};

use crate::methods;
use crate::properties::Depth;

/// WebDAV request handler context.
///
/// Authentication happens in the surrounding service; the handler is
/// given an already-established [`RequestContext`] per request.
#[derive(Debug, Clone)]
pub struct DavHandler {
    /// Entry service, for MKCOL.
    entries: Arc<EntryService>,
    /// Materializer, for PROPFIND.
    materializer: TreeMaterializer,
    /// Projection settings.
    config: WebDavConfig,
}

impl DavHandler {
    /// Create a new DAV handler.
    pub fn new(
        entries: Arc<EntryService>,
        materializer: TreeMaterializer,
        config: WebDavConfig,
    ) -> Self {
        Self {
            entries,
            materializer,
            config,
        }
    }

    /// Handle a WebDAV request against a path inside a space.
    pub async fn handle(
        &self,
        ctx: &RequestContext,
        space_id: SpaceId,
        path: &str,
        req: Request<Bytes>,
    ) -> Response<String> {
        let method = req.method().clone();
        let headers = req.headers().clone();
        let body = String::from_utf8_lossy(&req.into_body()).to_string();

        let result = match method.as_str() {
            "OPTIONS" => Ok(self.handle_options()),
            "PROPFIND" => {
                let depth = Depth::from_header(headers.get("Depth").and_then(|v| v.to_str().ok()));
                methods::propfind::handle_propfind(
                    space_id,
                    path,
                    depth,
                    &self.materializer,
                    &self.config.api_prefix,
                )
                .await
            }
            "MKCOL" => {
                methods::mkcol::handle_mkcol(ctx, space_id, path, &body, &self.entries).await
            }
            _ => {
                debug!(%method, path, "Unmodeled WebDAV method");
                respond(
                    StatusCode::METHOD_NOT_ALLOWED,
                    format!("Method {method} not allowed"),
                )
            }
        };

        match result {
            Ok(response) => response,
            Err(e) => self.error_response(&e),
        }
    }

    /// Handle OPTIONS: only the modeled subset is advertised.
    fn handle_options(&self) -> Response<String> {
        Response::builder()
            .status(StatusCode::OK)
            .header("Allow", "OPTIONS, PROPFIND, MKCOL")
            .header("DAV", "1")
            .body(String::new())
            .unwrap_or_else(|_| {
                let mut r = Response::new(String::new());
                *r.status_mut() = StatusCode::OK;
                r
            })
    }

    /// Render an error the method implementations did not already map.
    fn error_response(&self, err: &AppError) -> Response<String> {
        let status = match err.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Forbidden | ErrorKind::DepthExceeded => StatusCode::FORBIDDEN,
            ErrorKind::NotAFolder | ErrorKind::NotAFile | ErrorKind::Validation => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        respond(status, err.message.clone()).unwrap_or_else(|_| {
            let mut r = Response::new(String::new());
            *r.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            r
        })
    }
}

fn respond(status: StatusCode, body: String) -> Result<Response<String>, AppError> {
    Response::builder()
        .status(status)
        .body(body)
        .map_err(|e| AppError::internal(format!("Failed to build response: {e}")))
}
