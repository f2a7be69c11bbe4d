//! Integration tests for the WebDAV projection.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, StatusCode};

use docspace_core::config::tree::TreeConfig;
use docspace_core::config::webdav::WebDavConfig;
use docspace_core::result::AppResult;
use docspace_core::traits::{Capability, CapabilityChecker, ObjectStore};
use docspace_core::types::{SpaceId, UserId};
use docspace_database::store::SpaceStore;
use docspace_database::{CollectionStore, EntryStore, MemoryMetadataStore};
use docspace_entity::space::DocumentSpace;
use docspace_service::context::RequestContext;
use docspace_service::{EntryService, TreeMaterializer};
use docspace_storage::MemoryObjectStore;
use docspace_webdav::DavHandler;

#[derive(Debug)]
struct GrantAll;

#[async_trait]
impl CapabilityChecker for GrantAll {
    async fn allows(&self, _: UserId, _: SpaceId, _: Capability) -> AppResult<bool> {
        Ok(true)
    }
}

struct TestDav {
    handler: DavHandler,
    entries: EntryService,
    objects: Arc<MemoryObjectStore>,
    space: DocumentSpace,
    ctx: RequestContext,
}

impl TestDav {
    async fn new() -> Self {
        let store = MemoryMetadataStore::new();
        let objects = Arc::new(MemoryObjectStore::new());
        let space = store.create_space("engineering").await.unwrap();

        let entry_store: Arc<dyn EntryStore> = Arc::new(store.clone());
        let collection_store: Arc<dyn CollectionStore> = Arc::new(store.clone());
        let object_store: Arc<dyn ObjectStore> = objects.clone();

        let entries = EntryService::new(
            entry_store.clone(),
            collection_store,
            object_store.clone(),
            Arc::new(GrantAll),
            TreeConfig::default(),
        );
        let materializer = TreeMaterializer::new(entry_store, object_store);
        let handler = DavHandler::new(
            Arc::new(entries.clone()),
            materializer,
            WebDavConfig::default(),
        );

        Self {
            handler,
            entries,
            objects,
            space,
            ctx: RequestContext::new(UserId::new()),
        }
    }

    async fn mkdir(&self, parent: &str, name: &str) {
        self.entries
            .create_folder(&self.ctx, self.space.id, parent, name)
            .await
            .unwrap();
    }

    async fn upload(&self, parent: &str, name: &str, content: &str) {
        let spec = self
            .entries
            .resolver()
            .resolve_folder(self.space.id, parent)
            .await
            .unwrap();
        let data = Bytes::from(content.to_string());
        let size = data.len() as i64;
        let etag = self
            .objects
            .put(&spec.file_key_for_child(name), data)
            .await
            .unwrap();
        self.entries
            .create_file_placeholder(&self.ctx, self.space.id, parent, name, size, &etag)
            .await
            .unwrap();
    }

    async fn request(&self, method: &str, path: &str, depth: Option<&str>) -> http::Response<String> {
        let mut builder = Request::builder()
            .method(Method::from_bytes(method.as_bytes()).unwrap())
            .uri("/");
        if let Some(depth) = depth {
            builder = builder.header("Depth", depth);
        }
        let req = builder.body(Bytes::new()).unwrap();
        self.handler.handle(&self.ctx, self.space.id, path, req).await
    }
}

#[tokio::test]
async fn test_propfind_lists_folder_and_children() {
    let dav = TestDav::new().await;
    dav.mkdir("/", "reports").await;
    dav.mkdir("/reports", "2023").await;
    dav.upload("/reports", "q1.csv", "a,b,c").await;

    let response = dav.request("PROPFIND", "/reports", Some("1")).await;
    assert_eq!(response.status(), StatusCode::MULTI_STATUS);

    let body = response.body();
    assert!(body.contains("<D:href>/api/document-space/reports/</D:href>"));
    assert!(body.contains("<D:href>/api/document-space/reports/2023/</D:href>"));
    assert!(body.contains("<D:href>/api/document-space/reports/q1%2Ecsv</D:href>"));
    assert!(body.contains("<D:getcontentlength>5</D:getcontentlength>"));
    assert!(body.contains("<D:resourcetype><D:collection/></D:resourcetype>"));
}

#[tokio::test]
async fn test_propfind_depth_zero_reports_only_the_folder() {
    let dav = TestDav::new().await;
    dav.mkdir("/", "reports").await;
    dav.upload("/reports", "q1.csv", "1").await;

    let response = dav.request("PROPFIND", "/reports", Some("0")).await;
    assert_eq!(response.status(), StatusCode::MULTI_STATUS);
    assert!(!response.body().contains("q1.csv"));
}

#[tokio::test]
async fn test_propfind_missing_path_is_404() {
    let dav = TestDav::new().await;
    let response = dav.request("PROPFIND", "/nope", Some("1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_propfind_percent_encodes_hrefs() {
    let dav = TestDav::new().await;
    dav.mkdir("/", "q1 final").await;

    let response = dav.request("PROPFIND", "/q1 final", Some("0")).await;
    assert_eq!(response.status(), StatusCode::MULTI_STATUS);
    assert!(
        response
            .body()
            .contains("<D:href>/api/document-space/q1%20final/</D:href>")
    );
}

#[tokio::test]
async fn test_mkcol_creates_folder() {
    let dav = TestDav::new().await;
    dav.mkdir("/", "reports").await;

    let response = dav.request("MKCOL", "/reports/2024", None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = dav
        .entries
        .resolver()
        .resolve(dav.space.id, "/reports/2024")
        .await
        .unwrap();
    assert!(created.is_folder());
}

#[tokio::test]
async fn test_mkcol_on_existing_name_is_405() {
    let dav = TestDav::new().await;
    dav.mkdir("/", "reports").await;

    let response = dav.request("MKCOL", "/reports", None).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_mkcol_without_parent_is_409() {
    let dav = TestDav::new().await;
    let response = dav.request("MKCOL", "/missing/child", None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_options_advertises_modeled_subset() {
    let dav = TestDav::new().await;
    let response = dav.request("OPTIONS", "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("Allow").unwrap(),
        "OPTIONS, PROPFIND, MKCOL"
    );
}

#[tokio::test]
async fn test_unmodeled_method_is_405() {
    let dav = TestDav::new().await;
    let response = dav.request("LOCK", "/", None).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
