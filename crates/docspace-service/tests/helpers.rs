//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use docspace_core::config::tree::TreeConfig;
use docspace_core::result::AppResult;
use docspace_core::traits::{Capability, CapabilityChecker, ObjectStore};
use docspace_core::types::{SpaceId, UserId};
use docspace_database::store::SpaceStore;
use docspace_database::{CollectionStore, EntryStore, MemoryMetadataStore};
use docspace_entity::entry::FileSystemEntry;
use docspace_entity::space::DocumentSpace;
use docspace_service::access::AccessTracker;
use docspace_service::collection::CollectionService;
use docspace_service::context::RequestContext;
use docspace_service::tree::ExportService;
use docspace_service::{EntryService, TreeMaterializer};
use docspace_storage::MemoryObjectStore;

/// Capability checker granting everything, for tests exercising tree
/// semantics rather than authorization.
#[derive(Debug)]
pub struct GrantAll;

#[async_trait]
impl CapabilityChecker for GrantAll {
    async fn allows(&self, _: UserId, _: SpaceId, _: Capability) -> AppResult<bool> {
        Ok(true)
    }
}

/// Capability checker granting only reads, to every caller.
#[derive(Debug)]
pub struct ReadOnly;

#[async_trait]
impl CapabilityChecker for ReadOnly {
    async fn allows(&self, _: UserId, _: SpaceId, capability: Capability) -> AppResult<bool> {
        Ok(capability == Capability::Read)
    }
}

/// Test wiring: every service over one shared in-memory metadata store
/// and one in-memory object store, with a pre-created space.
pub struct TestEnv {
    pub store: MemoryMetadataStore,
    pub objects: Arc<MemoryObjectStore>,
    pub entries: EntryService,
    pub materializer: TreeMaterializer,
    pub export: ExportService,
    pub access: AccessTracker,
    pub collections: CollectionService,
    pub space: DocumentSpace,
    pub ctx: RequestContext,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::build(Arc::new(GrantAll), TreeConfig::default()).await
    }

    pub async fn with_max_depth(max_depth: usize) -> Self {
        Self::build(Arc::new(GrantAll), TreeConfig { max_depth }).await
    }

    pub async fn with_checker(capabilities: Arc<dyn CapabilityChecker>) -> Self {
        Self::build(capabilities, TreeConfig::default()).await
    }

    async fn build(capabilities: Arc<dyn CapabilityChecker>, config: TreeConfig) -> Self {
        let store = MemoryMetadataStore::new();
        let objects = Arc::new(MemoryObjectStore::new());
        let space = store.create_space("engineering").await.unwrap();

        let entry_store: Arc<dyn EntryStore> = Arc::new(store.clone());
        let collection_store: Arc<dyn CollectionStore> = Arc::new(store.clone());
        let object_store: Arc<dyn ObjectStore> = objects.clone();

        let entries = EntryService::new(
            entry_store.clone(),
            collection_store.clone(),
            object_store.clone(),
            capabilities.clone(),
            config,
        );
        let materializer = TreeMaterializer::new(entry_store.clone(), object_store.clone());
        let export = ExportService::new(materializer.clone(), object_store);
        let access = AccessTracker::new(entry_store.clone(), Arc::new(store.clone()));
        let collections =
            CollectionService::new(collection_store, entry_store, capabilities);

        Self {
            store,
            objects,
            entries,
            materializer,
            export,
            access,
            collections,
            space,
            ctx: RequestContext::new(UserId::new()),
        }
    }

    /// Create a folder under `parent_path`.
    pub async fn mkdir(&self, parent_path: &str, name: &str) -> FileSystemEntry {
        self.entries
            .create_folder(&self.ctx, self.space.id, parent_path, name)
            .await
            .unwrap()
    }

    /// Store object bytes at the key the parent folder dictates, then
    /// record the placeholder row, the same order the upload path uses.
    pub async fn upload(&self, parent_path: &str, name: &str, content: &str) -> FileSystemEntry {
        let parent = self
            .entries
            .resolver()
            .resolve_folder(self.space.id, parent_path)
            .await
            .unwrap();
        let data = Bytes::from(content.to_string());
        let size = data.len() as i64;
        let etag = self
            .objects
            .put(&parent.file_key_for_child(name), data)
            .await
            .unwrap();

        self.entries
            .create_file_placeholder(&self.ctx, self.space.id, parent_path, name, size, &etag)
            .await
            .unwrap()
    }

    /// The physical key the file at `path` currently resolves to.
    pub async fn file_key(&self, path: &str) -> String {
        self.entries
            .resolver()
            .resolve_file(self.space.id, path)
            .await
            .unwrap()
            .file_key()
            .unwrap()
    }

    /// Every object key currently stored for this space, sorted.
    pub async fn object_keys(&self) -> Vec<String> {
        self.objects
            .list(&format!("{}/", self.space.id))
            .await
            .unwrap()
            .into_iter()
            .map(|meta| meta.key)
            .collect()
    }
}
