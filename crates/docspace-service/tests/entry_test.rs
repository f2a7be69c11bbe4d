//! Integration tests for tree mutation.

mod helpers;

use std::sync::Arc;

use docspace_core::error::ErrorKind;
use docspace_core::traits::ObjectStore;
use docspace_entity::entry::ChildFilter;

use helpers::{ReadOnly, TestEnv};

#[tokio::test]
async fn test_duplicate_live_sibling_is_conflict() {
    let env = TestEnv::new().await;
    env.mkdir("/", "docs").await;

    let err = env
        .entries
        .create_folder(&env.ctx, env.space.id, "/", "docs")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_archived_copy_coexists_with_new_live_entry() {
    let env = TestEnv::new().await;
    env.mkdir("/", "reports").await;
    let first = env.upload("/reports", "q1.csv", "v1").await;

    env.entries.archive(&env.ctx, first.id).await.unwrap();
    let second = env.upload("/reports", "q1.csv", "v2").await;
    assert_ne!(first.path_id, second.path_id);

    let live = env
        .entries
        .list_children(&env.ctx, env.space.id, "/reports", ChildFilter::Live)
        .await
        .unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].id, second.id);

    let archived = env
        .entries
        .list_children(&env.ctx, env.space.id, "/reports", ChildFilter::Archived)
        .await
        .unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, first.id);
}

#[tokio::test]
async fn test_archived_entry_leaves_path_resolution() {
    let env = TestEnv::new().await;
    let docs = env.mkdir("/", "docs").await;
    env.upload("/docs", "a.txt", "a").await;

    env.entries.archive(&env.ctx, docs.id).await.unwrap();

    let err = env
        .entries
        .resolver()
        .resolve(env.space.id, "/docs")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unarchive_conflicts_with_live_usurper() {
    let env = TestEnv::new().await;
    env.mkdir("/", "reports").await;
    let first = env.upload("/reports", "q1.csv", "v1").await;
    env.entries.archive(&env.ctx, first.id).await.unwrap();
    env.upload("/reports", "q1.csv", "v2").await;

    let err = env.entries.unarchive(&env.ctx, first.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_depth_limit_boundary() {
    let env = TestEnv::with_max_depth(2).await;
    env.mkdir("/", "a").await;
    // Depth 2 == max succeeds.
    env.mkdir("/a", "b").await;

    let err = env
        .entries
        .create_folder(&env.ctx, env.space.id, "/a/b", "c")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DepthExceeded);

    let err = env
        .entries
        .create_file_placeholder(&env.ctx, env.space.id, "/a/b", "f.txt", 1, "etag")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DepthExceeded);
}

#[tokio::test]
async fn test_move_revalidates_depth() {
    let env = TestEnv::with_max_depth(2).await;
    let folder = env.mkdir("/", "deep").await;
    env.mkdir("/", "a").await;
    env.mkdir("/a", "b").await;

    let err = env
        .entries
        .move_entry(&env.ctx, folder.id, "/a/b")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DepthExceeded);
}

#[tokio::test]
async fn test_move_into_own_subtree_is_rejected() {
    let env = TestEnv::new().await;
    let outer = env.mkdir("/", "outer").await;
    env.mkdir("/outer", "inner").await;

    let err = env
        .entries
        .move_entry(&env.ctx, outer.id, "/outer/inner")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_file_rename_copies_object_to_new_key() {
    let env = TestEnv::new().await;
    env.mkdir("/", "docs").await;
    let file = env.upload("/docs", "draft.txt", "content").await;
    let old_key = env.file_key("/docs/draft.txt").await;

    env.entries
        .rename(&env.ctx, file.id, "final.txt")
        .await
        .unwrap();

    let new_key = env.file_key("/docs/final.txt").await;
    assert_ne!(old_key, new_key);
    assert_eq!(
        env.objects.get(&new_key).await.unwrap(),
        bytes::Bytes::from("content")
    );
    // The old object is gone once the rename committed.
    assert!(env.objects.get(&old_key).await.is_err());
}

#[tokio::test]
async fn test_file_move_relocates_object() {
    let env = TestEnv::new().await;
    env.mkdir("/", "inbox").await;
    env.mkdir("/", "archive").await;
    let file = env.upload("/inbox", "letter.txt", "dear").await;
    let old_key = env.file_key("/inbox/letter.txt").await;

    let moved = env
        .entries
        .move_entry(&env.ctx, file.id, "/archive")
        .await
        .unwrap();
    assert_eq!(moved.path_id, file.path_id);

    let new_key = env.file_key("/archive/letter.txt").await;
    assert_ne!(old_key, new_key);
    assert_eq!(
        env.objects.get(&new_key).await.unwrap(),
        bytes::Bytes::from("dear")
    );
    assert!(env.objects.get(&old_key).await.is_err());
}

#[tokio::test]
async fn test_rename_to_occupied_name_is_conflict() {
    let env = TestEnv::new().await;
    env.mkdir("/", "a").await;
    let b = env.mkdir("/", "b").await;

    let err = env.entries.rename(&env.ctx, b.id, "a").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_delete_empty_folder() {
    let env = TestEnv::new().await;
    let folder = env.mkdir("/", "empty").await;

    let removed = env.entries.delete(&env.ctx, folder.id).await.unwrap();
    assert_eq!(removed, 1);
    assert!(
        env.entries
            .resolver()
            .resolve(env.space.id, "/empty")
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_delete_recurses_and_cascades() {
    let env = TestEnv::new().await;
    let docs = env.mkdir("/", "docs").await;
    env.mkdir("/docs", "sub").await;
    let top = env.upload("/docs", "top.txt", "t").await;
    let deep = env.upload("/docs/sub", "deep.txt", "d").await;

    env.access.record_download(deep.id, env.ctx.user_id).await.unwrap();
    env.collections
        .add_to_collection(&env.ctx, env.space.id, "favorites", top.id)
        .await
        .unwrap();

    let removed = env.entries.delete(&env.ctx, docs.id).await.unwrap();
    assert_eq!(removed, 4);

    // Access records and collection memberships died with the rows.
    assert!(
        env.access
            .last_download(deep.id, env.ctx.user_id)
            .await
            .unwrap()
            .is_none()
    );
    let collections = env
        .collections
        .list_collections(&env.ctx, env.space.id)
        .await
        .unwrap();
    let (_, members) = env
        .collections
        .get_collection(&env.ctx, collections[0].id)
        .await
        .unwrap();
    assert!(members.is_empty());

    // Objects were reaped too.
    assert!(env.object_keys().await.is_empty());
}

#[tokio::test]
async fn test_write_operations_require_write_capability() {
    let env = TestEnv::with_checker(Arc::new(ReadOnly)).await;

    let err = env
        .entries
        .create_folder(&env.ctx, env.space.id, "/", "docs")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    // Reads still pass.
    let root = env
        .entries
        .resolve_path(&env.ctx, env.space.id, "/")
        .await
        .unwrap();
    assert!(root.is_root());
}

#[tokio::test]
async fn test_refresh_file_placeholder_updates_in_place() {
    let env = TestEnv::new().await;
    env.mkdir("/", "docs").await;
    let file = env.upload("/docs", "a.txt", "v1").await;

    let refreshed = env
        .entries
        .refresh_file_placeholder(&env.ctx, file.id, 99, "etag-2")
        .await
        .unwrap();
    assert_eq!(refreshed.id, file.id);
    assert_eq!(refreshed.path_id, file.path_id);
    assert_eq!(refreshed.size, 99);
    assert_eq!(refreshed.etag.as_deref(), Some("etag-2"));
}
