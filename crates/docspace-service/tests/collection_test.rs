//! Integration tests for user collections and access tracking.

mod helpers;

use docspace_core::error::ErrorKind;
use docspace_core::types::{EntryId, UserId};
use docspace_database::store::SpaceStore;
use docspace_service::context::RequestContext;

use helpers::TestEnv;

#[tokio::test]
async fn test_add_to_collection_creates_and_is_idempotent() {
    let env = TestEnv::new().await;
    env.mkdir("/", "docs").await;
    let file = env.upload("/docs", "a.txt", "a").await;

    let collection = env
        .collections
        .add_to_collection(&env.ctx, env.space.id, "favorites", file.id)
        .await
        .unwrap();
    // Adding again is a no-op against the same collection.
    let again = env
        .collections
        .add_to_collection(&env.ctx, env.space.id, "favorites", file.id)
        .await
        .unwrap();
    assert_eq!(collection.id, again.id);

    let (_, members) = env
        .collections
        .get_collection(&env.ctx, collection.id)
        .await
        .unwrap();
    assert_eq!(members, vec![file.id]);
}

#[tokio::test]
async fn test_collections_are_scoped_per_owner() {
    let env = TestEnv::new().await;
    env.mkdir("/", "docs").await;
    let file = env.upload("/docs", "a.txt", "a").await;

    let mine = env
        .collections
        .add_to_collection(&env.ctx, env.space.id, "favorites", file.id)
        .await
        .unwrap();

    // The same name under another owner is a different collection.
    let other = RequestContext::new(UserId::new());
    let theirs = env
        .collections
        .add_to_collection(&other, env.space.id, "favorites", file.id)
        .await
        .unwrap();
    assert_ne!(mine.id, theirs.id);

    // And their collection is not reachable as the original caller.
    let err = env
        .collections
        .get_collection(&env.ctx, theirs.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_remove_and_delete_collection() {
    let env = TestEnv::new().await;
    env.mkdir("/", "docs").await;
    let file = env.upload("/docs", "a.txt", "a").await;

    let collection = env
        .collections
        .add_to_collection(&env.ctx, env.space.id, "reading", file.id)
        .await
        .unwrap();

    assert!(
        env.collections
            .remove_from_collection(&env.ctx, collection.id, file.id)
            .await
            .unwrap()
    );
    assert!(
        !env.collections
            .remove_from_collection(&env.ctx, collection.id, file.id)
            .await
            .unwrap()
    );

    assert!(
        env.collections
            .delete_collection(&env.ctx, collection.id)
            .await
            .unwrap()
    );
    // The member entry itself is untouched.
    assert!(
        env.entries
            .resolver()
            .resolve(env.space.id, "/docs/a.txt")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_collection_rejects_entry_from_other_space() {
    let env = TestEnv::new().await;
    env.mkdir("/", "docs").await;
    let file = env.upload("/docs", "a.txt", "a").await;

    let other_space = env.store.create_space("marketing").await.unwrap();

    let err = env
        .collections
        .add_to_collection(&env.ctx, other_space.id, "favorites", file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_record_download_upserts_and_touches_activity() {
    let env = TestEnv::new().await;
    env.mkdir("/", "docs").await;
    let file = env.upload("/docs", "a.txt", "a").await;

    assert!(
        env.access
            .last_download(file.id, env.ctx.user_id)
            .await
            .unwrap()
            .is_none()
    );

    let first = env
        .access
        .record_download(file.id, env.ctx.user_id)
        .await
        .unwrap();
    let second = env
        .access
        .record_download(file.id, env.ctx.user_id)
        .await
        .unwrap();
    assert!(second.last_downloaded >= first.last_downloaded);

    let found = env
        .access
        .last_download(file.id, env.ctx.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.last_downloaded, second.last_downloaded);

    let entry = env
        .entries
        .resolver()
        .resolve(env.space.id, "/docs/a.txt")
        .await
        .unwrap();
    assert!(entry.entry.as_ref().unwrap().last_activity >= file.last_activity);
}

#[tokio::test]
async fn test_record_download_for_missing_entry_is_not_found() {
    let env = TestEnv::new().await;
    let err = env
        .access
        .record_download(EntryId::new(), env.ctx.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
