//! Group Membership Tests
//!
//! Tests for the membership edge store:
//! - Full replacement of a group's member set
//! - Silent drop of unresolvable member paths
//! - Inverse membership view
//! - Edges that outlive their principal rows
//! - Missing subjects reported as errors

use sqlx::sqlite::SqlitePoolOptions;

use dp_principal::{PrincipalStore, PropertyPatch, SqlitePrincipalStore, StoreError};

async fn test_store() -> SqlitePrincipalStore {
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqlitePrincipalStore::new(pool);
    store.init_schema().await.unwrap();
    store
}

async fn create(store: &SqlitePrincipalStore, path: &str) {
    store
        .create_principal(path, &PropertyPatch::new())
        .await
        .unwrap();
}

fn paths(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[tokio::test]
async fn test_set_then_read_members() {
    let store = test_store().await;
    create(&store, "principals/users/alice").await;
    create(&store, "principals/users/bob").await;
    create(&store, "principals/groups/staff").await;

    store
        .set_group_members(
            "principals/groups/staff",
            &paths(&["principals/users/alice", "principals/users/bob"]),
        )
        .await
        .unwrap();

    let members = store
        .group_members("principals/groups/staff")
        .await
        .unwrap();
    assert_eq!(
        members,
        paths(&["principals/users/alice", "principals/users/bob"])
    );
}

#[tokio::test]
async fn test_unresolvable_members_are_dropped() {
    let store = test_store().await;
    create(&store, "principals/users/alice").await;
    create(&store, "principals/groups/staff").await;

    store
        .set_group_members(
            "principals/groups/staff",
            &paths(&["principals/users/alice", "principals/users/nobody"]),
        )
        .await
        .unwrap();

    let members = store
        .group_members("principals/groups/staff")
        .await
        .unwrap();
    assert_eq!(members, paths(&["principals/users/alice"]));
}

#[tokio::test]
async fn test_replacement_is_not_a_merge() {
    let store = test_store().await;
    create(&store, "principals/users/alice").await;
    create(&store, "principals/users/bob").await;
    create(&store, "principals/groups/staff").await;

    store
        .set_group_members(
            "principals/groups/staff",
            &paths(&["principals/users/alice", "principals/users/bob"]),
        )
        .await
        .unwrap();
    store
        .set_group_members("principals/groups/staff", &paths(&["principals/users/bob"]))
        .await
        .unwrap();

    let members = store
        .group_members("principals/groups/staff")
        .await
        .unwrap();
    assert_eq!(members, paths(&["principals/users/bob"]));
}

#[tokio::test]
async fn test_replacement_with_the_same_set_is_idempotent() {
    let store = test_store().await;
    create(&store, "principals/users/alice").await;
    create(&store, "principals/groups/staff").await;

    let members = paths(&["principals/users/alice"]);
    store
        .set_group_members("principals/groups/staff", &members)
        .await
        .unwrap();
    store
        .set_group_members("principals/groups/staff", &members)
        .await
        .unwrap();

    let read = store
        .group_members("principals/groups/staff")
        .await
        .unwrap();
    assert_eq!(read, members);
}

#[tokio::test]
async fn test_empty_set_clears_the_group() {
    let store = test_store().await;
    create(&store, "principals/users/alice").await;
    create(&store, "principals/groups/staff").await;

    store
        .set_group_members(
            "principals/groups/staff",
            &paths(&["principals/users/alice"]),
        )
        .await
        .unwrap();
    store
        .set_group_members("principals/groups/staff", &[])
        .await
        .unwrap();

    let members = store
        .group_members("principals/groups/staff")
        .await
        .unwrap();
    assert!(members.is_empty());
}

#[tokio::test]
async fn test_membership_is_the_inverse_view() {
    let store = test_store().await;
    create(&store, "principals/users/alice").await;
    create(&store, "principals/users/bob").await;
    create(&store, "principals/groups/staff").await;
    create(&store, "principals/groups/admins").await;

    store
        .set_group_members(
            "principals/groups/staff",
            &paths(&["principals/users/alice", "principals/users/bob"]),
        )
        .await
        .unwrap();
    store
        .set_group_members(
            "principals/groups/admins",
            &paths(&["principals/users/alice"]),
        )
        .await
        .unwrap();

    let memberships = store
        .group_membership("principals/users/alice")
        .await
        .unwrap();
    assert_eq!(
        memberships,
        paths(&["principals/groups/staff", "principals/groups/admins"])
    );

    let memberships = store
        .group_membership("principals/users/bob")
        .await
        .unwrap();
    assert_eq!(memberships, paths(&["principals/groups/staff"]));
}

#[tokio::test]
async fn test_new_group_starts_empty() {
    let store = test_store().await;
    create(&store, "principals/groups/staff").await;

    let members = store
        .group_members("principals/groups/staff")
        .await
        .unwrap();
    assert!(members.is_empty());

    let memberships = store
        .group_membership("principals/groups/staff")
        .await
        .unwrap();
    assert!(memberships.is_empty());
}

#[tokio::test]
async fn test_missing_subject_is_an_error() {
    let store = test_store().await;

    let result = store.group_members("principals/groups/ghost").await;
    assert!(matches!(
        result,
        Err(StoreError::PrincipalNotFound { path }) if path == "principals/groups/ghost"
    ));

    let result = store.group_membership("principals/users/ghost").await;
    assert!(matches!(result, Err(StoreError::PrincipalNotFound { .. })));

    let result = store
        .set_group_members("principals/groups/ghost", &[])
        .await;
    assert!(matches!(result, Err(StoreError::PrincipalNotFound { .. })));
}

#[tokio::test]
async fn test_edges_to_deleted_principals_are_invisible() {
    let store = test_store().await;
    create(&store, "principals/users/alice").await;
    create(&store, "principals/users/bob").await;
    create(&store, "principals/groups/staff").await;

    store
        .set_group_members(
            "principals/groups/staff",
            &paths(&["principals/users/alice", "principals/users/bob"]),
        )
        .await
        .unwrap();

    // Remove bob's row out from under the store; the edge stays behind.
    sqlx::query("DELETE FROM principals WHERE uri = ?")
        .bind("principals/users/bob")
        .execute(store.pool())
        .await
        .unwrap();

    let members = store
        .group_members("principals/groups/staff")
        .await
        .unwrap();
    assert_eq!(members, paths(&["principals/users/alice"]));

    let edges: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groupmembers")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(edges, 2);
}

#[tokio::test]
async fn test_a_group_cannot_contain_itself() {
    let store = test_store().await;
    create(&store, "principals/users/alice").await;
    create(&store, "principals/groups/staff").await;

    store
        .set_group_members(
            "principals/groups/staff",
            &paths(&["principals/groups/staff", "principals/users/alice"]),
        )
        .await
        .unwrap();

    let members = store
        .group_members("principals/groups/staff")
        .await
        .unwrap();
    assert_eq!(members, paths(&["principals/users/alice"]));
}

#[tokio::test]
async fn test_duplicate_member_paths_collapse() {
    let store = test_store().await;
    create(&store, "principals/users/alice").await;
    create(&store, "principals/groups/staff").await;

    store
        .set_group_members(
            "principals/groups/staff",
            &paths(&["principals/users/alice", "principals/users/alice"]),
        )
        .await
        .unwrap();

    let members = store
        .group_members("principals/groups/staff")
        .await
        .unwrap();
    assert_eq!(members, paths(&["principals/users/alice"]));
}
