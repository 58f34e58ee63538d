mod common;

use std::{sync::Arc, time::Duration};

use common::FakeSpotify;
use tunesync::error::SyncError;

#[tokio::test]
async fn test_cached_token_is_reused() {
    let fake = FakeSpotify::start().await;
    let tokens = fake.token_manager();

    let first = tokens.get_valid_token().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    let second = tokens.get_valid_token().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fake.grant_count(), 1);
}

#[tokio::test]
async fn test_token_inside_expiry_buffer_is_refreshed() {
    let fake = FakeSpotify::start().await;
    // 30s lifetime is entirely covered by the expiry buffer
    fake.set_expires_in(30);
    let tokens = fake.token_manager();

    let first = tokens.get_valid_token().await.unwrap();
    let second = tokens.get_valid_token().await.unwrap();

    assert_ne!(first, second);
    assert_eq!(fake.grant_count(), 2);
}

#[tokio::test]
async fn test_invalidate_forces_a_new_grant() {
    let fake = FakeSpotify::start().await;
    let tokens = fake.token_manager();

    tokens.get_valid_token().await.unwrap();
    tokens.invalidate().await;
    tokens.get_valid_token().await.unwrap();

    assert_eq!(fake.grant_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_grant() {
    let fake = FakeSpotify::start().await;
    fake.set_grant_delay(Duration::from_millis(200));
    let tokens = fake.token_manager();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tokens = Arc::clone(&tokens);
            tokio::spawn(async move { tokens.get_valid_token().await })
        })
        .collect();

    let mut values = Vec::new();
    for handle in handles {
        values.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(fake.grant_count(), 1);
    assert!(values.iter().all(|v| v == &values[0]));
}

#[tokio::test]
async fn test_rejected_grant_is_auth_failure() {
    let fake = FakeSpotify::start().await;
    fake.fail_grants_with(401);
    let tokens = fake.token_manager();

    let err = tokens.get_valid_token().await.unwrap_err();
    assert!(matches!(err, SyncError::AuthFailure { status: 401 }));
    assert_eq!(err.stage(), "authentication");

    // no retry inside the manager
    assert_eq!(fake.grant_count(), 1);
}

#[tokio::test]
async fn test_auth_failure_aborts_catalog_calls() {
    let fake = FakeSpotify::start().await;
    fake.add_artist("A1", "Artist One", &["house"]);
    fake.fail_grants_with(500);

    let catalog = fake.catalog_client();
    let err = catalog.get_artist("A1").await.unwrap_err();
    assert!(matches!(err, SyncError::AuthFailure { status: 500 }));
}
