//! End-to-end reconciliation tests through the webhook endpoint.
//!
//! Run with a disposable Postgres database:
//! `DATABASE_URL=postgres://localhost/claro_test cargo test -p claro-api-identity --features integration`

#![cfg(feature = "integration")]

mod common;

use axum::http::StatusCode;
use claro_db::{run_migrations, User};
use common::*;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    let pool = PgPool::connect(&url).await.expect("connect test database");
    run_migrations(&pool).await.expect("run migrations");
    pool
}

fn unique_external_id() -> String {
    format!("u_{}", Uuid::new_v4().simple())
}

fn created_event(external_id: &str) -> String {
    format!(r#"{{"type":"created","data":{{"id":"{external_id}","email":"a@b.com","first_name":"Ana"}}}}"#)
}

#[tokio::test]
async fn created_event_materializes_one_user() {
    let pool = test_pool().await;
    let external_id = unique_external_id();
    let body = created_event(&external_id);

    let response = webhook_app(pool.clone())
        .oneshot(signed_request(&body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let user = User::find_by_external_id(&pool, &external_id)
        .await
        .expect("lookup")
        .expect("user exists");
    assert_eq!(user.email, "a@b.com");
    assert_eq!(user.first_name.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn replaying_identical_request_is_idempotent() {
    let pool = test_pool().await;
    let external_id = unique_external_id();
    let body = created_event(&external_id);

    let first = webhook_app(pool.clone())
        .oneshot(signed_request(&body))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::OK);
    let before = User::find_by_external_id(&pool, &external_id)
        .await
        .expect("lookup")
        .expect("user exists");

    let second = webhook_app(pool.clone())
        .oneshot(signed_request(&body))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::OK);
    let after = User::find_by_external_id(&pool, &external_id)
        .await
        .expect("lookup")
        .expect("user still exists");

    assert_eq!(after.id, before.id);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.email, before.email);
    assert_eq!(after.first_name, before.first_name);
}

#[tokio::test]
async fn update_without_prior_create_upserts() {
    let pool = test_pool().await;
    let external_id = unique_external_id();
    let body = format!(r#"{{"type":"updated","data":{{"id":"{external_id}","email":"new@b.com"}}}}"#);

    let response = webhook_app(pool.clone())
        .oneshot(signed_request(&body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let user = User::find_by_external_id(&pool, &external_id)
        .await
        .expect("lookup")
        .expect("user created by upsert-on-update");
    assert_eq!(user.email, "new@b.com");
}

#[tokio::test]
async fn delete_removes_user_and_replays_as_noop() {
    let pool = test_pool().await;
    let external_id = unique_external_id();

    let create = created_event(&external_id);
    webhook_app(pool.clone())
        .oneshot(signed_request(&create))
        .await
        .expect("create response");

    let delete = format!(r#"{{"type":"deleted","data":{{"id":"{external_id}"}}}}"#);
    let first = webhook_app(pool.clone())
        .oneshot(signed_request(&delete))
        .await
        .expect("delete response");
    assert_eq!(first.status(), StatusCode::OK);

    assert!(User::find_by_external_id(&pool, &external_id)
        .await
        .expect("lookup")
        .is_none());

    // Redelivery of the identical delete succeeds as a no-op.
    let second = webhook_app(pool.clone())
        .oneshot(signed_request(&delete))
        .await
        .expect("replayed delete response");
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn verification_failure_leaves_store_unchanged() {
    let pool = test_pool().await;
    let external_id = unique_external_id();
    let body = created_event(&external_id);

    let response = webhook_app(pool.clone())
        .oneshot(request_missing_header(&body, "event-signature"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(
        User::find_by_external_id(&pool, &external_id)
            .await
            .expect("lookup")
            .is_none(),
        "rejected request must not mutate the store"
    );
}
