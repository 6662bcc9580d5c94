//! Common test utilities for claro-api-identity tests.
//!
//! Provides request builders and fixtures for exercising the webhook
//! endpoint the way the provider would.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use claro_api_identity::{crypto, webhook_router, IdentityState};

/// Shared signing secret used across tests.
pub const SECRET: &str = "whsec_test_secret_key_12345";

/// Delivery id and timestamp fixtures.
pub const EVENT_ID: &str = "msg_2nXw7qLpTest";
pub const TIMESTAMP: &str = "1700000000";

/// A lazily-connected pool.
///
/// Verification-failure and unknown-type paths never touch the database,
/// so these tests run without one.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/claro_never_connected")
        .expect("lazy pool")
}

/// Build the webhook router over the given pool.
pub fn webhook_app(pool: PgPool) -> Router {
    let state = IdentityState::new(pool, SECRET).expect("identity state");
    webhook_router(state)
}

/// Build a correctly signed webhook request for `body`.
pub fn signed_request(body: &str) -> Request<Body> {
    let signature = crypto::compute_signature(SECRET, EVENT_ID, TIMESTAMP, body.as_bytes());
    Request::builder()
        .method("POST")
        .uri("/identity-webhook")
        .header("content-type", "application/json")
        .header("event-id", EVENT_ID)
        .header("event-timestamp", TIMESTAMP)
        .header("event-signature", signature)
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Build a webhook request with one of the three signature headers omitted.
pub fn request_missing_header(body: &str, omit: &str) -> Request<Body> {
    let signature = crypto::compute_signature(SECRET, EVENT_ID, TIMESTAMP, body.as_bytes());
    let mut builder = Request::builder()
        .method("POST")
        .uri("/identity-webhook")
        .header("content-type", "application/json");
    if omit != "event-id" {
        builder = builder.header("event-id", EVENT_ID);
    }
    if omit != "event-timestamp" {
        builder = builder.header("event-timestamp", TIMESTAMP);
    }
    if omit != "event-signature" {
        builder = builder.header("event-signature", signature);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}
