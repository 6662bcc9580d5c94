//! Axum router setup for identity synchronization endpoints.

use axum::{routing::post, Router};
use sqlx::PgPool;

use crate::error::ApiResult;
use crate::handlers::{session, webhook};
use crate::services::{EventRouter, ReconcilerService, SessionSyncService};
use crate::verifier::WebhookVerifier;

/// Shared state for identity handlers.
#[derive(Clone)]
pub struct IdentityState {
    pub verifier: WebhookVerifier,
    pub event_router: EventRouter,
    pub session_sync: SessionSyncService,
}

impl IdentityState {
    /// Create the identity state from a pool and the webhook signing secret.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the signing secret is empty; the
    /// caller must treat this as fatal rather than serving unsigned traffic.
    pub fn new(pool: PgPool, webhook_secret: &str) -> ApiResult<Self> {
        Ok(Self {
            verifier: WebhookVerifier::new(webhook_secret)?,
            event_router: EventRouter::new(ReconcilerService::new(pool.clone())),
            session_sync: SessionSyncService::new(pool),
        })
    }
}

/// Creates the public webhook ingestion router.
///
/// Authentication is the HMAC signature itself; no session is involved.
pub fn webhook_router(state: IdentityState) -> Router {
    Router::new()
        .route("/identity-webhook", post(webhook::identity_webhook_handler))
        .with_state(state)
}

/// Creates the authenticated session sync router.
///
/// The caller attaches `session_auth_middleware` and the
/// `SessionPublicKey` extension when wiring the application.
pub fn session_router(state: IdentityState) -> Router {
    Router::new()
        .route("/session/sync", post(session::session_sync_handler))
        .with_state(state)
}
