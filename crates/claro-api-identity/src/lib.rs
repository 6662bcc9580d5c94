//! Identity synchronization for the claro user directory.
//!
//! Keeps the internal user store consistent with the external identity
//! provider through two independent, unordered, at-least-once write paths:
//!
//! - **Webhook path**: the provider posts signed account-lifecycle events
//!   to `POST /identity-webhook`. Each request is HMAC-verified (fail
//!   closed), routed by event type, and reconciled into the store with
//!   idempotent upsert/delete semantics.
//! - **Fallback path**: an authenticated session lazily ensures its user
//!   record exists via `POST /session/sync` when the webhook has not yet
//!   landed.
//!
//! Races between the two paths are resolved entirely by the store's unique
//! index on the external identity id, never by coordination between callers.

pub mod crypto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;
pub mod verifier;

pub use error::{ApiResult, IdentityError};
pub use middleware::{session_auth_middleware, SessionIdentity, SessionPublicKey};
pub use models::{ProviderEvent, UserPayload};
pub use router::{session_router, webhook_router, IdentityState};
pub use services::event_router::{DispatchOutcome, EventRouter};
pub use services::reconciler::ReconcilerService;
pub use services::session_sync::{SessionSyncService, SyncAction, UserLookup};
pub use verifier::WebhookVerifier;
