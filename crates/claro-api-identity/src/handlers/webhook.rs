//! Provider webhook ingestion endpoint handler.
//!
//! POST /identity-webhook - Verify and reconcile one provider event.

use axum::{body::Bytes, extract::State, http::HeaderMap, http::StatusCode};

use crate::error::IdentityError;
use crate::router::IdentityState;
use crate::services::DispatchOutcome;

/// Ingests one signed account-lifecycle event from the identity provider.
///
/// One event, one verify, one reconcile, one response; no in-process state
/// is shared across requests. Failures surface immediately and the
/// provider's own redelivery policy provides the retry.
#[utoipa::path(
    post,
    path = "/identity-webhook",
    request_body = String,
    responses(
        (status = 200, description = "Event processed (or deliberately ignored)"),
        (status = 400, description = "Verification or parse failure", body = crate::error::ErrorResponse),
        (status = 500, description = "Store unavailable; provider should retry", body = crate::error::ErrorResponse),
    ),
    tag = "Identity"
)]
pub async fn identity_webhook_handler(
    State(state): State<IdentityState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, IdentityError> {
    let event = state.verifier.verify(&headers, &body)?;

    tracing::debug!(event_type = event.kind(), "Verified provider event");

    let outcome = state.event_router.dispatch(event).await?;

    if outcome == DispatchOutcome::Ignored {
        tracing::debug!("Provider event ignored (unknown type)");
    }

    Ok(StatusCode::OK)
}
