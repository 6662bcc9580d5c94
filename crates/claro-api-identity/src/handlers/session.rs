//! Session fallback sync endpoint handler.
//!
//! POST /session/sync - Ensure the authenticated session's user record exists.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::IdentityError;
use crate::middleware::SessionIdentity;
use crate::router::IdentityState;

/// The session's user record after a sync.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSyncResponse {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Whether this call created the record (fallback path won the race).
    pub created: bool,
}

/// Ensures a user record exists for the authenticated session.
///
/// Called once per session transition (absent -> present). Only a
/// definitively absent record triggers a create; an existing record is
/// returned unchanged.
#[utoipa::path(
    post,
    path = "/session/sync",
    responses(
        (status = 200, description = "User record present (created if it was missing)", body = SessionSyncResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 500, description = "Store unavailable", body = crate::error::ErrorResponse),
    ),
    security(("bearerAuth" = [])),
    tag = "Identity"
)]
pub async fn session_sync_handler(
    State(state): State<IdentityState>,
    Extension(identity): Extension<SessionIdentity>,
) -> Result<(StatusCode, Json<SessionSyncResponse>), IdentityError> {
    let outcome = state.session_sync.sync(&identity).await?;

    let user = outcome.user;
    let response = SessionSyncResponse {
        id: user.id,
        external_id: user.external_id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        avatar_url: user.avatar_url,
        username: user.username,
        created_at: user.created_at,
        updated_at: user.updated_at,
        created: outcome.created,
    };

    Ok((StatusCode::OK, Json(response)))
}
