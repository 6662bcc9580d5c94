//! Session authentication middleware.
//!
//! Extracts and validates the session JWT from the Authorization header,
//! then inserts a [`SessionIdentity`] into request extensions. The token is
//! issued by the external identity provider; its `sub` claim is the
//! external identity id the user store is keyed by.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use claro_core::ExternalId;
use claro_db::NewUserProfile;

/// Wrapper for the session JWT verification key (PEM) to allow putting it
/// in request extensions.
#[derive(Clone)]
pub struct SessionPublicKey(pub String);

/// Claims carried by a provider-issued session token.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    /// External identity id.
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
}

/// The authenticated session's view of the current user.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub external_id: ExternalId,
    /// Empty when the session token carries no email claim.
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub username: Option<String>,
}

impl SessionIdentity {
    /// Convert into the store's write parameter type for the fallback create.
    #[must_use]
    pub fn to_profile(&self) -> NewUserProfile {
        NewUserProfile {
            external_id: self.external_id.as_str().to_string(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            avatar_url: self.avatar_url.clone(),
            username: self.username.clone(),
        }
    }
}

impl From<SessionClaims> for SessionIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            external_id: ExternalId::new(claims.sub),
            email: claims.email.unwrap_or_default(),
            first_name: claims.given_name,
            last_name: claims.family_name,
            avatar_url: claims.picture,
            username: claims.preferred_username,
        }
    }
}

/// Session authentication middleware.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Decodes and validates the RS256 session JWT
/// 3. Inserts a [`SessionIdentity`] into request extensions
pub async fn session_auth_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    // Get the verification key from extensions
    let public_key = request
        .extensions()
        .get::<SessionPublicKey>()
        .ok_or_else(|| {
            tracing::error!("Session public key not configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error",
            )
                .into_response()
        })?
        .0
        .clone();

    // Extract Bearer token from Authorization header
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response()
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header format",
        )
            .into_response()
    })?;

    // SECURITY: Reject empty bearer tokens before attempting JWT decode.
    if token.is_empty() {
        tracing::warn!("Rejected empty bearer token");
        return Err((StatusCode::UNAUTHORIZED, "Empty bearer token").into_response());
    }

    let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes()).map_err(|e| {
        tracing::error!("Session public key is not valid RSA PEM: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error",
        )
            .into_response()
    })?;

    let mut validation = Validation::new(Algorithm::RS256);
    // The provider sets audience per frontend origin; identity is what matters here.
    validation.validate_aud = false;

    let claims = jsonwebtoken::decode::<SessionClaims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("Session token validation failed: {e}");
            (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
        })?;

    if claims.sub.is_empty() {
        tracing::warn!("Session token has an empty subject");
        return Err((StatusCode::UNAUTHORIZED, "Invalid token claims").into_response());
    }

    let identity = SessionIdentity::from(claims);
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
