//! Webhook request verification.
//!
//! Authenticates inbound provider deliveries before anything touches the
//! store. Pure validation: no network or storage side effects.

use axum::http::HeaderMap;

use crate::crypto;
use crate::error::IdentityError;
use crate::models::ProviderEvent;

/// Header carrying the provider's delivery id.
pub const EVENT_ID_HEADER: &str = "event-id";

/// Header carrying the delivery timestamp.
pub const EVENT_TIMESTAMP_HEADER: &str = "event-timestamp";

/// Header carrying the HMAC-SHA256 signature.
pub const EVENT_SIGNATURE_HEADER: &str = "event-signature";

/// Verifies provider webhook deliveries against the shared signing secret.
///
/// The secret is injected at construction; an absent secret is a fatal
/// configuration error, never a per-request fallback to accept-all.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    /// Create a verifier from the shared signing secret.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Configuration`] if the secret is empty —
    /// the service must refuse to process webhooks rather than silently
    /// accept unsigned events.
    pub fn new(secret: impl Into<String>) -> Result<Self, IdentityError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(IdentityError::Configuration(
                "webhook signing secret must not be empty".to_string(),
            ));
        }
        Ok(Self { secret })
    }

    /// Verify a webhook delivery and parse it into a typed event.
    ///
    /// Fail closed: a missing header, a signature mismatch, or a body that
    /// does not parse as the expected envelope all reject the request with
    /// no mutation.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<ProviderEvent, IdentityError> {
        let event_id = required_header(headers, EVENT_ID_HEADER)?;
        let timestamp = required_header(headers, EVENT_TIMESTAMP_HEADER)?;
        let signature = required_header(headers, EVENT_SIGNATURE_HEADER)?;

        if !crypto::verify_signature(signature, &self.secret, event_id, timestamp, body) {
            tracing::warn!(event_id, "Webhook signature mismatch");
            return Err(IdentityError::Verification(
                "signature mismatch".to_string(),
            ));
        }

        ProviderEvent::parse(body)
    }
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"[redacted]")
            .finish()
    }
}

/// Extract a required header as UTF-8, failing closed when absent.
fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, IdentityError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| IdentityError::Verification(format!("missing required header: {name}")))
}
