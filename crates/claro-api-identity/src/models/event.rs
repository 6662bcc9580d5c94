//! Provider account-lifecycle events.
//!
//! The provider posts a JSON envelope `{ "type": string, "data": object }`.
//! Known types map to a closed tagged variant carrying only the fields that
//! type needs; every other type parses to [`ProviderEvent::Other`] so new
//! provider event types never produce errors. Events are ephemeral — only
//! their effect on the stored user is retained.

use claro_core::ExternalId;
use claro_db::NewUserProfile;
use serde::Deserialize;

use crate::error::IdentityError;

/// Raw webhook envelope as delivered by the provider.
#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Payload of a `created` or `updated` event.
///
/// `data.id` is the external identity id and is required; the profile
/// fields are whatever the provider chose to send.
#[derive(Debug, Deserialize)]
struct UserEventData {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

/// Payload of a `deleted` event. Only the identity id matters.
#[derive(Debug, Deserialize)]
struct DeletedEventData {
    id: String,
}

/// Profile fields carried by a `created` or `updated` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPayload {
    pub external_id: ExternalId,
    /// Empty when the provider omits the address.
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub username: Option<String>,
}

impl UserPayload {
    /// Convert into the store's write parameter type.
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

impl From<UserEventData> for UserPayload {
    fn from(data: UserEventData) -> Self {
        Self {
            external_id: ExternalId::new(data.id),
            email: data.email.unwrap_or_default(),
            first_name: data.first_name,
            last_name: data.last_name,
            avatar_url: data.avatar_url,
            username: data.username,
        }
    }
}

/// A verified, typed account-lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// A new account was created at the provider.
    Created(UserPayload),
    /// An existing account's profile changed.
    Updated(UserPayload),
    /// The account was removed at the provider.
    Deleted { external_id: ExternalId },
    /// An event type this system does not (yet) understand.
    Other { event_type: String },
}

impl ProviderEvent {
    /// Parse a raw webhook body into a typed event.
    ///
    /// A body that is not the expected envelope, or a known type missing its
    /// required identity id, is an [`IdentityError::InvalidPayload`].
    pub fn parse(body: &[u8]) -> Result<Self, IdentityError> {
        let envelope: EventEnvelope = serde_json::from_slice(body)
            .map_err(|e| IdentityError::InvalidPayload(format!("malformed envelope: {e}")))?;

        match envelope.event_type.as_str() {
            "created" | "updated" => {
                let data: UserEventData = serde_json::from_value(envelope.data).map_err(|e| {
                    IdentityError::InvalidPayload(format!(
                        "invalid {} payload: {e}",
                        envelope.event_type
                    ))
                })?;
                if data.id.is_empty() {
                    return Err(IdentityError::InvalidPayload(
                        "event data has an empty identity id".to_string(),
                    ));
                }
                let payload = UserPayload::from(data);
                if envelope.event_type == "created" {
                    Ok(ProviderEvent::Created(payload))
                } else {
                    Ok(ProviderEvent::Updated(payload))
                }
            }
            "deleted" => {
                let data: DeletedEventData = serde_json::from_value(envelope.data)
                    .map_err(|e| IdentityError::InvalidPayload(format!("invalid deleted payload: {e}")))?;
                if data.id.is_empty() {
                    return Err(IdentityError::InvalidPayload(
                        "event data has an empty identity id".to_string(),
                    ));
                }
                Ok(ProviderEvent::Deleted {
                    external_id: ExternalId::new(data.id),
                })
            }
            _ => Ok(ProviderEvent::Other {
                event_type: envelope.event_type,
            }),
        }
    }

    /// The event type tag, for logging.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            ProviderEvent::Created(_) => "created",
            ProviderEvent::Updated(_) => "updated",
            ProviderEvent::Deleted { .. } => "deleted",
            ProviderEvent::Other { event_type } => event_type,
        }
    }
}
