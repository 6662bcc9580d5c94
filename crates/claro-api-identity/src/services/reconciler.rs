//! Reconciler applying webhook-driven lifecycle events to the user store.
//!
//! All operations are keyed by the external identity id and idempotent, so
//! the provider's at-least-once, unordered redelivery is safe to replay.

use sqlx::PgPool;

use claro_core::ExternalId;
use claro_db::User;

use crate::error::ApiResult;
use crate::models::UserPayload;

/// Applies create/update/delete semantics to the user store.
#[derive(Clone)]
pub struct ReconcilerService {
    pool: PgPool,
}

impl ReconcilerService {
    /// Create a new reconciler service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a user from a `created` or `updated` event payload.
    ///
    /// Creates the row when the external id is unseen (so an `updated`
    /// arriving before its `created` still succeeds), otherwise overwrites
    /// only the mutable profile fields. The internal id and creation
    /// timestamp are never touched. A concurrent create for the same id
    /// collapses into this row through the store's unique index.
    pub async fn upsert_user(&self, payload: &UserPayload) -> ApiResult<User> {
        let user = User::upsert_from_provider(&self.pool, &payload.to_profile()).await?;

        tracing::info!(
            external_id = %user.external_id,
            user_id = %user.id,
            "Reconciled user from provider event"
        );

        Ok(user)
    }

    /// Delete the user for an external identity id.
    ///
    /// Deleting an id with no corresponding user is a no-op, not an error.
    /// Returns whether a row was actually removed.
    pub async fn delete_user(&self, external_id: &ExternalId) -> ApiResult<bool> {
        let removed = User::delete_by_external_id(&self.pool, external_id.as_str()).await?;

        if removed > 0 {
            tracing::info!(external_id = %external_id, "Deleted user from provider event");
        } else {
            tracing::debug!(
                external_id = %external_id,
                "Delete for unknown external id ignored"
            );
        }

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    // Reconciler behavior requires a database and is covered by
    // tests/reconcile_flow_test.rs behind the `integration` feature.
}
