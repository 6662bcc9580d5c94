//! User entity model.
//!
//! Represents a user record mirrored from the external identity provider.
//! Rows are keyed by the provider-issued `external_id`; the unique index on
//! that column resolves every create race between the webhook reconciler
//! and the session fallback sync, so callers never coordinate with each
//! other.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use claro_core::UserId;

/// A user record in the directory.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Internal identifier, store-assigned, stable, never reused.
    pub id: Uuid,

    /// External identity id from the provider (unique).
    pub external_id: String,

    /// User's email address. Empty when the provider omits it.
    pub email: String,

    /// User's first name (given name).
    pub first_name: Option<String>,

    /// User's last name (family name).
    pub last_name: Option<String>,

    /// URL to the user's avatar image.
    pub avatar_url: Option<String>,

    /// Provider-side username.
    pub username: Option<String>,

    /// When the user was created.
    pub created_at: DateTime<Utc>,

    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Profile fields supplied on a create or upsert.
///
/// Built from either a webhook event payload or the authenticated session's
/// claims. The fields are an authoritative snapshot of the provider state:
/// an upsert overwrites all mutable profile fields with these values,
/// including clearing ones that are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUserProfile {
    pub external_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub username: Option<String>,
}

impl User {
    /// Get the internal user ID as a typed `UserId`.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.id)
    }

    /// Find a user by the provider's external identity id.
    pub async fn find_by_external_id(
        pool: &sqlx::PgPool,
        external_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Check if a user exists for an external identity id.
    pub async fn exists(pool: &sqlx::PgPool, external_id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE external_id = $1)")
            .bind(external_id)
            .fetch_one(pool)
            .await
    }

    /// Create or overwrite a user from a provider event payload.
    ///
    /// Keyed by `external_id`. When the row already exists, only the mutable
    /// profile fields are overwritten and `updated_at` is refreshed; `id`
    /// and `created_at` are never touched. Replaying an identical payload
    /// changes nothing beyond `updated_at`.
    pub async fn upsert_from_provider(
        pool: &sqlx::PgPool,
        profile: &NewUserProfile,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO users (external_id, email, first_name, last_name, avatar_url, username)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (external_id) DO UPDATE
            SET email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                avatar_url = EXCLUDED.avatar_url,
                username = EXCLUDED.username,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&profile.external_id)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.avatar_url)
        .bind(&profile.username)
        .fetch_one(pool)
        .await
    }

    /// Create a user only if none exists for the external identity id.
    ///
    /// Unlike [`User::upsert_from_provider`] this never overwrites an
    /// existing row, so a fallback create that loses the race against an
    /// in-flight webhook leaves the webhook's data intact. Returns the row
    /// and whether this call created it.
    pub async fn ensure_exists(
        pool: &sqlx::PgPool,
        profile: &NewUserProfile,
    ) -> Result<(Self, bool), sqlx::Error> {
        let inserted: Option<Self> = sqlx::query_as(
            r#"
            INSERT INTO users (external_id, email, first_name, last_name, avatar_url, username)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (external_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&profile.external_id)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.avatar_url)
        .bind(&profile.username)
        .fetch_optional(pool)
        .await?;

        if let Some(user) = inserted {
            return Ok((user, true));
        }

        // Lost the race: another writer inserted the row first.
        match Self::find_by_external_id(pool, &profile.external_id).await? {
            Some(user) => Ok((user, false)),
            // The row was deleted between the insert and the re-read.
            None => Err(sqlx::Error::RowNotFound),
        }
    }

    /// Delete a user by external identity id.
    ///
    /// Returns the number of rows removed; zero (the id was never created,
    /// or a delete was already applied) is a successful no-op.
    pub async fn delete_by_external_id(
        pool: &sqlx::PgPool,
        external_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE external_id = $1")
            .bind(external_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_conversion() {
        let uuid = Uuid::new_v4();
        let user = User {
            id: uuid,
            external_id: "u_123".to_string(),
            email: "test@example.com".to_string(),
            first_name: Some("Ana".to_string()),
            last_name: None,
            avatar_url: None,
            username: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(*user.user_id().as_uuid(), uuid);
    }

    #[test]
    fn test_new_user_profile_default_is_empty() {
        let profile = NewUserProfile::default();
        assert!(profile.external_id.is_empty());
        assert!(profile.email.is_empty());
        assert!(profile.first_name.is_none());
    }
}
