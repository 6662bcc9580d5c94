//! Session-scoped fallback synchronization.
//!
//! When a session becomes authenticated before the provider's `created`
//! webhook has landed, the session lazily materializes its own user record.
//! The decision logic is an explicit state machine rather than an implicit
//! re-evaluated side effect: the only transition allowed to write is
//! `Absent -> Present`, and it fires at most once per session.
//!
//! Correctness under races with the webhook reconciler depends entirely on
//! the store's unique index on the external id, not on coordination
//! between the two callers.

use sqlx::PgPool;

use claro_db::User;

use crate::error::ApiResult;
use crate::middleware::SessionIdentity;

/// What the session currently knows about its user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUserState {
    /// Nothing observed yet.
    Unknown,
    /// A store lookup is in flight; not yet resolved.
    Loading,
    /// The store definitively has no record for this identity.
    Absent,
    /// The record exists.
    Present,
}

/// Result of a store lookup, as observed by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLookup {
    /// The query has not resolved yet.
    Loading,
    /// Definitively not found.
    Absent,
    /// The user record exists.
    Present,
}

/// Action the session should take after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Nothing to do.
    None,
    /// Issue the one-shot ensure-exists create.
    EnsureExists,
}

/// One-shot ensure-exists tracker for a single session.
///
/// Re-observing `Absent` after the ensure action was already armed yields
/// [`SyncAction::None`], so session-state re-evaluation can never issue the
/// create more than once.
#[derive(Debug)]
pub struct SessionSync {
    state: SessionUserState,
    ensure_fired: bool,
}

impl SessionSync {
    /// Create a tracker for a fresh session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SessionUserState::Unknown,
            ensure_fired: false,
        }
    }

    /// The last observed state.
    #[must_use]
    pub fn state(&self) -> SessionUserState {
        self.state
    }

    /// Feed a lookup observation into the tracker, returning what to do next.
    pub fn observe(&mut self, lookup: UserLookup) -> SyncAction {
        match lookup {
            UserLookup::Loading => {
                self.state = SessionUserState::Loading;
                SyncAction::None
            }
            UserLookup::Present => {
                self.state = SessionUserState::Present;
                SyncAction::None
            }
            UserLookup::Absent => {
                self.state = SessionUserState::Absent;
                if self.ensure_fired {
                    SyncAction::None
                } else {
                    self.ensure_fired = true;
                    SyncAction::EnsureExists
                }
            }
        }
    }
}

impl Default for SessionSync {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a session sync: the user record, and whether this call created it.
#[derive(Debug, Clone)]
pub struct SessionSyncOutcome {
    pub user: User,
    pub created: bool,
}

/// Runs the fallback ensure-exists for an authenticated session.
#[derive(Clone)]
pub struct SessionSyncService {
    pool: PgPool,
}

impl SessionSyncService {
    /// Create a new session sync service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensure the session's user record exists.
    ///
    /// Queries the store once; only on definitive absence issues a single
    /// create carrying whatever profile fields the session exposes. The
    /// create never overwrites an existing row, so losing the race against
    /// an in-flight webhook leaves the webhook's richer data intact.
    pub async fn sync(&self, identity: &SessionIdentity) -> ApiResult<SessionSyncOutcome> {
        let mut tracker = SessionSync::new();
        tracker.observe(UserLookup::Loading);

        let found = User::find_by_external_id(&self.pool, identity.external_id.as_str()).await?;

        match found {
            Some(user) => {
                tracker.observe(UserLookup::Present);
                Ok(SessionSyncOutcome {
                    user,
                    created: false,
                })
            }
            None => {
                // A fresh tracker always arms the ensure on first absence.
                let action = tracker.observe(UserLookup::Absent);
                debug_assert_eq!(action, SyncAction::EnsureExists);

                let (user, created) =
                    User::ensure_exists(&self.pool, &identity.to_profile()).await?;
                tracker.observe(UserLookup::Present);

                tracing::info!(
                    external_id = %identity.external_id,
                    created,
                    "Session fallback sync ensured user record"
                );

                Ok(SessionSyncOutcome { user, created })
            }
        }
    }
}
