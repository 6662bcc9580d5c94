//! Dispatch of verified provider events by type.

use crate::error::ApiResult;
use crate::models::ProviderEvent;
use crate::services::reconciler::ReconcilerService;

/// What the router did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A `created` or `updated` event was reconciled into the store.
    Upserted,
    /// A `deleted` event was applied (including when the row was already absent).
    Deleted,
    /// The event type is unknown to this system; deliberately ignored.
    Ignored,
}

/// Routes verified events to the reconciler.
///
/// Unknown event types are a successful no-op: the provider ships event
/// types this system does not yet understand, and rejecting them would
/// only trigger pointless redelivery.
#[derive(Clone)]
pub struct EventRouter {
    reconciler: ReconcilerService,
}

impl EventRouter {
    /// Create a new event router over the given reconciler.
    #[must_use]
    pub fn new(reconciler: ReconcilerService) -> Self {
        Self { reconciler }
    }

    /// Dispatch a verified event to its handler.
    pub async fn dispatch(&self, event: ProviderEvent) -> ApiResult<DispatchOutcome> {
        match event {
            ProviderEvent::Created(payload) | ProviderEvent::Updated(payload) => {
                self.reconciler.upsert_user(&payload).await?;
                Ok(DispatchOutcome::Upserted)
            }
            ProviderEvent::Deleted { external_id } => {
                self.reconciler.delete_user(&external_id).await?;
                Ok(DispatchOutcome::Deleted)
            }
            ProviderEvent::Other { event_type } => {
                tracing::debug!(event_type, "Ignoring unhandled provider event type");
                Ok(DispatchOutcome::Ignored)
            }
        }
    }
}
