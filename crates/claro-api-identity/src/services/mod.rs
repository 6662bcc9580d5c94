//! Services applying provider events and session state to the user store.

pub mod event_router;
pub mod reconciler;
pub mod session_sync;

pub use event_router::{DispatchOutcome, EventRouter};
pub use reconciler::ReconcilerService;
pub use session_sync::{SessionSync, SessionSyncOutcome, SessionSyncService, SyncAction, UserLookup};
