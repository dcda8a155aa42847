//! Outbound application events.
//!
//! The [`SessionService`](super::service::SessionService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them.

use crate::app::ports::StorageError;
use crate::fsm::ModeId;
use crate::pet::OwnerKey;

/// Structured events emitted by the session core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The session opened. `created` is true for a brand-new pet.
    Started {
        owner: OwnerKey,
        mode: ModeId,
        created: bool,
    },

    /// Offline catch-up ran on resume.
    CaughtUp { minutes: u64, tier: usize },

    /// The state machine moved between modes.
    StateChanged { from: ModeId, to: ModeId },

    /// Health reached zero.
    PetDied,

    /// A fresh pet replaced the dead one.
    Restarted,

    /// A save was handed to the persistence layer.
    Saved,

    /// A save could not be handed off or written.
    SaveFailed(StorageError),

    /// Final save done; the session is over.
    SessionEnded,
}
