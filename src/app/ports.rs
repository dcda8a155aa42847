//! Port traits: the hexagonal boundary between the pet domain and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SessionService (domain)
//! ```
//!
//! Storage, persistence queues, clocks, output sinks and renderers
//! implement these traits. The [`SessionService`](super::service::SessionService)
//! consumes them via generics, so the domain core never touches a file,
//! socket or wall clock directly.
//!
//! ## Contract notes
//!
//! - **PetRepository::get_or_create** MUST be atomic per owner: two
//!   concurrent first connections produce exactly one record.
//! - **SavePort** implementations SHOULD NOT block the session loop.
//! - All port errors are typed; callers handle every variant explicitly.

use chrono::{DateTime, Utc};

use crate::pet::{OwnerKey, PetRecord};
use crate::render::SessionView;

// ───────────────────────────────────────────────────────────────
// Pet repository (driven adapter: domain ↔ persistent store)
// ───────────────────────────────────────────────────────────────

/// Persistent store of pet records, keyed by owner.
///
/// Shared by every session, so implementations serialise access
/// internally and take `&self`.
pub trait PetRepository: Send + Sync {
    /// The owner's current pet, if any.
    fn find_by_owner(&self, owner: &OwnerKey) -> Result<Option<PetRecord>, StorageError>;

    /// Insert a new record and return it with its assigned id.
    fn create(&self, record: PetRecord) -> Result<PetRecord, StorageError>;

    /// Upsert by owner.
    fn update(&self, record: &PetRecord) -> Result<(), StorageError>;

    /// Return the owner's pet, creating `fresh` when none exists.
    /// The flag is `true` when `fresh` was inserted.
    fn get_or_create(
        &self,
        owner: &OwnerKey,
        fresh: PetRecord,
    ) -> Result<(PetRecord, bool), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Save port (driven adapter: domain → persistence queue)
// ───────────────────────────────────────────────────────────────

/// Where in-session saves go. Production uses a queued saver backed by
/// a writer thread; tests record calls.
pub trait SavePort {
    fn save(&mut self, record: &PetRecord) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// ───────────────────────────────────────────────────────────────
// Output (driven adapter: domain → terminal)
// ───────────────────────────────────────────────────────────────

/// Receives every rendered frame for one session.
pub trait OutputSink {
    fn write_frame(&mut self, frame: &str) -> std::io::Result<()>;
}

/// Pure state-to-text function. Visual layout is entirely the
/// implementation's business.
pub trait Renderer {
    fn render(&self, view: &SessionView<'_>) -> String;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the event queue)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a schedule fires.
///
/// The runtime implements this by pushing into the session event queue;
/// the [`Scheduler`](crate::scheduler::Scheduler) itself knows nothing
/// about queues or sessions.
pub trait SchedulerDelegate {
    /// * `label`: the label of the schedule that fired.
    /// * `event`: which periodic signal it carries.
    fn on_schedule_fired(&mut self, label: &str, event: TimerEvent);
}

/// Periodic signals a schedule can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Animation frame.
    Frame,
    /// Stat tick.
    Logic,
    /// Periodic persistence.
    Autosave,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration loading and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found.
    NotFound,
    /// Stored config failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Filesystem error.
    Io(std::io::ErrorKind),
}

/// Errors from [`PetRepository`] and [`SavePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested record does not exist.
    NotFound,
    /// Stored record failed to deserialize.
    Corrupted,
    /// Filesystem error.
    Io(std::io::ErrorKind),
    /// The persistence queue is full; the save was dropped.
    QueueFull,
    /// The persistence worker has stopped.
    Closed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Io(kind) => write!(f, "I/O error: {}", kind),
        }
    }
}

impl std::error::Error for ConfigError {}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "record not found"),
            Self::Corrupted => write!(f, "record corrupted"),
            Self::Io(kind) => write!(f, "I/O error: {}", kind),
            Self::QueueFull => write!(f, "save queue full"),
            Self::Closed => write!(f, "persistence worker closed"),
        }
    }
}

impl std::error::Error for StorageError {}
