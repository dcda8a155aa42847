//! Off-loop persistence.
//!
//! In-session saves must not block the session main loop, so they are
//! handed to a per-session writer thread through a bounded channel.
//!
//! ```text
//!  SessionService ──save()──▶ QueuedSaver ──try_send──▶ ┌──────────────┐
//!                                                      │ SAVE channel │
//!                         PersistenceWorker thread ◀───│ (bounded)    │
//!                         repo.update() serially       └──────────────┘
//! ```
//!
//! A full queue drops the save with [`StorageError::QueueFull`]; the next
//! autosave or the final shutdown save carries the newer state anyway.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};

use crate::app::ports::{PetRepository, SavePort, StorageError};
use crate::pet::PetRecord;

/// Pending saves per session.
pub const SAVE_QUEUE_DEPTH: usize = 4;

enum SaveMsg {
    Save(Box<PetRecord>),
    Stop,
}

type SaveChannel = Channel<CriticalSectionRawMutex, SaveMsg, SAVE_QUEUE_DEPTH>;

/// Counters returned when the worker is stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub written: u64,
    pub failed: u64,
}

// ───────────────────────────────────────────────────────────────
// QueuedSaver (SavePort)
// ───────────────────────────────────────────────────────────────

/// Non-blocking [`SavePort`] feeding a [`PersistenceWorker`].
#[derive(Clone)]
pub struct QueuedSaver {
    queue: Arc<SaveChannel>,
    closed: Arc<AtomicBool>,
}

impl SavePort for QueuedSaver {
    fn save(&mut self, record: &PetRecord) -> Result<(), StorageError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed);
        }
        self.queue
            .try_send(SaveMsg::Save(Box::new(record.clone())))
            .map_err(|_| StorageError::QueueFull)
    }
}

// ───────────────────────────────────────────────────────────────
// PersistenceWorker
// ───────────────────────────────────────────────────────────────

pub struct PersistenceWorker {
    queue: Arc<SaveChannel>,
    closed: Arc<AtomicBool>,
    handle: Option<JoinHandle<WorkerStats>>,
    stats: WorkerStats,
}

impl PersistenceWorker {
    /// Start the writer thread for one session.
    pub fn spawn(repo: Arc<dyn PetRepository>, name: &str) -> std::io::Result<Self> {
        let queue: Arc<SaveChannel> = Arc::new(Channel::new());
        let rx = Arc::clone(&queue);
        let handle = std::thread::Builder::new()
            .name(format!("save-{name}"))
            .spawn(move || futures_lite::future::block_on(write_loop(rx, repo)))?;
        info!("Persistence worker started for {}", name);
        Ok(Self {
            queue,
            closed: Arc::new(AtomicBool::new(false)),
            handle: Some(handle),
            stats: WorkerStats::default(),
        })
    }

    /// A save port feeding this worker.
    pub fn saver(&self) -> QueuedSaver {
        QueuedSaver {
            queue: Arc::clone(&self.queue),
            closed: Arc::clone(&self.closed),
        }
    }

    /// Refuse new saves, drain what is queued, and join the thread.
    /// Safe to call more than once; later calls return the same stats.
    pub fn stop(&mut self) -> WorkerStats {
        self.closed.store(true, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return self.stats;
        };
        if !handle.is_finished() {
            futures_lite::future::block_on(self.queue.send(SaveMsg::Stop));
        }
        match handle.join() {
            Ok(stats) => self.stats = stats,
            Err(_) => warn!("Persistence worker panicked"),
        }
        info!(
            "Persistence worker stopped ({} written, {} failed)",
            self.stats.written, self.stats.failed
        );
        self.stats
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn write_loop(queue: Arc<SaveChannel>, repo: Arc<dyn PetRepository>) -> WorkerStats {
    let mut stats = WorkerStats::default();
    loop {
        match queue.receive().await {
            SaveMsg::Save(record) => match repo.update(&record) {
                Ok(()) => {
                    stats.written += 1;
                    debug!("Saved pet for {}", record.owner);
                }
                Err(e) => {
                    stats.failed += 1;
                    warn!("Background save for {} failed: {}", record.owner, e);
                }
            },
            SaveMsg::Stop => return stats,
        }
    }
}
