//! Mock port adapters for integration tests.
//!
//! Records every event, save and frame so tests can assert on the full
//! history without a real terminal or disk.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use termpet::adapters::memory::MemoryStore;
use termpet::app::events::AppEvent;
use termpet::app::ports::{EventSink, OutputSink, PetRepository, SavePort, StorageError};
use termpet::pet::{OwnerKey, PetRecord};
use termpet::stats::Entropy;

// ── Entropy ──────────────────────────────────────────────────

/// Deterministic entropy: every `one_in` roll either always or never
/// hits, and `unit()` returns a fixed value.
pub struct FixedEntropy {
    hit: bool,
    unit: f64,
}

#[allow(dead_code)]
impl FixedEntropy {
    /// No probabilistic rule ever fires.
    pub fn never() -> Self {
        Self { hit: false, unit: 0.99 }
    }

    /// Every probabilistic rule fires.
    pub fn always() -> Self {
        Self { hit: true, unit: 0.0 }
    }
}

impl Entropy for FixedEntropy {
    fn pick(&mut self, low: u32, high: u32) -> u32 {
        if self.hit { low } else { high }
    }

    fn unit(&mut self) -> f64 {
        self.unit
    }
}

// ── EventSink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, event: &AppEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── SavePort ─────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSaver {
    pub saves: Vec<PetRecord>,
    /// When set, every save fails with this error.
    pub fail_with: Option<StorageError>,
}

impl SavePort for RecordingSaver {
    fn save(&mut self, record: &PetRecord) -> Result<(), StorageError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.saves.push(record.clone());
        Ok(())
    }
}

// ── PetRepository ────────────────────────────────────────────

/// A [`MemoryStore`] that counts `update` calls.
#[derive(Default)]
pub struct CountingRepo {
    pub inner: MemoryStore,
    updates: AtomicU64,
}

#[allow(dead_code)]
impl CountingRepo {
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::SeqCst)
    }
}

impl PetRepository for CountingRepo {
    fn find_by_owner(&self, owner: &OwnerKey) -> Result<Option<PetRecord>, StorageError> {
        self.inner.find_by_owner(owner)
    }

    fn create(&self, record: PetRecord) -> Result<PetRecord, StorageError> {
        self.inner.create(record)
    }

    fn update(&self, record: &PetRecord) -> Result<(), StorageError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(record)
    }

    fn get_or_create(
        &self,
        owner: &OwnerKey,
        fresh: PetRecord,
    ) -> Result<(PetRecord, bool), StorageError> {
        self.inner.get_or_create(owner, fresh)
    }
}

/// A [`CountingRepo`] whose first `failures` loads fail with
/// `Io(Interrupted)` before it recovers.
#[derive(Default)]
pub struct FlakyRepo {
    pub inner: CountingRepo,
    failures: AtomicU32,
}

#[allow(dead_code)]
impl FlakyRepo {
    pub fn failing(failures: u32) -> Self {
        Self {
            inner: CountingRepo::default(),
            failures: AtomicU32::new(failures),
        }
    }
}

impl PetRepository for FlakyRepo {
    fn find_by_owner(&self, owner: &OwnerKey) -> Result<Option<PetRecord>, StorageError> {
        self.inner.find_by_owner(owner)
    }

    fn create(&self, record: PetRecord) -> Result<PetRecord, StorageError> {
        self.inner.create(record)
    }

    fn update(&self, record: &PetRecord) -> Result<(), StorageError> {
        self.inner.update(record)
    }

    fn get_or_create(
        &self,
        owner: &OwnerKey,
        fresh: PetRecord,
    ) -> Result<(PetRecord, bool), StorageError> {
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StorageError::Io(std::io::ErrorKind::Interrupted));
        }
        self.inner.get_or_create(owner, fresh)
    }
}

/// A repository whose every call fails.
pub struct BrokenRepo;

impl PetRepository for BrokenRepo {
    fn find_by_owner(&self, _owner: &OwnerKey) -> Result<Option<PetRecord>, StorageError> {
        Err(StorageError::Io(std::io::ErrorKind::PermissionDenied))
    }

    fn create(&self, _record: PetRecord) -> Result<PetRecord, StorageError> {
        Err(StorageError::Io(std::io::ErrorKind::PermissionDenied))
    }

    fn update(&self, _record: &PetRecord) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::ErrorKind::PermissionDenied))
    }

    fn get_or_create(
        &self,
        _owner: &OwnerKey,
        _fresh: PetRecord,
    ) -> Result<(PetRecord, bool), StorageError> {
        Err(StorageError::Io(std::io::ErrorKind::PermissionDenied))
    }
}

// ── OutputSink ───────────────────────────────────────────────

/// Collects frames; optionally fails once `fail_after` frames were written.
#[derive(Clone, Default)]
pub struct CaptureOutput {
    pub frames: Arc<Mutex<Vec<String>>>,
    pub fail_after: Option<usize>,
}

#[allow(dead_code)]
impl CaptureOutput {
    pub fn frame_count(&self) -> usize {
        self.frames.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn last_frame(&self) -> Option<String> {
        self.frames.lock().ok().and_then(|f| f.last().cloned())
    }
}

impl OutputSink for CaptureOutput {
    fn write_frame(&mut self, frame: &str) -> std::io::Result<()> {
        let mut frames = self.frames.lock().map_err(|_| std::io::ErrorKind::Other)?;
        if self.fail_after.is_some_and(|n| frames.len() >= n) {
            return Err(std::io::ErrorKind::BrokenPipe.into());
        }
        frames.push(frame.to_owned());
        Ok(())
    }
}
