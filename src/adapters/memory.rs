//! In-memory pet store.
//!
//! Implements [`PetRepository`] over a mutex-guarded map of
//! postcard-encoded blobs, one per owner. Records are encoded on write
//! and decoded on read so the store behaves like a real backend: callers
//! never share a live record with it, and a corrupted blob surfaces as
//! [`StorageError::Corrupted`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::{debug, info};

use crate::app::ports::{PetRepository, StorageError};
use crate::pet::{OwnerKey, PetRecord};

const PET_NAMESPACE: &str = "pets";

#[derive(Default)]
struct Inner {
    blobs: HashMap<String, Vec<u8>>,
    next_id: u64,
    writes: u64,
}

impl Inner {
    fn assign_id(&mut self, record: &mut PetRecord) {
        if record.id.is_none() {
            self.next_id += 1;
            record.id = Some(self.next_id);
        }
    }

    fn put(&mut self, record: &PetRecord) -> Result<(), StorageError> {
        let bytes = encode(record)?;
        self.blobs.insert(composite_key(&record.owner), bytes);
        self.writes += 1;
        Ok(())
    }
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        info!("MemoryStore: volatile backend");
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total successful writes (creates and updates) since construction.
    #[cfg(test)]
    pub(crate) fn write_count(&self) -> u64 {
        self.lock().map(|inner| inner.writes).unwrap_or(0)
    }

    /// Overwrite an owner's blob with raw bytes.
    #[cfg(test)]
    fn insert_raw(&self, owner: &OwnerKey, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.lock()?.blobs.insert(composite_key(owner), bytes);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Io(std::io::ErrorKind::Other))
    }
}

fn composite_key(owner: &OwnerKey) -> String {
    format!("{}::{}", PET_NAMESPACE, owner)
}

fn encode(record: &PetRecord) -> Result<Vec<u8>, StorageError> {
    postcard::to_allocvec(record).map_err(|_| StorageError::Corrupted)
}

fn decode(bytes: &[u8]) -> Result<PetRecord, StorageError> {
    postcard::from_bytes(bytes).map_err(|_| StorageError::Corrupted)
}

impl PetRepository for MemoryStore {
    fn find_by_owner(&self, owner: &OwnerKey) -> Result<Option<PetRecord>, StorageError> {
        let inner = self.lock()?;
        inner
            .blobs
            .get(&composite_key(owner))
            .map(|bytes| decode(bytes))
            .transpose()
    }

    fn create(&self, mut record: PetRecord) -> Result<PetRecord, StorageError> {
        let mut inner = self.lock()?;
        inner.assign_id(&mut record);
        inner.put(&record)?;
        debug!("MemoryStore: created pet {:?} for {}", record.id, record.owner);
        Ok(record)
    }

    fn update(&self, record: &PetRecord) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        let mut record = record.clone();
        inner.assign_id(&mut record);
        inner.put(&record)?;
        debug!("MemoryStore: write #{} for {}", inner.writes, record.owner);
        Ok(())
    }

    fn get_or_create(
        &self,
        owner: &OwnerKey,
        mut fresh: PetRecord,
    ) -> Result<(PetRecord, bool), StorageError> {
        let mut inner = self.lock()?;
        if let Some(bytes) = inner.blobs.get(&composite_key(owner)) {
            return Ok((decode(bytes)?, false));
        }
        fresh.owner = owner.clone();
        inner.assign_id(&mut fresh);
        inner.put(&fresh)?;
        info!("MemoryStore: new pet {:?} for {}", fresh.id, owner);
        Ok((fresh, true))
    }
}
