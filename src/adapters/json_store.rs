//! JSON file pet store.
//!
//! All records live in one JSON document keyed by owner. Every write
//! rewrites the whole document to a sibling temp file and renames it
//! over the original, so a crash mid-write leaves the previous version
//! intact. A process-local mutex serialises readers and writers.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{PetRepository, StorageError};
use crate::pet::{OwnerKey, PetRecord};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    next_id: u64,
    pets: BTreeMap<String, PetRecord>,
}

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`. The parent directory
    /// is created if missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.kind()))?;
        }
        info!("JsonFileStore: {}", path.display());
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, StorageError> {
        self.lock.lock().map_err(|_| StorageError::Io(ErrorKind::Other))
    }

    fn read(&self) -> Result<StoreFile, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                warn!("JsonFileStore: {} unreadable: {}", self.path.display(), e);
                StorageError::Corrupted
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(e) => Err(StorageError::Io(e.kind())),
        }
    }

    fn write(&self, file: &StoreFile) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(file).map_err(|_| StorageError::Corrupted)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| StorageError::Io(e.kind()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StorageError::Io(e.kind()))?;
        debug!("JsonFileStore: wrote {} record(s)", file.pets.len());
        Ok(())
    }
}

fn assign_id(file: &mut StoreFile, record: &mut PetRecord) {
    if record.id.is_none() {
        file.next_id += 1;
        record.id = Some(file.next_id);
    }
}

impl PetRepository for JsonFileStore {
    fn find_by_owner(&self, owner: &OwnerKey) -> Result<Option<PetRecord>, StorageError> {
        let _guard = self.guard()?;
        Ok(self.read()?.pets.remove(owner.as_str()))
    }

    fn create(&self, mut record: PetRecord) -> Result<PetRecord, StorageError> {
        let _guard = self.guard()?;
        let mut file = self.read()?;
        assign_id(&mut file, &mut record);
        file.pets.insert(record.owner.as_str().to_owned(), record.clone());
        self.write(&file)?;
        Ok(record)
    }

    fn update(&self, record: &PetRecord) -> Result<(), StorageError> {
        let _guard = self.guard()?;
        let mut file = self.read()?;
        let mut record = record.clone();
        assign_id(&mut file, &mut record);
        file.pets.insert(record.owner.as_str().to_owned(), record);
        self.write(&file)
    }

    fn get_or_create(
        &self,
        owner: &OwnerKey,
        mut fresh: PetRecord,
    ) -> Result<(PetRecord, bool), StorageError> {
        let _guard = self.guard()?;
        let mut file = self.read()?;
        if let Some(existing) = file.pets.get(owner.as_str()) {
            return Ok((existing.clone(), false));
        }
        fresh.owner = owner.clone();
        assign_id(&mut file, &mut fresh);
        file.pets.insert(owner.as_str().to_owned(), fresh.clone());
        self.write(&file)?;
        info!("JsonFileStore: new pet {:?} for {}", fresh.id, owner);
        Ok((fresh, true))
    }
}
