//! Snapshot persistence for a dossier in progress.
//!
//! One record, one profile, last write wins. The [`Store`] trait is
//! the seam callers program against; [`FileStore`] keeps a JSON
//! snapshot on disk and [`MemoryStore`] backs tests and throwaway
//! sessions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dossier_schema::AnswerRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("stored snapshot is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Where answers live between sessions.
pub trait Store: Send + Sync {
    /// `Ok(None)` means nothing was ever saved, not an error.
    fn load(&self) -> Result<Option<AnswerRecord>, StoreError>;
    fn save(&self, record: &AnswerRecord) -> Result<(), StoreError>;
}

/// The association's identity, persisted alongside the record and used
/// to prefill structure fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationProfile {
    pub denomination: String,
    pub siret: String,
    pub representant_legal: String,
    pub adresse: String,
    pub email: String,
    pub telephone: String,
}

/// The on-disk snapshot shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    record: AnswerRecord,
    #[serde(default)]
    profile: OrganizationProfile,
}

/// JSON snapshot at a fixed path.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_snapshot(&self) -> Result<Option<Snapshot>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)?;
        log::debug!("snapshot written to {}", self.path.display());
        Ok(())
    }

    pub fn load_profile(&self) -> Result<OrganizationProfile, StoreError> {
        Ok(self.read_snapshot()?.map(|s| s.profile).unwrap_or_default())
    }

    pub fn save_profile(&self, profile: &OrganizationProfile) -> Result<(), StoreError> {
        let mut snapshot = self.read_snapshot()?.unwrap_or_default();
        snapshot.profile = profile.clone();
        self.write_snapshot(&snapshot)
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<Option<AnswerRecord>, StoreError> {
        Ok(self.read_snapshot()?.map(|s| s.record))
    }

    fn save(&self, record: &AnswerRecord) -> Result<(), StoreError> {
        let mut snapshot = self.read_snapshot()?.unwrap_or_default();
        snapshot.record = record.clone();
        self.write_snapshot(&snapshot)
    }
}

/// In-memory store for tests and unsaved sessions.
#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<Option<AnswerRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<AnswerRecord>, StoreError> {
        let guard = self.record.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, record: &AnswerRecord) -> Result<(), StoreError> {
        let mut guard = self.record.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_schema::Value;

    fn sample_record() -> AnswerRecord {
        let mut record = AnswerRecord::new();
        record.set("presentation_projet", "Titre du projet", Value::Text("Atelier".into()));
        record.set("budget_financement", "Coût total estimé (€)", Value::Number(1500.0));
        record
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("dossier.json"));
        assert!(store.load().unwrap().is_none());

        let record = sample_record();
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));
    }

    #[test]
    fn file_store_keeps_profile_across_record_saves() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("dossier.json"));
        let profile = OrganizationProfile {
            denomination: "Les Amis du Code".into(),
            email: "contact@amisducode.fr".into(),
            ..Default::default()
        };
        store.save_profile(&profile).unwrap();
        store.save(&sample_record()).unwrap();
        assert_eq!(store.load_profile().unwrap(), profile);
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dossier.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn memory_store_last_write_wins() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&AnswerRecord::new()).unwrap();
        let record = sample_record();
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));
    }
}
