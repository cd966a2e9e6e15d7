//! Bundled persistence adapters

use crate::core::types::ActorId;
use crate::persistence::{LedgerRecord, PersistenceAdapter, PersistenceError};
use ahash::AHashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One pretty-printed JSON file per actor: `<dir>/<actor uuid>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, actor: ActorId) -> PathBuf {
        self.dir.join(format!("{}.json", actor))
    }
}

impl PersistenceAdapter for JsonFileStore {
    fn load(&self, actor: ActorId) -> Result<Option<LedgerRecord>, PersistenceError> {
        let content = match fs::read_to_string(self.path_for(actor)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&mut self, actor: ActorId, record: &LedgerRecord) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(record)?;

        // Write then rename so a crash never leaves a truncated ledger
        let path = self.path_for(actor);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Records kept in memory; nothing survives the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: AHashMap<ActorId, LedgerRecord>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, actor: ActorId) -> Option<&LedgerRecord> {
        self.records.get(&actor)
    }

    pub fn insert(&mut self, actor: ActorId, record: LedgerRecord) {
        self.records.insert(actor, record);
    }

    /// Number of save calls received
    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PersistenceAdapter for MemoryStore {
    fn load(&self, actor: ActorId) -> Result<Option<LedgerRecord>, PersistenceError> {
        Ok(self.records.get(&actor).cloned())
    }

    fn save(&mut self, actor: ActorId, record: &LedgerRecord) -> Result<(), PersistenceError> {
        self.saves += 1;
        self.records.insert(actor, record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record() -> LedgerRecord {
        LedgerRecord {
            school_points: BTreeMap::from([("air".to_string(), 2)]),
            ..LedgerRecord::default()
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("saves"));
        let actor = ActorId::new();

        assert!(store.load(actor).unwrap().is_none());
        store.save(actor, &record()).unwrap();
        assert_eq!(store.load(actor).unwrap(), Some(record()));
        assert!(store.path_for(actor).exists());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let actor = ActorId::new();
        fs::write(store.path_for(actor), "{ truncated").unwrap();

        assert!(matches!(store.load(actor), Err(PersistenceError::Json(_))));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        let actor = ActorId::new();
        store.save(actor, &record()).unwrap();
        store.save(actor, &record()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.load(actor).unwrap(), Some(record()));
    }
}
