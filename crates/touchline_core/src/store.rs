//! Persistence port
//!
//! The tracker writes two JSON blobs after every change: one for the match
//! state and one for the roster. The backing store is injected so the core
//! runs the same against memory, a directory on disk, or whatever the host
//! provides.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::roster::Roster;
use crate::state::MatchState;

pub const MATCH_STATE_KEY: &str = "match_state";
pub const ROSTER_KEY: &str = "roster";

/// Key-value storage for snapshot blobs. No transactional guarantees.
pub trait StateStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, blob: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.get(key).cloned())
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.slots.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl StateStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write to a temp file, then rename over the slot
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(blob.as_bytes())?;
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;

        tracing::debug!(bytes = blob.len(), path = %path.display(), "slot written");
        Ok(())
    }
}

fn save_json<T: Serialize>(store: &mut dyn StateStore, key: &str, value: &T) -> Result<(), StoreError> {
    let blob = serde_json::to_string(value)?;
    store.save(key, &blob)
}

fn load_json<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Result<Option<T>, StoreError> {
    match store.load(key)? {
        Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
        None => Ok(None),
    }
}

pub fn save_match_state(store: &mut dyn StateStore, state: &MatchState) -> Result<(), StoreError> {
    save_json(store, MATCH_STATE_KEY, state)
}

pub fn load_match_state(store: &dyn StateStore) -> Result<Option<MatchState>, StoreError> {
    Ok(load_json::<MatchState>(store, MATCH_STATE_KEY)?.map(MatchState::migrate))
}

pub fn save_roster(store: &mut dyn StateStore, roster: &Roster) -> Result<(), StoreError> {
    save_json(store, ROSTER_KEY, roster)
}

pub fn load_roster(store: &dyn StateStore) -> Result<Option<Roster>, StoreError> {
    load_json(store, ROSTER_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgeGroup, MatchConfig};
    use tempfile::tempdir;

    fn state() -> MatchState {
        MatchState::new(MatchConfig::for_age_group(AgeGroup::U9, "Pumas", "Rovers").unwrap())
    }

    #[test]
    fn test_memory_round_trip() {
        let mut store = MemoryStore::new();
        let original = state();
        save_match_state(&mut store, &original).unwrap();
        assert_eq!(load_match_state(&store).unwrap(), Some(original));
        assert_eq!(load_roster(&store).unwrap(), None);
    }

    #[test]
    fn test_file_store_writes_one_file_per_slot() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("slots"));

        let roster = Roster::with_squad(7);
        save_roster(&mut store, &roster).unwrap();
        save_match_state(&mut store, &state()).unwrap();

        assert!(dir.path().join("slots/roster.json").exists());
        assert!(dir.path().join("slots/match_state.json").exists());
        assert!(!dir.path().join("slots/roster.tmp").exists());
        assert_eq!(load_roster(&store).unwrap(), Some(roster));
    }

    #[test]
    fn test_file_store_missing_slot_is_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.load(ROSTER_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        let err = store.save("../escape", "{}").unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_corrupt_blob_is_a_serialization_error() {
        let mut store = MemoryStore::new();
        store.save(MATCH_STATE_KEY, "{not json").unwrap();
        assert!(matches!(
            load_match_state(&store),
            Err(StoreError::Serialization(_))
        ));
    }
}
