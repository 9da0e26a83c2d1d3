//! Workspace state persistence.
//!
//! The layout is stored as one JSON document under a namespaced key. Saving
//! is best effort and loading never fails: anything unreadable falls back to
//! [`WorkspaceStoreState::default_layout`].

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use crate::kernel::registry::ServiceRegistry;
use crate::kernel::services::ports::storage::{Result, StateStorage, StorageError};
use crate::kernel::state::WorkspaceStoreState;

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: FxHashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }
}

pub struct WorkspacePersistence<S> {
    storage: S,
    key: String,
}

impl<S: StateStorage> WorkspacePersistence<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn try_save(&mut self, state: &WorkspaceStoreState) -> Result<()> {
        let text = serde_json::to_string(state).map_err(StorageError::Serialize)?;
        self.storage.write(&self.key, &text)
    }

    /// Returns `false` if the write failed; the failure is logged and the
    /// in-memory state stays authoritative.
    pub fn save(&mut self, state: &WorkspaceStoreState) -> bool {
        match self.try_save(state) {
            Ok(()) => true,
            Err(error) => {
                tracing::error!(key = %self.key, %error, "save workspace state failed");
                false
            }
        }
    }

    pub fn try_load(&self, registry: &ServiceRegistry) -> Result<Option<WorkspaceStoreState>> {
        let Some(text) = self.storage.read(&self.key)? else {
            return Ok(None);
        };
        let state: WorkspaceStoreState =
            serde_json::from_str(&text).map_err(StorageError::Parse)?;
        state.validate(registry).map_err(StorageError::Schema)?;
        Ok(Some(state))
    }

    pub fn load(&self, registry: &ServiceRegistry) -> WorkspaceStoreState {
        match self.try_load(registry) {
            Ok(Some(state)) => {
                tracing::info!(
                    key = %self.key,
                    tabs = state.tab_count(),
                    "workspace state restored"
                );
                state
            }
            Ok(None) => {
                tracing::info!(key = %self.key, "no saved workspace state, using defaults");
                WorkspaceStoreState::default_layout()
            }
            Err(error) => {
                tracing::warn!(
                    key = %self.key,
                    %error,
                    "saved workspace state unusable, using defaults"
                );
                WorkspaceStoreState::default_layout()
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/persistence.rs"]
mod tests;
