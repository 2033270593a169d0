//! Favorites persistence.
//!
//! One key of a local key-value store holds the favorite ids as a JSON array.
//! Every mutation rewrites the whole array.

mod memory;
mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Error type for key-value persistence.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Minimal synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// Set of favorite record ids, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u32>", into = "Vec<u32>")]
pub struct FavoriteIds(Vec<u32>);

impl FavoriteIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.0.contains(&id)
    }

    /// Add `id`. Returns false when it was already present.
    pub fn insert(&mut self, id: u32) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Remove `id`. Returns false when it was not present.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.0.len();
        self.0.retain(|&existing| existing != id);
        self.0.len() != before
    }

    /// Flip membership of `id`. Returns the new membership.
    pub fn toggle(&mut self, id: u32) -> bool {
        if self.remove(id) {
            false
        } else {
            self.0.push(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<u32>> for FavoriteIds {
    fn from(ids: Vec<u32>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<FavoriteIds> for Vec<u32> {
    fn from(ids: FavoriteIds) -> Self {
        ids.0
    }
}

impl FromIterator<u32> for FavoriteIds {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut ids = FavoriteIds::new();
        for id in iter {
            ids.insert(id);
        }
        ids
    }
}

/// Loads and saves [`FavoriteIds`] under a single key.
#[derive(Clone)]
pub struct FavoritesPersistence {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl FavoritesPersistence {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persisted favorites. Absent, unreadable or malformed data yields an empty set.
    pub fn load(&self) -> FavoriteIds {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return FavoriteIds::new(),
            Err(e) => {
                warn!("Failed to read favorites '{}': {}", self.key, e);
                return FavoriteIds::new();
            }
        };

        match serde_json::from_str::<Vec<u32>>(&raw) {
            Ok(ids) => FavoriteIds::from(ids),
            Err(e) => {
                warn!("Ignoring malformed favorites payload '{}': {}", self.key, e);
                FavoriteIds::new()
            }
        }
    }

    /// Overwrite the persisted set with `ids`.
    pub fn save(&self, ids: &FavoriteIds) -> Result<(), PersistenceError> {
        let payload = serde_json::to_string(&ids.0)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        self.kv.set(&self.key, &payload)
    }
}
