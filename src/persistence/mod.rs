// Snapshot port - isolates local persistence side effects from the stores
pub mod sqlite;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::PersistError;

pub use sqlite::SqliteSnapshotStore;

pub const AUTH_PARTITION: &str = "auth-storage";
pub const HASHTAG_PARTITION: &str = "hashtag-storage";
pub const NOTIFICATION_PARTITION: &str = "notification-storage";

/// Durable key-value storage for store snapshots, one JSON body per partition.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, partition: &str) -> Result<Option<String>, PersistError>;

    /// Replace the partition body (idempotent upsert)
    fn save(&self, partition: &str, body: &str) -> Result<(), PersistError>;

    /// Returns true if something was removed
    fn remove(&self, partition: &str) -> Result<bool, PersistError>;
}

pub type DynSnapshotStore = Arc<dyn SnapshotStore>;

/// Restore a snapshot, falling back to `fallback` when the partition is
/// missing or unreadable.
pub fn restore_or<T, F>(store: Option<&DynSnapshotStore>, partition: &str, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let Some(store) = store else {
        return fallback();
    };

    match store.load(partition) {
        Ok(Some(body)) => match serde_json::from_str(&body) {
            Ok(value) => {
                tracing::debug!("Restored snapshot {}", partition);
                value
            }
            Err(e) => {
                tracing::warn!("Discarding corrupt snapshot {}: {}", partition, e);
                fallback()
            }
        },
        Ok(None) => fallback(),
        Err(e) => {
            tracing::warn!("Failed to load snapshot {}: {}", partition, e);
            fallback()
        }
    }
}

/// Best-effort mirror of `value` into `partition`. Failures are logged only.
pub fn mirror<T: Serialize>(store: Option<&DynSnapshotStore>, partition: &str, value: &T) {
    let Some(store) = store else {
        return;
    };

    let result = serde_json::to_string(value)
        .map_err(PersistError::from)
        .and_then(|body| store.save(partition, &body));

    if let Err(e) = result {
        tracing::warn!("Failed to persist snapshot {}: {}", partition, e);
    }
}

/// In-memory snapshot store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySnapshotStore {
    partitions: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn partitions(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.partitions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, partition: &str) -> Result<Option<String>, PersistError> {
        Ok(self.partitions().get(partition).cloned())
    }

    fn save(&self, partition: &str, body: &str) -> Result<(), PersistError> {
        self.partitions()
            .insert(partition.to_string(), body.to_string());
        Ok(())
    }

    fn remove(&self, partition: &str) -> Result<bool, PersistError> {
        Ok(self.partitions().remove(partition).is_some())
    }
}
