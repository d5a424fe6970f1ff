//! Persistence port for serialized state.
//!
//! The cart never touches a session or a database directly. It is handed a
//! [`SnapshotStore`] and reads or writes whole snapshots through it. The web
//! binaries implement the port over their session; tests use
//! [`MemorySnapshotStore`].

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::{Future, ready};
use std::sync::Mutex;

/// Key-value storage for serialized snapshots.
pub trait SnapshotStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the snapshot stored under `key`, if any.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    /// Replace the snapshot stored under `key`.
    fn save(&self, key: &str, snapshot: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Remove the snapshot stored under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl<T: SnapshotStore + Sync> SnapshotStore for &T {
    type Error = T::Error;

    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send {
        (**self).load(key)
    }

    fn save(&self, key: &str, snapshot: String) -> impl Future<Output = Result<(), Self::Error>> + Send {
        (**self).save(key, snapshot)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), Self::Error>> + Send {
        (**self).remove(key)
    }
}

/// In-process [`SnapshotStore`].
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw snapshot, bypassing any serializer.
    pub fn insert(&self, key: impl Into<String>, snapshot: impl Into<String>) {
        self.entries().insert(key.into(), snapshot.into());
    }

    /// Current raw snapshot under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic mid-insert cannot leave a HashMap half-written
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    type Error = Infallible;

    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send {
        ready(Ok(self.get(key)))
    }

    fn save(&self, key: &str, snapshot: String) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self.insert(key, snapshot);
        ready(Ok(()))
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self.entries().remove(key);
        ready(Ok(()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemorySnapshotStore::new();
        assert_eq!(store.load("cart").await.unwrap(), None);

        store.save("cart", "{}".to_owned()).await.unwrap();
        assert_eq!(store.load("cart").await.unwrap().as_deref(), Some("{}"));

        store.remove("cart").await.unwrap();
        store.remove("cart").await.unwrap();
        assert_eq!(store.get("cart"), None);
    }
}
