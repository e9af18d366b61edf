use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Mutex;

use crate::errors::CoreError;

/// A change notification emitted after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageChange {
    Set(String),
    Removed(String),
}

impl StorageChange {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            StorageChange::Set(k) | StorageChange::Removed(k) => k,
        }
    }
}

/// Narrow interface over client-side persisted state (the browser's local
/// storage, a file, or memory in tests).
///
/// Values are opaque strings; each `set` replaces the whole value for a key,
/// so a write is never observed half-applied.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;

    /// Receive a [`StorageChange`] for every later successful write.
    fn subscribe(&self) -> UnboundedReceiver<StorageChange>;
}

/// JSON helpers available on every store.
pub trait JsonStoreExt: KeyValueStore {
    /// Read and decode a JSON value. A missing key yields `Ok(None)`.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CoreError> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                CoreError::Deserialization(format!("Stored value under '{key}' is not valid: {e}"))
            }),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to encode '{key}': {e}")))?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> JsonStoreExt for S {}

/// Fan-out list of change subscribers; closed receivers are pruned on send.
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Mutex<Vec<UnboundedSender<StorageChange>>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&self) -> UnboundedReceiver<StorageChange> {
        let (tx, rx) = mpsc::unbounded();
        self.senders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    pub(crate) fn notify(&self, change: StorageChange) {
        let mut senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        senders.retain(|tx| tx.unbounded_send(change.clone()).is_ok());
    }
}
