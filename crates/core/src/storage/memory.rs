use futures::channel::mpsc::UnboundedReceiver;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::CoreError;

use super::traits::{KeyValueStore, StorageChange, Subscribers};

/// In-memory store. Used in tests and by hosts without persistent storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store, handy for fixtures.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(map),
            subscribers: Subscribers::default(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        self.subscribers.notify(StorageChange::Set(key.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
            .is_some();
        if removed {
            self.subscribers
                .notify(StorageChange::Removed(key.to_string()));
        }
        Ok(())
    }

    fn subscribe(&self) -> UnboundedReceiver<StorageChange> {
        self.subscribers.subscribe()
    }
}
