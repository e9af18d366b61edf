use futures::channel::mpsc::UnboundedReceiver;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::CoreError;

use super::traits::{KeyValueStore, StorageChange, Subscribers};

/// Plain JSON file store: the whole map is one JSON object on disk.
///
/// Every write rewrites the file through a temporary sibling and a rename,
/// so the file always holds the state after the last completed write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
    subscribers: Subscribers,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| {
                    CoreError::InvalidFileFormat(format!(
                        "{} is not a valid store file: {e}",
                        path.display()
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
            subscribers: Subscribers::default(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), CoreError> {
        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| CoreError::Serialization(format!("Failed to encode store: {e}")))?;
        write_atomically(&self.path, &json)
    }

    fn mutate<F>(&self, change: StorageChange, apply: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = entries.clone();
        if !apply(&mut next) {
            return Ok(());
        }
        self.persist(&next)?;
        *entries = next;
        drop(entries);
        tracing::debug!(key = change.key(), path = %self.path.display(), "store written");
        self.subscribers.notify(change);
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.mutate(StorageChange::Set(key.to_string()), |map| {
            map.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.mutate(StorageChange::Removed(key.to_string()), |map| {
            map.remove(key).is_some()
        })
    }

    fn subscribe(&self) -> UnboundedReceiver<StorageChange> {
        self.subscribers.subscribe()
    }
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
