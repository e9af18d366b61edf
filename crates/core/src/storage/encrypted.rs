use futures::channel::mpsc::UnboundedReceiver;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::CoreError;

use super::encryption::{random_bytes, Cipher, KdfParams};
use super::file::write_atomically;
use super::format::{StoreHeader, CURRENT_VERSION};
use super::traits::{KeyValueStore, StorageChange, Subscribers};

/// Password-protected file store for hosts that keep the bearer token on disk.
///
/// Flow on write: map → bincode → AES-256-GCM(Argon2id(password, salt)) → ITKV bytes.
/// The salt is fixed per file; the nonce is fresh per write.
pub struct EncryptedFileStore {
    path: PathBuf,
    cipher: Cipher,
    salt: [u8; 16],
    kdf_params: KdfParams,
    entries: Mutex<BTreeMap<String, String>>,
    subscribers: Subscribers,
}

impl std::fmt::Debug for EncryptedFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStore")
            .field("path", &self.path)
            .field("kdf_params", &self.kdf_params)
            .field(
                "entries",
                &self.entries.lock().map(|e| e.len()).unwrap_or_default(),
            )
            .finish()
    }
}

impl EncryptedFileStore {
    /// Open an existing store or start a new one with default KDF params.
    pub fn open(path: impl AsRef<Path>, password: &str) -> Result<Self, CoreError> {
        Self::open_with_params(path, password, KdfParams::default())
    }

    /// Like [`open`](Self::open); `params` only applies when the file is new.
    pub fn open_with_params(
        path: impl AsRef<Path>,
        password: &str,
        params: KdfParams,
    ) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let salt = random_bytes::<16>()?;
            let cipher = Cipher::derive(password, &salt, &params)?;
            return Ok(Self {
                path,
                cipher,
                salt,
                kdf_params: params,
                entries: Mutex::new(BTreeMap::new()),
                subscribers: Subscribers::default(),
            });
        }

        let bytes = std::fs::read(&path)?;
        let (header, payload) = StoreHeader::decode(&bytes)?;
        let cipher = Cipher::derive(password, &header.salt, &header.kdf_params)?;
        let plaintext = cipher.open(&header.nonce, payload)?;
        let entries: BTreeMap<String, String> = bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to decode store: {e}")))?;

        Ok(Self {
            path,
            cipher,
            salt: header.salt,
            kdf_params: header.kdf_params,
            entries: Mutex::new(entries),
            subscribers: Subscribers::default(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), CoreError> {
        let plaintext = bincode::serialize(entries)
            .map_err(|e| CoreError::Serialization(format!("Failed to encode store: {e}")))?;
        let (nonce, ciphertext) = self.cipher.seal(&plaintext)?;
        let header = StoreHeader {
            version: CURRENT_VERSION,
            kdf_params: self.kdf_params,
            salt: self.salt,
            nonce,
        };
        write_atomically(&self.path, &header.encode(&ciphertext))
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
        tracing::debug!(key = change.key(), "encrypted store written");
        self.subscribers.notify(change);
        Ok(())
    }
}

impl KeyValueStore for EncryptedFileStore {
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
