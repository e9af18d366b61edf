use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::auth::AuthResponse;
use crate::storage::keys;
use crate::storage::traits::KeyValueStore;

/// Bearer token and username, stored as plain strings so a browser client
/// sharing the same storage reads them unchanged.
pub struct SessionStore<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Result<Option<String>, CoreError> {
        Ok(self.store.get(keys::TOKEN)?.filter(|t| !t.is_empty()))
    }

    pub fn username(&self) -> Result<Option<String>, CoreError> {
        self.store.get(keys::USERNAME)
    }

    pub fn is_logged_in(&self) -> Result<bool, CoreError> {
        Ok(self.token()?.is_some())
    }

    pub fn store_login(&self, auth: &AuthResponse) -> Result<(), CoreError> {
        self.store.set(keys::TOKEN, &auth.token)?;
        self.store.set(keys::USERNAME, &auth.username)?;
        tracing::info!(username = %auth.username, "session started");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        self.store.remove(keys::TOKEN)?;
        self.store.remove(keys::USERNAME)?;
        tracing::info!("session cleared");
        Ok(())
    }
}
