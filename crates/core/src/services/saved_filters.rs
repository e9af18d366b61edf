use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::filter::{SavedFilter, TransactionFilter};
use crate::storage::keys;
use crate::storage::traits::{JsonStoreExt, KeyValueStore};

/// Named transaction filters kept under [`keys::SAVED_FILTERS`].
pub struct SavedFilterStore<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> SavedFilterStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Readable entries in save order. Entries that do not decode are
    /// skipped with a warning and left untouched in storage.
    pub fn list(&self) -> Result<Vec<SavedFilter>, CoreError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<SavedFilter>(raw) {
                Ok(saved) => Some(saved),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable saved filter");
                    None
                }
            })
            .collect())
    }

    /// Raw stored array. A value that is not an array is treated as empty
    /// and gets overwritten by the next save.
    fn entries(&self) -> Result<Vec<Value>, CoreError> {
        match self.store.get_json::<Vec<Value>>(keys::SAVED_FILTERS) {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(CoreError::Deserialization(e)) => {
                tracing::warn!(error = %e, "ignoring unreadable saved filters");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub fn get(&self, id: &str) -> Result<SavedFilter, CoreError> {
        self.list()?
            .into_iter()
            .find(|f| f.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("saved filter {id}")))
    }

    /// Append a new snapshot of `filters` under `name`.
    pub fn save(&self, name: &str, filters: &TransactionFilter) -> Result<SavedFilter, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError(
                "Please enter a name for the filter".into(),
            ));
        }

        let saved = SavedFilter {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            filters: filters.clone(),
        };
        let mut all = self.entries()?;
        all.push(serde_json::to_value(&saved)?);
        self.store.set_json(keys::SAVED_FILTERS, &all)?;
        Ok(saved)
    }

    /// Deleting an unknown id is a no-op.
    pub fn delete(&self, id: &str) -> Result<(), CoreError> {
        let mut all = self.entries()?;
        let before = all.len();
        all.retain(|f| f.get("id").and_then(Value::as_str) != Some(id));
        if all.len() != before {
            self.store.set_json(keys::SAVED_FILTERS, &all)?;
        }
        Ok(())
    }
}
