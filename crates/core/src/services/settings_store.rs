use serde_json::Value;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::settings::UserSettings;
use crate::storage::keys;
use crate::storage::traits::{JsonStoreExt, KeyValueStore};

/// Preferences under [`keys::USER_SETTINGS`].
pub struct SettingsStore<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Stored settings merged over the defaults.
    ///
    /// Unknown keys are ignored and missing keys take their default. A
    /// stored value that is not a JSON object is discarded with a warning.
    pub fn load(&self) -> Result<UserSettings, CoreError> {
        let stored = match self.store.get_json::<Value>(keys::USER_SETTINGS) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable user settings");
                None
            }
        };

        let Some(Value::Object(overrides)) = stored else {
            return Ok(UserSettings::default());
        };

        let mut merged = match serde_json::to_value(UserSettings::default())? {
            Value::Object(map) => map,
            _ => return Ok(UserSettings::default()),
        };
        for (k, v) in overrides {
            if merged.contains_key(&k) {
                merged.insert(k, v);
            }
        }

        serde_json::from_value(Value::Object(merged)).or_else(|e| {
            tracing::warn!(error = %e, "user settings have invalid field types, using defaults");
            Ok(UserSettings::default())
        })
    }

    pub fn save(&self, settings: &UserSettings) -> Result<(), CoreError> {
        self.store.set_json(keys::USER_SETTINGS, settings)
    }

    /// Drop stored preferences.
    pub fn reset(&self) -> Result<(), CoreError> {
        self.store.remove(keys::USER_SETTINGS)
    }
}
