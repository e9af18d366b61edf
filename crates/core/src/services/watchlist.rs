use futures::future::join_all;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::api::traits::AssetLookup;
use crate::errors::CoreError;
use crate::models::asset::{Asset, WatchedAsset};
use crate::storage::keys;
use crate::storage::traits::{JsonStoreExt, KeyValueStore};

/// Result of [`WatchlistStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Informational, not an error
    AlreadyPresent,
}

/// Ordered, duplicate-free set of watched asset ids, persisted as a JSON
/// array under [`keys::WATCHLIST`].
///
/// Every mutation writes the full array back before returning. Mutations
/// through one `WatchlistStore` are serialized; writers sharing the key
/// through another handle are not coordinated with.
pub struct WatchlistStore<S: KeyValueStore> {
    store: Arc<S>,
    update: Mutex<()>,
}

impl<S: KeyValueStore> WatchlistStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            update: Mutex::new(()),
        }
    }

    /// Stored ids in insertion order. Missing key → empty list.
    pub fn ids(&self) -> Result<Vec<Uuid>, CoreError> {
        Ok(self
            .store
            .get_json::<Vec<Uuid>>(keys::WATCHLIST)?
            .unwrap_or_default())
    }

    pub fn contains(&self, id: Uuid) -> Result<bool, CoreError> {
        Ok(self.ids()?.contains(&id))
    }

    pub fn add(&self, asset: &Asset) -> Result<AddOutcome, CoreError> {
        let _update = self.update.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids = self.ids()?;
        if ids.contains(&asset.id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        ids.push(asset.id);
        self.store.set_json(keys::WATCHLIST, &ids)?;
        tracing::debug!(asset = %asset.symbol, count = ids.len(), "added to watchlist");
        Ok(AddOutcome::Added)
    }

    /// Removing an id that is not watched is a no-op. Returns whether
    /// anything was removed.
    pub fn remove(&self, id: Uuid) -> Result<bool, CoreError> {
        let _update = self.update.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids = self.ids()?;
        let before = ids.len();
        ids.retain(|x| *x != id);
        if ids.len() == before {
            return Ok(false);
        }
        self.store.set_json(keys::WATCHLIST, &ids)?;
        Ok(true)
    }

    /// Rehydrate every watched id from the backend, in watchlist order.
    ///
    /// Lookups run concurrently. An id that fails to load is dropped from
    /// the result (and logged); it stays in storage.
    pub async fn list(&self, lookup: &dyn AssetLookup) -> Result<Vec<WatchedAsset>, CoreError> {
        let ids = self.ids()?;
        let results = join_all(ids.iter().map(|id| lookup.get_asset(*id))).await;

        Ok(ids
            .iter()
            .zip(results)
            .filter_map(|(id, result)| match result {
                Ok(asset) => Some(WatchedAsset::from(asset)),
                Err(e) => {
                    tracing::warn!(asset_id = %id, error = %e, "dropping watchlist entry");
                    None
                }
            })
            .collect())
    }
}

/// Merge current prices into `entries` with one bulk request.
///
/// Entries the backend has no price for keep their previous price. Prices
/// are never persisted. Returns the number of entries updated.
pub async fn refresh_prices(
    entries: &mut [WatchedAsset],
    lookup: &dyn AssetLookup,
    currency: &str,
) -> Result<usize, CoreError> {
    if entries.is_empty() {
        return Ok(0);
    }
    let ids: Vec<Uuid> = entries.iter().map(|e| e.asset.id).collect();
    let prices = lookup.bulk_prices(&ids, currency).await?;

    let mut updated = 0;
    for entry in entries.iter_mut() {
        if let Some(price) = prices.get(&entry.asset.id) {
            entry.current_price = Some(*price);
            updated += 1;
        }
    }
    Ok(updated)
}
