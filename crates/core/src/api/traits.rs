use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::alert::Alert;
use crate::models::asset::Asset;
use crate::models::portfolio::Portfolio;
use crate::models::transaction::Transaction;

/// Read access to assets and their prices.
///
/// `ApiClient` implements this against the REST backend; tests substitute
/// in-memory mocks.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AssetLookup: Send + Sync {
    /// `GET /assets/{id}`
    async fn get_asset(&self, id: Uuid) -> Result<Asset, CoreError>;

    /// `POST /market-data/bulk`: current prices for many assets in one call.
    /// Assets the backend has no price for are absent from the map.
    async fn bulk_prices(
        &self,
        asset_ids: &[Uuid],
        currency: &str,
    ) -> Result<HashMap<Uuid, f64>, CoreError>;

    /// `GET /market-data/search?query=`: symbol/name substring search.
    async fn search_assets(&self, query: &str) -> Result<Vec<Asset>, CoreError>;
}

/// Data sources consulted by the global search box.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SearchSource: AssetLookup {
    /// `GET /portfolios`
    async fn list_portfolios(&self) -> Result<Vec<Portfolio>, CoreError>;

    /// `GET /transactions?size={limit}`: most recent transactions.
    async fn recent_transactions(&self, limit: usize) -> Result<Vec<Transaction>, CoreError>;
}

/// Server-side alert state, polled periodically.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AlertSource: Send + Sync {
    /// `GET /alerts/triggered`
    async fn triggered_alerts(&self) -> Result<Vec<Alert>, CoreError>;
}
