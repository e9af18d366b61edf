use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// The category of a tracked asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Stock,
    Crypto,
    Forex,
    Commodity,
    Bond,
    Etf,
    Other,
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetType::Stock => write!(f, "STOCK"),
            AssetType::Crypto => write!(f, "CRYPTO"),
            AssetType::Forex => write!(f, "FOREX"),
            AssetType::Commodity => write!(f, "COMMODITY"),
            AssetType::Bond => write!(f, "BOND"),
            AssetType::Etf => write!(f, "ETF"),
            AssetType::Other => write!(f, "OTHER"),
        }
    }
}

/// A tradable asset known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    /// Ticker symbol, uppercased (e.g., "AAPL", "BTC")
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub asset_type: AssetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Asset {
    pub fn new(
        id: Uuid,
        symbol: impl Into<String>,
        name: impl Into<String>,
        asset_type: AssetType,
    ) -> Self {
        Self {
            id,
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
            asset_type,
            description: None,
            exchange: None,
            network: None,
            currency: None,
            created_at: None,
        }
    }
}

/// An asset paired with its most recently fetched price.
///
/// Prices are volatile: they are merged in memory after a bulk fetch and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedAsset {
    #[serde(flatten)]
    pub asset: Asset,
    #[serde(default)]
    pub current_price: Option<f64>,
}

impl From<Asset> for WatchedAsset {
    fn from(asset: Asset) -> Self {
        Self {
            asset,
            current_price: None,
        }
    }
}

/// Entry of `GET /assets/popular`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularAsset {
    pub asset: Asset,
    pub transaction_count: u64,
}

/// Body of `POST /assets` and `PUT /assets/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    pub asset_type: AssetType,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    pub currency: String,
}

impl AssetRequest {
    /// Validate and normalize (symbol uppercased, whitespace trimmed).
    pub fn normalized(mut self) -> Result<Self, CoreError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::ValidationError("Symbol is required".into()));
        }
        let currency = self.currency.trim().to_uppercase();
        if currency.is_empty() {
            return Err(CoreError::ValidationError("Currency is required".into()));
        }
        self.symbol = symbol;
        self.currency = currency;
        Ok(self)
    }
}

/// Current price of a single asset (`GET /market-data/asset/{id}/price`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub asset_id: Uuid,
    #[serde(default)]
    pub asset_symbol: Option<String>,
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}
