use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// Investment style a portfolio is managed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskProfile::Conservative => write!(f, "CONSERVATIVE"),
            RiskProfile::Moderate => write!(f, "MODERATE"),
            RiskProfile::Aggressive => write!(f, "AGGRESSIVE"),
        }
    }
}

/// A portfolio as returned by `GET /portfolios`.
///
/// This is a session-scoped copy; the backend owns the canonical record and
/// everything here is refetched after each mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// ISO 4217 code, e.g. "USD"
    pub base_currency: String,
    #[serde(default)]
    pub risk_profile: Option<RiskProfile>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Body of `POST /portfolios` and `PUT /portfolios/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub base_currency: String,
    pub risk_profile: RiskProfile,
}

impl PortfolioRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            base_currency: "USD".to_string(),
            risk_profile: RiskProfile::Moderate,
        }
    }

    /// Client-side checks run before the request is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Portfolio name is required".into(),
            ));
        }
        let currency = self.base_currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid currency code '{}': must be exactly 3 ASCII letters (e.g., USD, EUR, GBP)",
                self.base_currency
            )));
        }
        Ok(())
    }
}

/// Body of `POST /portfolios/{id}/duplicate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatePortfolioRequest {
    /// Backend falls back to "<original> (Copy)" when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub copy_transactions: bool,
}

/// One row of `POST /portfolios/{id}/rebalance`. Computed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceSuggestion {
    pub asset_id: Uuid,
    #[serde(default)]
    pub asset_symbol: Option<String>,
    #[serde(default)]
    pub asset_name: Option<String>,
    pub current_allocation: f64,
    pub target_allocation: f64,
    pub difference: f64,
    /// Positive = buy, negative = sell
    pub suggested_action: f64,
    /// "BUY", "SELL" or "HOLD"
    pub action: String,
}
