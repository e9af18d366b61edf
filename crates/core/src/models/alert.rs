use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// Direction a price has to cross for an alert to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionType {
    Below,
    Above,
}

impl std::fmt::Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionType::Below => write!(f, "BELOW"),
            ConditionType::Above => write!(f, "ABOVE"),
        }
    }
}

/// A price alert. Evaluation happens server-side; the client only reads
/// `triggered_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub asset_id: Uuid,
    #[serde(default)]
    pub asset_symbol: Option<String>,
    #[serde(default)]
    pub asset_name: Option<String>,
    pub condition_type: ConditionType,
    pub target_price: f64,
    pub currency: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub triggered_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Alert {
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.triggered_at.is_some()
    }
}

/// Body of `POST /alerts` and `PUT /alerts/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    pub asset_id: Option<Uuid>,
    pub condition_type: ConditionType,
    pub target_price: f64,
    pub currency: String,
}

impl AlertRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.asset_id.is_none() {
            return Err(CoreError::ValidationError("Please select an asset".into()));
        }
        if !self.target_price.is_finite() || self.target_price <= 0.0 {
            return Err(CoreError::ValidationError(
                "Target price must be positive".into(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(CoreError::ValidationError("Currency is required".into()));
        }
        Ok(())
    }
}

/// Result of a bulk operation where each item succeeds or fails on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOutcome {
    pub succeeded: Vec<Uuid>,
    /// Failed ids with the user-facing reason.
    pub failed: Vec<(Uuid, String)>,
}

impl BulkOutcome {
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}
