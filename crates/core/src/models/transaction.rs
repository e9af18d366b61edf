use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// Kind of portfolio transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Buy,
    Sell,
    Deposit,
    Withdraw,
    TransferIn,
    TransferOut,
}

impl TransactionType {
    pub const ALL: [TransactionType; 6] = [
        TransactionType::Buy,
        TransactionType::Sell,
        TransactionType::Deposit,
        TransactionType::Withdraw,
        TransactionType::TransferIn,
        TransactionType::TransferOut,
    ];

    /// TRANSFER_IN or TRANSFER_OUT.
    #[must_use]
    pub fn is_transfer(&self) -> bool {
        matches!(self, TransactionType::TransferIn | TransactionType::TransferOut)
    }

    /// Wire name, as used in query strings.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdraw => "WITHDRAW",
            TransactionType::TransferIn => "TRANSFER_IN",
            TransactionType::TransferOut => "TRANSFER_OUT",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        TransactionType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown transaction type: {s}")))
    }
}

/// A recorded transaction as returned by `GET /transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub asset_id: Uuid,
    #[serde(default)]
    pub asset_symbol: Option<String>,
    #[serde(default)]
    pub asset_name: Option<String>,
    pub transaction_type: TransactionType,
    pub quantity: f64,
    pub price: f64,
    #[serde(default)]
    pub fee: f64,
    pub transaction_date: NaiveDateTime,
    #[serde(default)]
    pub notes: Option<String>,
    /// Destination portfolio for TRANSFER_IN / TRANSFER_OUT
    #[serde(default)]
    pub transfer_portfolio_id: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Transaction {
    /// Traded value: quantity × price, fee excluded.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.quantity * self.price
    }

    /// Traded value plus fee.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.amount() + self.fee
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        self.asset_symbol.as_deref().unwrap_or("")
    }
}

/// Body of `POST /transactions` and `PUT /transactions/{id}`.
///
/// `quantity` and `price` are optional here only so that an unfilled form can
/// be represented; [`TransactionRequest::validate`] rejects them when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub portfolio_id: Uuid,
    pub asset_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    #[serde(default)]
    pub fee: f64,
    pub transaction_date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_portfolio_id: Option<Uuid>,
}

impl TransactionRequest {
    pub fn new(
        portfolio_id: Uuid,
        asset_id: Uuid,
        transaction_type: TransactionType,
        quantity: f64,
        price: f64,
        transaction_date: NaiveDateTime,
    ) -> Self {
        Self {
            portfolio_id,
            asset_id: Some(asset_id),
            transaction_type,
            quantity: Some(quantity),
            price: Some(price),
            fee: 0.0,
            transaction_date,
            notes: None,
            transfer_portfolio_id: None,
        }
    }

    /// Client-side checks. A request that fails here never reaches the backend.
    ///
    /// Rules:
    /// - An asset must be selected
    /// - Quantity and price are required, finite and non-negative
    /// - Fee is finite and non-negative
    /// - TRANSFER_* needs a destination portfolio other than the source
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.asset_id.is_none() {
            return Err(CoreError::ValidationError("Please select an asset".into()));
        }

        let quantity = self
            .quantity
            .ok_or_else(|| CoreError::ValidationError("Quantity is required".into()))?;
        check_non_negative("Quantity", quantity)?;

        let price = self
            .price
            .ok_or_else(|| CoreError::ValidationError("Price is required".into()))?;
        check_non_negative("Price", price)?;

        check_non_negative("Fee", self.fee)?;

        if self.transaction_type.is_transfer() {
            match self.transfer_portfolio_id {
                None => {
                    return Err(CoreError::ValidationError(
                        "Please select a destination portfolio".into(),
                    ))
                }
                Some(dest) if dest == self.portfolio_id => {
                    return Err(CoreError::ValidationError(
                        "Destination portfolio must differ from the source portfolio".into(),
                    ))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::ValidationError(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}
