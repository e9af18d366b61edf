use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

use super::transaction::TransactionType;

fn default_true() -> bool {
    true
}

// The browser client stores unset form fields as "" and amounts as the raw
// input text, so both shapes are accepted on read.

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountInput {
    Number(f64),
    Text(String),
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<AmountInput>::deserialize(deserializer)? {
        Some(AmountInput::Number(n)) => Ok(Some(n)),
        Some(AmountInput::Text(raw)) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Structured criteria for the transaction list.
///
/// Every `None` field is inactive. Active predicates are ANDed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub portfolio_id: Option<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub asset_id: Option<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub transaction_type: Option<TransactionType>,
    /// Inclusive lower bound on the transaction date
    #[serde(default, deserialize_with = "blank_as_none")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the transaction date
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end_date: Option<NaiveDate>,
    /// Lower bound on quantity × price
    #[serde(default, deserialize_with = "lenient_amount")]
    pub min_amount: Option<f64>,
    /// Upper bound on quantity × price
    #[serde(default, deserialize_with = "lenient_amount")]
    pub max_amount: Option<f64>,
    /// When false, TRANSFER_IN / TRANSFER_OUT rows are dropped.
    #[serde(default = "default_true")]
    pub include_transfers: bool,
    /// Free text matched against asset symbol and name
    #[serde(default, deserialize_with = "blank_as_none")]
    pub search: Option<String>,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            portfolio_id: None,
            asset_id: None,
            transaction_type: None,
            start_date: None,
            end_date: None,
            min_amount: None,
            max_amount: None,
            include_transfers: true,
            search: None,
        }
    }
}

impl TransactionFilter {
    /// Query parameters understood by `GET /transactions` and
    /// `GET /export/transactions`. Inactive fields are omitted.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.portfolio_id {
            pairs.push(("portfolioId", id.to_string()));
        }
        if let Some(id) = self.asset_id {
            pairs.push(("assetId", id.to_string()));
        }
        if let Some(t) = self.transaction_type {
            pairs.push(("transactionType", t.as_str().to_string()));
        }
        if let Some(d) = self.start_date {
            pairs.push(("startDate", format!("{d}T00:00:00")));
        }
        if let Some(d) = self.end_date {
            pairs.push(("endDate", format!("{d}T23:59:59")));
        }
        pairs
    }
}

/// Column the transaction list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Chronological on transaction date-time
    #[default]
    Date,
    /// quantity × price
    Amount,
    /// Asset symbol, case-sensitive
    Asset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    /// Newest / largest first (default for display)
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }
}

/// A named filter persisted client-side under `savedFilters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub id: String,
    pub name: String,
    pub filters: TransactionFilter,
}
