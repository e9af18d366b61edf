use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use reqwest::{multipart, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::errors::CoreError;
use crate::models::alert::{Alert, AlertRequest, BulkOutcome};
use crate::models::asset::{Asset, AssetRequest, AssetType, PopularAsset, PriceQuote};
use crate::models::auth::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
    UserProfile,
};
use crate::models::filter::TransactionFilter;
use crate::models::page::{ListResponse, Page};
use crate::models::portfolio::{
    DuplicatePortfolioRequest, Portfolio, PortfolioRequest, RebalanceSuggestion,
};
use crate::models::transaction::{Transaction, TransactionRequest};
use crate::services::csv_import::ImportKind;
use crate::services::export::ExportRequest;

use super::traits::{AlertSource, AssetLookup, SearchSource};

/// Thin REST client for the Invest Tracker backend.
///
/// Every path below is relative to `ClientConfig::base_url`. Requests carry
/// `Authorization: Bearer <token>` once a token is set. Nothing is retried:
/// an HTTP error with a `message` body becomes [`CoreError::Api`], anything
/// else becomes [`CoreError::UnexpectedStatus`] or [`CoreError::Network`].
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkPriceRequest<'a> {
    asset_ids: &'a [Uuid],
    currency: &'a str,
}

#[derive(Deserialize)]
struct BulkPriceResponse {
    #[serde(default)]
    prices: HashMap<Uuid, f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RebalanceRequest<'a> {
    target_allocations: &'a HashMap<Uuid, f64>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.timeout);
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            token: RwLock::new(None),
        })
    }

    // ── Session ─────────────────────────────────────────────────────

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .map(|t| t.is_some())
            .unwrap_or(false)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path (which must start with `/`).
    pub fn endpoint(&self, path: &str) -> Result<Url, CoreError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    // ── Auth & account ──────────────────────────────────────────────

    /// `POST /auth/login`. On success the returned token is used for
    /// subsequent requests.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, CoreError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .send_json(self.request(Method::POST, "/auth/login")?.json(&body))
            .await?;
        self.set_token(auth.token.clone());
        Ok(auth)
    }

    /// `POST /auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, CoreError> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(CoreError::ValidationError(
                "Username and password are required".into(),
            ));
        }
        let auth: AuthResponse = self
            .send_json(self.request(Method::POST, "/auth/register")?.json(request))
            .await?;
        self.set_token(auth.token.clone());
        Ok(auth)
    }

    pub async fn get_profile(&self) -> Result<UserProfile, CoreError> {
        self.get_json("/users/profile", &[]).await
    }

    pub async fn update_profile(&self, profile: &UserProfile) -> Result<UserProfile, CoreError> {
        self.send_json(self.request(Method::PUT, "/users/profile")?.json(profile))
            .await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), CoreError> {
        if request.new_password.is_empty() {
            return Err(CoreError::ValidationError("New password is required".into()));
        }
        self.send_empty(self.request(Method::PUT, "/users/password")?.json(request))
            .await
    }

    // ── Portfolios ──────────────────────────────────────────────────

    pub async fn list_portfolios(&self) -> Result<Vec<Portfolio>, CoreError> {
        self.get_json("/portfolios", &[]).await
    }

    pub async fn get_portfolio(&self, id: Uuid) -> Result<Portfolio, CoreError> {
        self.get_json(&format!("/portfolios/{id}"), &[]).await
    }

    pub async fn create_portfolio(&self, request: &PortfolioRequest) -> Result<Portfolio, CoreError> {
        request.validate()?;
        self.send_json(self.request(Method::POST, "/portfolios")?.json(request))
            .await
    }

    pub async fn update_portfolio(
        &self,
        id: Uuid,
        request: &PortfolioRequest,
    ) -> Result<Portfolio, CoreError> {
        request.validate()?;
        self.send_json(
            self.request(Method::PUT, &format!("/portfolios/{id}"))?
                .json(request),
        )
        .await
    }

    pub async fn delete_portfolio(&self, id: Uuid) -> Result<(), CoreError> {
        self.send_empty(self.request(Method::DELETE, &format!("/portfolios/{id}"))?)
            .await
    }

    /// `POST /portfolios/{id}/duplicate`, optionally copying transactions.
    pub async fn duplicate_portfolio(
        &self,
        id: Uuid,
        request: &DuplicatePortfolioRequest,
    ) -> Result<Portfolio, CoreError> {
        self.send_json(
            self.request(Method::POST, &format!("/portfolios/{id}/duplicate"))?
                .json(request),
        )
        .await
    }

    /// `POST /portfolios/{id}/rebalance` with target percentages per asset.
    pub async fn rebalance(
        &self,
        id: Uuid,
        target_allocations: &HashMap<Uuid, f64>,
    ) -> Result<Vec<RebalanceSuggestion>, CoreError> {
        if target_allocations.is_empty() {
            return Err(CoreError::ValidationError(
                "Target allocations are required".into(),
            ));
        }
        let total: f64 = target_allocations.values().sum();
        if target_allocations.values().any(|p| !(0.0..=100.0).contains(p)) || total > 100.0 + 1e-9 {
            return Err(CoreError::ValidationError(format!(
                "Target allocations must be between 0 and 100% and sum to at most 100% (got {total:.2}%)"
            )));
        }
        let body = RebalanceRequest { target_allocations };
        self.send_json(
            self.request(Method::POST, &format!("/portfolios/{id}/rebalance"))?
                .json(&body),
        )
        .await
    }

    // ── Transactions ────────────────────────────────────────────────

    /// `GET /transactions` with the backend-side filters and paging.
    /// A plain array answer is treated as a single page.
    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: usize,
        size: usize,
    ) -> Result<Page<Transaction>, CoreError> {
        let mut query = filter.to_query_pairs();
        query.push(("page", page.to_string()));
        query.push(("size", size.to_string()));
        let response: ListResponse<Transaction> = self.get_json("/transactions", &query).await?;
        Ok(match response {
            ListResponse::Paged(page) => page,
            ListResponse::Plain(items) => Page {
                page: 0,
                size: items.len(),
                total_elements: items.len(),
                total_pages: 1,
                content: items,
            },
        })
    }

    /// Validated client-side first; an invalid request is never sent.
    pub async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<Transaction, CoreError> {
        request.validate()?;
        self.send_json(self.request(Method::POST, "/transactions")?.json(request))
            .await
    }

    pub async fn update_transaction(
        &self,
        id: Uuid,
        request: &TransactionRequest,
    ) -> Result<Transaction, CoreError> {
        request.validate()?;
        self.send_json(
            self.request(Method::PUT, &format!("/transactions/{id}"))?
                .json(request),
        )
        .await
    }

    pub async fn delete_transaction(&self, id: Uuid) -> Result<(), CoreError> {
        self.send_empty(self.request(Method::DELETE, &format!("/transactions/{id}"))?)
            .await
    }

    // ── Assets ──────────────────────────────────────────────────────

    pub async fn list_assets(
        &self,
        asset_type: Option<AssetType>,
        symbol: Option<&str>,
        page: usize,
        size: usize,
    ) -> Result<Page<Asset>, CoreError> {
        let mut query = Vec::new();
        if let Some(t) = asset_type {
            query.push(("assetType", t.to_string()));
        }
        if let Some(s) = symbol.filter(|s| !s.is_empty()) {
            query.push(("symbol", s.to_string()));
        }
        query.push(("page", page.to_string()));
        query.push(("size", size.to_string()));
        self.get_json("/assets", &query).await
    }

    pub async fn popular_assets(&self) -> Result<Vec<PopularAsset>, CoreError> {
        let response: ListResponse<PopularAsset> = self.get_json("/assets/popular", &[]).await?;
        Ok(response.into_items())
    }

    pub async fn create_asset(&self, request: AssetRequest) -> Result<Asset, CoreError> {
        let request = request.normalized()?;
        self.send_json(self.request(Method::POST, "/assets")?.json(&request))
            .await
    }

    pub async fn update_asset(&self, id: Uuid, request: AssetRequest) -> Result<Asset, CoreError> {
        let request = request.normalized()?;
        self.send_json(
            self.request(Method::PUT, &format!("/assets/{id}"))?
                .json(&request),
        )
        .await
    }

    pub async fn delete_asset(&self, id: Uuid) -> Result<(), CoreError> {
        self.send_empty(self.request(Method::DELETE, &format!("/assets/{id}"))?)
            .await
    }

    // ── Market data ─────────────────────────────────────────────────

    pub async fn asset_price(&self, id: Uuid, currency: &str) -> Result<PriceQuote, CoreError> {
        self.get_json(
            &format!("/market-data/asset/{id}/price"),
            &[("currency", currency.to_string())],
        )
        .await
    }

    // ── Alerts ──────────────────────────────────────────────────────

    pub async fn list_alerts(&self) -> Result<Vec<Alert>, CoreError> {
        self.get_json("/alerts", &[]).await
    }

    pub async fn create_alert(&self, request: &AlertRequest) -> Result<Alert, CoreError> {
        request.validate()?;
        self.send_json(self.request(Method::POST, "/alerts")?.json(request))
            .await
    }

    pub async fn update_alert(&self, id: Uuid, request: &AlertRequest) -> Result<Alert, CoreError> {
        request.validate()?;
        self.send_json(
            self.request(Method::PUT, &format!("/alerts/{id}"))?
                .json(request),
        )
        .await
    }

    pub async fn delete_alert(&self, id: Uuid) -> Result<(), CoreError> {
        self.send_empty(self.request(Method::DELETE, &format!("/alerts/{id}"))?)
            .await
    }

    /// `PUT /alerts/{id}/toggle?active=`
    pub async fn toggle_alert(&self, id: Uuid, active: bool) -> Result<Alert, CoreError> {
        self.send_json(
            self.request(Method::PUT, &format!("/alerts/{id}/toggle"))?
                .query(&[("active", active.to_string())]),
        )
        .await
    }

    /// Toggle many alerts; one failure does not stop the others.
    pub async fn toggle_alerts(&self, ids: &[Uuid], active: bool) -> BulkOutcome {
        let results = join_all(ids.iter().map(|id| async move {
            (*id, self.toggle_alert(*id, active).await)
        }))
        .await;

        let mut outcome = BulkOutcome::default();
        for (id, result) in results {
            match result {
                Ok(_) => outcome.succeeded.push(id),
                Err(e) => {
                    tracing::warn!(alert_id = %id, error = %e, "failed to toggle alert");
                    outcome
                        .failed
                        .push((id, e.user_message("Failed to update alert")));
                }
            }
        }
        outcome
    }

    /// `POST /alerts/{id}/reset`: clear the triggered state.
    pub async fn reset_alert(&self, id: Uuid) -> Result<Alert, CoreError> {
        self.send_json(self.request(Method::POST, &format!("/alerts/{id}/reset"))?)
            .await
    }

    // ── Analytics & reports (opaque JSON) ───────────────────────────

    pub async fn dashboard(&self) -> Result<serde_json::Value, CoreError> {
        self.get_json("/analytics/dashboard", &[]).await
    }

    pub async fn portfolio_summary(&self, id: Uuid) -> Result<serde_json::Value, CoreError> {
        self.get_json(&format!("/analytics/portfolio/{id}/summary"), &[])
            .await
    }

    /// `interval` is one of DAILY, WEEKLY, MONTHLY.
    pub async fn portfolio_performance(
        &self,
        id: Uuid,
        interval: &str,
    ) -> Result<serde_json::Value, CoreError> {
        self.get_json(
            &format!("/analytics/portfolio/{id}/performance"),
            &[("interval", interval.to_uppercase())],
        )
        .await
    }

    pub async fn portfolio_returns(&self, id: Uuid) -> Result<serde_json::Value, CoreError> {
        self.get_json(&format!("/analytics/portfolio/{id}/returns"), &[])
            .await
    }

    pub async fn risk_metrics(&self, id: Uuid) -> Result<serde_json::Value, CoreError> {
        self.get_json(&format!("/analytics/portfolio/{id}/risk-metrics"), &[])
            .await
    }

    pub async fn correlation(&self, portfolio_id: Uuid) -> Result<serde_json::Value, CoreError> {
        self.get_json(
            "/analytics/correlation",
            &[("portfolioId", portfolio_id.to_string())],
        )
        .await
    }

    pub async fn tax_report(
        &self,
        portfolio_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<serde_json::Value, CoreError> {
        self.get_json("/reports/tax", &report_query(portfolio_id, start, end))
            .await
    }

    pub async fn performance_report(
        &self,
        portfolio_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<serde_json::Value, CoreError> {
        self.get_json("/reports/performance", &report_query(portfolio_id, start, end))
            .await
    }

    // ── Import / export ─────────────────────────────────────────────

    /// Fetch the backend-rendered export file.
    pub async fn download_export(&self, request: &ExportRequest) -> Result<Vec<u8>, CoreError> {
        let builder = self.request(Method::GET, &request.path_and_query())?;
        let response = self.check(builder.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Post the raw CSV file as multipart form data.
    ///
    /// Callers are expected to have validated the file with
    /// [`crate::services::csv_import::validate_csv`] first.
    pub async fn submit_import(
        &self,
        kind: ImportKind,
        file_name: &str,
        bytes: Vec<u8>,
        portfolio_id: Option<Uuid>,
    ) -> Result<MessageResponse, CoreError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let mut form = multipart::Form::new().part("file", part);
        if let Some(id) = portfolio_id {
            form = form.text("portfolioId", id.to_string());
        }
        let builder = self.request(Method::POST, kind.endpoint())?.multipart(form);
        let response = self.check(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(MessageResponse {
                message: String::new(),
            });
        }
        // The portfolio import answers with the created portfolio rather
        // than a message.
        Ok(serde_json::from_slice(&bytes).unwrap_or(MessageResponse {
            message: String::new(),
        }))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, CoreError> {
        let url = self.endpoint(path)?;
        let builder = self.http.request(method, url);
        let token = self.token.read().unwrap_or_else(|e| e.into_inner());
        Ok(match token.as_deref() {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CoreError> {
        let mut builder = self.request(Method::GET, path)?;
        if !query.is_empty() {
            builder = builder.query(query);
        }
        self.send_json(builder).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, CoreError> {
        let response = self.check(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CoreError::Deserialization(format!("Unexpected response body: {e}")))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), CoreError> {
        self.check(builder.send().await?).await?;
        Ok(())
    }

    /// Turn a non-2xx response into the matching error.
    async fn check(&self, response: Response) -> Result<Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());

        tracing::debug!(status = status.as_u16(), ?message, "backend rejected request");

        Err(match message {
            Some(message) => CoreError::Api {
                status: status.as_u16(),
                message,
            },
            None => CoreError::UnexpectedStatus(status.as_u16()),
        })
    }
}

fn report_query(
    portfolio_id: Uuid,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("portfolioId", portfolio_id.to_string())];
    if let Some(d) = start {
        query.push(("startDate", d.to_string()));
    }
    if let Some(d) = end {
        query.push(("endDate", d.to_string()));
    }
    query
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AssetLookup for ApiClient {
    async fn get_asset(&self, id: Uuid) -> Result<Asset, CoreError> {
        self.get_json(&format!("/assets/{id}"), &[]).await
    }

    async fn bulk_prices(
        &self,
        asset_ids: &[Uuid],
        currency: &str,
    ) -> Result<HashMap<Uuid, f64>, CoreError> {
        if asset_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let body = BulkPriceRequest {
            asset_ids,
            currency,
        };
        let response: BulkPriceResponse = self
            .send_json(self.request(Method::POST, "/market-data/bulk")?.json(&body))
            .await?;
        Ok(response.prices)
    }

    async fn search_assets(&self, query: &str) -> Result<Vec<Asset>, CoreError> {
        self.get_json("/market-data/search", &[("query", query.to_string())])
            .await
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SearchSource for ApiClient {
    async fn list_portfolios(&self) -> Result<Vec<Portfolio>, CoreError> {
        ApiClient::list_portfolios(self).await
    }

    async fn recent_transactions(&self, limit: usize) -> Result<Vec<Transaction>, CoreError> {
        let response: ListResponse<Transaction> = self
            .get_json("/transactions", &[("size", limit.to_string())])
            .await?;
        Ok(response.into_items())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AlertSource for ApiClient {
    async fn triggered_alerts(&self) -> Result<Vec<Alert>, CoreError> {
        self.get_json("/alerts/triggered", &[]).await
    }
}
