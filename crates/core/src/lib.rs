pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Arc;
use uuid::Uuid;

use api::client::ApiClient;
use config::ClientConfig;
use errors::CoreError;
use models::asset::{Asset, WatchedAsset};
use models::auth::{AuthResponse, MessageResponse, RegisterRequest};
use models::filter::{SortSpec, TransactionFilter};
use models::page::Page;
use models::settings::UserSettings;
use models::transaction::{Transaction, TransactionRequest};
use services::aggregator::{self, GlobalSearchResults};
use services::csv_import::{self, CsvValidation, ImportKind, ImportRequest};
use services::export::ExportRequest;
use services::request_guard::{InFlight, SearchSequencer};
use services::saved_filters::SavedFilterStore;
use services::session::SessionStore;
use services::settings_store::SettingsStore;
use services::watchlist::{self, AddOutcome, WatchlistStore};
use storage::traits::KeyValueStore;

/// Rows fetched from the backend before client-side filtering of the
/// transaction list.
const TRANSACTION_FETCH_SIZE: usize = 1000;

/// Main entry point for the Invest Tracker core library.
///
/// Wires the REST client to one client-side store and the services built on
/// it. Every backend mutation is fire-then-refetch: nothing here patches
/// local copies of server data.
#[must_use]
pub struct InvestTracker<S: KeyValueStore> {
    config: ClientConfig,
    api: Arc<ApiClient>,
    store: Arc<S>,
    session: SessionStore<S>,
    watchlist: WatchlistStore<S>,
    saved_filters: SavedFilterStore<S>,
    settings: SettingsStore<S>,
    import_in_flight: InFlight,
    export_in_flight: InFlight,
    transaction_in_flight: InFlight,
    search: SearchSequencer,
}

impl<S: KeyValueStore> std::fmt::Debug for InvestTracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestTracker")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.api.is_authenticated())
            .finish()
    }
}

impl<S: KeyValueStore> InvestTracker<S> {
    /// Build the client and restore a persisted session, if any.
    ///
    /// Stored user settings override the poll interval and currency of
    /// `config`.
    pub fn new(config: ClientConfig, store: S) -> Result<Self, CoreError> {
        let store = Arc::new(store);
        let settings = SettingsStore::new(Arc::clone(&store));
        let config = config.with_settings(&settings.load()?);
        let api = Arc::new(ApiClient::new(&config)?);
        let session = SessionStore::new(Arc::clone(&store));

        if let Some(token) = session.token()? {
            api.set_token(token);
            tracing::debug!("restored session from storage");
        }

        Ok(Self {
            watchlist: WatchlistStore::new(Arc::clone(&store)),
            saved_filters: SavedFilterStore::new(Arc::clone(&store)),
            settings,
            session,
            api,
            store,
            config,
            import_in_flight: InFlight::new(),
            export_in_flight: InFlight::new(),
            transaction_in_flight: InFlight::new(),
            search: SearchSequencer::new(),
        })
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Session ─────────────────────────────────────────────────────

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, CoreError> {
        let auth = self.api.login(username, password).await.inspect_err(|e| {
            tracing::warn!(error = %e, "login failed");
        })?;
        self.session.store_login(&auth)?;
        Ok(auth)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, CoreError> {
        let auth = self.api.register(request).await.inspect_err(|e| {
            tracing::warn!(error = %e, "registration failed");
        })?;
        self.session.store_login(&auth)?;
        Ok(auth)
    }

    pub fn logout(&self) -> Result<(), CoreError> {
        self.api.clear_token();
        self.session.clear()
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    // ── Import / export ─────────────────────────────────────────────

    /// Validate CSV text without submitting anything.
    pub fn preview_import(&self, text: &str, kind: ImportKind) -> CsvValidation {
        csv_import::validate_csv(text, kind)
    }

    /// Check, validate and upload a CSV file.
    ///
    /// Nothing is sent when the file name or content is invalid. A second
    /// import while one is outstanding fails with [`CoreError::Busy`].
    pub async fn import_file(
        &self,
        kind: ImportKind,
        file_name: &str,
        bytes: Vec<u8>,
        portfolio_id: Option<Uuid>,
    ) -> Result<MessageResponse, CoreError> {
        let request = ImportRequest::prepare(kind, file_name, bytes, portfolio_id)?;
        let _guard = self.import_in_flight.begin("import")?;

        let file_name = request.file_name().to_string();
        let portfolio_id = request.portfolio_id();
        let response = self
            .api
            .submit_import(kind, &file_name, request.into_bytes(), portfolio_id)
            .await
            .inspect_err(|e| tracing::warn!(file = %file_name, error = %e, "import failed"))?;

        tracing::info!(file = %file_name, kind = %kind, "import submitted");
        Ok(response)
    }

    /// Download a backend-rendered export.
    pub async fn export(&self, request: &ExportRequest) -> Result<Vec<u8>, CoreError> {
        let _guard = self.export_in_flight.begin("export")?;
        self.api
            .download_export(request)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "export failed"))
    }

    /// Download an export and write it to `dir` under its deterministic name
    /// (dated today, UTC). Returns the written path.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn export_to_dir(
        &self,
        request: &ExportRequest,
        dir: &std::path::Path,
    ) -> Result<std::path::PathBuf, CoreError> {
        let bytes = self.export(request).await?;
        let path = dir.join(request.file_name(chrono::Utc::now().date_naive()));
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), "export written");
        Ok(path)
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Validated before sending; an invalid request makes no network call.
    pub async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<Transaction, CoreError> {
        request.validate()?;
        let _guard = self.transaction_in_flight.begin("transaction")?;
        self.api.create_transaction(request).await
    }

    /// Fetch transactions matching the backend-side fields of `filter`,
    /// then apply the full filter, sort and page locally.
    pub async fn transactions(
        &self,
        filter: &TransactionFilter,
        sort: SortSpec,
        page: usize,
        size: usize,
    ) -> Result<Page<Transaction>, CoreError> {
        let fetched = self
            .api
            .list_transactions(filter, 0, TRANSACTION_FETCH_SIZE)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to fetch transactions"))?;
        Ok(aggregator::transaction_view(
            &fetched.content,
            filter,
            sort,
            page,
            size,
        ))
    }

    // ── Search ──────────────────────────────────────────────────────

    /// Global search box. `None` means a newer search superseded this one
    /// and the result must not be shown.
    pub async fn global_search(&self, query: &str) -> Option<GlobalSearchResults> {
        self.search
            .run(aggregator::fetch_global_search(self.api.as_ref(), query))
            .await
    }

    /// Drop any search still in flight (the view went away).
    pub fn cancel_search(&self) {
        self.search.invalidate();
    }

    // ── Watchlist ───────────────────────────────────────────────────

    pub fn watch(&self, asset: &Asset) -> Result<AddOutcome, CoreError> {
        self.watchlist.add(asset)
    }

    pub fn unwatch(&self, asset_id: Uuid) -> Result<bool, CoreError> {
        self.watchlist.remove(asset_id)
    }

    /// Watched assets with current prices in the configured currency.
    ///
    /// A failed price refresh is logged and the entries are returned
    /// without prices.
    pub async fn watchlist(&self) -> Result<Vec<WatchedAsset>, CoreError> {
        let mut entries = self.watchlist.list(self.api.as_ref()).await?;
        if let Err(e) =
            watchlist::refresh_prices(&mut entries, self.api.as_ref(), &self.config.default_currency)
                .await
        {
            tracing::warn!(error = %e, "failed to refresh watchlist prices");
        }
        Ok(entries)
    }

    #[must_use]
    pub fn watchlist_store(&self) -> &WatchlistStore<S> {
        &self.watchlist
    }

    // ── Saved filters & settings ────────────────────────────────────

    #[must_use]
    pub fn saved_filters(&self) -> &SavedFilterStore<S> {
        &self.saved_filters
    }

    pub fn settings(&self) -> Result<UserSettings, CoreError> {
        self.settings.load()
    }

    /// Persist settings. Takes effect for the poll interval and currency on
    /// the next [`InvestTracker::new`].
    pub fn save_settings(&self, settings: &UserSettings) -> Result<(), CoreError> {
        self.settings.save(settings)
    }

    // ── Alerts ──────────────────────────────────────────────────────

    /// Start polling triggered alerts at the configured interval.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn start_alert_polling(&self) -> services::alert_poller::AlertPoller {
        services::alert_poller::AlertPoller::spawn(
            Arc::clone(&self.api) as Arc<dyn api::traits::AlertSource>,
            self.config.alert_poll_interval,
        )
    }
}
