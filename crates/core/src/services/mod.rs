pub mod aggregator;
pub mod csv_import;
pub mod export;
pub mod request_guard;
pub mod saved_filters;
pub mod session;
pub mod settings_store;
pub mod watchlist;

// Needs a tokio runtime (native only)
#[cfg(not(target_arch = "wasm32"))]
pub mod alert_poller;
