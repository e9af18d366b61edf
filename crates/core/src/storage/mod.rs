pub mod encryption;
pub mod format;
pub mod memory;
pub mod traits;

// File-backed stores (native only)
#[cfg(not(target_arch = "wasm32"))]
pub mod encrypted;
#[cfg(not(target_arch = "wasm32"))]
pub mod file;

/// Local-storage keys shared with the browser client.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USERNAME: &str = "username";
    pub const WATCHLIST: &str = "watchlist";
    pub const SAVED_FILTERS: &str = "savedFilters";
    pub const USER_SETTINGS: &str = "userSettings";
}
