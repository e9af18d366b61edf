use std::time::Duration;

use crate::models::settings::UserSettings;

pub const ENV_API_URL: &str = "INVEST_TRACKER_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "INVEST_TRACKER_TIMEOUT_SECS";
pub const ENV_ALERT_POLL_SECS: &str = "INVEST_TRACKER_ALERT_POLL_SECS";
pub const ENV_CURRENCY: &str = "INVEST_TRACKER_CURRENCY";

/// Runtime configuration of the backend client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Prefix for every endpoint path, e.g. `http://localhost:8080/api`
    pub base_url: String,
    /// Per-request timeout (ignored on WASM, where the browser owns timeouts)
    pub timeout: Duration,
    /// How often triggered alerts are re-fetched
    pub alert_poll_interval: Duration,
    /// Currency requested for bulk price refreshes
    pub default_currency: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout: Duration::from_secs(30),
            alert_poll_interval: Duration::from_secs(5 * 60),
            default_currency: "USD".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables, keeping defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_API_URL) {
            if url.trim().is_empty() {
                tracing::warn!("{ENV_API_URL} is empty, using default: {}", config.base_url);
            } else {
                config.base_url = url.trim().to_string();
            }
        }

        if let Some(secs) = read_positive_secs(ENV_TIMEOUT_SECS, config.timeout) {
            config.timeout = secs;
        }

        if let Some(secs) = read_positive_secs(ENV_ALERT_POLL_SECS, config.alert_poll_interval) {
            config.alert_poll_interval = secs;
        }

        if let Ok(currency) = std::env::var(ENV_CURRENCY) {
            let upper = currency.trim().to_uppercase();
            if upper.len() == 3 && upper.chars().all(|c| c.is_ascii_alphabetic()) {
                config.default_currency = upper;
            } else {
                tracing::warn!(
                    "Invalid {ENV_CURRENCY} value '{currency}', using default: {}",
                    config.default_currency
                );
            }
        }

        config
    }

    /// Apply persisted user preferences (refresh interval, display currency).
    #[must_use]
    pub fn with_settings(mut self, settings: &UserSettings) -> Self {
        if let Some(minutes) = settings.price_update_minutes() {
            match minutes.checked_mul(60) {
                Some(secs) => self.alert_poll_interval = Duration::from_secs(secs),
                None => tracing::warn!(
                    "Price update interval of {minutes} minutes is out of range, keeping {}s",
                    self.alert_poll_interval.as_secs()
                ),
            }
        }
        if !settings.default_currency.trim().is_empty() {
            self.default_currency = settings.default_currency.trim().to_uppercase();
        }
        self
    }
}

fn read_positive_secs(var: &str, current: Duration) -> Option<Duration> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Some(Duration::from_secs(value)),
        Ok(value) => {
            tracing::warn!(
                "Invalid {var} value: {value} (must be positive), using default: {}s",
                current.as_secs()
            );
            None
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse {var} '{raw}': {e}, using default: {}s",
                current.as_secs()
            );
            None
        }
    }
}
