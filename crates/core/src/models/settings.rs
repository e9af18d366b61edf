use serde::{Deserialize, Serialize};

/// User preferences persisted client-side under `userSettings`.
///
/// Missing fields fall back to their defaults when loaded, so settings saved
/// by an older client still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    /// Display currency (e.g., "USD", "EUR")
    pub default_currency: String,
    pub date_format: String,
    pub number_format: String,
    pub chart_type: String,
    pub show_notifications: bool,
    pub email_notifications: bool,
    /// Minutes between price/alert refreshes, kept as text like the form field.
    pub price_update_interval: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            date_format: "MM/DD/YYYY".to_string(),
            number_format: "en-US".to_string(),
            chart_type: "line".to_string(),
            show_notifications: true,
            email_notifications: false,
            price_update_interval: "5".to_string(),
        }
    }
}

impl UserSettings {
    /// Refresh interval in minutes, if the stored text is a positive integer.
    #[must_use]
    pub fn price_update_minutes(&self) -> Option<u64> {
        self.price_update_interval
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|m| *m > 0)
    }
}
