use thiserror::Error;

/// Unified error type for the entire invest-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Client validation (never sent to the backend) ───────────────
    #[error("Please select a CSV file")]
    InvalidFileType(String),

    #[error("Import blocked by {} validation error(s): {}", .0.len(), .0.join("; "))]
    ImportValidation(Vec<String>),

    #[error("{0}")]
    ValidationError(String),

    #[error("Another {0} request is still in progress")]
    Busy(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request failed with HTTP status {0}")]
    UnexpectedStatus(u16),

    #[error("Network error: {0}")]
    Network(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Storage / File ──────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed — wrong password or corrupted file")]
    Decryption,
}

impl CoreError {
    /// True for errors caught before any network call (bad input, bad CSV,
    /// missing transfer destination). These are rendered inline.
    #[must_use]
    pub fn is_client_validation(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidFileType(_)
                | CoreError::ImportValidation(_)
                | CoreError::ValidationError(_)
        )
    }

    /// The message to show the user for a failed action.
    ///
    /// Validation errors and backend rejections are shown verbatim; failures
    /// without a structured message fall back to the per-action `fallback`
    /// (e.g. "Failed to fetch watchlist").
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            CoreError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            CoreError::InvalidFileType(_) | CoreError::ValidationError(_) | CoreError::Busy(_) => {
                self.to_string()
            }
            CoreError::ImportValidation(errors) => errors.join("\n"),
            _ => fallback.to_string(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<url::ParseError> for CoreError {
    fn from(e: url::ParseError) -> Self {
        CoreError::ValidationError(format!("Invalid URL: {e}"))
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; search terms and filter values
        // live in the query string, so strip it.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}
