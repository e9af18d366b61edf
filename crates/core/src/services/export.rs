use chrono::NaiveDate;
use url::form_urlencoded;
use uuid::Uuid;

use crate::models::filter::TransactionFilter;

/// File format rendered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Csv,
    Pdf,
    #[default]
    Excel,
}

impl ExportFormat {
    /// Lenient parse: `csv` and `pdf` are recognised, anything else is Excel.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "csv" => ExportFormat::Csv,
            "pdf" => ExportFormat::Pdf,
            _ => ExportFormat::Excel,
        }
    }

    /// Value of the `format` query parameter.
    #[must_use]
    pub fn as_param(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "excel",
        }
    }

    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
        }
    }
}

/// What to export.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportRequest {
    Portfolio {
        id: Uuid,
        /// Used only for the downloaded file name
        name: String,
        format: ExportFormat,
    },
    Transactions {
        filter: TransactionFilter,
        format: ExportFormat,
    },
}

impl ExportRequest {
    #[must_use]
    pub fn format(&self) -> ExportFormat {
        match self {
            ExportRequest::Portfolio { format, .. } | ExportRequest::Transactions { format, .. } => {
                *format
            }
        }
    }

    /// Endpoint path, without query.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            ExportRequest::Portfolio { id, .. } => format!("/export/portfolio/{id}"),
            ExportRequest::Transactions { .. } => "/export/transactions".to_string(),
        }
    }

    /// Query parameters. Only filter fields that are set are included.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("format", self.format().as_param().to_string())];
        if let ExportRequest::Transactions { filter, .. } = self {
            pairs.extend(
                filter
                    .to_query_pairs()
                    .into_iter()
                    .filter(|(_, v)| !v.is_empty()),
            );
        }
        pairs
    }

    /// `path?query`, as sent to the backend.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish();
        format!("{}?{}", self.path(), query)
    }

    /// Deterministic download name for the given day.
    ///
    /// `portfolio_<name>_<YYYY-MM-DD>.<ext>` or `transactions_<YYYY-MM-DD>.<ext>`.
    /// Path separators in the portfolio name are replaced with `_`.
    #[must_use]
    pub fn file_name(&self, date: NaiveDate) -> String {
        let ext = self.format().extension();
        match self {
            ExportRequest::Portfolio { name, .. } => {
                let safe: String = name
                    .chars()
                    .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
                    .collect();
                format!("portfolio_{safe}_{}.{ext}", date.format("%Y-%m-%d"))
            }
            ExportRequest::Transactions { .. } => {
                format!("transactions_{}.{ext}", date.format("%Y-%m-%d"))
            }
        }
    }
}
