use uuid::Uuid;

use crate::errors::CoreError;

/// Columns a transactions CSV header must mention (case-insensitive substring).
pub const REQUIRED_TRANSACTION_FIELDS: [&str; 4] = ["asset", "type", "quantity", "price"];

/// Minimum comma-separated fields per data row.
pub const MIN_COLUMNS: usize = 4;

/// Data rows inspected for column count. Later rows are left to the backend.
pub const MAX_CHECKED_ROWS: usize = 10;

/// Data lines shown in the preview (the header is shown in addition).
pub const PREVIEW_ROWS: usize = 5;

/// What a CSV file is imported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Transactions,
    Portfolio,
}

impl ImportKind {
    /// Multipart upload endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &'static str {
        match self {
            ImportKind::Transactions => "/import/transactions",
            ImportKind::Portfolio => "/import/portfolio",
        }
    }
}

impl std::fmt::Display for ImportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportKind::Transactions => write!(f, "transactions"),
            ImportKind::Portfolio => write!(f, "portfolio"),
        }
    }
}

/// Diagnostics for one CSV blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvValidation {
    /// Human-readable problems; empty means the file may be submitted.
    pub errors: Vec<String>,
    /// Header followed by at most [`PREVIEW_ROWS`] data lines.
    pub preview: Vec<String>,
}

impl CsvValidation {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Reject anything whose name does not end in `.csv` (case-sensitive).
pub fn check_file_name(file_name: &str) -> Result<(), CoreError> {
    if file_name.ends_with(".csv") {
        Ok(())
    } else {
        Err(CoreError::InvalidFileType(file_name.to_string()))
    }
}

/// Structural validation of a CSV text before upload.
///
/// - Fewer than 2 non-empty lines → exactly one error.
/// - Transactions: the lowercased header must contain every
///   [`REQUIRED_TRANSACTION_FIELDS`] entry; one error per missing field.
/// - The first [`MAX_CHECKED_ROWS`] data rows need at least [`MIN_COLUMNS`]
///   fields. Row numbers count the header as row 1.
pub fn validate_csv(text: &str, kind: ImportKind) -> CsvValidation {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .collect();

    let preview = lines
        .iter()
        .take(PREVIEW_ROWS + 1)
        .map(|l| l.to_string())
        .collect();

    if lines.len() < 2 {
        return CsvValidation {
            errors: vec!["CSV must have at least a header row and one data row".to_string()],
            preview,
        };
    }

    let mut errors = Vec::new();

    if kind == ImportKind::Transactions {
        let header = lines[0].to_lowercase();
        for field in REQUIRED_TRANSACTION_FIELDS {
            if !header.contains(field) {
                errors.push(format!("Missing required field: {field}"));
            }
        }
    }

    let last = lines.len().min(MAX_CHECKED_ROWS + 1);
    for (i, line) in lines.iter().enumerate().take(last).skip(1) {
        if line.split(',').count() < MIN_COLUMNS {
            errors.push(format!("Row {}: Insufficient columns", i + 1));
        }
    }

    CsvValidation { errors, preview }
}

/// A file ready to be posted to an import endpoint.
///
/// Built only through [`ImportRequest::prepare`], so holding one means the
/// name and content passed client-side validation.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    kind: ImportKind,
    file_name: String,
    bytes: Vec<u8>,
    portfolio_id: Option<Uuid>,
    preview: Vec<String>,
}

impl ImportRequest {
    /// Check the name, decode as UTF-8 and validate. Any failure blocks the
    /// whole import.
    pub fn prepare(
        kind: ImportKind,
        file_name: &str,
        bytes: Vec<u8>,
        portfolio_id: Option<Uuid>,
    ) -> Result<Self, CoreError> {
        check_file_name(file_name)?;

        let text = std::str::from_utf8(&bytes).map_err(|_| {
            CoreError::ImportValidation(vec!["File is not valid UTF-8 text".to_string()])
        })?;

        let validation = validate_csv(text, kind);
        if !validation.is_valid() {
            tracing::debug!(
                kind = %kind,
                errors = validation.errors.len(),
                "CSV import blocked by validation"
            );
            return Err(CoreError::ImportValidation(validation.errors));
        }

        Ok(Self {
            kind,
            file_name: file_name.to_string(),
            bytes,
            portfolio_id,
            preview: validation.preview,
        })
    }

    #[must_use]
    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn portfolio_id(&self) -> Option<Uuid> {
        self.portfolio_id
    }

    #[must_use]
    pub fn preview(&self) -> &[String] {
        &self.preview
    }

    /// Hand over the raw file content for upload.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
