//! Response envelopes shared by every dashboard endpoint.
//!
//! Read endpoints wrap their payload in [`ApiResponse`]; the CSV import
//! and validate endpoints reply with [`ImportResponse`], whose HTTP status
//! distinguishes full success (200) from partial success (207) and client
//! errors (400) from upstream failures (500).

use crate::ImportOutcome;
use serde::{Deserialize, Serialize};

/// Fallback message for failures that carry no usable description.
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            success: true,
            error: None,
        }
    }

    /// Failure envelope. A `None` message normalizes to [`UNKNOWN_ERROR`],
    /// which existing dashboard clients match on.
    pub fn failure(data: T, error: Option<String>) -> Self {
        Self {
            data,
            success: false,
            error: Some(error.unwrap_or_else(|| UNKNOWN_ERROR.into())),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ImportOutcome>,
    #[serde(skip)]
    status: u16,
}

impl ImportResponse {
    /// Wrap a finished import batch; 207 Multi-Status when any record
    /// failed.
    pub fn from_outcome(outcome: ImportOutcome) -> Self {
        let (success, message, status) = if outcome.failed == 0 {
            (
                true,
                format!("Successfully imported {} records", outcome.success),
                200,
            )
        } else {
            (
                false,
                format!(
                    "Import completed with {} successes and {} failures",
                    outcome.success, outcome.failed
                ),
                207,
            )
        };
        Self {
            success,
            message,
            results: Some(outcome),
            status,
        }
    }

    /// Request body did not contain CSV text at all.
    pub fn missing_content() -> Self {
        Self {
            success: false,
            message: "CSV content is required".into(),
            results: None,
            status: 400,
        }
    }

    /// The CSV parsed but produced no records; nothing is written.
    pub fn no_valid_data() -> Self {
        Self {
            success: false,
            message: "No valid data found in CSV".into(),
            results: None,
            status: 400,
        }
    }

    /// Parsing or the batch driver itself failed before any outcome.
    pub fn import_failed(cause: &str) -> Self {
        Self {
            success: false,
            message: format!("Failed to import CSV data: {cause}"),
            results: None,
            status: 500,
        }
    }

    /// Successful dry-run validation of `count` records.
    pub fn validated(count: usize) -> Self {
        Self {
            success: true,
            message: format!("CSV validation successful. Found {count} valid records"),
            results: Some(ImportOutcome {
                success: count,
                failed: 0,
                errors: Vec::new(),
            }),
            status: 200,
        }
    }

    /// Dry-run validation rejected the CSV.
    pub fn validation_failed(cause: &str) -> Self {
        Self {
            success: false,
            message: format!("CSV validation failed: {cause}"),
            results: None,
            status: 400,
        }
    }

    pub fn http_status(&self) -> u16 {
        self.status
    }
}
