//! Error types for capacity model operations
//!
//! Anticipated failures (API errors, write failures, webhook rejections) are
//! logged and surfaced as `false`/empty values at the point of use. What
//! reaches callers as an `Err` is either a caller bug (`NotAuthenticated`)
//! or something the operator has to fix (credentials, config, input files).

use std::path::PathBuf;
use thiserror::Error;

use crate::google_api::GoogleApiError;

#[derive(Debug, Error)]
pub enum CapacityError {
    #[error("Authentication failed: {0}")]
    Authentication(#[from] GoogleApiError),

    #[error("Not authenticated. Call authenticate() first.")]
    NotAuthenticated,

    #[error("Range access failed for {range}: {source}")]
    RangeAccess {
        range: String,
        #[source]
        source: GoogleApiError,
    },

    #[error("Malformed matrix criteria: {0}")]
    MalformedCriteria(String),

    #[error("Matrix criteria are empty; add at least one rule")]
    EmptyRuleSet,

    #[error("No data: {0}")]
    NoData(String),

    #[error("Update rejected: {0}")]
    UpdateFailed(String),

    #[error("Webhook failed: {0}")]
    Webhook(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CapacityError {
    /// Returns true if this error requires user action to resolve
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            CapacityError::Authentication(_)
                | CapacityError::Config(_)
                | CapacityError::FileNotFound(_)
                | CapacityError::MalformedCriteria(_)
                | CapacityError::EmptyRuleSet
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CapacityError::Authentication(GoogleApiError::CredentialsNotFound(_)) => {
                "Download credentials.json (Desktop App) from Google Cloud Console."
            }
            CapacityError::Authentication(_) => "Run 'capacity auth' to sign in again.",
            CapacityError::NotAuthenticated => "Authenticate before reading or writing ranges.",
            CapacityError::RangeAccess { .. } => {
                "Check the spreadsheet ID, sheet names and sharing permissions."
            }
            CapacityError::MalformedCriteria(_) => "Fix the criteria file or the Matrix sheet.",
            CapacityError::EmptyRuleSet => "Add at least one row to the Matrix sheet.",
            CapacityError::NoData(_) => {
                "Run the Apps Script in Google Sheets first, or 'capacity trigger'."
            }
            CapacityError::UpdateFailed(_) => "Check you have edit access to the spreadsheet.",
            CapacityError::Webhook(_) => "Check the webhook URL and the Apps Script deployment.",
            CapacityError::Config(_) => "Check config.json in the project root.",
            CapacityError::FileNotFound(_) => "Check the path and try again.",
            CapacityError::Io(_) => "Check file permissions and disk space.",
            CapacityError::Json(_) => "Check the file is valid JSON.",
            CapacityError::Csv(_) => "Check the output path is writable.",
        }
    }
}
