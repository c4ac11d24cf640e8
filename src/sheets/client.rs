//! Google Sheets API v4 — values.get / values.update / values.clear.

use async_trait::async_trait;
use serde::Deserialize;

use super::{RangeSpec, RangeStore, Rows, UpdateResponse};
use crate::google_api::GoogleApiError;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
/// Store values as sent; never parse formulas or numbers.
const VALUE_INPUT_OPTION: &str = "RAW";

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    #[serde(default)]
    updated_cells: u64,
}

// ============================================================================
// Client
// ============================================================================

/// Bearer-token Sheets client.
pub struct SheetsClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl SheetsClient {
    pub fn new(access_token: &str) -> Self {
        Self::with_base_url(access_token, SHEETS_API_BASE)
    }

    /// Point the client at a different host (used by tests).
    pub fn with_base_url(access_token: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}` with each segment escaped.
    fn values_url(
        &self,
        spreadsheet_id: &str,
        range: &RangeSpec,
        suffix: &str,
    ) -> Result<url::Url, GoogleApiError> {
        let mut url = url::Url::parse(&self.base_url).map_err(|e| GoogleApiError::ApiError {
            status: 0,
            message: format!("invalid Sheets base URL {}: {}", self.base_url, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| GoogleApiError::ApiError {
                status: 0,
                message: format!("Sheets base URL cannot take a path: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values"])
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }
}

/// Map a non-success response into a `GoogleApiError`.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GoogleApiError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GoogleApiError::AuthExpired);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GoogleApiError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}

/// Sheets returns strings by default, but numbers and booleans show up
/// under other render options.
fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RangeStore for SheetsClient {
    async fn get(&self, spreadsheet_id: &str, range: &RangeSpec) -> Result<Rows, GoogleApiError> {
        let url = self.values_url(spreadsheet_id, range, "")?;
        log::debug!("GET {}", url);

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body: ValueRangeResponse = check_status(resp).await?.json().await?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn update(
        &self,
        spreadsheet_id: &str,
        range: &RangeSpec,
        rows: &[Vec<String>],
    ) -> Result<UpdateResponse, GoogleApiError> {
        let url = self.values_url(spreadsheet_id, range, "")?;
        log::debug!("PUT {} ({} rows)", url, rows.len());

        let body = serde_json::json!({
            "range": range.to_string(),
            "majorDimension": "ROWS",
            "values": rows,
        });
        let resp = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&body)
            .send()
            .await?;
        let result: UpdateValuesResponse = check_status(resp).await?.json().await?;

        Ok(UpdateResponse {
            updated_cells: result.updated_cells,
        })
    }

    async fn clear(&self, spreadsheet_id: &str, range: &RangeSpec) -> Result<(), GoogleApiError> {
        let url = self.values_url(spreadsheet_id, range, ":clear")?;
        log::debug!("POST {}", url);

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}
