//! Remote regeneration trigger.
//!
//! Posts a one-shot request to the Apps Script web app that rebuilds the
//! capacity projection tab. One attempt, bounded by a timeout.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CapacityError;

pub const GENERATE_ACTION: &str = "generate_capacity_model";
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub action: String,
    /// ISO-8601, local time.
    pub timestamp: String,
}

impl WebhookPayload {
    pub fn generate() -> Self {
        Self {
            action: GENERATE_ACTION.to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Ask the web app to regenerate the capacity model. Failures are logged.
pub async fn trigger(url: &str) -> bool {
    trigger_with_timeout(url, WEBHOOK_TIMEOUT).await
}

pub async fn trigger_with_timeout(url: &str, timeout: Duration) -> bool {
    match send(url, timeout).await {
        Ok(()) => {
            log::info!("Webhook accepted generation request");
            true
        }
        Err(e) => {
            log::warn!("{}", e);
            false
        }
    }
}

async fn send(url: &str, timeout: Duration) -> Result<(), CapacityError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CapacityError::Webhook(format!("client setup: {}", e)))?;

    let payload = WebhookPayload::generate();
    log::debug!("POST {} action={}", url, payload.action);

    let resp = client
        .post(url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| CapacityError::Webhook(format!("request failed: {}", e)))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(CapacityError::Webhook(format!("HTTP error: {}", status.as_u16())));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| CapacityError::Webhook(format!("reading response: {}", e)))?;
    let parsed: WebhookResponse = serde_json::from_str(&body)
        .map_err(|e| CapacityError::Webhook(format!("response is not JSON: {}", e)))?;

    match parsed.status.as_deref() {
        Some("success") => Ok(()),
        _ => Err(CapacityError::Webhook(
            parsed
                .message
                .unwrap_or_else(|| "response did not report success".to_string()),
        )),
    }
}
