//! OAuth2 browser consent flow and token acquisition.
//!
//! Opens the user's browser for consent, captures the redirect on a
//! localhost TcpListener and exchanges the auth code for tokens.
//! `Authenticator` wraps the whole "cached token, else refresh, else consent"
//! sequence around an injected [`CredentialStore`].

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;

use super::{
    is_token_expired, load_credentials, refresh_access_token, ClientCredentials,
    CredentialStore, GoogleApiError, GoogleToken, InstalledAppCredentials, SCOPES,
};

/// Produces a valid access token for the Sheets API.
pub struct Authenticator {
    credentials_path: PathBuf,
    store: Box<dyn CredentialStore>,
}

impl Authenticator {
    pub fn new(credentials_path: impl Into<PathBuf>, store: Box<dyn CredentialStore>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            store,
        }
    }

    /// Return a usable access token.
    ///
    /// 1. Cached token that has not expired → use it
    /// 2. Expired token with a refresh token → refresh and persist
    /// 3. Otherwise → browser consent flow (requires credentials.json) and persist
    pub async fn authenticate(&self) -> Result<String, GoogleApiError> {
        let cached = match self.store.load() {
            Ok(token) => Some(token),
            Err(GoogleApiError::TokenNotFound(_)) => None,
            Err(e) => {
                log::warn!("Ignoring unreadable token cache: {}", e);
                None
            }
        };

        if let Some(token) = cached {
            if !is_token_expired(&token) {
                log::debug!("Using cached access token");
                return Ok(token.token);
            }
            if token.refresh_token.is_some() {
                match refresh_access_token(&token).await {
                    Ok(refreshed) => {
                        self.store.save(&refreshed)?;
                        log::info!("Refreshed Google access token");
                        return Ok(refreshed.token);
                    }
                    Err(e) => log::warn!("Token refresh failed, re-running consent: {}", e),
                }
            }
        }

        let creds = load_credentials(&self.credentials_path)?;
        let token = run_consent_flow(&creds).await?;
        self.store.save(&token)?;
        Ok(token.token)
    }

    /// Drop the cached token so the next run goes through consent again.
    pub fn sign_out(&self) -> Result<(), GoogleApiError> {
        self.store.delete()
    }
}

/// Run the full OAuth2 consent flow.
///
/// 1. Start TcpListener on a random port
/// 2. Open browser with auth URL
/// 3. Wait for redirect with auth code
/// 4. Exchange code for tokens
pub async fn run_consent_flow(creds: &ClientCredentials) -> Result<GoogleToken, GoogleApiError> {
    let installed = &creds.installed;

    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    let redirect_uri = format!("http://localhost:{}", port);

    let auth_url = build_auth_url(&installed.auth_uri, &installed.client_id, &redirect_uri);

    log::info!("Opening browser for Google OAuth consent...");
    if let Err(e) = open::that(&auth_url) {
        log::warn!("Failed to open browser: {}. URL: {}", e, auth_url);
    }
    println!("If the browser did not open, visit:\n{}", auth_url);

    let auth_code = wait_for_auth_code(&listener)?;
    exchange_code(installed, &auth_code, &redirect_uri).await
}

/// Trade an authorization code for access and refresh tokens.
async fn exchange_code(
    installed: &InstalledAppCredentials,
    code: &str,
    redirect_uri: &str,
) -> Result<GoogleToken, GoogleApiError> {
    let client = reqwest::Client::new();
    let mut form = vec![
        ("code", code),
        ("client_id", installed.client_id.as_str()),
        ("redirect_uri", redirect_uri),
        ("grant_type", "authorization_code"),
    ];
    if let Some(secret) = installed.client_secret.as_deref() {
        form.push(("client_secret", secret));
    }
    let resp = client.post(&installed.token_uri).form(&form).send().await?;

    if !resp.status().is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GoogleApiError::CodeExchangeFailed(body));
    }

    let body: serde_json::Value = resp.json().await?;

    let access_token = body["access_token"]
        .as_str()
        .ok_or_else(|| GoogleApiError::CodeExchangeFailed("No access_token in response".into()))?
        .to_string();
    let refresh_token = body["refresh_token"].as_str().map(|s| s.to_string());
    let expires_in = body["expires_in"].as_u64().unwrap_or(3600);
    let expiry = chrono::Utc::now() + chrono::Duration::seconds(expires_in as i64);

    Ok(GoogleToken {
        token: access_token,
        refresh_token,
        token_uri: installed.token_uri.clone(),
        client_id: installed.client_id.clone(),
        client_secret: installed.client_secret.clone(),
        scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
        expiry: Some(expiry.to_rfc3339()),
    })
}

fn build_auth_url(auth_uri: &str, client_id: &str, redirect_uri: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &SCOPES.join(" "))
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .finish();
    format!("{}?{}", auth_uri, query)
}

/// Wait for the OAuth redirect and extract the auth code from the URL.
fn wait_for_auth_code(listener: &TcpListener) -> Result<String, GoogleApiError> {
    let (mut stream, _) = listener.accept()?;

    let mut buffer = [0u8; 4096];
    let n = stream.read(&mut buffer)?;
    let request = String::from_utf8_lossy(&buffer[..n]);

    match extract_auth_code(&request) {
        Some(code) => {
            send_response(
                &mut stream,
                "Authorization successful! You can close this tab and return to the terminal.",
            );
            Ok(code)
        }
        None => {
            let message = if request.contains("error=") {
                "Authorization denied. You can close this tab."
            } else {
                "No authorization code received. You can close this tab."
            };
            send_response(&mut stream, message);
            Err(GoogleApiError::FlowCancelled)
        }
    }
}

/// Pull the decoded `code` parameter out of `GET /?code=xxx&scope=... HTTP/1.1`.
fn extract_auth_code(request: &str) -> Option<String> {
    let path = request.lines().next()?.split_whitespace().nth(1)?;
    let query = path.split_once('?')?.1;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}

/// Send an HTTP response to the browser.
fn send_response(stream: &mut impl Write, message: &str) {
    let body = format!(
        "<html><body style=\"font-family: system-ui; text-align: center; padding: 40px;\">\
         <h2>{}</h2></body></html>",
        message
    );
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
