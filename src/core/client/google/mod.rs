//! Thin REST clients for the Google APIs the service talks to.
//!
//! Token acquisition is out of scope: callers hand in a ready bearer token
//! (or none, e.g. against a local mock).

pub mod reporting_v4;
pub mod data_v1beta;
pub mod sheets_v4;

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GoogleApiError {
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl GoogleApiError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GoogleApiError::Timeout
        } else if e.is_decode() {
            GoogleApiError::Decode(e.to_string())
        } else {
            GoogleApiError::Transport(e.to_string())
        }
    }
}

/// Connection settings shared by every Google client.
#[derive(Debug, Clone)]
pub struct GoogleEndpoint {
    pub base_url: String,
    pub access_token: Option<String>,
}

impl GoogleEndpoint {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Builds a fresh HTTP client whose every request is bounded by `timeout`.
    pub fn connect(&self, timeout: Duration) -> Result<Client, GoogleApiError> {
        Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GoogleApiError::Build(e.to_string()))
    }

    pub fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.access_token.as_deref() {
            Some(token) if !token.is_empty() => req.bearer_auth(token),
            _ => req,
        }
    }
}

/// Sends `req`, rejects non-2xx, and decodes the JSON body.
pub async fn send_json<R: DeserializeOwned>(req: RequestBuilder) -> Result<R, GoogleApiError> {
    let resp = req.send().await.map_err(GoogleApiError::from_reqwest)?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GoogleApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let text = resp.text().await.map_err(GoogleApiError::from_reqwest)?;
    debug!(bytes = text.len(), "Google API response received");
    serde_json::from_str(&text).map_err(|e| GoogleApiError::Decode(e.to_string()))
}
