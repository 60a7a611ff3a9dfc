//! HTTP plumbing shared by the store fetchers.

use crate::model::FetchError;
use anyhow::Result;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// An upstream response folded down to its status and parsed body.
///
/// Non-JSON bodies are kept as `{"raw": <text>}` so callers can treat
/// every response uniformly; a non-success status never becomes an `Err`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub ok: bool,
    pub status: u16,
    pub data: Value,
}

/// Thin JSON GET client with a hard per-request timeout.
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new() -> Result<Self> {
        let client =
            Client::builder().gzip(true).connect_timeout(Duration::from_secs(10)).build()?;

        Ok(Self { client })
    }

    /// Performs a GET, mapping transport failures to `FetchError` and
    /// folding the body into an `ApiResponse`.
    pub async fn get_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<ApiResponse, FetchError> {
        debug!("GET {}", url);

        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(to_fetch_error)?;

        let status = response.status().as_u16();
        let ok = response.status().is_success();
        let text = response.text().await.map_err(to_fetch_error)?;

        let data = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }));

        Ok(ApiResponse { ok, status, data })
    }
}

fn to_fetch_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}

/// Pulls a human-readable failure out of an upstream payload, trying the
/// conventional `message` and `error` fields before the fallback.
pub fn extract_error_message(data: &Value, fallback: &str) -> String {
    for key in ["message", "error"] {
        if let Some(message) = data.get(key).and_then(Value::as_str) {
            if !message.is_empty() {
                return message.to_string();
            }
        }
    }

    fallback.to_string()
}
