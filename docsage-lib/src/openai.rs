//! Shared HTTP transport for OpenAI-compatible APIs.
//!
//! Errors are plain messages; each capability wraps them in its own
//! [`crate::Error`] variant.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

pub(crate) struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub(crate) fn new(
        base_url: &str,
        api_key: String,
        timeout_secs: u64,
    ) -> std::result::Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| format!("cannot build HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// POST `body` to `{base_url}{path}` and decode a JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<T, String> {
        if self.api_key.is_empty() {
            return Err("API key is not configured".to_string());
        }

        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    format!("request to {url} timed out")
                } else {
                    format!("request to {url} failed: {e}")
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("failed to read response body: {e}"))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .and_then(|d| d.message)
                .unwrap_or(text);
            return Err(match status.as_u16() {
                429 => format!("rate limited: {message}"),
                code => format!("HTTP {code}: {message}"),
            });
        }

        serde_json::from_str(&text).map_err(|e| format!("malformed response: {e}"))
    }
}
