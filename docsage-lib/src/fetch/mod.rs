//! Source text retrieval
//!
//! A [`Fetcher`] turns a URL into plain text. [`HttpFetcher`] downloads the
//! page and converts it to text with [`extract_text`].

use std::time::Duration;

use async_trait::async_trait;

use crate::{Error, Result};

/// Trait for source text backends
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return its text content. Empty text is not an error.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP(S).
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("docsage/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Fetch(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("{url}: HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("{url}: failed to read body: {e}")))?;

        tracing::debug!(url, bytes = body.len(), "fetched page");
        extract_text(&body)
    }
}

mod html;

pub use html::*;
