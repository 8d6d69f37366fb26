//! Upstream feed fetcher.

use reqwest::Client;

use crate::error::ExrateError;
use crate::feed;
use crate::models::RateSheet;

/// HTTP client bound to one upstream feed URL.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    /// Create a client with default `reqwest` settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Upstream URL this client fetches from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the feed and return the body as text.
    ///
    /// The HTTP status is not checked: a non-2xx response is returned as-is
    /// and left for the parser to accept or reject.
    ///
    /// # Errors
    ///
    /// [`ExrateError::Network`] when the request or body read fails.
    pub async fn fetch_text(&self) -> Result<String, ExrateError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, %status, "Upstream returned non-success status");
        }

        let body = response.text().await?;
        tracing::debug!(url = %self.url, %status, bytes = body.len(), "Fetched upstream feed");
        Ok(body)
    }

    /// Fetch and parse the feed in one step.
    pub async fn fetch_rate_sheet(&self) -> Result<RateSheet, ExrateError> {
        let body = self.fetch_text().await?;
        feed::parse_rate_sheet(&body)
    }
}
