//! HTTP implementation of the version feed adapter.
//!
//! Fetches every configured feed URL with a per-request timeout and a
//! short exponential-backoff retry on transport-level failures, then
//! merges the validated documents into one [`LatestVersionSet`].

use std::time::Duration;

use async_trait::async_trait;
use stalewatch_core::LatestVersionSet;

use crate::schema::FeedDocument;
use crate::VersionFeed;

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single feed fetch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for version feed failures.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The feed endpoint could not be reached (network, DNS, timeout).
    #[error("feed request failed: {0}")]
    Unavailable(#[from] reqwest::Error),

    /// The feed endpoint answered with a non-success status.
    #[error("feed {url} returned HTTP {status}")]
    Status {
        /// Endpoint that answered.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body does not decode into the expected schema.
    #[error("feed {url} returned an invalid document: {detail}")]
    Parse {
        /// Endpoint that answered.
        url: String,
        /// What failed to validate.
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// HttpVersionFeed
// ---------------------------------------------------------------------------

/// Fetches latest-version documents from configured feed endpoints.
pub struct HttpVersionFeed {
    client: reqwest::Client,
    feed_urls: Vec<String>,
}

impl HttpVersionFeed {
    /// Create an adapter for the given feed endpoints.
    pub fn new(feed_urls: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, feed_urls }
    }

    /// Create an adapter reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across adapters).
    pub fn with_client(client: reqwest::Client, feed_urls: Vec<String>) -> Self {
        Self { client, feed_urls }
    }

    /// Fetch one feed document, retrying transport failures and 5xx
    /// answers with backoff. Parse failures are never retried; the
    /// upstream will not change shape between attempts.
    async fn fetch_document(&self, url: &str) -> Result<FeedDocument, FeedError> {
        let mut last_err: Option<FeedError> = None;

        for delay_secs in RETRY_DELAYS_SECS {
            match self.try_fetch(url).await {
                Ok(doc) => return Ok(doc),
                Err(e) if is_transient(&e) => {
                    tracing::warn!(url, error = %e, "Feed fetch attempt failed, retrying");
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                }
                Err(e) => return Err(e),
            }
        }

        match self.try_fetch(url).await {
            Ok(doc) => Ok(doc),
            Err(e) => {
                tracing::error!(url, error = %e, "Feed fetch failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }

    /// Execute a single GET and validate the body.
    async fn try_fetch(&self, url: &str) -> Result<FeedDocument, FeedError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FeedError::Parse {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }
}

/// Whether an error class is worth another attempt.
fn is_transient(err: &FeedError) -> bool {
    match err {
        FeedError::Unavailable(_) => true,
        FeedError::Status { status, .. } => *status >= 500,
        FeedError::Parse { .. } => false,
    }
}

#[async_trait]
impl VersionFeed for HttpVersionFeed {
    async fn fetch_latest(&self) -> Result<LatestVersionSet, FeedError> {
        let mut latest = LatestVersionSet::new();

        for url in &self.feed_urls {
            let document = self.fetch_document(url).await?;
            let (platform, versions) =
                document.into_entries().map_err(|detail| FeedError::Parse {
                    url: url.clone(),
                    detail,
                })?;

            tracing::debug!(url = %url, %platform, count = versions.len(), "Feed document accepted");
            for version in versions {
                latest.insert(platform, version);
            }
        }

        tracing::info!(platforms = latest.platform_count(), "Version feeds merged");
        Ok(latest)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_includes_url_and_code() {
        let err = FeedError::Status {
            url: "https://feeds.example.com/macos".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "feed https://feeds.example.com/macos returned HTTP 503"
        );
    }

    #[test]
    fn parse_error_display_includes_detail() {
        let err = FeedError::Parse {
            url: "https://feeds.example.com/macos".to_string(),
            detail: "missing field `tracks`".to_string(),
        };
        assert!(err.to_string().contains("missing field `tracks`"));
    }

    #[test]
    fn server_errors_are_transient_client_errors_are_not() {
        let base = |status| FeedError::Status {
            url: "u".to_string(),
            status,
        };
        assert!(is_transient(&base(500)));
        assert!(is_transient(&base(503)));
        assert!(!is_transient(&base(404)));
        assert!(!is_transient(&FeedError::Parse {
            url: "u".to_string(),
            detail: "d".to_string(),
        }));
    }

    #[test]
    fn new_does_not_panic() {
        let _feed = HttpVersionFeed::new(vec!["https://feeds.example.com/macos".to_string()]);
    }
}
