//! HTTP implementation of the fleet inventory adapter.
//!
//! Performs one bearer-authenticated report fetch against the remote
//! query backend's saved-query endpoint per run, with the same bounded
//! transport retry as the other read-only adapters.

use std::time::Duration;

use async_trait::async_trait;

use crate::schema::ReportDocument;
use crate::{FleetInventory, InventorySnapshot};

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single report fetch. Reports for a large
/// fleet are bigger than feed documents, so this is more generous.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for inventory fetch failures.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// The backend could not be reached (network, DNS, timeout).
    #[error("inventory request failed: {0}")]
    Unavailable(#[from] reqwest::Error),

    /// The backend answered with a non-success status (including auth
    /// rejections, which surface as 401/403 here).
    #[error("inventory backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body does not decode into the report schema.
    #[error("inventory report is not decodable: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// HttpFleetInventory
// ---------------------------------------------------------------------------

/// Fetches host reports from the remote query backend.
pub struct HttpFleetInventory {
    client: reqwest::Client,
    base_url: String,
    token: String,
    query_id: String,
}

impl HttpFleetInventory {
    /// Create an adapter for one backend and saved query.
    ///
    /// * `base_url` - backend base URL, e.g. `https://fleet.example.com`.
    /// * `token`    - bearer credential for the report endpoint.
    /// * `query_id` - identifier of the saved query that reports
    ///                serial/platform/version tuples.
    pub fn new(base_url: String, token: String, query_id: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url,
            token,
            query_id,
        }
    }

    /// Create an adapter reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        token: String,
        query_id: String,
    ) -> Self {
        Self {
            client,
            base_url,
            token,
            query_id,
        }
    }

    fn report_url(&self) -> String {
        format!(
            "{}/api/v1/queries/{}/report",
            self.base_url.trim_end_matches('/'),
            self.query_id
        )
    }

    /// Execute a single report GET and decode the body.
    async fn try_fetch(&self) -> Result<ReportDocument, InventoryError> {
        let response = self
            .client
            .get(self.report_url())
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(InventoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| InventoryError::Parse(e.to_string()))
    }
}

/// Whether an error class is worth another attempt.
fn is_transient(err: &InventoryError) -> bool {
    match err {
        InventoryError::Unavailable(_) => true,
        InventoryError::Status { status, .. } => *status >= 500,
        InventoryError::Parse(_) => false,
    }
}

#[async_trait]
impl FleetInventory for HttpFleetInventory {
    async fn fetch_hosts(&self) -> Result<InventorySnapshot, InventoryError> {
        let mut last_err: Option<InventoryError> = None;

        for delay_secs in RETRY_DELAYS_SECS {
            match self.try_fetch().await {
                Ok(doc) => return Ok(finish(doc)),
                Err(e) if is_transient(&e) => {
                    tracing::warn!(error = %e, "Inventory fetch attempt failed, retrying");
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                }
                Err(e) => return Err(e),
            }
        }

        match self.try_fetch().await {
            Ok(doc) => Ok(finish(doc)),
            Err(e) => {
                tracing::error!(error = %e, "Inventory fetch failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }
}

/// Convert a decoded report and log the outcome.
fn finish(doc: ReportDocument) -> InventorySnapshot {
    let snapshot = doc.into_snapshot();
    tracing::info!(
        hosts = snapshot.hosts.len(),
        skipped_rows = snapshot.skipped_rows,
        "Inventory report fetched"
    );
    snapshot
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_url_joins_without_double_slash() {
        let inv = HttpFleetInventory::new(
            "https://fleet.example.com/".to_string(),
            "tok".to_string(),
            "os-versions".to_string(),
        );
        assert_eq!(
            inv.report_url(),
            "https://fleet.example.com/api/v1/queries/os-versions/report"
        );
    }

    #[test]
    fn status_error_display_includes_body() {
        let err = InventoryError::Status {
            status: 401,
            body: "bad token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "inventory backend returned HTTP 401: bad token"
        );
    }

    #[test]
    fn auth_rejection_is_not_transient() {
        let err = InventoryError::Status {
            status: 403,
            body: String::new(),
        };
        assert!(!is_transient(&err));
        assert!(is_transient(&InventoryError::Status {
            status: 502,
            body: String::new(),
        }));
    }
}
