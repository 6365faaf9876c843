//! HTTP implementation of the device directory adapter.

use std::time::Duration;

use async_trait::async_trait;
use stalewatch_core::Contact;

use crate::schema::{DeviceResponse, TokenResponse};
use crate::{DeviceDirectory, DirectoryToken};

/// Retry delays in seconds for device lookups (exponential backoff).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single directory call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Token acquisition failed. Any failure during the auth step lands
    /// here because a run without a token cannot resolve any contact;
    /// callers abort the whole run.
    #[error("directory auth failed: {0}")]
    Auth(String),

    /// A device lookup could not reach the directory.
    #[error("directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The directory answered a lookup with an unexpected status.
    #[error("directory returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The device exists but has nobody assigned, or the directory does
    /// not know the serial at all.
    #[error("no contact on record for serial {hardware_serial}")]
    ContactNotFound {
        /// Serial the lookup was keyed by.
        hardware_serial: String,
    },

    /// A lookup response does not decode into the device schema.
    #[error("directory response is not decodable: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// HttpDeviceDirectory
// ---------------------------------------------------------------------------

/// Talks to the device-management directory's token and device endpoints.
pub struct HttpDeviceDirectory {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpDeviceDirectory {
    /// Create an adapter for one directory instance.
    ///
    /// * `base_url` - directory base URL, e.g. `https://mdm.example.com`.
    /// * `api_key`  - long-lived service credential exchanged for
    ///                run-scoped bearer tokens.
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Create an adapter reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn token_url(&self) -> String {
        format!("{}/auth/token", self.base_url.trim_end_matches('/'))
    }

    fn device_url(&self, hardware_serial: &str) -> String {
        format!(
            "{}/api/v1/devices/{}",
            self.base_url.trim_end_matches('/'),
            hardware_serial
        )
    }

    /// Execute a single device lookup.
    async fn try_lookup(
        &self,
        token: &DirectoryToken,
        hardware_serial: &str,
    ) -> Result<Contact, DirectoryError> {
        let response = self
            .client
            .get(self.device_url(hardware_serial))
            .bearer_auth(token.secret())
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(DirectoryError::ContactNotFound {
                hardware_serial: hardware_serial.to_string(),
            });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let decoded: DeviceResponse =
            serde_json::from_str(&body).map_err(|e| DirectoryError::Parse(e.to_string()))?;

        let email = decoded
            .device
            .assigned_user
            .map(|user| user.email)
            .filter(|email| !email.trim().is_empty());

        match email {
            Some(email) => Ok(Contact {
                email,
                hardware_serial: hardware_serial.to_string(),
            }),
            None => Err(DirectoryError::ContactNotFound {
                hardware_serial: hardware_serial.to_string(),
            }),
        }
    }
}

/// Whether a lookup error is worth another attempt. Semantic outcomes
/// (contact missing, parse failure) never are.
fn is_transient(err: &DirectoryError) -> bool {
    match err {
        DirectoryError::Transport(_) => true,
        DirectoryError::Status { status, .. } => *status >= 500,
        _ => false,
    }
}

#[async_trait]
impl DeviceDirectory for HttpDeviceDirectory {
    async fn acquire_token(&self) -> Result<DirectoryToken, DirectoryError> {
        let body = serde_json::json!({ "api_key": self.api_key });

        let response = self
            .client
            .post(self.token_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| DirectoryError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Auth(format!(
                "token endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let decoded: TokenResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Auth(format!("token response not decodable: {e}")))?;

        tracing::debug!(expires_in = ?decoded.expires_in, "Directory token acquired");
        Ok(DirectoryToken::new(decoded.access_token))
    }

    async fn resolve_contact(
        &self,
        token: &DirectoryToken,
        hardware_serial: &str,
    ) -> Result<Contact, DirectoryError> {
        let mut last_err: Option<DirectoryError> = None;

        for delay_secs in RETRY_DELAYS_SECS {
            match self.try_lookup(token, hardware_serial).await {
                Ok(contact) => return Ok(contact),
                Err(e) if is_transient(&e) => {
                    tracing::warn!(
                        hardware_serial,
                        error = %e,
                        "Directory lookup attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                }
                Err(e) => return Err(e),
            }
        }

        match self.try_lookup(token, hardware_serial).await {
            Ok(contact) => Ok(contact),
            Err(e) => {
                tracing::error!(
                    hardware_serial,
                    error = %e,
                    "Directory lookup failed after all retries"
                );
                Err(last_err.unwrap_or(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slash() {
        let dir = HttpDeviceDirectory::new(
            "https://mdm.example.com/".to_string(),
            "key".to_string(),
        );
        assert_eq!(dir.token_url(), "https://mdm.example.com/auth/token");
        assert_eq!(
            dir.device_url("C02A"),
            "https://mdm.example.com/api/v1/devices/C02A"
        );
    }

    #[test]
    fn contact_not_found_display_names_the_serial() {
        let err = DirectoryError::ContactNotFound {
            hardware_serial: "C02A".to_string(),
        };
        assert_eq!(err.to_string(), "no contact on record for serial C02A");
    }

    #[test]
    fn semantic_errors_are_not_transient() {
        assert!(!is_transient(&DirectoryError::ContactNotFound {
            hardware_serial: "X".to_string(),
        }));
        assert!(!is_transient(&DirectoryError::Parse("bad".to_string())));
        assert!(!is_transient(&DirectoryError::Auth("nope".to_string())));
        assert!(is_transient(&DirectoryError::Status {
            status: 502,
            body: String::new(),
        }));
    }
}
