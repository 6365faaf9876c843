//! Device directory adapter (identity resolver).
//!
//! Maps a hardware serial to the responsible person's email via the
//! device-management directory. Resolution is a two-step protocol:
//!
//! 1. Acquire a short-lived bearer token with the configured service
//!    credential. The token is re-acquired every run and shared
//!    read-only across concurrent lookups; it is never cached across
//!    runs, since lifetime and expiry are the directory's concern.
//! 2. Look the device up by serial and extract the assigned user's
//!    email address.
//!
//! - [`DeviceDirectory`] — the seam the orchestrator depends on.
//! - [`HttpDeviceDirectory`] — reqwest-backed implementation.
//! - [`DirectoryError`] — auth (run-fatal) vs. per-host taxonomy.

pub mod client;
pub mod schema;

use async_trait::async_trait;
use stalewatch_core::Contact;

pub use client::{DirectoryError, HttpDeviceDirectory};
pub use schema::{AssignedUser, DeviceRecord, DeviceResponse, TokenResponse};

/// Short-lived credential for directory lookups.
///
/// Valid for the current run only. The `Debug` impl redacts the secret
/// so tokens cannot leak through error logs.
#[derive(Clone)]
pub struct DirectoryToken {
    access_token: String,
}

impl DirectoryToken {
    /// Wrap a bearer secret obtained from the token endpoint.
    pub fn new(access_token: String) -> Self {
        Self { access_token }
    }

    /// The raw bearer value, for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for DirectoryToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryToken").field("access_token", &"<redacted>").finish()
    }
}

/// Resolves hosts to responsible people.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Acquire the run-scoped bearer token. A failure here is a
    /// configuration or credential problem and aborts the whole run,
    /// since no contact can be resolved without it.
    async fn acquire_token(&self) -> Result<DirectoryToken, DirectoryError>;

    /// Resolve the contact assigned to `hardware_serial`.
    ///
    /// [`DirectoryError::ContactNotFound`] signals a directory
    /// data-hygiene gap for this one device; callers skip the host with
    /// a diagnostic and keep processing others.
    async fn resolve_contact(
        &self,
        token: &DirectoryToken,
        hardware_serial: &str,
    ) -> Result<Contact, DirectoryError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_debug_redacts_secret() {
        let token = DirectoryToken::new("very-secret-bearer".to_string());
        let debug = format!("{token:?}");
        assert!(!debug.contains("very-secret-bearer"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn token_secret_roundtrips() {
        let token = DirectoryToken::new("abc123".to_string());
        assert_eq!(token.secret(), "abc123");
    }
}
