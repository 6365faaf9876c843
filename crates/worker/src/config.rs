//! Worker configuration, loaded from environment variables.
//!
//! Credentials and endpoints are never hardcoded; everything comes from
//! the environment (optionally via a `.env` file in development). The
//! optional SMTP fallback has its own loader in
//! [`stalewatch_notify::EmailConfig`].

use std::time::Duration;

/// Default messaging platform API base.
const DEFAULT_CHAT_API_URL: &str = "https://slack.com/api";

/// Default bound on concurrent per-host resolution/notification.
const DEFAULT_MAX_CONCURRENT_HOSTS: usize = 8;

/// Default whole-run wall-clock budget in seconds.
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// A variable is set but does not parse.
    #[error("environment variable {name} is invalid: {detail}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// What failed to parse.
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// WorkerConfig
// ---------------------------------------------------------------------------

/// Everything the worker needs for one pass.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Version feed endpoints, one JSON document per platform.
    pub feed_urls: Vec<String>,
    /// Inventory backend base URL.
    pub inventory_url: String,
    /// Inventory bearer credential.
    pub inventory_token: String,
    /// Saved-query identifier on the inventory backend.
    pub inventory_query_id: String,
    /// Directory service base URL.
    pub directory_url: String,
    /// Directory service credential exchanged for run-scoped tokens.
    pub directory_api_key: String,
    /// Messaging platform API base URL.
    pub chat_api_url: String,
    /// Messaging platform bot credential.
    pub chat_bot_token: String,
    /// Bound on concurrent per-host processing.
    pub max_concurrent_hosts: usize,
    /// Whole-run wall-clock budget.
    pub run_timeout: Duration,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable               | Required | Default                 |
    /// |------------------------|----------|-------------------------|
    /// | `VERSION_FEED_URLS`    | yes      | — (comma-separated)     |
    /// | `INVENTORY_URL`        | yes      | —                       |
    /// | `INVENTORY_TOKEN`      | yes      | —                       |
    /// | `INVENTORY_QUERY_ID`   | yes      | —                       |
    /// | `DIRECTORY_URL`        | yes      | —                       |
    /// | `DIRECTORY_API_KEY`    | yes      | —                       |
    /// | `CHAT_API_URL`         | no       | `https://slack.com/api` |
    /// | `CHAT_BOT_TOKEN`       | yes      | —                       |
    /// | `MAX_CONCURRENT_HOSTS` | no       | `8`                     |
    /// | `RUN_TIMEOUT_SECS`     | no       | `300`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let feed_urls: Vec<String> = required("VERSION_FEED_URLS")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if feed_urls.is_empty() {
            return Err(ConfigError::InvalidVar {
                name: "VERSION_FEED_URLS",
                detail: "no feed URLs after splitting on commas".to_string(),
            });
        }

        let max_concurrent_hosts = parse_or("MAX_CONCURRENT_HOSTS", DEFAULT_MAX_CONCURRENT_HOSTS)?;
        if max_concurrent_hosts == 0 {
            return Err(ConfigError::InvalidVar {
                name: "MAX_CONCURRENT_HOSTS",
                detail: "must be at least 1".to_string(),
            });
        }

        let run_timeout_secs: u64 = parse_or("RUN_TIMEOUT_SECS", DEFAULT_RUN_TIMEOUT_SECS)?;

        Ok(Self {
            feed_urls,
            inventory_url: required("INVENTORY_URL")?,
            inventory_token: required("INVENTORY_TOKEN")?,
            inventory_query_id: required("INVENTORY_QUERY_ID")?,
            directory_url: required("DIRECTORY_URL")?,
            directory_api_key: required("DIRECTORY_API_KEY")?,
            chat_api_url: std::env::var("CHAT_API_URL")
                .unwrap_or_else(|_| DEFAULT_CHAT_API_URL.to_string()),
            chat_bot_token: required("CHAT_BOT_TOKEN")?,
            max_concurrent_hosts,
            run_timeout: Duration::from_secs(run_timeout_secs),
        })
    }
}

/// Read a required variable, rejecting empty values.
fn required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Read an optional variable with a parsed default.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            name,
            detail: e.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests share process state; each test uses its own variable
    // names via the helpers only where that is safe.

    #[test]
    fn missing_required_var_is_reported_by_name() {
        std::env::remove_var("INVENTORY_URL");
        let err = required("INVENTORY_URL").unwrap_err();
        assert_eq!(
            err.to_string(),
            "required environment variable INVENTORY_URL is not set"
        );
    }

    #[test]
    fn empty_required_var_counts_as_missing() {
        std::env::set_var("DIRECTORY_API_KEY", "   ");
        assert!(required("DIRECTORY_API_KEY").is_err());
        std::env::remove_var("DIRECTORY_API_KEY");
    }

    #[test]
    fn parse_or_uses_default_when_unset() {
        std::env::remove_var("RUN_TIMEOUT_SECS");
        let value: u64 = parse_or("RUN_TIMEOUT_SECS", 300).unwrap();
        assert_eq!(value, 300);
    }

    #[test]
    fn parse_or_rejects_garbage() {
        std::env::set_var("MAX_CONCURRENT_HOSTS", "several");
        let result: Result<usize, _> = parse_or("MAX_CONCURRENT_HOSTS", 8);
        assert!(result.is_err());
        std::env::remove_var("MAX_CONCURRENT_HOSTS");
    }
}
