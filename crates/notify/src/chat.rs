//! Chat messaging platform client.
//!
//! Two calls against a Slack-shaped Web API: resolve an email to the
//! platform's user id, then post a direct message to that id. The API
//! reports most failures as `{ "ok": false, "error": "..." }` with a
//! 200 status, so both calls decode the envelope rather than trusting
//! the status code alone.
//!
//! The identity lookup is an idempotent GET and retries transport
//! failures. The message post is never retried: a timeout after the
//! platform accepted the send would double-message the contact, and
//! there is no dedup layer to absorb that.

use std::time::Duration;

use serde::Deserialize;

/// Retry delays in seconds for the identity lookup.
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single chat API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `error` token the platform uses for an unknown email.
const ERR_USERS_NOT_FOUND: &str = "users_not_found";

/// `error` token the platform uses when throttling.
const ERR_RATELIMITED: &str = "ratelimited";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for chat API failures.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The email has no account on the messaging platform.
    #[error("no messaging account for {email}")]
    IdentityNotFound {
        /// Email the lookup was keyed by.
        email: String,
    },

    /// The platform throttled the call.
    #[error("chat API rate limit hit")]
    RateLimited,

    /// The platform rejected the call with an API-level error token.
    #[error("chat API error: {0}")]
    Api(String),

    /// The platform could not be reached.
    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response does not decode into the expected envelope.
    #[error("chat response is not decodable: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Wire schema
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UserRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    ok: bool,
    #[serde(default)]
    user: Option<UserRef>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// ChatApi
// ---------------------------------------------------------------------------

/// Client for the messaging platform's Web API.
pub struct ChatApi {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
}

impl ChatApi {
    /// Create a client for the given API base URL and bot credential.
    pub fn new(api_url: String, bot_token: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_url,
            bot_token,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, bot_token: String) -> Self {
        Self {
            client,
            api_url,
            bot_token,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), method)
    }

    /// Resolve an email address to the platform's user id.
    pub async fn lookup_user_id(&self, email: &str) -> Result<String, ChatError> {
        let mut last_err: Option<ChatError> = None;

        for delay_secs in RETRY_DELAYS_SECS {
            match self.try_lookup(email).await {
                Ok(id) => return Ok(id),
                Err(e @ (ChatError::Transport(_) | ChatError::RateLimited)) => {
                    tracing::warn!(email, error = %e, "Identity lookup attempt failed, retrying");
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                }
                Err(e) => return Err(e),
            }
        }

        match self.try_lookup(email).await {
            Ok(id) => Ok(id),
            Err(e) => Err(last_err.unwrap_or(e)),
        }
    }

    async fn try_lookup(&self, email: &str) -> Result<String, ChatError> {
        let response = self
            .client
            .get(self.endpoint("users.lookupByEmail"))
            .bearer_auth(&self.bot_token)
            .query(&[("email", email)])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ChatError::RateLimited);
        }
        if !status.is_success() {
            return Err(ChatError::Api(format!("HTTP {}", status.as_u16())));
        }

        let body = response.text().await?;
        let decoded: LookupResponse =
            serde_json::from_str(&body).map_err(|e| ChatError::Parse(e.to_string()))?;

        if !decoded.ok {
            return match decoded.error.as_deref() {
                Some(ERR_USERS_NOT_FOUND) => Err(ChatError::IdentityNotFound {
                    email: email.to_string(),
                }),
                Some(ERR_RATELIMITED) => Err(ChatError::RateLimited),
                Some(other) => Err(ChatError::Api(other.to_string())),
                None => Err(ChatError::Api("unspecified error".to_string())),
            };
        }

        decoded
            .user
            .map(|user| user.id)
            .ok_or_else(|| ChatError::Parse("ok response without user object".to_string()))
    }

    /// Post a direct message to a user id. Exactly one attempt.
    pub async fn post_message(&self, user_id: &str, text: &str) -> Result<(), ChatError> {
        let body = serde_json::json!({
            "channel": user_id,
            "text": text,
        });

        let response = self
            .client
            .post(self.endpoint("chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ChatError::RateLimited);
        }
        if !status.is_success() {
            return Err(ChatError::Api(format!("HTTP {}", status.as_u16())));
        }

        let raw = response.text().await?;
        let decoded: PostResponse =
            serde_json::from_str(&raw).map_err(|e| ChatError::Parse(e.to_string()))?;

        if !decoded.ok {
            return match decoded.error.as_deref() {
                Some(ERR_RATELIMITED) => Err(ChatError::RateLimited),
                Some(other) => Err(ChatError::Api(other.to_string())),
                None => Err(ChatError::Api("unspecified error".to_string())),
            };
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let api = ChatApi::new("https://slack.example.com/api/".to_string(), "tok".to_string());
        assert_eq!(
            api.endpoint("chat.postMessage"),
            "https://slack.example.com/api/chat.postMessage"
        );
    }

    #[test]
    fn lookup_envelope_parses_user_id() {
        let decoded: LookupResponse =
            serde_json::from_str(r#"{ "ok": true, "user": { "id": "U0123" } }"#).unwrap();
        assert!(decoded.ok);
        assert_eq!(decoded.user.unwrap().id, "U0123");
    }

    #[test]
    fn lookup_envelope_parses_error_token() {
        let decoded: LookupResponse =
            serde_json::from_str(r#"{ "ok": false, "error": "users_not_found" }"#).unwrap();
        assert!(!decoded.ok);
        assert_eq!(decoded.error.as_deref(), Some(ERR_USERS_NOT_FOUND));
    }

    #[test]
    fn post_envelope_parses_both_shapes() {
        let ok: PostResponse = serde_json::from_str(r#"{ "ok": true }"#).unwrap();
        assert!(ok.ok);

        let throttled: PostResponse =
            serde_json::from_str(r#"{ "ok": false, "error": "ratelimited" }"#).unwrap();
        assert_eq!(throttled.error.as_deref(), Some(ERR_RATELIMITED));
    }

    #[test]
    fn error_displays_are_diagnosable() {
        assert_matches!(
            ChatError::IdentityNotFound { email: "a@b.c".to_string() }.to_string().as_str(),
            "no messaging account for a@b.c"
        );
        assert_eq!(
            ChatError::Api("channel_not_found".to_string()).to_string(),
            "chat API error: channel_not_found"
        );
    }
}
