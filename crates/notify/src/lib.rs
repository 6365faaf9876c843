//! Reminder delivery.
//!
//! Renders the human-readable reminder and delivers it to the resolved
//! contact's messaging identity. The directory hands back an email; the
//! messaging platform keys sends by its own user id, so delivery starts
//! with an explicit email-to-user-id lookup rather than assuming the two
//! namespaces match. When the lookup finds no account and SMTP fallback
//! is configured, the same reminder goes out as a plain-text email.
//!
//! There is no in-run or cross-run deduplication here: the pipeline is
//! stateless, so two identical runs deliver two identical reminders.
//! Callers that need once-per-interval semantics must bolt an external
//! TTL store onto this boundary.
//!
//! - [`Notifier`] — the seam the orchestrator depends on.
//! - [`ReminderNotifier`] — chat delivery with optional email fallback.
//! - [`render_reminder`] — pure message rendering.

pub mod chat;
pub mod email;
pub mod message;

use async_trait::async_trait;
use stalewatch_core::NotificationEvent;

use crate::chat::{ChatApi, ChatError};
use crate::email::{EmailDelivery, EmailError};

pub use chat::ChatApi as Chat;
pub use email::{EmailConfig, EmailDelivery as Email};
pub use message::render_reminder;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for reminder delivery failures. All variants are scoped to
/// one contact and never abort the remaining hosts.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The contact's email has no account on the messaging platform and
    /// no fallback channel was available.
    #[error("no messaging identity for {email}")]
    IdentityNotFound {
        /// Email the lookup was keyed by.
        email: String,
    },

    /// The messaging platform throttled the send.
    #[error("messaging platform rate-limited the send")]
    RateLimited,

    /// The send (or the fallback email) was rejected or failed.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The messaging platform could not be reached.
    #[error("messaging request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<ChatError> for NotifyError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::IdentityNotFound { email } => Self::IdentityNotFound { email },
            ChatError::RateLimited => Self::RateLimited,
            ChatError::Api(detail) => Self::Delivery(detail),
            ChatError::Transport(e) => Self::Transport(e),
            ChatError::Parse(detail) => Self::Delivery(detail),
        }
    }
}

impl From<EmailError> for NotifyError {
    fn from(err: EmailError) -> Self {
        Self::Delivery(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Delivers one reminder to one contact.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the event's message body to its contact.
    async fn deliver(&self, event: &NotificationEvent) -> Result<(), NotifyError>;
}

// ---------------------------------------------------------------------------
// ReminderNotifier
// ---------------------------------------------------------------------------

/// Production notifier: chat first, optional email fallback.
pub struct ReminderNotifier {
    chat: ChatApi,
    email_fallback: Option<EmailDelivery>,
}

impl ReminderNotifier {
    /// Create a notifier that only delivers over chat.
    pub fn new(chat: ChatApi) -> Self {
        Self {
            chat,
            email_fallback: None,
        }
    }

    /// Attach an SMTP fallback used when a contact has no chat identity.
    pub fn with_email_fallback(mut self, email: EmailDelivery) -> Self {
        self.email_fallback = Some(email);
        self
    }
}

#[async_trait]
impl Notifier for ReminderNotifier {
    async fn deliver(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        match self.chat.lookup_user_id(&event.contact.email).await {
            Ok(user_id) => {
                self.chat.post_message(&user_id, &event.message_body).await?;
                tracing::info!(
                    hardware_serial = %event.hardware_serial,
                    user_id = %user_id,
                    "Reminder delivered over chat"
                );
                Ok(())
            }
            Err(ChatError::IdentityNotFound { email }) => match &self.email_fallback {
                Some(mailer) => {
                    mailer.deliver(&email, event).await?;
                    tracing::info!(
                        hardware_serial = %event.hardware_serial,
                        to = %email,
                        "No chat identity, reminder delivered over email"
                    );
                    Ok(())
                }
                None => Err(NotifyError::IdentityNotFound { email }),
            },
            Err(other) => Err(other.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
