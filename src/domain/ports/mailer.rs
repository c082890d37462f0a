//! Port abstraction for outbound email delivery.

use async_trait::async_trait;

use crate::domain::EmailAddress;

/// Delivery errors raised by mailer adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailerError {
    /// The message could not be handed to the transport.
    #[error("mail delivery failed: {message}")]
    Send { message: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a sign-in link for a freshly issued magic-link token.
    async fn send_sign_in_link(
        &self,
        to: &EmailAddress,
        sign_in_url: &str,
    ) -> Result<(), MailerError>;

    /// Deliver the one-off welcome message after first authentication.
    async fn send_welcome(&self, to: &EmailAddress) -> Result<(), MailerError>;
}
