//! Port abstraction for verification-token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EmailAddress, TokenValue, VerificationToken};

/// Persistence errors raised by token store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenStoreError {
    /// Query or mutation failed during execution.
    #[error("token store failed: {message}")]
    Backend { message: String },
}

/// Result of an atomic consume attempt.
///
/// `AlreadyUsed` is reported ahead of expiry so a redeemed token keeps
/// failing with the same outcome for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// No token with this value exists.
    Missing,
    /// The token was already redeemed.
    AlreadyUsed,
    /// The validity window elapsed before redemption.
    Expired,
    /// The token was redeemed now; carries the associated email.
    Consumed { email: EmailAddress },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a freshly issued token.
    async fn insert(&self, token: &VerificationToken) -> Result<(), TokenStoreError>;

    /// Atomically check and mark the token consumed.
    ///
    /// The check-not-consumed-then-mark step must execute as a single atomic
    /// operation against the backing store (a conditional update); of two
    /// concurrent redemptions of the same token, exactly one may observe
    /// [`ConsumeOutcome::Consumed`].
    async fn consume(
        &self,
        value: &TokenValue,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, TokenStoreError>;
}
