//! Single-use email verification tokens backing the magic-link flow.
//!
//! A token binds an opaque random value to an email address for a fixed
//! validity window. Redemption is at most once; the consume step itself is
//! the responsibility of the [`TokenStore`](crate::domain::ports::TokenStore)
//! adapter so it can be made atomic against the backing store.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::EmailAddress;

/// Validity window for a freshly issued magic link.
pub fn magic_link_ttl() -> Duration {
    Duration::minutes(10)
}

/// Opaque single-use token value embedded in the sign-in URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenValue(String);

impl TokenValue {
    /// Generate a fresh random value.
    pub fn random() -> Self {
        Self(nanoid::nanoid!(32))
    }

    /// Wrap a value received back from a sign-in URL.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for TokenValue {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Persisted verification token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationToken {
    value: TokenValue,
    email: EmailAddress,
    issued_at: DateTime<Utc>,
    consumed: bool,
}

impl VerificationToken {
    /// Issue a new token for `email` at `now`.
    ///
    /// Each issuance is independent: outstanding tokens for the same email
    /// remain valid until they expire or are consumed.
    pub fn issue(email: EmailAddress, now: DateTime<Utc>) -> Self {
        Self {
            value: TokenValue::random(),
            email,
            issued_at: now,
            consumed: false,
        }
    }

    /// The opaque token value.
    pub fn value(&self) -> &TokenValue {
        &self.value
    }

    /// Email address the token was issued for.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Issuance timestamp.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Instant after which redemption must fail.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + magic_link_ttl()
    }

    /// Whether the validity window has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    /// Whether the token has already been redeemed.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Flag the token as redeemed.
    pub fn mark_consumed(&mut self) {
        self.consumed = true;
    }
}
