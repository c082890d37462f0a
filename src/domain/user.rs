//! User identity model.
//!
//! Users are created on first successful authentication (magic-link
//! redemption or an OAuth callback) and never deleted by this core. The
//! [`Identity`] enum is the output of identity resolution: every inbound
//! request resolves to either a known user or [`Identity::Anonymous`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validation failures raised by [`EmailAddress::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailValidationError {
    #[error("email address must not be empty")]
    Empty,
    #[error("email address must contain a local part and a domain")]
    MissingParts,
}

/// Validated, normalised email address.
///
/// Addresses are trimmed and lowercased on construction so lookups by email
/// are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "renter@example.com")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmailValidationError> {
        let normalised = raw.as_ref().trim().to_ascii_lowercase();
        if normalised.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        match normalised.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
                Ok(Self(normalised))
            }
            _ => Err(EmailValidationError::MissingParts),
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    email: EmailAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl User {
    /// Build a user from validated components.
    pub fn new(id: UserId, email: EmailAddress, name: Option<String>) -> Self {
        Self { id, email, name }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// The user's unique email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Optional display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Outcome of resolving an inbound request credential.
///
/// Resolution is side-effect-free and never fails: a missing or invalid
/// credential resolves to [`Identity::Anonymous`] so unauthenticated reads
/// (listing views, owner lookups) proceed without forcing authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No valid session credential accompanied the request.
    Anonymous,
    /// A validated session bound the request to this user.
    User(UserId),
}

impl Identity {
    /// The resolved user id, if authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(id),
        }
    }

    /// Whether the request carried no valid credential.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}
