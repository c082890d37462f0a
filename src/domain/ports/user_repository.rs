//! Port abstraction for user persistence adapters.

use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Query or mutation failed during execution.
    #[error("user repository failed: {message}")]
    Backend { message: String },
    /// Insert hit the unique-email constraint.
    ///
    /// Callers racing to provision the same address should re-read by email
    /// and adopt the winner's record.
    #[error("a user with this email already exists")]
    DuplicateEmail,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a freshly provisioned user.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by their unique email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;
}
