//! Port abstraction for listing persistence adapters.
//!
//! The repository is assumed to serialise conflicting writes to the same
//! listing id; last-write-wins is acceptable for partial updates.

use async_trait::async_trait;

use crate::domain::{Listing, ListingId, UserId};

/// Persistence errors raised by listing repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingRepositoryError {
    /// Query or mutation failed during execution.
    #[error("listing repository failed: {message}")]
    Backend { message: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Persist a newly created listing.
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError>;

    /// Fetch a listing by identifier.
    async fn find_by_id(&self, id: &ListingId)
    -> Result<Option<Listing>, ListingRepositoryError>;

    /// Replace a listing record after a merge.
    async fn update(&self, listing: &Listing) -> Result<(), ListingRepositoryError>;

    /// Delete a listing, returning the removed record when it existed.
    async fn delete(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Whether `id` exists and is owned by `owner`.
    ///
    /// A missing listing reports `false`, indistinguishable from "not owned",
    /// so the authorisation gate cannot leak existence.
    async fn owned_by(
        &self,
        owner: &UserId,
        id: &ListingId,
    ) -> Result<bool, ListingRepositoryError>;
}
