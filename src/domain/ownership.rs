//! Ownership authorisation gate applied before every listing mutation.

use std::sync::Arc;

use crate::domain::ports::{ListingRepository, ListingRepositoryError};
use crate::domain::{Error, Identity, ListingId, UserId};

/// Pure authorisation check: no side effects, uniform denial.
///
/// Anonymous callers, callers who do not own the listing, and callers naming
/// a listing that does not exist all receive the same unauthorised outcome.
/// Treating "missing" identically to "not owned" prevents enumeration of
/// listing ids by probing response codes.
#[derive(Clone)]
pub struct OwnershipGate {
    listings: Arc<dyn ListingRepository>,
}

impl OwnershipGate {
    /// Build a gate over the listing repository.
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    /// The uniform outward denial.
    pub fn denial() -> Error {
        Error::unauthorized("Unauthorized")
    }

    /// Allow the mutation and yield the acting user id, or deny uniformly.
    pub async fn authorize(
        &self,
        identity: &Identity,
        listing_id: &ListingId,
    ) -> Result<UserId, Error> {
        let user_id = identity.user_id().ok_or_else(Self::denial)?;
        let owned = self
            .listings
            .owned_by(user_id, listing_id)
            .await
            .map_err(map_repository_error)?;
        if owned {
            Ok(*user_id)
        } else {
            Err(Self::denial())
        }
    }
}

pub(crate) fn map_repository_error(error: ListingRepositoryError) -> Error {
    tracing::error!(error = %error, "listing repository failure");
    Error::internal("Something went wrong")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockListingRepository;

    fn gate(repo: MockListingRepository) -> OwnershipGate {
        OwnershipGate::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn anonymous_callers_are_denied_without_touching_the_repository() {
        let mut repo = MockListingRepository::new();
        repo.expect_owned_by().times(0);

        let err = gate(repo)
            .authorize(&Identity::Anonymous, &ListingId::random())
            .await
            .expect_err("denied");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn owners_are_allowed() {
        let user = UserId::random();
        let mut repo = MockListingRepository::new();
        repo.expect_owned_by().times(1).return_once(|_, _| Ok(true));

        let allowed = gate(repo)
            .authorize(&Identity::User(user), &ListingId::random())
            .await
            .expect("allowed");
        assert_eq!(allowed, user);
    }

    #[tokio::test]
    async fn missing_and_unowned_listings_are_indistinguishable() {
        let mut repo = MockListingRepository::new();
        repo.expect_owned_by()
            .times(2)
            .returning(|_, _| Ok(false));

        let gate = gate(repo);
        let unowned = gate
            .authorize(&Identity::User(UserId::random()), &ListingId::random())
            .await
            .expect_err("denied");
        let missing = gate
            .authorize(&Identity::User(UserId::random()), &ListingId::random())
            .await
            .expect_err("denied");
        assert_eq!(unowned, missing);
        assert_eq!(unowned.code(), ErrorCode::Unauthorized);
    }
}
