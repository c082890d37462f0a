//! Listing lifecycle orchestration: create, update, delete, owner lookup.
//!
//! Every mutation passes the ownership gate before it reaches the
//! repository. Deletion commits the record removal first and then cleans up
//! the stored image best-effort; a storage failure at that point is logged
//! and never rolls back the committed deletion.

use std::sync::Arc;

use crate::domain::ownership::{OwnershipGate, map_repository_error};
use crate::domain::ports::{
    ListingRepository, MediaStore, UserRepository, UserRepositoryError,
};
use crate::domain::upload_service::ImageUploader;
use crate::domain::{Error, Identity, Listing, ListingDraft, ListingId, ListingPatch, User};

/// Raw field inputs for creating a listing.
#[derive(Debug, Clone)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub price: u32,
    pub guests: u32,
    pub beds: u32,
    pub baths: u32,
    /// Optional data-URL image payload uploaded as part of creation.
    pub image: Option<String>,
}

/// Listing lifecycle service.
#[derive(Clone)]
pub struct ListingService {
    listings: Arc<dyn ListingRepository>,
    users: Arc<dyn UserRepository>,
    media: Arc<dyn MediaStore>,
    uploader: Arc<dyn ImageUploader>,
    gate: OwnershipGate,
}

impl ListingService {
    /// Build the service from its collaborator ports.
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        users: Arc<dyn UserRepository>,
        media: Arc<dyn MediaStore>,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        let gate = OwnershipGate::new(Arc::clone(&listings));
        Self {
            listings,
            users,
            media,
            uploader,
            gate,
        }
    }

    /// Create a listing owned by the acting user.
    ///
    /// When the request carries an image payload the upload pipeline runs
    /// first and the returned URL is embedded in the new record. A create
    /// that fails after a successful upload leaves the stored object
    /// orphaned; the repository offers no transaction spanning both systems.
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateListingRequest,
    ) -> Result<Listing, Error> {
        let owner = identity.user_id().ok_or_else(OwnershipGate::denial)?;
        let draft = ListingDraft::try_new(
            &request.title,
            &request.description,
            request.price,
            request.guests,
            request.beds,
            request.baths,
        )?;

        let image_url = match request.image {
            Some(raw) => Some(self.uploader.upload(&raw).await?),
            None => None,
        };

        let listing = Listing::create(ListingId::random(), *owner, draft, image_url);
        self.listings
            .insert(&listing)
            .await
            .map_err(map_repository_error)?;
        Ok(listing)
    }

    /// Merge a partial update onto an owned listing.
    ///
    /// Replacing the image does not delete the previously stored object.
    /// The source system behaves the same way; cleaning up here would turn a
    /// metadata update into a destructive storage operation, so the gap is
    /// kept and documented rather than silently fixed.
    pub async fn update(
        &self,
        identity: &Identity,
        listing_id: &ListingId,
        patch: ListingPatch,
    ) -> Result<Listing, Error> {
        self.gate.authorize(identity, listing_id).await?;
        patch.validate()?;

        let mut listing = self
            .listings
            .find_by_id(listing_id)
            .await
            .map_err(map_repository_error)?
            // Deleted between the gate and the read: keep the uniform denial.
            .ok_or_else(OwnershipGate::denial)?;
        listing.apply(patch);
        self.listings
            .update(&listing)
            .await
            .map_err(map_repository_error)?;
        Ok(listing)
    }

    /// Delete an owned listing and best-effort remove its stored image.
    pub async fn delete(
        &self,
        identity: &Identity,
        listing_id: &ListingId,
    ) -> Result<Listing, Error> {
        self.gate.authorize(identity, listing_id).await?;

        let deleted = self
            .listings
            .delete(listing_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(OwnershipGate::denial)?;

        // The record deletion is committed; image cleanup must not undo it.
        if let Some(url) = deleted.image_url() {
            match self.media.delete(url).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(listing_id = %listing_id, url, "stored image was already gone");
                }
                Err(error) => {
                    tracing::warn!(
                        listing_id = %listing_id,
                        url,
                        error = %error,
                        "failed to delete stored image; object is orphaned",
                    );
                }
            }
        }
        Ok(deleted)
    }

    /// Look up the owner of a listing.
    ///
    /// Unauthenticated by design; the owner identity is not treated as
    /// sensitive.
    pub async fn owner(&self, listing_id: &ListingId) -> Result<User, Error> {
        let listing = self
            .listings
            .find_by_id(listing_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("Listing not found"))?;

        self.users
            .find_by_id(listing.owner_id())
            .await
            .map_err(|error: UserRepositoryError| {
                tracing::error!(error = %error, "user repository failure");
                Error::internal("Something went wrong")
            })?
            .ok_or_else(|| {
                tracing::error!(listing_id = %listing_id, "listing owner record is missing");
                Error::internal("Something went wrong")
            })
    }
}
