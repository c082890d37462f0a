//! Listing aggregate and its field validation.
//!
//! A listing is exclusively owned by the user who created it. The only
//! lifecycle states are existence and deletion; there is no draft/published
//! distinction. Numeric fields must be positive and text fields non-empty;
//! violations surface as field-named validation errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, UserId};

/// Stable listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ListingId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Rental listing owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    id: ListingId,
    owner_id: UserId,
    title: String,
    description: String,
    price: u32,
    guests: u32,
    beds: u32,
    baths: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

/// Validated field set for creating a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    title: String,
    description: String,
    price: u32,
    guests: u32,
    beds: u32,
    baths: u32,
}

/// Partial update applied onto an existing listing.
///
/// `None` fields are left untouched. A present `image_url` replaces the
/// stored reference without deleting the previous object; see the lifecycle
/// service for the rationale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<u32>,
    pub guests: Option<u32>,
    pub beds: Option<u32>,
    pub baths: Option<u32>,
    pub image_url: Option<String>,
}

fn require_text(field: &str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_failed(
            field,
            format!("{field} must not be empty"),
        ));
    }
    Ok(trimmed.to_owned())
}

fn require_positive(field: &str, value: u32) -> Result<u32, Error> {
    if value == 0 {
        return Err(Error::validation_failed(
            field,
            format!("{field} must be a positive number"),
        ));
    }
    Ok(value)
}

impl ListingDraft {
    /// Validate raw field inputs into a draft.
    pub fn try_new(
        title: &str,
        description: &str,
        price: u32,
        guests: u32,
        beds: u32,
        baths: u32,
    ) -> Result<Self, Error> {
        Ok(Self {
            title: require_text("title", title)?,
            description: require_text("description", description)?,
            price: require_positive("price", price)?,
            guests: require_positive("guests", guests)?,
            beds: require_positive("beds", beds)?,
            baths: require_positive("baths", baths)?,
        })
    }
}

impl ListingPatch {
    /// Whether the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate the fields that are present.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }
        if let Some(price) = self.price {
            require_positive("price", price)?;
        }
        if let Some(guests) = self.guests {
            require_positive("guests", guests)?;
        }
        if let Some(beds) = self.beds {
            require_positive("beds", beds)?;
        }
        if let Some(baths) = self.baths {
            require_positive("baths", baths)?;
        }
        Ok(())
    }
}

impl Listing {
    /// Build a listing from a validated draft.
    pub fn create(
        id: ListingId,
        owner_id: UserId,
        draft: ListingDraft,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id,
            owner_id,
            title: draft.title,
            description: draft.description,
            price: draft.price,
            guests: draft.guests,
            beds: draft.beds,
            baths: draft.baths,
            image_url,
        }
    }

    /// Merge a validated patch onto this listing.
    pub fn apply(&mut self, patch: ListingPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_owned();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_owned();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(guests) = patch.guests {
            self.guests = guests;
        }
        if let Some(beds) = patch.beds {
            self.beds = beds;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(baths) = patch.baths {
            self.baths = baths;
        }
    }

    /// Stable listing identifier.
    pub fn id(&self) -> &ListingId {
        &self.id
    }

    /// Identifier of the owning user.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Listing title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Listing description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Nightly price.
    pub fn price(&self) -> u32 {
        self.price
    }

    /// Guest capacity.
    pub fn guests(&self) -> u32 {
        self.guests
    }

    /// Number of beds.
    pub fn beds(&self) -> u32 {
        self.beds
    }

    /// Number of bathrooms.
    pub fn baths(&self) -> u32 {
        self.baths
    }

    /// Public URL of the attached image, if any.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::Value;

    fn draft() -> ListingDraft {
        ListingDraft::try_new("Loft", "A bright loft", 100, 2, 1, 1).expect("valid draft")
    }

    #[test]
    fn create_carries_owner_and_fields() {
        let owner = UserId::random();
        let listing = Listing::create(ListingId::random(), owner, draft(), None);
        assert_eq!(listing.owner_id(), &owner);
        assert_eq!(listing.title(), "Loft");
        assert_eq!(listing.price(), 100);
        assert!(listing.image_url().is_none());
    }

    #[rstest]
    #[case("", "desc", 100, 2, 1, 1, "title")]
    #[case("Loft", "   ", 100, 2, 1, 1, "description")]
    #[case("Loft", "desc", 0, 2, 1, 1, "price")]
    #[case("Loft", "desc", 100, 0, 1, 1, "guests")]
    #[case("Loft", "desc", 100, 2, 0, 1, "beds")]
    #[case("Loft", "desc", 100, 2, 1, 0, "baths")]
    fn draft_validation_names_the_offending_field(
        #[case] title: &str,
        #[case] description: &str,
        #[case] price: u32,
        #[case] guests: u32,
        #[case] beds: u32,
        #[case] baths: u32,
        #[case] field: &str,
    ) {
        let err = ListingDraft::try_new(title, description, price, guests, beds, baths)
            .expect_err("invalid draft");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details.get("field").and_then(Value::as_str), Some(field));
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut listing = Listing::create(ListingId::random(), UserId::random(), draft(), None);
        listing.apply(ListingPatch {
            price: Some(150),
            image_url: Some("https://cdn.example/objects/abc.png".into()),
            ..ListingPatch::default()
        });
        assert_eq!(listing.price(), 150);
        assert_eq!(listing.title(), "Loft");
        assert_eq!(
            listing.image_url(),
            Some("https://cdn.example/objects/abc.png")
        );
    }

    #[test]
    fn patch_validation_rejects_zero_price() {
        let patch = ListingPatch {
            price: Some(0),
            ..ListingPatch::default()
        };
        let err = patch.validate().expect_err("invalid patch");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn serialises_camel_case() {
        let listing = Listing::create(ListingId::random(), UserId::random(), draft(), None);
        let value = serde_json::to_value(&listing).expect("serialise listing");
        assert!(value.get("ownerId").is_some());
        assert!(value.get("owner_id").is_none());
        assert!(value.get("imageUrl").is_none());
    }
}
