//! Domain layer: entities, ports, and services.
//!
//! The domain knows nothing about HTTP or concrete backends. Inbound
//! adapters call the services; outbound adapters implement the ports.

pub mod auth_service;
pub mod error;
pub mod image;
pub mod listing;
pub mod listing_service;
pub mod ownership;
pub mod ports;
pub mod token;
pub mod upload_service;
pub mod user;

pub use auth_service::AuthService;
pub use error::{Error, ErrorCode};
pub use image::{ImagePayload, MAX_IMAGE_BYTES};
pub use listing::{Listing, ListingDraft, ListingId, ListingPatch};
pub use listing_service::{CreateListingRequest, ListingService};
pub use ownership::OwnershipGate;
pub use token::{TokenValue, VerificationToken, magic_link_ttl};
pub use upload_service::{ImageUploadService, ImageUploader};
pub use user::{EmailAddress, Identity, User, UserId};
