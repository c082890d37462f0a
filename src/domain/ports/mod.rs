//! Domain ports for the hexagonal boundary.
//!
//! Services depend on these traits only; outbound adapters implement them.
//! Each port carries its own error enum so adapters never leak backend
//! detail into the domain.

mod listing_repository;
mod mailer;
mod media_store;
mod token_store;
mod user_repository;

#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingRepository, ListingRepositoryError};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{Mailer, MailerError};
#[cfg(test)]
pub use media_store::MockMediaStore;
pub use media_store::{MediaStore, MediaStoreError};
#[cfg(test)]
pub use token_store::MockTokenStore;
pub use token_store::{ConsumeOutcome, TokenStore, TokenStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
