//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use mockable::Clock;
use url::Url;

use crate::domain::ports::{ListingRepository, Mailer, MediaStore, TokenStore, UserRepository};
use crate::domain::{AuthService, ImageUploadService, ImageUploader, ListingService};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{
    InMemoryListingRepository, InMemoryMediaStore, InMemoryTokenStore, InMemoryUserRepository,
    LoggingMailer,
};

/// Bearer secret the in-memory state accepts on the OAuth callback route.
pub const TEST_GATEWAY_SECRET: &str = "test-gateway-secret";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build an [`HttpState`] wired to in-memory adapters.
pub fn in_memory_state() -> HttpState {
    in_memory_state_with_clock(Arc::new(mockable::DefaultClock))
}

/// Build an [`HttpState`] with a caller-supplied clock for expiry tests.
pub fn in_memory_state_with_clock(clock: Arc<dyn Clock>) -> HttpState {
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::default());
    let listings: Arc<dyn ListingRepository> = Arc::new(InMemoryListingRepository::default());
    let tokens: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::default());
    let media: Arc<dyn MediaStore> = Arc::new(InMemoryMediaStore::new("https://media.test"));
    let mailer: Arc<dyn Mailer> = Arc::new(LoggingMailer);
    let base_url = Url::parse("http://localhost:8080").expect("test base url");

    let auth = Arc::new(AuthService::new(
        tokens,
        Arc::clone(&users),
        mailer,
        clock,
        base_url,
    ));
    let uploader: Arc<dyn ImageUploader> =
        Arc::new(ImageUploadService::new(Arc::clone(&media)));
    let listing_service = Arc::new(ListingService::new(
        listings,
        users,
        media,
        Arc::clone(&uploader),
    ));
    HttpState::new(
        auth,
        listing_service,
        uploader,
        Some(TEST_GATEWAY_SECRET.to_owned()),
    )
}
