//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::upload_service::ImageUploader;
use crate::domain::{AuthService, ListingService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<AuthService>,
    pub listings: Arc<ListingService>,
    pub uploader: Arc<dyn ImageUploader>,
    /// Shared secret presented by the gateway forwarding completed OAuth
    /// handshakes. `None` keeps the OAuth callback disabled.
    pub oauth_gateway_secret: Option<String>,
}

impl HttpState {
    /// Bundle the service layer for injection into handlers.
    pub fn new(
        auth: Arc<AuthService>,
        listings: Arc<ListingService>,
        uploader: Arc<dyn ImageUploader>,
        oauth_gateway_secret: Option<String>,
    ) -> Self {
        Self {
            auth,
            listings,
            uploader,
            oauth_gateway_secret,
        }
    }
}
