//! Rental listings backend: magic-link authentication, owner-gated listing
//! lifecycle, and image storage.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::RequestLog;
