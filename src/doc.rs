//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: all inbound HTTP paths, the shared error and entity
//! schemas, and the session-cookie security scheme. Swagger UI serves the
//! document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Listing, ListingId, User, UserId};
use crate::inbound::http::auth::{MagicLinkRequest, OauthCallbackRequest};
use crate::inbound::http::homes::{CreateHomeRequest, UpdateHomeRequest};
use crate::inbound::http::uploads::{ImageUploadRequest, ImageUploadResponse};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by the auth callback endpoints.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Homeshare API",
        description = "Rental listings: magic-link sign-in, owner-gated listing \
                       lifecycle, and image uploads."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::request_magic_link,
        crate::inbound::http::auth::magic_link_callback,
        crate::inbound::http::auth::oauth_callback,
        crate::inbound::http::auth::logout,
        crate::inbound::http::homes::create_home,
        crate::inbound::http::homes::update_home,
        crate::inbound::http::homes::delete_home,
        crate::inbound::http::homes::get_home_owner,
        crate::inbound::http::uploads::upload_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        UserId,
        Listing,
        ListingId,
        MagicLinkRequest,
        OauthCallbackRequest,
        CreateHomeRequest,
        UpdateHomeRequest,
        ImageUploadRequest,
        ImageUploadResponse,
    )),
    tags(
        (name = "auth", description = "Sign-in, session, and logout"),
        (name = "homes", description = "Listing lifecycle"),
        (name = "uploads", description = "Image storage"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
