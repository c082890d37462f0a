//! Authentication API handlers.
//!
//! ```text
//! POST /api/v1/auth/magic-link      {"email":"renter@example.com"}
//! GET  /api/v1/auth/callback?token=…
//! POST /api/v1/auth/oauth/callback  {"email":"…","name":"…"}
//! POST /api/v1/auth/logout
//! ```
//!
//! The magic-link endpoint always answers `202 Accepted` for well-formed
//! addresses so the response cannot be used to probe which emails have
//! accounts.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{EmailAddress, Error, TokenValue, User};
use crate::domain::user::EmailValidationError;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, method_not_allowed};

/// Request body for `POST /api/v1/auth/magic-link`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkRequest {
    pub email: String,
}

/// Query string for `GET /api/v1/auth/callback`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CallbackQuery {
    pub token: String,
}

/// Request body for `POST /api/v1/auth/oauth/callback`.
///
/// The email arrives already verified by the upstream OAuth provider. Only
/// the gateway terminating the provider handshake may forward it, proven by
/// the configured bearer secret on each request.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OauthCallbackRequest {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Check the gateway's `Authorization: Bearer` credential.
///
/// Without a configured secret the route stays disabled: an unauthenticated
/// OAuth callback would let any caller mint a session for any email.
fn verify_gateway(request: &HttpRequest, secret: Option<&str>) -> Result<(), Error> {
    let Some(secret) = secret else {
        return Err(Error::unauthorized("Unauthorized"));
    };
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if presented == Some(secret) {
        Ok(())
    } else {
        Err(Error::unauthorized("Unauthorized"))
    }
}

fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|error| {
        let code = match error {
            EmailValidationError::Empty => "empty_email",
            EmailValidationError::MissingParts => "malformed_email",
        };
        Error::invalid_request(error.to_string())
            .with_details(json!({ "field": "email", "code": code }))
    })
}

/// Issue a sign-in link to the given address.
#[utoipa::path(
    post,
    path = "/api/v1/auth/magic-link",
    request_body = MagicLinkRequest,
    responses(
        (status = 202, description = "Sign-in link queued for delivery"),
        (status = 400, description = "Malformed email address", body = Error),
        (status = 500, description = "Delivery failed", body = Error)
    ),
    tags = ["auth"],
    operation_id = "requestMagicLink",
    security([])
)]
pub async fn request_magic_link(
    state: web::Data<HttpState>,
    payload: web::Json<MagicLinkRequest>,
) -> ApiResult<HttpResponse> {
    let email = parse_email(&payload.email)?;
    state.auth.issue_magic_link(email).await?;
    Ok(HttpResponse::Accepted().finish())
}

/// Redeem a magic-link token and establish a session.
#[utoipa::path(
    get,
    path = "/api/v1/auth/callback",
    params(CallbackQuery),
    responses(
        (status = 200, description = "Signed in", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Token missing, expired, or already used", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "magicLinkCallback",
    security([])
)]
pub async fn magic_link_callback(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CallbackQuery>,
) -> ApiResult<web::Json<User>> {
    let token = TokenValue::from_raw(query.into_inner().token);
    let user = state.auth.redeem_magic_link(&token).await?;
    session.persist_user(user.id())?;
    Ok(web::Json(user))
}

/// Establish a session from a completed OAuth handshake.
///
/// Callable only by the gateway that terminated the provider handshake,
/// authenticated by the configured bearer secret.
#[utoipa::path(
    post,
    path = "/api/v1/auth/oauth/callback",
    request_body = OauthCallbackRequest,
    responses(
        (status = 200, description = "Signed in", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Malformed email address", body = Error),
        (status = 401, description = "Missing or invalid gateway credential", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "oauthCallback",
    security([])
)]
pub async fn oauth_callback(
    request: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OauthCallbackRequest>,
) -> ApiResult<web::Json<User>> {
    verify_gateway(&request, state.oauth_gateway_secret.as_deref())?;
    let body = payload.into_inner();
    let email = parse_email(&body.email)?;
    let name = body.name.map(|name| name.trim().to_owned()).filter(|name| !name.is_empty());
    let user = state.auth.oauth_sign_in(email, name).await?;
    session.persist_user(user.id())?;
    Ok(web::Json(user))
}

/// End the current session. Idempotent.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Session cleared"),
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Register the authentication routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/auth/magic-link")
            .route(web::post().to(request_magic_link))
            .default_service(web::to(|| async { method_not_allowed("POST") })),
    )
    .service(
        web::resource("/auth/callback")
            .route(web::get().to(magic_link_callback))
            .default_service(web::to(|| async { method_not_allowed("GET") })),
    )
    .service(
        web::resource("/auth/oauth/callback")
            .route(web::post().to(oauth_callback))
            .default_service(web::to(|| async { method_not_allowed("POST") })),
    )
    .service(
        web::resource("/auth/logout")
            .route(web::post().to(logout))
            .default_service(web::to(|| async { method_not_allowed("POST") })),
    );
}
