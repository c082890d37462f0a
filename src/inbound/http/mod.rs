//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod homes;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;

pub use error::ApiResult;

use actix_web::HttpResponse;
use actix_web::http::header;

use crate::domain::{Error, ErrorCode};

/// Respond `405 Method Not Allowed` with an accurate `Allow` header.
///
/// Registered as the `default_service` of every resource so unsupported
/// verbs on a known path never fall through to a misleading `404`.
pub(crate) fn method_not_allowed(allow: &'static str) -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, allow))
        .json(Error::new(
            ErrorCode::InvalidRequest,
            "Method not allowed",
        ))
}
