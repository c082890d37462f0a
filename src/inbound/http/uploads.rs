//! Image upload API handler.
//!
//! ```text
//! POST /api/v1/image-upload {"image":"data:image/png;base64,…"}
//! ```
//!
//! Accepts a base64 data URL, stores the decoded object, and returns its
//! public URL. The JSON body limit is raised at app assembly so payloads up
//! to the decoded 10 MiB cap fit with base64 overhead.

use actix_web::web;
use serde::{Deserialize, Serialize};

use crate::domain::Error;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, method_not_allowed};

/// Request body for `POST /api/v1/image-upload`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadRequest {
    /// Base64 data URL, e.g. `data:image/png;base64,…`.
    pub image: String,
}

/// Response body carrying the stored object's public URL.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub url: String,
}

/// Store an uploaded image and return its public URL.
#[utoipa::path(
    post,
    path = "/api/v1/image-upload",
    request_body = ImageUploadRequest,
    responses(
        (status = 200, description = "Image stored", body = ImageUploadResponse),
        (status = 400, description = "Missing or malformed data URL", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 413, description = "Image exceeds the size limit", body = Error),
        (status = 500, description = "Storage failure", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "uploadImage"
)]
pub async fn upload_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ImageUploadRequest>,
) -> ApiResult<web::Json<ImageUploadResponse>> {
    session.require_user()?;
    let url = state.uploader.upload(&payload.image).await?;
    Ok(web::Json(ImageUploadResponse { url }))
}

/// Register the upload route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/image-upload")
            .route(web::post().to(upload_image))
            .default_service(web::to(|| async { method_not_allowed("POST") })),
    );
}
