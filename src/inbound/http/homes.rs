//! Listing API handlers.
//!
//! ```text
//! POST   /api/v1/homes                {"title":"Loft","description":"…","price":100,…}
//! PATCH  /api/v1/homes/{id}           partial field update, owner only
//! DELETE /api/v1/homes/{id}           owner only, removes the stored image
//! GET    /api/v1/homes/{id}/owner     public owner lookup
//! ```
//!
//! Ownership failures on mutations always surface as `401 Unauthorized`
//! with an unchanging body, whether the listing is missing or owned by
//! someone else.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Listing, ListingId, ListingPatch, User};
use crate::domain::listing_service::CreateListingRequest;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, method_not_allowed};

/// Request body for `POST /api/v1/homes`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHomeRequest {
    pub title: String,
    pub description: String,
    pub price: u32,
    pub guests: u32,
    pub beds: u32,
    pub baths: u32,
    /// Optional image as a base64 data URL; uploaded before the listing is
    /// persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<CreateHomeRequest> for CreateListingRequest {
    fn from(value: CreateHomeRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            price: value.price,
            guests: value.guests,
            beds: value.beds,
            baths: value.baths,
            image: value.image,
        }
    }
}

/// Request body for `PATCH /api/v1/homes/{id}`. Absent fields are untouched.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHomeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baths: Option<u32>,
    /// Replacement image URL, typically from a prior `/image-upload` call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<UpdateHomeRequest> for ListingPatch {
    fn from(value: UpdateHomeRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            price: value.price,
            guests: value.guests,
            beds: value.beds,
            baths: value.baths,
            image_url: value.image_url,
        }
    }
}

/// Create a listing owned by the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/homes",
    request_body = CreateHomeRequest,
    responses(
        (status = 201, description = "Listing created", body = Listing),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 413, description = "Image payload too large", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["homes"],
    operation_id = "createHome"
)]
pub async fn create_home(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateHomeRequest>,
) -> ApiResult<HttpResponse> {
    let identity = session.identity();
    let listing = state
        .listings
        .create(&identity, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(listing))
}

/// Partially update an owned listing.
#[utoipa::path(
    patch,
    path = "/api/v1/homes/{id}",
    params(("id" = Uuid, Path, description = "Listing id")),
    request_body = UpdateHomeRequest,
    responses(
        (status = 200, description = "Updated listing", body = Listing),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not the owner", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["homes"],
    operation_id = "updateHome"
)]
pub async fn update_home(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateHomeRequest>,
) -> ApiResult<web::Json<Listing>> {
    let identity = session.identity();
    let id = ListingId::from(path.into_inner());
    let listing = state
        .listings
        .update(&identity, &id, payload.into_inner().into())
        .await?;
    Ok(web::Json(listing))
}

/// Delete an owned listing and its stored image.
#[utoipa::path(
    delete,
    path = "/api/v1/homes/{id}",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Deleted listing", body = Listing),
        (status = 401, description = "Not the owner", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["homes"],
    operation_id = "deleteHome"
)]
pub async fn delete_home(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Listing>> {
    let identity = session.identity();
    let id = ListingId::from(path.into_inner());
    let listing = state.listings.delete(&identity, &id).await?;
    Ok(web::Json(listing))
}

/// Look up the owner of a listing. No authentication required.
#[utoipa::path(
    get,
    path = "/api/v1/homes/{id}/owner",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing owner", body = User),
        (status = 404, description = "Listing not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["homes"],
    operation_id = "getHomeOwner",
    security([])
)]
pub async fn get_home_owner(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<User>> {
    let id = ListingId::from(path.into_inner());
    let owner = state.listings.owner(&id).await?;
    Ok(web::Json(owner))
}

/// Register the listing routes with explicit per-resource verb sets.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/homes")
            .route(web::post().to(create_home))
            .default_service(web::to(|| async { method_not_allowed("POST") })),
    )
    .service(
        web::resource("/homes/{id}")
            .route(web::patch().to(update_home))
            .route(web::delete().to(delete_home))
            .default_service(web::to(|| async { method_not_allowed("PATCH, DELETE") })),
    )
    .service(
        web::resource("/homes/{id}/owner")
            .route(web::get().to(get_home_owner))
            .default_service(web::to(|| async { method_not_allowed("GET") })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    use crate::inbound::http::test_utils::{
        TEST_GATEWAY_SECRET, in_memory_state, test_session_middleware,
    };

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .configure(configure)
                    .configure(crate::inbound::http::auth::configure),
            )
    }

    fn home_request() -> CreateHomeRequest {
        CreateHomeRequest {
            title: "Canal loft".into(),
            description: "Bright loft by the canal".into(),
            price: 120,
            guests: 2,
            beds: 1,
            baths: 1,
            image: None,
        }
    }

    /// Sign a fresh user in through the OAuth callback and return the
    /// session cookie.
    async fn sign_in<S>(app: &S, email: &str) -> actix_web::cookie::Cookie<'static>
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/oauth/callback")
                .insert_header(("Authorization", format!("Bearer {TEST_GATEWAY_SECRET}")))
                .set_json(serde_json::json!({ "email": email, "name": "Ada" }))
                .to_request(),
        )
        .await;
        assert!(response.status().is_success());
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    #[actix_web::test]
    async fn create_requires_a_session() {
        let app = actix_test::init_service(test_app(in_memory_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/homes")
                .set_json(home_request())
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_returns_created_listing_owned_by_the_caller() {
        let app = actix_test::init_service(test_app(in_memory_state())).await;
        let cookie = sign_in(&app, "owner@example.com").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/homes")
                .cookie(cookie)
                .set_json(home_request())
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("title").and_then(Value::as_str),
            Some("Canal loft")
        );
        assert!(body.get("ownerId").and_then(Value::as_str).is_some());
        assert!(body.get("owner_id").is_none());
    }

    #[actix_web::test]
    async fn create_rejects_invalid_fields_with_field_details() {
        let app = actix_test::init_service(test_app(in_memory_state())).await;
        let cookie = sign_in(&app, "owner@example.com").await;

        let mut request = home_request();
        request.guests = 0;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/homes")
                .cookie(cookie)
                .set_json(request)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("details")
                .and_then(|details| details.get("field"))
                .and_then(Value::as_str),
            Some("guests")
        );
    }

    #[rstest]
    #[case::missing_listing(false)]
    #[case::someone_elses_listing(true)]
    #[actix_web::test]
    async fn delete_denies_non_owners_uniformly(#[case] listing_exists: bool) {
        let app = actix_test::init_service(test_app(in_memory_state())).await;
        let owner_cookie = sign_in(&app, "owner@example.com").await;

        let id = if listing_exists {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/homes")
                    .cookie(owner_cookie)
                    .set_json(home_request())
                    .to_request(),
            )
            .await;
            let body: Value = actix_test::read_body_json(response).await;
            body.get("id")
                .and_then(Value::as_str)
                .expect("listing id")
                .to_owned()
        } else {
            Uuid::new_v4().to_string()
        };

        let intruder_cookie = sign_in(&app, "intruder@example.com").await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/homes/{id}"))
                .cookie(intruder_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(response).await;
        // The denial body must not vary with listing existence.
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Unauthorized")
        );
    }

    #[actix_web::test]
    async fn owner_can_update_and_delete() {
        let app = actix_test::init_service(test_app(in_memory_state())).await;
        let cookie = sign_in(&app, "owner@example.com").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/homes")
                .cookie(cookie.clone())
                .set_json(home_request())
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(response).await;
        let id = created.get("id").and_then(Value::as_str).expect("id");

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/homes/{id}"))
                .cookie(cookie.clone())
                .set_json(serde_json::json!({ "price": 150 }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated: Value = actix_test::read_body_json(response).await;
        assert_eq!(updated.get("price").and_then(Value::as_u64), Some(150));
        assert_eq!(
            updated.get("title").and_then(Value::as_str),
            Some("Canal loft")
        );

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/homes/{id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let deleted: Value = actix_test::read_body_json(response).await;
        assert_eq!(deleted.get("id").and_then(Value::as_str), Some(id));
    }

    #[actix_web::test]
    async fn owner_lookup_is_public_and_404s_for_unknown_listings() {
        let app = actix_test::init_service(test_app(in_memory_state())).await;
        let cookie = sign_in(&app, "owner@example.com").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/homes")
                .cookie(cookie)
                .set_json(home_request())
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(response).await;
        let id = created.get("id").and_then(Value::as_str).expect("id");

        // No cookie on the lookup.
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/homes/{id}/owner"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let owner: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            owner.get("email").and_then(Value::as_str),
            Some("owner@example.com")
        );

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/homes/{}/owner", Uuid::new_v4()))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case("/api/v1/homes", actix_test::TestRequest::get(), "POST")]
    #[case("/api/v1/homes", actix_test::TestRequest::delete(), "POST")]
    #[case(
        "/api/v1/homes/3fa85f64-5717-4562-b3fc-2c963f66afa6",
        actix_test::TestRequest::post(),
        "PATCH, DELETE"
    )]
    #[case(
        "/api/v1/homes/3fa85f64-5717-4562-b3fc-2c963f66afa6/owner",
        actix_test::TestRequest::put(),
        "GET"
    )]
    #[actix_web::test]
    async fn unsupported_verbs_get_405_with_allow(
        #[case] uri: &str,
        #[case] request: actix_test::TestRequest,
        #[case] allow: &str,
    ) {
        let app = actix_test::init_service(test_app(in_memory_state())).await;
        let response = actix_test::call_service(&app, request.uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response
                .headers()
                .get(header::ALLOW)
                .and_then(|value| value.to_str().ok()),
            Some(allow)
        );
    }
}
