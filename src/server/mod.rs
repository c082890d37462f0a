//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware, config::CookieContentSecurity, storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{ListingRepository, Mailer, MediaStore, TokenStore, UserRepository};
use crate::domain::{AuthService, ImageUploadService, ImageUploader, ListingService, image};
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{auth, health, homes, uploads};
use crate::middleware::RequestLog;
use crate::outbound::memory::{
    InMemoryListingRepository, InMemoryMediaStore, InMemoryTokenStore, InMemoryUserRepository,
    LoggingMailer,
};
use crate::outbound::object_store::HttpObjectStore;
use crate::outbound::smtp::SmtpMailer;

/// JSON body limit accommodating the 10 MiB decoded image cap plus base64
/// overhead and envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().limit(image::MAX_ENCODED_LEN + 64 * 1024)
}

/// Assemble the service layer from the configured adapters.
///
/// Repositories are in-memory; media storage and mail fall back to in-memory
/// and log-only adapters when their settings are absent.
fn build_http_state(config: &mut ServerConfig) -> std::io::Result<HttpState> {
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::default());
    let listings: Arc<dyn ListingRepository> = Arc::new(InMemoryListingRepository::default());
    let tokens: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::default());

    let media: Arc<dyn MediaStore> = match config.object_store.take() {
        Some(store) => Arc::new(HttpObjectStore::new(store).map_err(|error| {
            std::io::Error::other(format!("object store client construction failed: {error}"))
        })?),
        None => {
            let mut base = config.public_base_url.clone();
            base.set_path("/media");
            Arc::new(InMemoryMediaStore::new(base.as_str()))
        }
    };
    let mailer: Arc<dyn Mailer> = match config.smtp.take() {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp).map_err(|error| {
            std::io::Error::other(format!("SMTP transport construction failed: {error}"))
        })?),
        None => Arc::new(LoggingMailer),
    };

    let auth = Arc::new(AuthService::new(
        tokens,
        Arc::clone(&users),
        mailer,
        Arc::new(mockable::DefaultClock),
        config.public_base_url.clone(),
    ));
    let uploader: Arc<dyn ImageUploader> =
        Arc::new(ImageUploadService::new(Arc::clone(&media)));
    let listings = Arc::new(ListingService::new(
        listings,
        users,
        media,
        Arc::clone(&uploader),
    ));
    Ok(HttpState::new(
        auth,
        listings,
        uploader,
        config.oauth_gateway_secret.take(),
    ))
}

/// Dependency bundle for one worker's app instance.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Build the Actix app: session middleware, request logging, API routes,
/// health probes, and (in debug builds) the Swagger UI.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .configure(auth::configure)
        .configure(homes::configure)
        .configure(uploads::configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(RequestLog)
        .service(api)
        .configure(health::configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when adapter construction or socket binding
/// fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    mut config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&mut config)?);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
