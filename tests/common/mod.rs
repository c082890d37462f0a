//! Shared harness for end-to-end API tests.
//!
//! Builds the real Actix app over in-memory adapters, with a recording
//! mailer (to capture sign-in links) and a mutable clock (to cross token
//! expiry boundaries).

use std::sync::{Arc, Mutex};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;
use url::Url;

use homeshare::domain::ports::{
    ListingRepository, Mailer, MailerError, MediaStore, TokenStore, UserRepository,
};
use homeshare::domain::{
    AuthService, EmailAddress, ImageUploadService, ImageUploader, ListingService,
};
use homeshare::inbound::http::state::HttpState;
use homeshare::inbound::http::{auth, homes, uploads};
use homeshare::outbound::memory::{
    InMemoryListingRepository, InMemoryMediaStore, InMemoryTokenStore, InMemoryUserRepository,
};
use homeshare::server::json_config;

/// Mailer that records every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sign_in_links: Mutex<Vec<(String, String)>>,
    welcomes: Mutex<Vec<String>>,
}

impl RecordingMailer {
    /// Sign-in links captured so far as `(recipient, url)` pairs.
    pub fn sign_in_links(&self) -> Vec<(String, String)> {
        self.sign_in_links.lock().expect("mailer lock").clone()
    }

    /// Recipients of captured welcome messages.
    pub fn welcomes(&self) -> Vec<String> {
        self.welcomes.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_sign_in_link(
        &self,
        to: &EmailAddress,
        sign_in_url: &str,
    ) -> Result<(), MailerError> {
        self.sign_in_links
            .lock()
            .expect("mailer lock")
            .push((to.to_string(), sign_in_url.to_owned()));
        Ok(())
    }

    async fn send_welcome(&self, to: &EmailAddress) -> Result<(), MailerError> {
        self.welcomes
            .lock()
            .expect("mailer lock")
            .push(to.to_string());
        Ok(())
    }
}

/// Clock whose current instant tests can move forward.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

/// Bearer secret the test gateway presents on the OAuth callback.
pub const GATEWAY_SECRET: &str = "integration-gateway-secret";

/// Handles onto the adapters behind a test app.
pub struct Harness {
    pub state: HttpState,
    pub media: Arc<InMemoryMediaStore>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<MutableClock>,
}

impl Harness {
    pub fn new() -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::default());
        let listings: Arc<dyn ListingRepository> = Arc::new(InMemoryListingRepository::default());
        let tokens: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::default());
        let media = Arc::new(InMemoryMediaStore::new("https://media.test"));
        let media_port: Arc<dyn MediaStore> = media.clone();
        let mailer = Arc::new(RecordingMailer::default());
        let mailer_port: Arc<dyn Mailer> = mailer.clone();
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let clock_port: Arc<dyn Clock> = clock.clone();

        let auth = Arc::new(AuthService::new(
            tokens,
            Arc::clone(&users),
            mailer_port,
            clock_port,
            Url::parse("http://localhost:8080").expect("base url"),
        ));
        let uploader: Arc<dyn ImageUploader> =
            Arc::new(ImageUploadService::new(Arc::clone(&media_port)));
        let listing_service = Arc::new(ListingService::new(
            listings,
            users,
            media_port,
            Arc::clone(&uploader),
        ));
        Self {
            state: HttpState::new(
                auth,
                listing_service,
                uploader,
                Some(GATEWAY_SECRET.to_owned()),
            ),
            media,
            mailer,
            clock,
        }
    }

    /// Build the API app the way the server assembles it.
    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .app_data(json_config())
            .service(
                web::scope("/api/v1")
                    .wrap(session)
                    .configure(auth::configure)
                    .configure(homes::configure)
                    .configure(uploads::configure),
            )
    }
}

/// Extract the `token` query parameter from a captured sign-in URL.
pub fn token_from(sign_in_url: &str) -> String {
    let url = Url::parse(sign_in_url).expect("sign-in URL");
    url.query_pairs()
        .find(|(name, _)| name == "token")
        .map(|(_, value)| value.into_owned())
        .expect("token parameter")
}
