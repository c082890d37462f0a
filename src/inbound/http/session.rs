//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations such as resolving the caller's identity.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::domain::{Error, Identity, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.as_uuid().to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Resolve the caller's identity from the session.
    ///
    /// A missing or unreadable session value resolves to
    /// [`Identity::Anonymous`] rather than an error: an unparseable cookie is
    /// indistinguishable from a forged one and must not grant access or leak
    /// detail.
    pub fn identity(&self) -> Identity {
        let raw = match self.0.get::<String>(USER_ID_KEY) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(error = %error, "failed to read session; treating as anonymous");
                return Identity::Anonymous;
            }
        };
        match raw {
            Some(raw) => match Uuid::parse_str(&raw) {
                Ok(id) => Identity::User(UserId::from(id)),
                Err(error) => {
                    tracing::warn!(error = %error, "invalid user id in session cookie");
                    Identity::Anonymous
                }
            },
            None => Identity::Anonymous,
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user(&self) -> Result<UserId, Error> {
        match self.identity() {
            Identity::User(id) => Ok(id),
            Identity::Anonymous => Err(Error::unauthorized("Unauthorized")),
        }
    }

    /// Drop the session and its cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
