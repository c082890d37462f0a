//! Magic-link and OAuth authentication flows.
//!
//! Both sign-in paths funnel into the same resolve-or-create provisioning
//! step, so user records look identical regardless of how the email was
//! verified: via a redeemed magic-link token or by the external OAuth
//! provider. First-time provisioning triggers a fire-and-forget welcome
//! message that never affects the caller's outcome.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use url::Url;

use crate::domain::ports::{
    ConsumeOutcome, Mailer, TokenStore, TokenStoreError, UserRepository, UserRepositoryError,
};
use crate::domain::{EmailAddress, Error, TokenValue, User, UserId, VerificationToken};

fn token_denial(code: &str) -> Error {
    Error::unauthorized("Sign in link is not valid").with_details(json!({ "code": code }))
}

fn map_token_store_error(error: TokenStoreError) -> Error {
    tracing::error!(error = %error, "token store failure");
    Error::internal("Something went wrong")
}

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    tracing::error!(error = %error, "user repository failure");
    Error::internal("Something went wrong")
}

/// Authentication service issuing and redeeming magic links.
#[derive(Clone)]
pub struct AuthService {
    tokens: Arc<dyn TokenStore>,
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    public_base_url: Url,
}

impl AuthService {
    /// Build the service from its collaborator ports.
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        public_base_url: Url,
    ) -> Self {
        Self {
            tokens,
            users,
            mailer,
            clock,
            public_base_url,
        }
    }

    /// Issue a fresh single-use sign-in token and mail its link.
    ///
    /// Repeated calls for the same email issue independent tokens; earlier
    /// tokens stay valid until they expire or are consumed.
    pub async fn issue_magic_link(&self, email: EmailAddress) -> Result<(), Error> {
        let token = VerificationToken::issue(email.clone(), self.clock.utc());
        self.tokens
            .insert(&token)
            .await
            .map_err(map_token_store_error)?;

        let sign_in_url = self.sign_in_url(token.value())?;
        self.mailer
            .send_sign_in_link(&email, sign_in_url.as_str())
            .await
            .map_err(|error| {
                tracing::error!(error = %error, "failed to deliver sign-in link");
                Error::internal("Unable to send the sign in email")
            })
    }

    /// Redeem a magic-link token, provisioning the user on first sign-in.
    pub async fn redeem_magic_link(&self, value: &TokenValue) -> Result<User, Error> {
        let outcome = self
            .tokens
            .consume(value, self.clock.utc())
            .await
            .map_err(map_token_store_error)?;

        let email = match outcome {
            ConsumeOutcome::Missing => return Err(token_denial("token_invalid")),
            ConsumeOutcome::AlreadyUsed => return Err(token_denial("token_already_used")),
            ConsumeOutcome::Expired => return Err(token_denial("token_expired")),
            ConsumeOutcome::Consumed { email } => email,
        };

        let (user, created) = self.resolve_or_create(email, None).await?;
        if created {
            self.spawn_welcome(user.email().clone());
        }
        Ok(user)
    }

    /// Sign in with an email the external OAuth provider already verified.
    ///
    /// No verification token is involved; provisioning is shared with the
    /// magic-link path.
    pub async fn oauth_sign_in(
        &self,
        email: EmailAddress,
        name: Option<String>,
    ) -> Result<User, Error> {
        let (user, created) = self.resolve_or_create(email, name).await?;
        if created {
            self.spawn_welcome(user.email().clone());
        }
        Ok(user)
    }

    /// Resolve the user for `email`, creating the record on first sight.
    ///
    /// Returns whether this call created the user. A concurrent insert losing
    /// to the unique-email constraint adopts the winner's record.
    async fn resolve_or_create(
        &self,
        email: EmailAddress,
        name: Option<String>,
    ) -> Result<(User, bool), Error> {
        if let Some(existing) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_repository_error)?
        {
            return Ok((existing, false));
        }

        let user = User::new(UserId::random(), email.clone(), name);
        match self.users.insert(&user).await {
            Ok(()) => Ok((user, true)),
            Err(UserRepositoryError::DuplicateEmail) => {
                let winner = self
                    .users
                    .find_by_email(&email)
                    .await
                    .map_err(map_user_repository_error)?
                    .ok_or_else(|| Error::internal("Something went wrong"))?;
                Ok((winner, false))
            }
            Err(error) => Err(map_user_repository_error(error)),
        }
    }

    /// Build the emailed link against the registered redemption route.
    ///
    /// Extends the base URL's path segments rather than using `Url::join`,
    /// which would drop the last path segment of a base URL not ending in a
    /// slash.
    fn sign_in_url(&self, token: &TokenValue) -> Result<Url, Error> {
        let mut url = self.public_base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                tracing::error!("public base URL cannot carry path segments");
                Error::internal("Something went wrong")
            })?
            .pop_if_empty()
            .extend(["api", "v1", "auth", "callback"]);
        url.query_pairs_mut().append_pair("token", token.as_ref());
        Ok(url)
    }

    fn spawn_welcome(&self, email: EmailAddress) {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            if let Err(error) = mailer.send_welcome(&email).await {
                tracing::warn!(%email, error = %error, "unable to send welcome email");
            }
        });
    }
}
