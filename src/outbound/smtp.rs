//! Lettre-backed SMTP mailer for sign-in links and welcome mail.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::EmailAddress;
use crate::domain::ports::{Mailer, MailerError};

/// Connection settings for the SMTP relay.
pub struct SmtpConfig {
    pub relay: String,
    pub username: String,
    pub password: String,
    /// Sender address placed in the `From` header.
    pub from: String,
}

/// Mailer delivering over an authenticated TLS SMTP relay.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the mailer from relay settings.
    ///
    /// # Errors
    ///
    /// Fails when the relay host is invalid or the sender address does not
    /// parse as a mailbox.
    pub fn new(config: SmtpConfig) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.relay)
            .map_err(|error| MailerError::Send {
                message: format!("invalid SMTP relay: {error}"),
            })?
            .credentials(Credentials::new(config.username, config.password))
            .build();
        let from = config.from.parse::<Mailbox>().map_err(|error| {
            MailerError::Send {
                message: format!("invalid sender address: {error}"),
            }
        })?;
        Ok(Self { transport, from })
    }

    async fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        body: String,
    ) -> Result<(), MailerError> {
        let recipient = to.as_ref().parse::<Mailbox>().map_err(|error| {
            MailerError::Send {
                message: format!("invalid recipient address: {error}"),
            }
        })?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .body(body)
            .map_err(|error| MailerError::Send {
                message: format!("failed to build message: {error}"),
            })?;
        self.transport
            .send(message)
            .await
            .map(drop)
            .map_err(|error| MailerError::Send {
                message: error.to_string(),
            })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_sign_in_link(
        &self,
        to: &EmailAddress,
        sign_in_url: &str,
    ) -> Result<(), MailerError> {
        let body = format!(
            "Hello,\n\nFollow this link to sign in:\n\n{sign_in_url}\n\n\
             The link is valid for 10 minutes and can be used once.\n",
        );
        self.send(to, "Your sign-in link", body).await
    }

    async fn send_welcome(&self, to: &EmailAddress) -> Result<(), MailerError> {
        let body = "Welcome!\n\nYour account is ready. \
                    You can now create and manage your listings.\n"
            .to_owned();
        self.send(to, "Welcome", body).await
    }
}
