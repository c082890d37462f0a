//! HTTP server configuration object and environment loading.

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use url::Url;

use crate::outbound::object_store::ObjectStoreConfig;
use crate::outbound::smtp::SmtpConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    /// Externally reachable base URL embedded in magic-link emails.
    pub(crate) public_base_url: Url,
    pub(crate) object_store: Option<ObjectStoreConfig>,
    pub(crate) smtp: Option<SmtpConfig>,
    /// Secret the OAuth gateway presents as a bearer credential. `None`
    /// keeps the OAuth callback route disabled.
    pub(crate) oauth_gateway_secret: Option<String>,
}

impl ServerConfig {
    /// Construct a server configuration from explicit settings.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        public_base_url: Url,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            public_base_url,
            object_store: None,
            smtp: None,
            oauth_gateway_secret: None,
        }
    }

    /// Attach object-storage settings; without them images are held in
    /// process memory and lost on restart.
    #[must_use]
    pub fn with_object_store(mut self, config: ObjectStoreConfig) -> Self {
        self.object_store = Some(config);
        self
    }

    /// Attach SMTP relay settings; without them sign-in links are logged
    /// instead of emailed.
    #[must_use]
    pub fn with_smtp(mut self, config: SmtpConfig) -> Self {
        self.smtp = Some(config);
        self
    }

    /// Enable the OAuth callback route for a gateway presenting this secret.
    #[must_use]
    pub fn with_oauth_gateway_secret(mut self, secret: impl Into<String>) -> Self {
        self.oauth_gateway_secret = Some(secret.into());
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Load the configuration from environment variables.
    ///
    /// Required: `PUBLIC_BASE_URL`. The session key is read from
    /// `SESSION_KEY_FILE`; in release builds a missing key file aborts
    /// startup unless `SESSION_ALLOW_EPHEMERAL=1`. Storage
    /// (`STORAGE_ENDPOINT`, `STORAGE_BUCKET`, `STORAGE_API_KEY`,
    /// `STORAGE_PUBLIC_BASE`) and SMTP (`SMTP_RELAY`, `SMTP_USERNAME`,
    /// `SMTP_PASSWORD`, `SMTP_FROM`) are each all-or-nothing groups.
    /// `OAUTH_GATEWAY_SECRET` enables the OAuth callback route; leaving it
    /// unset keeps that route disabled.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] for a missing session key, unparseable
    /// addresses or URLs, or a partially configured group.
    pub fn from_env() -> std::io::Result<Self> {
        let key = load_session_key()?;
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|value| value != "0")
            .unwrap_or(true);
        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.into())
            .parse()
            .map_err(|error| std::io::Error::other(format!("invalid BIND_ADDR: {error}")))?;
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .map_err(|_| std::io::Error::other("PUBLIC_BASE_URL must be set"))?
            .parse::<Url>()
            .map_err(|error| {
                std::io::Error::other(format!("invalid PUBLIC_BASE_URL: {error}"))
            })?;

        let mut config = Self::new(
            key,
            cookie_secure,
            SameSite::Lax,
            bind_addr,
            public_base_url,
        );
        if let Some(store) = load_object_store()? {
            config = config.with_object_store(store);
        }
        if let Some(smtp) = load_smtp()? {
            config = config.with_smtp(smtp);
        }
        if let Ok(secret) = env::var("OAUTH_GATEWAY_SECRET") {
            config = config.with_oauth_gateway_secret(secret);
        }
        Ok(config)
    }
}

fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| DEFAULT_SESSION_KEY_FILE.into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(error) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %error, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {error}"
                )))
            }
        }
    }
}

/// Read an all-or-nothing environment variable group.
///
/// `Ok(None)` when every variable is absent, an error naming the gaps when
/// only some are set.
fn env_group<const N: usize>(names: [&str; N]) -> std::io::Result<Option<[String; N]>> {
    let values = names.map(|name| env::var(name).ok());
    if values.iter().all(Option::is_none) {
        return Ok(None);
    }
    let missing: Vec<&str> = names
        .iter()
        .zip(&values)
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(std::io::Error::other(format!(
            "incomplete configuration group; missing {}",
            missing.join(", ")
        )));
    }
    Ok(Some(values.map(|value| {
        value.unwrap_or_default()
    })))
}

fn load_object_store() -> std::io::Result<Option<ObjectStoreConfig>> {
    let Some([endpoint, bucket, api_key, public_base]) = env_group([
        "STORAGE_ENDPOINT",
        "STORAGE_BUCKET",
        "STORAGE_API_KEY",
        "STORAGE_PUBLIC_BASE",
    ])?
    else {
        return Ok(None);
    };
    let endpoint = endpoint
        .parse::<Url>()
        .map_err(|error| std::io::Error::other(format!("invalid STORAGE_ENDPOINT: {error}")))?;
    let public_base = public_base.parse::<Url>().map_err(|error| {
        std::io::Error::other(format!("invalid STORAGE_PUBLIC_BASE: {error}"))
    })?;
    Ok(Some(ObjectStoreConfig {
        endpoint,
        bucket,
        api_key,
        public_base,
    }))
}

fn load_smtp() -> std::io::Result<Option<SmtpConfig>> {
    let Some([relay, username, password, from]) = env_group([
        "SMTP_RELAY",
        "SMTP_USERNAME",
        "SMTP_PASSWORD",
        "SMTP_FROM",
    ])?
    else {
        return Ok(None);
    };
    Ok(Some(SmtpConfig {
        relay,
        username,
        password,
        from,
    }))
}
