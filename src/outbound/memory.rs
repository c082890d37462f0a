//! In-memory adapters for local development and tests.
//!
//! These back every port with a mutex-guarded map. They honour the same
//! contracts as the production adapters (unique emails, atomic token
//! consumption, URL-addressed media) so the service layer behaves
//! identically against either set.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ConsumeOutcome, ListingRepository, ListingRepositoryError, Mailer, MailerError, MediaStore,
    MediaStoreError, TokenStore, TokenStoreError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    EmailAddress, Listing, ListingId, TokenValue, User, UserId, VerificationToken,
};

fn poisoned<E>(build: impl FnOnce(String) -> E) -> E {
    build("lock poisoned".to_owned())
}

/// Users keyed by id with a unique-email constraint.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| poisoned(|message| UserRepositoryError::Backend { message }))?;
        if users.values().any(|existing| existing.email() == user.email()) {
            return Err(UserRepositoryError::DuplicateEmail);
        }
        users.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let users = self
            .users
            .lock()
            .map_err(|_| poisoned(|message| UserRepositoryError::Backend { message }))?;
        Ok(users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let users = self
            .users
            .lock()
            .map_err(|_| poisoned(|message| UserRepositoryError::Backend { message }))?;
        Ok(users.values().find(|user| user.email() == email).cloned())
    }
}

/// Listings keyed by id.
#[derive(Default)]
pub struct InMemoryListingRepository {
    listings: Mutex<HashMap<ListingId, Listing>>,
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError> {
        let mut listings = self
            .listings
            .lock()
            .map_err(|_| poisoned(|message| ListingRepositoryError::Backend { message }))?;
        listings.insert(*listing.id(), listing.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ListingId,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let listings = self
            .listings
            .lock()
            .map_err(|_| poisoned(|message| ListingRepositoryError::Backend { message }))?;
        Ok(listings.get(id).cloned())
    }

    async fn update(&self, listing: &Listing) -> Result<(), ListingRepositoryError> {
        let mut listings = self
            .listings
            .lock()
            .map_err(|_| poisoned(|message| ListingRepositoryError::Backend { message }))?;
        listings.insert(*listing.id(), listing.clone());
        Ok(())
    }

    async fn delete(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut listings = self
            .listings
            .lock()
            .map_err(|_| poisoned(|message| ListingRepositoryError::Backend { message }))?;
        Ok(listings.remove(id))
    }

    async fn owned_by(
        &self,
        owner: &UserId,
        id: &ListingId,
    ) -> Result<bool, ListingRepositoryError> {
        let listings = self
            .listings
            .lock()
            .map_err(|_| poisoned(|message| ListingRepositoryError::Backend { message }))?;
        Ok(listings
            .get(id)
            .is_some_and(|listing| listing.owner_id() == owner))
    }
}

/// Single-use token store with atomic consumption under one lock.
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: Mutex<HashMap<String, VerificationToken>>,
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn insert(&self, token: &VerificationToken) -> Result<(), TokenStoreError> {
        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| poisoned(|message| TokenStoreError::Backend { message }))?;
        tokens.insert(token.value().as_ref().to_owned(), token.clone());
        Ok(())
    }

    async fn consume(
        &self,
        value: &TokenValue,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, TokenStoreError> {
        // Holding the lock across check-and-mark makes the consume atomic;
        // of two racing redemptions exactly one observes `Consumed`.
        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| poisoned(|message| TokenStoreError::Backend { message }))?;
        let Some(token) = tokens.get_mut(value.as_ref()) else {
            return Ok(ConsumeOutcome::Missing);
        };
        if token.is_consumed() {
            return Ok(ConsumeOutcome::AlreadyUsed);
        }
        if token.is_expired(now) {
            return Ok(ConsumeOutcome::Expired);
        }
        token.mark_consumed();
        Ok(ConsumeOutcome::Consumed {
            email: token.email().clone(),
        })
    }
}

/// Media store keeping object bytes in a map keyed by storage key.
pub struct InMemoryMediaStore {
    public_base: String,
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl InMemoryMediaStore {
    /// Create a store whose public URLs hang off `public_base`.
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into().trim_end_matches('/').to_owned(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Whether an object is currently stored under the given public URL.
    pub fn contains(&self, url: &str) -> bool {
        let Some(key) = self.key_for(url) else {
            return false;
        };
        self.objects
            .lock()
            .map(|objects| objects.contains_key(&key))
            .unwrap_or(false)
    }

    fn key_for(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.public_base)
            .map(|rest| rest.trim_start_matches('/').to_owned())
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, MediaStoreError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| poisoned(|message| MediaStoreError::Write { message }))?;
        objects.insert(key.to_owned(), (bytes.to_vec(), content_type.to_owned()));
        Ok(format!("{}/{key}", self.public_base))
    }

    async fn delete(&self, url: &str) -> Result<bool, MediaStoreError> {
        let Some(key) = self.key_for(url) else {
            return Ok(false);
        };
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| poisoned(|message| MediaStoreError::Delete { message }))?;
        Ok(objects.remove(&key).is_some())
    }
}

/// Mailer that logs instead of sending; development fallback when no SMTP
/// relay is configured.
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send_sign_in_link(
        &self,
        to: &EmailAddress,
        sign_in_url: &str,
    ) -> Result<(), MailerError> {
        tracing::info!(recipient = %to, url = sign_in_url, "sign-in link (not sent: no relay configured)");
        Ok(())
    }

    async fn send_welcome(&self, to: &EmailAddress) -> Result<(), MailerError> {
        tracing::info!(recipient = %to, "welcome email (not sent: no relay configured)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::magic_link_ttl;
    use chrono::Utc;

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::new(raw).expect("valid email")
    }

    #[tokio::test]
    async fn user_repository_enforces_unique_emails() {
        let repo = InMemoryUserRepository::default();
        let first = User::new(UserId::random(), email("a@x.com"), None);
        let second = User::new(UserId::random(), email("a@x.com"), None);

        repo.insert(&first).await.expect("first insert");
        let err = repo.insert(&second).await.expect_err("duplicate");
        assert_eq!(err, UserRepositoryError::DuplicateEmail);
        let found = repo.find_by_email(&email("a@x.com")).await.expect("query");
        assert_eq!(found.as_ref().map(User::id), Some(first.id()));
    }

    #[tokio::test]
    async fn owned_by_reports_false_for_missing_and_foreign_listings() {
        let repo = InMemoryListingRepository::default();
        let owner = UserId::random();
        let draft =
            crate::domain::ListingDraft::try_new("Loft", "desc", 10, 1, 1, 1).expect("draft");
        let listing = Listing::create(ListingId::random(), owner, draft, None);
        repo.insert(&listing).await.expect("insert");

        assert!(repo.owned_by(&owner, listing.id()).await.expect("owned"));
        assert!(
            !repo
                .owned_by(&UserId::random(), listing.id())
                .await
                .expect("foreign")
        );
        assert!(
            !repo
                .owned_by(&owner, &ListingId::random())
                .await
                .expect("missing")
        );
    }

    #[tokio::test]
    async fn token_consume_is_single_use() {
        let store = InMemoryTokenStore::default();
        let now = Utc::now();
        let token = VerificationToken::issue(email("a@x.com"), now);
        store.insert(&token).await.expect("insert");

        let first = store.consume(token.value(), now).await.expect("consume");
        assert!(matches!(first, ConsumeOutcome::Consumed { .. }));
        let second = store.consume(token.value(), now).await.expect("consume");
        assert_eq!(second, ConsumeOutcome::AlreadyUsed);
    }

    #[tokio::test]
    async fn token_consume_reports_expiry_after_the_window() {
        let store = InMemoryTokenStore::default();
        let issued = Utc::now();
        let token = VerificationToken::issue(email("a@x.com"), issued);
        store.insert(&token).await.expect("insert");

        let late = issued + magic_link_ttl() + chrono::Duration::seconds(1);
        let outcome = store.consume(token.value(), late).await.expect("consume");
        assert_eq!(outcome, ConsumeOutcome::Expired);
    }

    #[tokio::test]
    async fn consumed_tokens_stay_already_used_past_expiry() {
        let store = InMemoryTokenStore::default();
        let issued = Utc::now();
        let token = VerificationToken::issue(email("a@x.com"), issued);
        store.insert(&token).await.expect("insert");
        store.consume(token.value(), issued).await.expect("consume");

        let late = issued + magic_link_ttl() + chrono::Duration::seconds(1);
        let outcome = store.consume(token.value(), late).await.expect("consume");
        assert_eq!(outcome, ConsumeOutcome::AlreadyUsed);
    }

    #[tokio::test]
    async fn media_store_round_trips_and_deletes_by_url() {
        let store = InMemoryMediaStore::new("https://media.test");
        let url = store
            .put("abc.png", b"bytes", "image/png")
            .await
            .expect("put");
        assert_eq!(url, "https://media.test/abc.png");
        assert!(store.contains(&url));

        assert!(store.delete(&url).await.expect("delete"));
        assert!(!store.contains(&url));
        // A second delete reports the object as already gone.
        assert!(!store.delete(&url).await.expect("redelete"));
    }

    #[tokio::test]
    async fn media_store_ignores_foreign_urls() {
        let store = InMemoryMediaStore::new("https://media.test");
        assert!(
            !store
                .delete("https://elsewhere.test/abc.png")
                .await
                .expect("delete")
        );
    }
}
