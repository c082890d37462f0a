//! Reqwest-backed object-storage adapter for listing images.
//!
//! This adapter owns transport details only: authenticated upsert writes,
//! deletes addressed by public URL, timeout and HTTP error mapping. The
//! storage API is the bucket/object scheme used by hosted object stores:
//! `{endpoint}/object/{bucket}/{key}` for writes and deletes, with objects
//! served publicly under a separate base URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{MediaStore, MediaStoreError};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the storage service.
pub struct ObjectStoreConfig {
    /// Base URL of the storage API, e.g. `https://xyz.storage.example/storage/v1`.
    pub endpoint: Url,
    /// Bucket holding listing images.
    pub bucket: String,
    /// Bearer token authorising writes and deletes.
    pub api_key: String,
    /// Base URL under which stored objects are publicly served.
    pub public_base: Url,
}

/// Media store adapter performing authenticated HTTP calls against one bucket.
pub struct HttpObjectStore {
    client: Client,
    endpoint: Url,
    bucket: String,
    api_key: String,
    public_base: Url,
}

impl HttpObjectStore {
    /// Build an adapter using a reqwest client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: ObjectStoreConfig) -> Result<Self, reqwest::Error> {
        Self::with_timeout(config, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        config: ObjectStoreConfig,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            bucket: config.bucket,
            api_key: config.api_key,
            public_base: config.public_base,
        })
    }

    fn object_url(&self, key: &str) -> Result<Url, MediaStoreError> {
        object_url(&self.endpoint, &self.bucket, key).map_err(|message| {
            MediaStoreError::Write { message }
        })
    }

    fn public_url(&self, key: &str) -> Result<String, MediaStoreError> {
        join_segments(&self.public_base, &self.bucket, key)
            .map(|url| url.to_string())
            .map_err(|message| MediaStoreError::Write { message })
    }

    /// Recover the storage key from a public URL previously returned by
    /// [`MediaStore::put`]. `None` when the URL is not under this store's
    /// public base or names a different bucket.
    fn key_for(&self, url: &str) -> Option<String> {
        key_for(&self.public_base, &self.bucket, url)
    }
}

#[async_trait]
impl MediaStore for HttpObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, MediaStoreError> {
        let target = self.object_url(key)?;
        let response = self
            .client
            .put(target)
            .bearer_auth(&self.api_key)
            // Re-running an interrupted upload must not fail on the replay.
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|error| MediaStoreError::Write {
                message: error.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(MediaStoreError::Write {
                message: status_message(status, body.as_ref()),
            });
        }
        self.public_url(key)
    }

    async fn delete(&self, url: &str) -> Result<bool, MediaStoreError> {
        let Some(key) = self.key_for(url) else {
            return Ok(false);
        };
        let target = object_url(&self.endpoint, &self.bucket, &key)
            .map_err(|message| MediaStoreError::Delete { message })?;
        let response = self
            .client
            .delete(target)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|error| MediaStoreError::Delete {
                message: error.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(MediaStoreError::Delete {
                message: status_message(status, body.as_ref()),
            });
        }
        Ok(true)
    }
}

fn object_url(endpoint: &Url, bucket: &str, key: &str) -> Result<Url, String> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|()| "storage endpoint cannot carry path segments".to_owned())?
        .pop_if_empty()
        .extend(["object", bucket, key]);
    Ok(url)
}

fn join_segments(base: &Url, bucket: &str, key: &str) -> Result<Url, String> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| "public base URL cannot carry path segments".to_owned())?
        .pop_if_empty()
        .extend([bucket, key]);
    Ok(url)
}

fn key_for(public_base: &Url, bucket: &str, url: &str) -> Option<String> {
    let base = public_base.as_str().trim_end_matches('/');
    let rest = url.strip_prefix(base)?.trim_start_matches('/');
    let (url_bucket, key) = rest.split_once('/')?;
    if url_bucket != bucket || key.is_empty() {
        return None;
    }
    Some(key.to_owned())
}

fn status_message(status: StatusCode, body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    }
}
