//! Image upload pipeline: validate, decode, store, return a public URL.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{MediaStore, MediaStoreError};
use crate::domain::{Error, ImagePayload};

/// Driving port for image uploads.
///
/// The listing lifecycle invokes this when a create request carries an image
/// payload; the standalone upload endpoint calls it directly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Validate and store a data-URL payload, returning the public URL.
    async fn upload(&self, raw_payload: &str) -> Result<String, Error>;
}

/// Media-store backed implementation of [`ImageUploader`].
#[derive(Clone)]
pub struct ImageUploadService {
    media: Arc<dyn MediaStore>,
}

impl ImageUploadService {
    /// Build the pipeline over a media store.
    pub fn new(media: Arc<dyn MediaStore>) -> Self {
        Self { media }
    }
}

#[async_trait]
impl ImageUploader for ImageUploadService {
    async fn upload(&self, raw_payload: &str) -> Result<String, Error> {
        let payload = ImagePayload::parse(raw_payload)?;
        let key = payload.storage_key();
        // No retry here: the caller may retry the whole upload.
        self.media
            .put(&key, payload.bytes(), payload.content_type())
            .await
            .map_err(|error: MediaStoreError| {
                tracing::error!(error = %error, key, "image upload failed");
                Error::internal("Unable to upload image to storage")
            })
    }
}
