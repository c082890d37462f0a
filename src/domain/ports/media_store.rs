//! Port abstraction for the object-storage backend holding listing images.
//!
//! The store owns the physical bytes; listings only hold the public URL the
//! store returned. Adapters are expected to bound every call with a timeout
//! and map timeouts to the corresponding failure variant.

use async_trait::async_trait;

/// Storage errors raised by media store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaStoreError {
    /// The object could not be written.
    #[error("media store write failed: {message}")]
    Write { message: String },
    /// The object could not be deleted.
    #[error("media store delete failed: {message}")]
    Delete { message: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Write `bytes` under `key` with overwrite-if-exists semantics and
    /// return the stable public URL for the object.
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, MediaStoreError>;

    /// Delete the object a previously returned public URL points at.
    ///
    /// Returns `false` when the URL does not reference an object in this
    /// store (unknown prefix or already gone).
    async fn delete(&self, url: &str) -> Result<bool, MediaStoreError>;
}
