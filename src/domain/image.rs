//! Inbound image payload decoding and validation.
//!
//! Uploads arrive as data URLs: a content-type marker followed by the
//! base64-encoded image bytes (`data:image/png;base64,...`). The size cap is
//! enforced on the encoded body before decoding so an oversized payload never
//! allocates its decoded form.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::domain::Error;

/// Maximum accepted decoded image size: 10 MiB.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

// Base64 inflates by 4/3 plus padding.
/// Base64 length ceiling corresponding to [`MAX_IMAGE_BYTES`], checked before
/// any decode work happens.
pub const MAX_ENCODED_LEN: usize = MAX_IMAGE_BYTES / 3 * 4 + 4;

fn malformed() -> Error {
    Error::invalid_request("Image data not valid")
}

/// Decoded image payload ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    content_type: String,
    bytes: Vec<u8>,
}

impl ImagePayload {
    /// Parse and decode a data-URL payload.
    ///
    /// Validation order: presence, data-URL shape, size cap, base64 decode.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        if raw.trim().is_empty() {
            return Err(Error::invalid_request("No image provided"));
        }
        let rest = raw.strip_prefix("data:").ok_or_else(malformed)?;
        let (content_type, body) = rest.split_once(";base64,").ok_or_else(malformed)?;
        if content_type.is_empty() || !content_type.contains('/') {
            return Err(malformed());
        }
        if body.len() > MAX_ENCODED_LEN {
            return Err(Error::payload_too_large("Image exceeds the 10 MiB limit"));
        }
        let bytes = STANDARD.decode(body).map_err(|_| malformed())?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(Error::payload_too_large("Image exceeds the 10 MiB limit"));
        }
        Ok(Self {
            content_type: content_type.to_owned(),
            bytes,
        })
    }

    /// Declared content type, e.g. `image/png`.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Decoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File extension derived from the content type.
    pub fn extension(&self) -> &str {
        self.content_type
            .split_once('/')
            .map_or("bin", |(_, subtype)| subtype)
    }

    /// Synthesise a collision-resistant storage key for this payload.
    ///
    /// The random name makes collisions astronomically unlikely; writes still
    /// use upsert semantics so a collision cannot surface as a latent failure.
    pub fn storage_key(&self) -> String {
        format!("{}.{}", nanoid::nanoid!(), self.extension())
    }
}
