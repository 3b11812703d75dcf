//! Cover storage error types.

use thiserror::Error;

/// Cover storage operation errors.
#[derive(Debug, Error)]
pub enum CoverError {
    /// Image size exceeds maximum allowed.
    #[error("cover image {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual image size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// MIME type not allowed.
    #[error("MIME type '{mime_type}' is not an accepted cover image type")]
    InvalidMimeType {
        /// The rejected MIME type.
        mime_type: String,
    },

    /// Object not found in storage.
    #[error("cover not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage backend configuration error.
    #[error("cover storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("cover storage operation failed: {0}")]
    Operation(String),
}

impl CoverError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<opendal::Error> for CoverError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }
}
