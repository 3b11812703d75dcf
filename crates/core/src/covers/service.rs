//! Cover storage implementation using Apache OpenDAL.

use opendal::{Operator, services};
use uuid::Uuid;

use biblio_shared::config::CoversConfig;

use super::error::CoverError;

/// Maximum accepted cover image size: 5MB.
const MAX_COVER_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types accepted for cover images.
const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Cover image store for the book catalog.
pub struct CoverStorage {
    operator: Operator,
    max_file_size: u64,
}

impl CoverStorage {
    /// Create a cover store from application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be initialized.
    pub fn from_config(config: &CoversConfig) -> Result<Self, CoverError> {
        let operator = Self::create_operator(config)?;
        Ok(Self {
            operator,
            max_file_size: MAX_COVER_BYTES,
        })
    }

    /// Create OpenDAL operator from backend config.
    fn create_operator(config: &CoversConfig) -> Result<Operator, CoverError> {
        match config {
            CoversConfig::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| CoverError::configuration(e.to_string()))?
                    .finish())
            }
            CoversConfig::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| CoverError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| CoverError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Validate an upload against size and MIME constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is too large or of an unaccepted type.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), CoverError> {
        if size > self.max_file_size {
            return Err(CoverError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        if !ALLOWED_MIME_TYPES.contains(&content_type) {
            return Err(CoverError::InvalidMimeType {
                mime_type: content_type.to_string(),
            });
        }

        Ok(())
    }

    /// Store a cover image and return its object key.
    ///
    /// `image_id` is a fresh id minted per upload, so a replacing upload
    /// never collides with the object it replaces.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the backend write fails.
    pub async fn store(
        &self,
        image_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, CoverError> {
        self.validate_upload(content_type, data.len() as u64)?;

        let key = cover_key(image_id, filename);
        self.operator.write(&key, data).await?;

        Ok(key)
    }

    /// Remove a stored cover image.
    ///
    /// A key that is already gone is treated as removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    pub async fn remove(&self, key: &str) -> Result<(), CoverError> {
        match self.operator.delete(key).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Generate the object key for a cover image.
///
/// Format: `covers/{image_id}/{sanitized_filename}`
#[must_use]
pub fn cover_key(image_id: Uuid, filename: &str) -> String {
    format!("covers/{image_id}/{}", sanitize_filename(filename))
}

/// Reduce a client-supplied filename to a safe object-key segment.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "cover".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn local_store() -> CoverStorage {
        CoverStorage::from_config(&CoversConfig::LocalFs {
            root: std::env::temp_dir().join("biblio-cover-tests"),
        })
        .unwrap()
    }

    #[rstest]
    #[case("front.jpg", "front.jpg")]
    #[case("my cover (1).png", "my_cover__1_.png")]
    #[case("../../etc/passwd", ".._.._etc_passwd")]
    #[case("???", "cover")]
    fn test_sanitize_filename(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(input), expected);
    }

    #[test]
    fn test_cover_key_is_scoped_to_book() {
        let id = Uuid::new_v4();
        let key = cover_key(id, "front.jpg");
        assert_eq!(key, format!("covers/{id}/front.jpg"));
    }

    #[test]
    fn test_validate_rejects_oversized_upload() {
        let store = local_store();
        let result = store.validate_upload("image/png", MAX_COVER_BYTES + 1);
        assert!(matches!(result, Err(CoverError::FileTooLarge { .. })));
    }

    #[test]
    fn test_validate_rejects_non_image() {
        let store = local_store();
        let result = store.validate_upload("application/pdf", 100);
        assert!(matches!(result, Err(CoverError::InvalidMimeType { .. })));
    }

    #[test]
    fn test_validate_accepts_small_image() {
        let store = local_store();
        assert!(store.validate_upload("image/jpeg", 100).is_ok());
    }

    #[tokio::test]
    async fn test_store_and_remove_round_trip() {
        let store = local_store();
        let id = Uuid::new_v4();

        let key = store
            .store(id, "front.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])
            .await
            .unwrap();
        assert_eq!(key, format!("covers/{id}/front.png"));

        store.remove(&key).await.unwrap();
        // Removing an already-removed key is not an error.
        store.remove(&key).await.unwrap();
    }
}
