//! Object storage contract used to publish generated reports.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::io;
use thiserror::Error;

/// Chunked object body. The uploader pulls chunks as fast as it can write them.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Errors that can occur while uploading an object.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The body stream yielded an error before it was exhausted.
    #[error("upload body failed: {0}")]
    Source(#[source] io::Error),
    /// The backend could not persist or publish the object.
    #[error("object write failed: {0}")]
    Sink(#[source] io::Error),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
}

/// An object to upload under `folder/file_name`.
pub struct UploadRequest {
    pub folder: String,
    pub file_name: String,
    pub content_type: String,
    pub body: ByteStream,
}

impl UploadRequest {
    /// Full object key, `folder/file_name`.
    pub fn key(&self) -> String {
        format!(
            "{}/{}",
            self.folder.trim_matches('/'),
            self.file_name.trim_start_matches('/')
        )
    }
}

/// Metadata of a published object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// Publicly fetchable URL of the object.
    pub url: String,
    pub size: u64,
    pub content_type: String,
}

/// Storage backend that publishes uploaded objects under a public URL.
///
/// Implementations must consume `body` to the end before returning success.
/// If the body or the write fails, nothing is published and the remaining
/// body is dropped.
///
/// Implemented by [`crate::infrastructure::storage::ObjectStoreStorage`] for
/// local directories, process memory and S3 buckets.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Uploads `request.body` and returns where it can be fetched.
    async fn upload(&self, request: UploadRequest) -> Result<StoredObject, UploadError>;

    /// Reports whether the backend can accept writes.
    async fn health_check(&self) -> bool;
}

/// Rejects keys that could escape the storage root.
pub fn validate_key_segment(segment: &str) -> Result<(), UploadError> {
    let invalid = segment.is_empty()
        || segment.split('/').any(|part| part.is_empty() || part == "." || part == "..")
        || segment.contains('\\');

    if invalid {
        return Err(UploadError::InvalidKey(segment.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn request(folder: &str, file_name: &str) -> UploadRequest {
        UploadRequest {
            folder: folder.to_string(),
            file_name: file_name.to_string(),
            content_type: "text/csv".to_string(),
            body: Box::pin(stream::empty::<io::Result<Bytes>>()),
        }
    }

    #[test]
    fn test_key_joins_folder_and_file() {
        assert_eq!(request("downloads", "a.csv").key(), "downloads/a.csv");
        assert_eq!(request("/downloads/", "a.csv").key(), "downloads/a.csv");
    }

    #[test]
    fn test_validate_key_segment() {
        assert!(validate_key_segment("downloads/a.csv").is_ok());
        assert!(validate_key_segment("../etc/passwd").is_err());
        assert!(validate_key_segment("downloads//a.csv").is_err());
        assert!(validate_key_segment("").is_err());
        assert!(validate_key_segment("a\\b").is_err());
    }
}
