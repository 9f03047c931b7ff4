//! Error taxonomy of the link service.

use thiserror::Error;

use crate::domain::errors::StorageError;

/// Outcome of a failed [`crate::application::services::LinkService`] operation.
///
/// `NotFound`, `DuplicateShortenedUrl` and `InvalidData` are expected domain
/// failures. `ExportFailed` covers any stage of the report pipeline.
/// `Storage` carries an unexpected backend failure and is reported to clients
/// without detail.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Link not found")]
    NotFound,
    #[error("Shortened URL already exists")]
    DuplicateShortenedUrl,
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Failed to export links: {0}")]
    ExportFailed(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            LinkError::DuplicateShortenedUrl.to_string(),
            "Shortened URL already exists"
        );
        assert_eq!(LinkError::NotFound.to_string(), "Link not found");
    }

    #[test]
    fn test_storage_error_message_is_passed_through() {
        let err = LinkError::from(StorageError::Unavailable("down".to_string()));
        assert_eq!(err.to_string(), "storage backend unavailable: down");
    }
}
