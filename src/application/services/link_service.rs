//! Link lifecycle and report export service.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::error::LinkError;
use crate::domain::entities::{Link, LinkPage, LinkPatch, NewLink};
use crate::domain::errors::StorageError;
use crate::domain::repositories::LinkRepository;
use crate::domain::storage::{ObjectStorage, UploadRequest};
use crate::utils::csv_report::{CSV_CONTENT_TYPE, csv_report_stream};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a single listing call returns.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Where and how long report exports may run.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Object storage folder reports are uploaded to.
    pub folder: String,
    /// Upper bound for the whole scan-encode-upload pipeline.
    pub timeout: Duration,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            folder: "downloads".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Service for creating, resolving, updating and exporting links.
///
/// Existence and uniqueness checks run here before the repository is touched.
/// The storage backend stays the final arbiter of key uniqueness, so a
/// collision it reports after a passing pre-check is still mapped to
/// [`LinkError::DuplicateShortenedUrl`].
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    object_storage: Arc<dyn ObjectStorage>,
    export: ExportSettings,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        object_storage: Arc<dyn ObjectStorage>,
        export: ExportSettings,
    ) -> Self {
        Self {
            repository,
            object_storage,
            export,
        }
    }

    /// Creates a link under a caller-chosen key.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::DuplicateShortenedUrl`] if the key is taken.
    pub async fn create_link(
        &self,
        original_url: String,
        shortened_url: String,
    ) -> Result<Link, LinkError> {
        if self
            .repository
            .find_by_shortened_url(&shortened_url)
            .await?
            .is_some()
        {
            return Err(LinkError::DuplicateShortenedUrl);
        }

        let link = self
            .repository
            .create(NewLink {
                original_url,
                shortened_url,
            })
            .await
            .map_err(|e| match e {
                StorageError::DuplicateKey => {
                    warn!("Shortened URL taken by a concurrent create");
                    LinkError::DuplicateShortenedUrl
                }
                other => LinkError::Storage(other),
            })?;

        info!(id = %link.id, shortened_url = %link.shortened_url, "Link created");

        Ok(link)
    }

    /// Applies a partial update to the link currently stored under `shortened_url`.
    ///
    /// # Errors
    ///
    /// - [`LinkError::NotFound`] if no link has that key
    /// - [`LinkError::DuplicateShortenedUrl`] if the new key belongs to another link
    /// - [`LinkError::InvalidData`] if the patch is empty or storage rejects it
    pub async fn update_link(
        &self,
        shortened_url: &str,
        patch: LinkPatch,
    ) -> Result<Link, LinkError> {
        if patch.is_empty() {
            return Err(LinkError::InvalidData(
                "At least one field must be provided".to_string(),
            ));
        }

        let link = self.find_existing(shortened_url).await?;

        if let Some(new_key) = &patch.shortened_url
            && *new_key != link.shortened_url
            && let Some(owner) = self.repository.find_by_shortened_url(new_key).await?
            && owner.id != link.id
        {
            return Err(LinkError::DuplicateShortenedUrl);
        }

        self.repository
            .update(link.id, patch)
            .await
            .map_err(|e| match e {
                StorageError::DuplicateKey => LinkError::DuplicateShortenedUrl,
                StorageError::NotFound => LinkError::NotFound,
                StorageError::InvalidData(reason) | StorageError::Query(reason) => {
                    LinkError::InvalidData(reason)
                }
                other => LinkError::Storage(other),
            })
    }

    /// Deletes the link stored under `shortened_url`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::NotFound`] if no link has that key.
    pub async fn delete_link(&self, shortened_url: &str) -> Result<(), LinkError> {
        let link = self.find_existing(shortened_url).await?;

        self.repository.delete(link.id).await.map_err(|e| match e {
            StorageError::NotFound => LinkError::NotFound,
            other => LinkError::Storage(other),
        })?;

        info!(id = %link.id, shortened_url, "Link deleted");

        Ok(())
    }

    /// Resolves a key to its original URL without counting an access.
    pub async fn get_original_url(&self, shortened_url: &str) -> Result<String, LinkError> {
        Ok(self.find_existing(shortened_url).await?.original_url)
    }

    /// Resolves a key to its full link.
    pub async fn get_link(&self, shortened_url: &str) -> Result<Link, LinkError> {
        self.find_existing(shortened_url).await
    }

    /// Counts one access of `shortened_url` and returns the redirect target.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::NotFound`] if no link has that key.
    pub async fn increment_access_count(&self, shortened_url: &str) -> Result<String, LinkError> {
        let link = self.find_existing(shortened_url).await?;
        self.repository.increment_access_count(shortened_url).await?;

        Ok(link.original_url)
    }

    /// Current access count of `shortened_url`.
    pub async fn get_access_count(&self, shortened_url: &str) -> Result<i64, LinkError> {
        self.find_existing(shortened_url).await?;

        Ok(self.repository.get_access_count(shortened_url).await?)
    }

    /// Lists links in id order, `limit` per page (default [`DEFAULT_PAGE_SIZE`],
    /// capped at [`MAX_PAGE_SIZE`]), starting after `cursor`.
    pub async fn list_links(
        &self,
        limit: Option<u32>,
        cursor: Option<Uuid>,
    ) -> Result<LinkPage, LinkError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        Ok(self.repository.get_all_links(limit, cursor).await?)
    }

    /// Exports all links as a CSV report and returns its public URL.
    ///
    /// Rows are streamed from the repository through the CSV encoder into the
    /// object storage upload; nothing is buffered beyond one chunk. The call
    /// returns only once the object is fully written and published.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::ExportFailed`] if reading, encoding or uploading
    /// fails, or if the pipeline exceeds the configured export timeout.
    pub async fn export_links_to_csv(&self) -> Result<String, LinkError> {
        let request = UploadRequest {
            folder: self.export.folder.clone(),
            file_name: format!("{}-links.csv", Uuid::now_v7()),
            content_type: CSV_CONTENT_TYPE.to_string(),
            body: csv_report_stream(self.repository.stream_all_links()),
        };

        let stored = tokio::time::timeout(self.export.timeout, self.object_storage.upload(request))
            .await
            .map_err(|_| {
                error!(timeout_secs = self.export.timeout.as_secs(), "Link export timed out");
                LinkError::ExportFailed(format!(
                    "timed out after {}s",
                    self.export.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                error!(error = %e, "Link export failed");
                LinkError::ExportFailed(e.to_string())
            })?;

        info!(key = %stored.key, size = stored.size, "Links exported");

        Ok(stored.url)
    }

    /// Reports whether the link repository is reachable.
    pub async fn repository_healthy(&self) -> bool {
        self.repository.health_check().await
    }

    /// Reports whether the report storage accepts writes.
    pub async fn object_storage_healthy(&self) -> bool {
        self.object_storage.health_check().await
    }

    async fn find_existing(&self, shortened_url: &str) -> Result<Link, LinkError> {
        self.repository
            .find_by_shortened_url(shortened_url)
            .await?
            .ok_or(LinkError::NotFound)
    }
}
