//! Repository trait for short link data access.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use uuid::Uuid;

use crate::domain::entities::{ExportRow, Link, LinkPage, LinkPatch, NewLink};
use crate::domain::errors::StorageResult;

/// Lazy, single-pass sequence of report rows ordered by link id.
pub type ExportRowStream = BoxStream<'static, StorageResult<ExportRow>>;

/// Repository interface for managing short links.
///
/// Lookups return `Ok(None)` on a miss; the service layer decides whether a
/// miss is an error. Uniqueness of `shortened_url` is enforced by the backend,
/// which reports a collision as [`StorageError::DuplicateKey`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - in-process maps
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
///
/// [`StorageError::DuplicateKey`]: crate::domain::errors::StorageError::DuplicateKey
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link by its shortened key (exact match).
    async fn find_by_shortened_url(&self, shortened_url: &str) -> StorageResult<Option<Link>>;

    /// Finds a link by id.
    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Link>>;

    /// Inserts a new link with a fresh id, `access_count = 0` and `created_at = now`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DuplicateKey`] if the key is already taken.
    ///
    /// [`StorageError::DuplicateKey`]: crate::domain::errors::StorageError::DuplicateKey
    async fn create(&self, new_link: NewLink) -> StorageResult<Link>;

    /// Applies the provided fields of `patch` to the link with `id`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if no link has this id
    /// - [`StorageError::DuplicateKey`] if the new key collides with another link
    ///
    /// [`StorageError::NotFound`]: crate::domain::errors::StorageError::NotFound
    /// [`StorageError::DuplicateKey`]: crate::domain::errors::StorageError::DuplicateKey
    async fn update(&self, id: Uuid, patch: LinkPatch) -> StorageResult<Link>;

    /// Removes the link with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no link has this id.
    ///
    /// [`StorageError::NotFound`]: crate::domain::errors::StorageError::NotFound
    async fn delete(&self, id: Uuid) -> StorageResult<()>;

    /// Adds one to the access counter of the link with this key.
    ///
    /// A missing key is a no-op.
    async fn increment_access_count(&self, shortened_url: &str) -> StorageResult<()>;

    /// Returns the access counter for this key, or 0 when absent.
    async fn get_access_count(&self, shortened_url: &str) -> StorageResult<i64>;

    /// Returns up to `limit` links with `id > cursor`, ascending by id.
    ///
    /// `next_cursor` is set to the id of the last returned link only when
    /// more links follow it.
    async fn get_all_links(&self, limit: u32, cursor: Option<Uuid>) -> StorageResult<LinkPage>;

    /// Streams every link as a report row, ascending by id.
    ///
    /// Rows are produced on demand; dropping the stream stops the scan.
    fn stream_all_links(&self) -> ExportRowStream;

    /// Reports whether the backend is reachable.
    async fn health_check(&self) -> bool;
}
