//! In-process implementation of link repository.

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{ExportRow, Link, LinkPage, LinkPatch, NewLink};
use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::repositories::{ExportRowStream, LinkRepository};

/// Rows copied out per read lock while streaming an export.
const SCAN_BATCH: usize = 64;

#[derive(Debug, Default)]
struct Store {
    /// Links ordered by id, which is also the pagination order.
    links: BTreeMap<Uuid, Link>,
    /// Unique index over `shortened_url`.
    keys: HashMap<String, Uuid>,
}

impl Store {
    fn by_key(&self, shortened_url: &str) -> Option<&Link> {
        self.keys
            .get(shortened_url)
            .and_then(|id| self.links.get(id))
    }

    /// Up to `limit` export rows with ids strictly after `after`.
    fn rows_after(&self, after: Option<Uuid>, limit: usize) -> Vec<(Uuid, ExportRow)> {
        let lower = after.map_or(Bound::Unbounded, Bound::Excluded);
        self.links
            .range((lower, Bound::Unbounded))
            .take(limit)
            .map(|(id, link)| (*id, link.to_export_row()))
            .collect()
    }
}

/// Link repository backed by in-memory maps.
///
/// All writes happen under one write lock, so the key index and the link map
/// never disagree and uniqueness is checked atomically with the insert.
/// Data is lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLinkRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryLinkRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub async fn len(&self) -> usize {
        self.store.read().await.links.len()
    }

    /// Returns true if no links are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn find_by_shortened_url(&self, shortened_url: &str) -> StorageResult<Option<Link>> {
        Ok(self.store.read().await.by_key(shortened_url).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Link>> {
        Ok(self.store.read().await.links.get(&id).cloned())
    }

    async fn create(&self, new_link: NewLink) -> StorageResult<Link> {
        let mut store = self.store.write().await;

        if store.keys.contains_key(&new_link.shortened_url) {
            return Err(StorageError::DuplicateKey);
        }

        let link = Link::from_new(new_link);
        store.keys.insert(link.shortened_url.clone(), link.id);
        store.links.insert(link.id, link.clone());

        Ok(link)
    }

    async fn update(&self, id: Uuid, patch: LinkPatch) -> StorageResult<Link> {
        let mut store = self.store.write().await;

        let current_key = store
            .links
            .get(&id)
            .map(|link| link.shortened_url.clone())
            .ok_or(StorageError::NotFound)?;

        if let Some(new_key) = &patch.shortened_url
            && *new_key != current_key
        {
            if store.keys.contains_key(new_key) {
                return Err(StorageError::DuplicateKey);
            }
            store.keys.remove(&current_key);
            store.keys.insert(new_key.clone(), id);
        }

        let link = store.links.get_mut(&id).ok_or(StorageError::NotFound)?;
        if let Some(original_url) = patch.original_url {
            link.original_url = original_url;
        }
        if let Some(shortened_url) = patch.shortened_url {
            link.shortened_url = shortened_url;
        }

        Ok(link.clone())
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let mut store = self.store.write().await;

        let link = store.links.remove(&id).ok_or(StorageError::NotFound)?;
        store.keys.remove(&link.shortened_url);

        Ok(())
    }

    async fn increment_access_count(&self, shortened_url: &str) -> StorageResult<()> {
        let mut store = self.store.write().await;

        let Some(id) = store.keys.get(shortened_url).copied() else {
            return Ok(());
        };
        if let Some(link) = store.links.get_mut(&id) {
            link.access_count += 1;
        }

        Ok(())
    }

    async fn get_access_count(&self, shortened_url: &str) -> StorageResult<i64> {
        Ok(self
            .store
            .read()
            .await
            .by_key(shortened_url)
            .map_or(0, |link| link.access_count))
    }

    async fn get_all_links(&self, limit: u32, cursor: Option<Uuid>) -> StorageResult<LinkPage> {
        let store = self.store.read().await;

        let lower = cursor.map_or(Bound::Unbounded, Bound::Excluded);
        let links = store
            .links
            .range((lower, Bound::Unbounded))
            .take(limit as usize + 1)
            .map(|(_, link)| link.clone())
            .collect();

        Ok(LinkPage::from_overfetch(links, limit as usize))
    }

    fn stream_all_links(&self) -> ExportRowStream {
        let store = self.store.clone();

        // Walks the id order in batches, taking the read lock once per batch.
        let batches = stream::unfold((None, false), move |(after, done): (Option<Uuid>, bool)| {
            let store = store.clone();
            async move {
                if done {
                    return None;
                }
                let batch = store.read().await.rows_after(after, SCAN_BATCH);
                let last = batch.last().map(|(id, _)| *id)?;
                let done = batch.len() < SCAN_BATCH;
                let rows: Vec<ExportRow> = batch.into_iter().map(|(_, row)| row).collect();
                Some((rows, (Some(last), done)))
            }
        });

        Box::pin(batches.flat_map(|rows| {
            stream::iter(rows.into_iter().map(Ok::<ExportRow, StorageError>))
        }))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
