//! Report storage on top of the `object_store` crate.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectMeta, ObjectStore, WriteMultipart};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};
use url::Url;

use super::location::{StoreConfigError, StoreLocation};
use crate::domain::storage::{
    ByteStream, ObjectStorage, StoredObject, UploadError, UploadRequest, validate_key_segment,
};

/// Parts buffered or in flight before the body stops being polled.
const MAX_PARTS_IN_FLIGHT: usize = 4;

/// Publishes reports to any [`ObjectStore`] and returns URLs under `public_base_url`.
///
/// Bodies go through a multipart upload, so the object only appears once the
/// upload completes. A failed, timed-out or dropped upload is aborted, which
/// removes whatever the backend staged.
#[derive(Debug, Clone)]
pub struct ObjectStoreStorage {
    store: Arc<dyn ObjectStore>,
    prefix: ObjectPath,
    public_base_url: Url,
    /// `LocalFileSystem` rejects object attributes, so only remote and
    /// in-memory stores record the content type.
    store_content_type: bool,
}

impl ObjectStoreStorage {
    /// Opens the backend named by `location`.
    pub async fn open(
        location: &StoreLocation,
        public_base_url: Url,
    ) -> Result<Self, StoreConfigError> {
        match location {
            StoreLocation::Local(root) => Self::local(root, public_base_url).await,
            StoreLocation::Memory => Ok(Self::in_memory(public_base_url)),
            StoreLocation::S3 {
                bucket,
                prefix,
                region,
            } => {
                let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
                if let Some(region) = region {
                    builder = builder.with_region(region);
                }

                Ok(Self::new(
                    Arc::new(builder.build()?),
                    ObjectPath::from(prefix.as_str()),
                    public_base_url,
                    true,
                ))
            }
        }
    }

    /// Stores reports as files under `root`, creating it if needed.
    pub async fn local(
        root: impl AsRef<Path>,
        public_base_url: Url,
    ) -> Result<Self, StoreConfigError> {
        let root = root.as_ref();
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|source| StoreConfigError::Directory {
                path: root.to_path_buf(),
                source,
            })?;

        let store = LocalFileSystem::new_with_prefix(root)?;

        Ok(Self::new(
            Arc::new(store),
            ObjectPath::default(),
            public_base_url,
            false,
        ))
    }

    /// Keeps reports in process memory.
    pub fn in_memory(public_base_url: Url) -> Self {
        Self::new(
            Arc::new(InMemory::new()),
            ObjectPath::default(),
            public_base_url,
            true,
        )
    }

    fn new(
        store: Arc<dyn ObjectStore>,
        prefix: ObjectPath,
        mut public_base_url: Url,
        store_content_type: bool,
    ) -> Self {
        // Keys are appended to the base rather than replacing its last segment.
        if !public_base_url.path().ends_with('/') {
            let path = format!("{}/", public_base_url.path());
            public_base_url.set_path(&path);
        }

        Self {
            store,
            prefix,
            public_base_url,
            store_content_type,
        }
    }

    /// Returns the content of a stored object.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let location = self.location(key).ok()?;
        self.store.get(&location).await.ok()?.bytes().await.ok()
    }

    /// Returns the content type recorded for an object.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        let location = self.location(key).ok()?;
        let object = self.store.get(&location).await.ok()?;
        object
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string())
    }

    /// Keys of all stored objects, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let objects: Vec<ObjectMeta> = match self.store.list(Some(&self.prefix)).try_collect().await
        {
            Ok(objects) => objects,
            Err(e) => {
                warn!(error = %e, "Failed to list report store");
                return Vec::new();
            }
        };

        let mut keys: Vec<String> = objects
            .iter()
            .filter_map(|meta| {
                meta.location
                    .prefix_match(&self.prefix)
                    .map(|parts| ObjectPath::from_iter(parts).to_string())
            })
            .collect();
        keys.sort();
        keys
    }

    /// Maps a public URL produced by this storage back to its key.
    pub fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.public_base_url.as_str())
    }

    fn location(&self, key: &str) -> Result<ObjectPath, UploadError> {
        let relative =
            ObjectPath::parse(key).map_err(|e| UploadError::InvalidKey(format!("{key}: {e}")))?;

        Ok(ObjectPath::from_iter(
            self.prefix.parts().chain(relative.parts()),
        ))
    }

    fn public_url(&self, key: &str) -> Result<String, UploadError> {
        self.public_base_url
            .join(key)
            .map(String::from)
            .map_err(|e| UploadError::InvalidKey(format!("{key}: {e}")))
    }
}

#[async_trait]
impl ObjectStorage for ObjectStoreStorage {
    async fn upload(&self, request: UploadRequest) -> Result<StoredObject, UploadError> {
        let key = request.key();
        validate_key_segment(&key)?;
        let url = self.public_url(&key)?;
        let location = self.location(&key)?;

        let mut attributes = Attributes::new();
        if self.store_content_type {
            attributes.insert(Attribute::ContentType, request.content_type.clone().into());
        }

        let upload = self
            .store
            .put_multipart_opts(&location, attributes.into())
            .await
            .map_err(sink)?;
        let mut pending = PendingUpload::new(WriteMultipart::new(upload), key.clone());

        let size = match pending.copy(request.body).await {
            Ok(size) => size,
            Err(e) => {
                pending.abort().await;
                return Err(e);
            }
        };
        pending.finish().await?;

        debug!(key, size, "Object stored");

        Ok(StoredObject {
            key,
            url,
            size,
            content_type: request.content_type,
        })
    }

    async fn health_check(&self) -> bool {
        match self.store.list_with_delimiter(Some(&self.prefix)).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Report store is unreachable");
                false
            }
        }
    }
}

/// Multipart write that is aborted unless it finishes.
///
/// Dropping it mid-upload, as happens when the export future is cancelled,
/// hands the abort to the runtime.
struct PendingUpload {
    writer: Option<WriteMultipart>,
    key: String,
}

impl PendingUpload {
    fn new(writer: WriteMultipart, key: String) -> Self {
        Self {
            writer: Some(writer),
            key,
        }
    }

    /// Copies `body` into the upload, pulling the next chunk only when a part slot is free.
    async fn copy(&mut self, mut body: ByteStream) -> Result<u64, UploadError> {
        let writer = self.writer.as_mut().ok_or_else(closed)?;
        let mut written = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(UploadError::Source)?;
            writer
                .wait_for_capacity(MAX_PARTS_IN_FLIGHT)
                .await
                .map_err(sink)?;
            writer.write(&chunk);
            written += chunk.len() as u64;
        }

        Ok(written)
    }

    async fn finish(mut self) -> Result<(), UploadError> {
        let writer = self.writer.take().ok_or_else(closed)?;
        writer.finish().await.map(drop).map_err(sink)
    }

    async fn abort(mut self) {
        if let Some(writer) = self.writer.take()
            && let Err(e) = writer.abort().await
        {
            warn!(error = %e, key = %self.key, "Failed to abort report upload");
        }
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        let Some(writer) = self.writer.take() else {
            return;
        };
        let key = std::mem::take(&mut self.key);

        match Handle::try_current() {
            Ok(runtime) => {
                debug!(key, "Report upload cancelled");
                runtime.spawn(async move {
                    if let Err(e) = writer.abort().await {
                        warn!(error = %e, key, "Failed to abort cancelled report upload");
                    }
                });
            }
            Err(_) => warn!(key, "Report upload dropped outside a runtime"),
        }
    }
}

fn sink(e: object_store::Error) -> UploadError {
    UploadError::Sink(io::Error::other(e))
}

fn closed() -> UploadError {
    UploadError::Sink(io::Error::other("upload already closed"))
}
