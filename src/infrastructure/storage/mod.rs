//! Object storage for generated reports.
//!
//! [`ObjectStoreStorage`] implements [`crate::domain::storage::ObjectStorage`]
//! over the `object_store` crate. [`StoreLocation`] picks the backend from a
//! URL: a local directory the router serves, process memory, or an S3 bucket.

mod location;
mod object_store_storage;

pub use location::{StoreConfigError, StoreLocation};
pub use object_store_storage::ObjectStoreStorage;
