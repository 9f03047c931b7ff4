//! Business logic services for the application layer.

pub mod link_service;

pub use link_service::{DEFAULT_PAGE_SIZE, ExportSettings, LinkService, MAX_PAGE_SIZE};
