//! Link repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - PostgreSQL storage via SQLx
//! - [`InMemoryLinkRepository`] - Process-local storage for development and tests
//!
//! [`row_stream`] holds the bounded channel used to stream report rows out of
//! a database scan.

pub mod memory_link_repository;
pub mod pg_link_repository;
pub mod row_stream;

pub use memory_link_repository::InMemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
