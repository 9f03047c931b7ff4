//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! existence checks and uniqueness rules. Services consume repository traits
//! and provide a clean API for HTTP handlers and the admin CLI.
//!
//! # Contents
//!
//! - [`services::LinkService`] - Link lifecycle, pagination and CSV export
//! - [`error::LinkError`] - Failures reported by the service

pub mod error;
pub mod services;
