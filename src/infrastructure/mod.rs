//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - Link repositories (PostgreSQL and in-memory)
//! - [`storage`] - Object storage backends for CSV reports

pub mod persistence;
pub mod storage;
