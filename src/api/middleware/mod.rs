//! HTTP middleware for request processing.
//!
//! Provides observability, cross-origin and report-serving middleware.

pub mod cors;
pub mod staged_uploads;
pub mod tracing;
