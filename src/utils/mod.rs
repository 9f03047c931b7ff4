//! Utility functions shared across layers.
//!
//! - [`csv_report`] - Streaming CSV encoding of report rows
//! - [`shortened_url`] - Shortened key validation rules

pub mod csv_report;
pub mod shortened_url;
