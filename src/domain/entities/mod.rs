//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL mapping with its access counter
//! - [`LinkPage`] - One page of a cursor-paginated scan
//! - [`ExportRow`] - The columns written to a CSV report
//!
//! Creation and partial updates use dedicated input structs
//! ([`NewLink`], [`LinkPatch`]).

pub mod link;

pub use link::{ExportRow, Link, LinkPage, LinkPatch, NewLink};
