//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod export;
pub mod health;
pub mod links;

pub use export::export_links_handler;
pub use health::health_handler;
pub use links::{
    access_link_handler, create_link_handler, delete_link_handler, get_link_handler,
    list_links_handler, update_link_handler,
};
