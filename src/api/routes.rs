//! API route configuration.

use crate::api::handlers::{
    access_link_handler, create_link_handler, delete_link_handler, export_links_handler,
    get_link_handler, list_links_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch},
};

/// Link CRUD routes.
///
/// # Endpoints
///
/// - `GET    /links`                        - List links (cursor pagination)
/// - `POST   /links`                        - Create a link
/// - `GET    /links/{shortenedUrl}`         - Resolve a key to its original URL
/// - `PATCH  /links/{shortenedUrl}`         - Partially update a link
/// - `DELETE /links/{shortenedUrl}`         - Delete a link
/// - `PATCH  /links/{shortenedUrl}/access`  - Count an access, return the target
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{shortened_url}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/{shortened_url}/access", patch(access_link_handler))
}

/// Report export route.
///
/// Kept apart from [`link_routes`] because it runs under the export timeout
/// instead of the per-request one. The static `/links/export` segment takes
/// priority over `/links/{shortenedUrl}`.
pub fn export_routes() -> Router<AppState> {
    Router::new().route("/links/export", get(export_links_handler))
}
