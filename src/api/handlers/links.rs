//! Handlers for link management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::link::{
    CreateLinkRequest, LinkResponse, OriginalUrlResponse, UpdateLinkRequest,
};
use crate::api::dto::pagination::{LinkPageResponse, ListLinksQuery};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a link under a caller-chosen key.
///
/// # Endpoint
///
/// `POST /links`
///
/// # Request Body
///
/// ```json
/// { "originalUrl": "https://example.com", "shortenedUrl": "exmpl" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
/// Returns 409 Conflict if the key is already taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(payload.original_url, payload.shortened_url)
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Returns the original URL stored under a key.
///
/// # Endpoint
///
/// `GET /links/{shortenedUrl}`
///
/// Does not count an access.
pub async fn get_link_handler(
    Path(shortened_url): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OriginalUrlResponse>, AppError> {
    let original_url = state.link_service.get_original_url(&shortened_url).await?;

    Ok(Json(OriginalUrlResponse { original_url }))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PATCH /links/{shortenedUrl}`
///
/// # Request Body
///
/// At least one field is required.
///
/// ```json
/// { "originalUrl": "https://new.example.com", "shortenedUrl": "newkey" }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist.
/// Returns 409 Conflict if the new key belongs to another link.
/// Returns 400 Bad Request if validation fails.
pub async fn update_link_handler(
    Path(shortened_url): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_link(&shortened_url, payload.into())
        .await?;

    Ok(Json(link.into()))
}

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /links/{shortenedUrl}`
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist.
pub async fn delete_link_handler(
    Path(shortened_url): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(&shortened_url).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Counts one access and returns the redirect target as plain text.
///
/// # Endpoint
///
/// `PATCH /links/{shortenedUrl}/access`
pub async fn access_link_handler(
    Path(shortened_url): Path<String>,
    State(state): State<AppState>,
) -> Result<String, AppError> {
    let original_url = state
        .link_service
        .increment_access_count(&shortened_url)
        .await?;

    Ok(original_url)
}

/// Lists links in creation order with cursor pagination.
///
/// # Endpoint
///
/// `GET /links?limit=20&cursor={id}`
///
/// `nextCursor` is present when more links follow; pass it back as `cursor`
/// to get the next page.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(params): Query<ListLinksQuery>,
) -> Result<Json<LinkPageResponse>, AppError> {
    params.validate()?;

    let page = state
        .link_service
        .list_links(params.limit, params.cursor)
        .await?;

    Ok(Json(page.into()))
}
