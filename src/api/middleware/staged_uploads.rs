//! Keeps in-progress report uploads off the static report route.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Answers 404 for staging files, which the local report store names `<key>#<n>`.
pub async fn hide_staged_uploads(request: Request, next: Next) -> Response {
    if is_staged(request.uri().path()) {
        return StatusCode::NOT_FOUND.into_response();
    }

    next.run(request).await
}

fn is_staged(path: &str) -> bool {
    path.contains('#') || path.to_ascii_lowercase().contains("%23")
}
