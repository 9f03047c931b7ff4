//! Cross-origin policy for browser clients of the API.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Creates the CORS layer.
///
/// With `allowed_origin` set, only that origin may call the API from a
/// browser; otherwise any origin may.
pub fn layer(allowed_origin: Option<HeaderValue>) -> CorsLayer {
    let origin = match allowed_origin {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
