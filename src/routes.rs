//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `/links/*`          - Link CRUD API (see [`crate::api::routes`])
//! - `GET /links/export` - CSV report export
//! - `GET /health`       - Health check: link store and report storage
//! - `/{export_route}/*` - Generated reports, served from the local report
//!   store only; staging files of running uploads answer 404
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Browser access for the single-page frontend
//! - **Timeout** - Per-request limit, 408 on expiry (not applied to export)
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::staged_uploads::hide_staged_uploads;
use crate::api::middleware::{cors, tracing};
use crate::config::Config;
use crate::state::AppState;
use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware;
use axum::routing::get;
use std::path::PathBuf;
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

/// Router-level settings derived from [`Config`].
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub request_timeout: Duration,
    pub cors_allowed_origin: Option<HeaderValue>,
    /// Path segment the report directory is served under.
    pub export_route: String,
    /// Local report directory, `None` when reports live in a remote store.
    pub export_dir: Option<PathBuf>,
}

impl RouterSettings {
    /// # Errors
    ///
    /// Returns an error if `CORS_ALLOWED_ORIGIN` is not a valid header value
    /// or `REPORT_STORE_URL` cannot be parsed.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            request_timeout: config.request_timeout(),
            cors_allowed_origin: config.cors_origin()?,
            export_route: config.export_route.clone(),
            export_dir: config.report_store()?.served_dir().map(PathBuf::from),
        })
    }
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState, settings: &RouterSettings) -> NormalizePath<Router> {
    let timed = Router::new()
        .merge(api::routes::link_routes())
        .route("/health", get(health_handler))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            settings.request_timeout,
        ));

    let mut router = Router::new()
        .merge(timed)
        .merge(api::routes::export_routes());

    if let Some(export_dir) = &settings.export_dir {
        router = router.nest_service(
            &format!("/{}", settings.export_route),
            middleware::from_fn(hide_staged_uploads).layer(ServeDir::new(export_dir)),
        );
    }

    let router = router
        .with_state(state)
        .layer(cors::layer(settings.cors_allowed_origin.clone()))
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
