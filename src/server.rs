//! HTTP server initialization and runtime setup.
//!
//! Handles backend selection, database connections, migrations and the Axum
//! server lifecycle.

use crate::application::services::LinkService;
use crate::config::{Config, StorageBackend};
use crate::domain::repositories::LinkRepository;
use crate::domain::storage::ObjectStorage;
use crate::infrastructure::persistence::{InMemoryLinkRepository, PgLinkRepository};
use crate::infrastructure::storage::{ObjectStoreStorage, StoreLocation};
use crate::routes::{RouterSettings, app_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Opens a PostgreSQL pool tuned by the `DB_*` settings.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the connection fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not configured")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Builds the link repository selected by `STORAGE_BACKEND`.
///
/// For PostgreSQL, pending migrations are applied before the repository is
/// returned.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn LinkRepository>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_pool(config).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PgLinkRepository::new(Arc::new(pool))))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory link storage; data is lost on restart");
            Ok(Arc::new(InMemoryLinkRepository::new()))
        }
    }
}

/// Builds the report storage selected by `REPORT_STORE_URL`.
pub async fn build_object_storage(config: &Config) -> Result<Arc<dyn ObjectStorage>> {
    let location = config.report_store()?;
    if location == StoreLocation::Memory {
        tracing::warn!("Using in-memory report storage; reports are lost on restart");
    }

    let storage = ObjectStoreStorage::open(&location, config.report_base_url()?)
        .await
        .with_context(|| format!("Failed to open report store {location}"))?;

    Ok(Arc::new(storage))
}

/// Wires repository, report storage and service from configuration.
pub async fn build_link_service(config: &Config) -> Result<LinkService> {
    let repository = build_repository(config).await?;
    let object_storage = build_object_storage(config).await?;

    Ok(LinkService::new(
        repository,
        object_storage,
        config.export_settings(),
    ))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Link repository (PostgreSQL with migrations, or in-memory)
/// - Local report storage
/// - Axum HTTP server with graceful shutdown on Ctrl+C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let link_service = build_link_service(&config).await?;
    let state = AppState::new(Arc::new(link_service));

    let settings = RouterSettings::from_config(&config)?;
    let app = app_router(state, &settings);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
