#![allow(dead_code)]

use axum::{Router, routing::get};
use axum_test::TestServer;
use link_shortener::api::handlers::health_handler;
use link_shortener::api::routes::{export_routes, link_routes};
use link_shortener::application::services::{ExportSettings, LinkService};
use link_shortener::domain::entities::{Link, NewLink};
use link_shortener::domain::repositories::LinkRepository;
use link_shortener::infrastructure::persistence::InMemoryLinkRepository;
use link_shortener::infrastructure::storage::ObjectStoreStorage;
use link_shortener::state::AppState;
use std::sync::Arc;
use url::Url;

/// Public base of report URLs produced by the in-memory report storage.
pub const REPORT_BASE_URL: &str = "http://reports.test/";

pub struct TestContext {
    pub state: AppState,
    pub repository: InMemoryLinkRepository,
    pub storage: ObjectStoreStorage,
}

pub fn create_test_state() -> TestContext {
    let repository = InMemoryLinkRepository::new();
    let storage = ObjectStoreStorage::in_memory(Url::parse(REPORT_BASE_URL).unwrap());

    let link_service = Arc::new(LinkService::new(
        Arc::new(repository.clone()),
        Arc::new(storage.clone()),
        ExportSettings::default(),
    ));

    TestContext {
        state: AppState::new(link_service),
        repository,
        storage,
    }
}

/// All API routes without the outer middleware stack.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(link_routes())
        .merge(export_routes())
        .route("/health", get(health_handler))
        .with_state(state)
}

pub fn make_server() -> (TestServer, TestContext) {
    let context = create_test_state();
    let server = TestServer::new(api_router(context.state.clone())).unwrap();
    (server, context)
}

pub async fn create_test_link(
    repository: &InMemoryLinkRepository,
    shortened_url: &str,
    original_url: &str,
) -> Link {
    repository
        .create(NewLink {
            original_url: original_url.to_string(),
            shortened_url: shortened_url.to_string(),
        })
        .await
        .unwrap()
}
