//! Checks of the full middleware stack returned by `app_router`.

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use link_shortener::application::services::{ExportSettings, LinkService};
use link_shortener::infrastructure::persistence::InMemoryLinkRepository;
use link_shortener::infrastructure::storage::ObjectStoreStorage;
use link_shortener::routes::{RouterSettings, app_router};
use link_shortener::state::AppState;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use url::Url;

const PUBLIC_BASE: &str = "http://localhost:3333";

fn settings(export_dir: &Path) -> RouterSettings {
    RouterSettings {
        request_timeout: Duration::from_secs(5),
        cors_allowed_origin: None,
        export_route: "exports".to_string(),
        export_dir: Some(export_dir.to_path_buf()),
    }
}

async fn state(export_dir: &Path) -> AppState {
    let storage =
        ObjectStoreStorage::local(export_dir, Url::parse(&format!("{PUBLIC_BASE}/exports/")).unwrap())
            .await
            .unwrap();
    let service = LinkService::new(
        Arc::new(InMemoryLinkRepository::new()),
        Arc::new(storage),
        ExportSettings::default(),
    );
    AppState::new(Arc::new(service))
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    to_bytes(body, usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_router(state(dir.path()).await, &settings(dir.path()));

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/links/",
            json!({ "originalUrl": "https://example.com", "shortenedUrl": "slash" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/links/slash/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_exported_report_is_downloadable() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_router(state(dir.path()).await, &settings(dir.path()));

    for n in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/links",
                json!({
                    "originalUrl": format!("https://example.com/{n}"),
                    "shortenedUrl": format!("short{n}")
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.clone().oneshot(get("/links/export")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(response.into_body()).await).unwrap();
    let report_url = body["reportUrl"].as_str().unwrap();
    let path = report_url.strip_prefix(PUBLIC_BASE).unwrap();
    assert!(path.starts_with("/exports/downloads/"));

    let response = app.oneshot(get(path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let csv = String::from_utf8(body_bytes(response.into_body()).await).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Original URL,Shortened URL,Access Count,Created At");
    assert!(lines[1].starts_with("https://example.com/0,short0,0,"));
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_router(state(dir.path()).await, &settings(dir.path()));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/links")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_staged_upload_is_not_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("downloads")).unwrap();
    std::fs::write(dir.path().join("downloads/report.csv"), b"a,b\n").unwrap();
    std::fs::write(dir.path().join("downloads/report.csv#1"), b"a,").unwrap();
    let app = app_router(state(dir.path()).await, &settings(dir.path()));

    let response = app
        .clone()
        .oneshot(get("/exports/downloads/report.csv%231"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get("/exports/downloads/report.csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response.into_body()).await, b"a,b\n");
}

#[tokio::test]
async fn test_remote_report_store_mounts_no_static_route() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("downloads")).unwrap();
    std::fs::write(dir.path().join("downloads/report.csv"), b"a,b\n").unwrap();
    let mut settings = settings(dir.path());
    settings.export_dir = None;
    let app = app_router(state(dir.path()).await, &settings);

    let response = app
        .oneshot(get("/exports/downloads/report.csv"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
