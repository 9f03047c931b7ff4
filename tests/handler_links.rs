mod common;

use axum::http::StatusCode;
use link_shortener::domain::repositories::LinkRepository;
use serde_json::{Value, json};
use std::collections::HashSet;

// ─── POST /links ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_link_success() {
    let (server, _) = common::make_server();

    let response = server
        .post("/links")
        .json(&json!({
            "originalUrl": "https://www.rust-lang.org/learn",
            "shortenedUrl": "rust"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body = response.json::<Value>();
    assert_eq!(body["originalUrl"], "https://www.rust-lang.org/learn");
    assert_eq!(body["shortenedUrl"], "rust");
    assert_eq!(body["accessCount"], 0);
    assert!(body["id"].is_string());
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_twice_conflicts() {
    let (server, _) = common::make_server();
    let payload = json!({ "originalUrl": "https://example.com", "shortenedUrl": "twice" });

    server
        .post("/links")
        .json(&payload)
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.post("/links").json(&payload).await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["message"], "Shortened URL already exists");
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let (server, context) = common::make_server();

    for payload in [
        json!({ "originalUrl": "not a url", "shortenedUrl": "valid" }),
        json!({ "originalUrl": "https://example.com", "shortenedUrl": "no" }),
        json!({ "originalUrl": "https://example.com", "shortenedUrl": "elevenchars" }),
        json!({ "originalUrl": "https://example.com", "shortenedUrl": "bad!key" }),
        json!({ "originalUrl": "https://example.com", "shortenedUrl": "export" }),
    ] {
        let response = server.post("/links").json(&payload).await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["code"], "validation_error");
    }

    assert!(context.repository.is_empty().await);
}

// ─── GET /links/{shortenedUrl} ───────────────────────────────────────────────

#[tokio::test]
async fn test_get_link_returns_original_url() {
    let (server, context) = common::make_server();
    common::create_test_link(&context.repository, "docs", "https://docs.rs").await;

    let response = server.get("/links/docs").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "originalUrl": "https://docs.rs" }));
}

#[tokio::test]
async fn test_get_link_does_not_count_access() {
    let (server, context) = common::make_server();
    common::create_test_link(&context.repository, "peek", "https://example.com").await;

    server.get("/links/peek").await.assert_status_ok();

    assert_eq!(context.repository.get_access_count("peek").await.unwrap(), 0);
}

#[tokio::test]
async fn test_get_link_not_found() {
    let (server, _) = common::make_server();

    let response = server.get("/links/missing").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["message"], "Link not found");
}

// ─── DELETE /links/{shortenedUrl} ────────────────────────────────────────────

#[tokio::test]
async fn test_delete_link_success() {
    let (server, context) = common::make_server();
    common::create_test_link(&context.repository, "del001", "https://example.com").await;

    server
        .delete("/links/del001")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server.get("/links/del001").await.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_link_twice() {
    let (server, context) = common::make_server();
    common::create_test_link(&context.repository, "del002", "https://example.com").await;

    server
        .delete("/links/del002")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server.delete("/links/del002").await.assert_status_not_found();
}

// ─── PATCH /links/{shortenedUrl} ─────────────────────────────────────────────

#[tokio::test]
async fn test_update_original_url() {
    let (server, context) = common::make_server();
    let link = common::create_test_link(&context.repository, "upd001", "https://old.com").await;

    let response = server
        .patch("/links/upd001")
        .json(&json!({ "originalUrl": "https://new.com" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["originalUrl"], "https://new.com");
    assert_eq!(body["shortenedUrl"], "upd001");
    assert_eq!(body["id"], link.id.to_string());
}

#[tokio::test]
async fn test_update_renames_key() {
    let (server, context) = common::make_server();
    common::create_test_link(&context.repository, "oldkey", "https://example.com").await;

    server
        .patch("/links/oldkey")
        .json(&json!({ "shortenedUrl": "newkey" }))
        .await
        .assert_status_ok();

    server.get("/links/oldkey").await.assert_status_not_found();
    server.get("/links/newkey").await.assert_status_ok();
}

#[tokio::test]
async fn test_update_to_taken_key_conflicts() {
    let (server, context) = common::make_server();
    common::create_test_link(&context.repository, "first", "https://one.com").await;
    common::create_test_link(&context.repository, "second", "https://two.com").await;

    let response = server
        .patch("/links/first")
        .json(&json!({ "originalUrl": "https://changed.com", "shortenedUrl": "second" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);

    server
        .get("/links/first")
        .await
        .assert_json(&json!({ "originalUrl": "https://one.com" }));
    server
        .get("/links/second")
        .await
        .assert_json(&json!({ "originalUrl": "https://two.com" }));
}

#[tokio::test]
async fn test_update_requires_a_field() {
    let (server, context) = common::make_server();
    common::create_test_link(&context.repository, "upd002", "https://example.com").await;

    server
        .patch("/links/upd002")
        .json(&json!({}))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_update_missing_link() {
    let (server, _) = common::make_server();

    server
        .patch("/links/ghost")
        .json(&json!({ "originalUrl": "https://example.com" }))
        .await
        .assert_status_not_found();
}

// ─── PATCH /links/{shortenedUrl}/access ──────────────────────────────────────

#[tokio::test]
async fn test_access_returns_plain_text_and_counts() {
    let (server, context) = common::make_server();
    common::create_test_link(&context.repository, "hits", "https://example.com/target").await;

    for _ in 0..3 {
        let response = server.patch("/links/hits/access").await;
        response.assert_status_ok();
        response.assert_text("https://example.com/target");
        let content_type = response.header("content-type");
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
    }

    assert_eq!(context.repository.get_access_count("hits").await.unwrap(), 3);
}

#[tokio::test]
async fn test_access_missing_link() {
    let (server, _) = common::make_server();

    server
        .patch("/links/ghost/access")
        .await
        .assert_status_not_found();
}

// ─── GET /links ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_paginates_25_links_by_10() {
    let (server, context) = common::make_server();
    for n in 0..25 {
        common::create_test_link(
            &context.repository,
            &format!("list{n}"),
            &format!("https://example.com/{n}"),
        )
        .await;
    }

    let mut sizes = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor: Option<String> = None;

    loop {
        let mut request = server.get("/links").add_query_param("limit", 10);
        if let Some(cursor) = &cursor {
            request = request.add_query_param("cursor", cursor);
        }
        let response = request.await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        let links = body["links"].as_array().unwrap();
        sizes.push(links.len());
        for link in links {
            assert!(seen.insert(link["id"].as_str().unwrap().to_string()));
        }

        match body.get("nextCursor").and_then(Value::as_str) {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(seen.len(), 25);
}

#[tokio::test]
async fn test_list_default_page_size() {
    let (server, context) = common::make_server();
    for n in 0..21 {
        common::create_test_link(
            &context.repository,
            &format!("def{n}"),
            &format!("https://example.com/{n}"),
        )
        .await;
    }

    let body = server.get("/links").await.json::<Value>();

    assert_eq!(body["links"].as_array().unwrap().len(), 20);
    assert!(body["nextCursor"].is_string());
}

#[tokio::test]
async fn test_list_empty() {
    let (server, _) = common::make_server();

    let response = server.get("/links").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "links": [] }));
}

#[tokio::test]
async fn test_list_rejects_bad_parameters() {
    let (server, _) = common::make_server();

    server
        .get("/links")
        .add_query_param("limit", 0)
        .await
        .assert_status_bad_request();
    server
        .get("/links")
        .add_query_param("limit", 101)
        .await
        .assert_status_bad_request();
    server
        .get("/links")
        .add_query_param("cursor", "not-a-uuid")
        .await
        .assert_status_bad_request();
}
