//! Integration tests for the link shortener API
//!
//! These tests verify the entire application stack including:
//! - HTTP routing
//! - Request/response handling
//! - Database operations
//! - Error handling

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

// Import from the main crate
use linkdash::route::create_app;
use linkdash::store::{AppState, RedbLinkStore};

/// Helper function to create a test application with a temporary database
fn setup_test_app() -> (axum::Router, NamedTempFile) {
    // Create a temporary database file
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = temp_db.path().to_str().unwrap();

    // Open the store
    let store = RedbLinkStore::open(db_path).expect("Failed to open test store");
    let state = AppState {
        store: Arc::new(store),
    };

    // Create the app
    let app = create_app(state);

    (app, temp_db)
}

/// Helper function to parse response body as JSON
async fn response_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

/// Helper to POST a link creation payload
async fn post_link(app: &axum::Router, payload: Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/links")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_link_with_custom_code() {
    let (app, _temp_db) = setup_test_app();

    let response = post_link(
        &app,
        json!({
            "targetUrl": "https://example.com/page",
            "code": "abc123"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response.into_body()).await;
    assert_eq!(body["code"], "abc123");
    assert_eq!(body["targetUrl"], "https://example.com/page");
    assert_eq!(body["totalClicks"], 0);
    assert!(body["lastClicked"].is_null());
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert!(body["createdAt"].is_string());
    assert!(body["updatedAt"].is_string());
}

#[tokio::test]
async fn test_create_link_generates_random_code() {
    let (app, _temp_db) = setup_test_app();

    let response = post_link(&app, json!({ "targetUrl": "https://example.com/auto" })).await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response.into_body()).await;
    let code = body["code"].as_str().unwrap();
    assert_eq!(code.len(), 6); // Random 6-char code
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_create_link_empty_code_is_treated_as_absent() {
    let (app, _temp_db) = setup_test_app();

    let response = post_link(
        &app,
        json!({ "targetUrl": "https://example.com/auto", "code": "" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response.into_body()).await;
    assert_eq!(body["code"].as_str().unwrap().len(), 6);
}

#[tokio::test]
async fn test_create_link_duplicate_code_conflict() {
    let (app, _temp_db) = setup_test_app();

    let first = post_link(
        &app,
        json!({ "targetUrl": "https://example.com/first", "code": "dupcode" }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    // Second creation with the same code must fail
    let second = post_link(
        &app,
        json!({ "targetUrl": "https://example.com/second", "code": "dupcode" }),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // The first link is unaffected
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/links/dupcode")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response_json(response.into_body()).await;
    assert_eq!(body["targetUrl"], "https://example.com/first");
}

#[tokio::test]
async fn test_create_link_rejects_invalid_url() {
    let (app, _temp_db) = setup_test_app();

    for bad_url in ["not a url", "/relative/path", ""] {
        let response = post_link(&app, json!({ "targetUrl": bad_url })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response.into_body()).await;
        assert!(body["error"].as_str().unwrap().contains("targetUrl"));
    }
}

#[tokio::test]
async fn test_create_link_rejects_invalid_code_pattern() {
    let (app, _temp_db) = setup_test_app();

    for bad_code in ["short", "waytoolongcode", "bad-ch!", "with space"] {
        let response = post_link(
            &app,
            json!({ "targetUrl": "https://example.com", "code": bad_code }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response.into_body()).await;
        assert!(body["error"].as_str().unwrap().contains("code"));
    }
}

#[tokio::test]
async fn test_redirect_success() {
    let (app, _temp_db) = setup_test_app();

    post_link(
        &app,
        json!({ "targetUrl": "https://example.com/redirect-test", "code": "redir12" }),
    )
    .await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/redir12")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "https://example.com/redirect-test"
    );
}

#[tokio::test]
async fn test_redirect_not_found_leaves_store_unchanged() {
    let (app, _temp_db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/missing1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Nothing was created or mutated by the miss
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/links")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_links_newest_first() {
    let (app, _temp_db) = setup_test_app();

    for code in ["first1", "second", "third3"] {
        post_link(
            &app,
            json!({ "targetUrl": format!("https://example.com/{}", code), "code": code }),
        )
        .await;
    }

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/links")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response.into_body()).await;
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|link| link["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["third3", "second", "first1"]);
}

#[tokio::test]
async fn test_get_link_not_found() {
    let (app, _temp_db) = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/links/nothere")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_link_is_idempotent() {
    let (app, _temp_db) = setup_test_app();

    post_link(
        &app,
        json!({ "targetUrl": "https://example.com/doomed", "code": "doomed1" }),
    )
    .await;

    // First delete removes the link
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/links/doomed1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Deleting again (or any unknown code) is still a success
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/links/doomed1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_delete_then_recreate_same_code() {
    let (app, _temp_db) = setup_test_app();

    post_link(
        &app,
        json!({ "targetUrl": "https://example.com/old", "code": "recycle" }),
    )
    .await;

    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/links/recycle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The freed code can be claimed by a brand new link
    let response = post_link(
        &app,
        json!({ "targetUrl": "https://example.com/new", "code": "recycle" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response.into_body()).await;
    assert_eq!(body["targetUrl"], "https://example.com/new");
    assert_eq!(body["totalClicks"], 0);
}
