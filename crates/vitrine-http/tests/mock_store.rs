//! Mock store tests for the HTTP object store client.
//!
//! These tests use wiremock to simulate the object store API and check how
//! responses and failures are classified.

use serde_json::json;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitrine_core::error::Error;
use vitrine_core::{ObjectStore, PutOptions, StoreUrl};
use vitrine_http::HttpStore;

/// Helper to create a store client pointed at a mock server.
fn mock_store(server: &MockServer, token: Option<&str>) -> HttpStore {
    let url = StoreUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
    HttpStore::new(url, token, None).unwrap()
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_sends_prefix_limit_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/objects"))
        .and(query_param("prefix", "notices/"))
        .and(query_param("limit", "1000"))
        .and(header("authorization", "Bearer store-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [
                {"key": "notices/a.json", "url": "https://cdn.example.com/notices/a.json"},
                {"pathname": "notices/b.json", "url": "https://cdn.example.com/notices/b.json"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = mock_store(&server, Some("store-token"));
    let objects = store.list("notices/", 1000).await.unwrap();

    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].key, "notices/a.json");
    assert_eq!(objects[1].key, "notices/b.json");
}

#[tokio::test]
async fn test_list_truncates_to_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/objects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [
                {"key": "notices/a.json", "url": "u1"},
                {"key": "notices/b.json", "url": "u2"},
                {"key": "notices/c.json", "url": "u3"}
            ]
        })))
        .mount(&server)
        .await;

    let store = mock_store(&server, None);
    assert_eq!(store.list("notices/", 2).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_failure_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/objects"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "Unavailable",
            "message": "maintenance"
        })))
        .mount(&server)
        .await;

    let store = mock_store(&server, None);
    let err = store.list("notices/", 10).await.unwrap_err();
    match err {
        Error::Protocol(e) => {
            assert_eq!(e.status, 503);
            assert_eq!(e.error.as_deref(), Some("Unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Metadata and body reads
// ============================================================================

#[tokio::test]
async fn test_head_found_and_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/objects/meta"))
        .and(query_param("key", "notices/a.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "notices/a.json",
            "url": "https://cdn.example.com/notices/a.json"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/objects/meta"))
        .and(query_param("key", "notices/missing.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "NotFound",
            "message": "no such object"
        })))
        .mount(&server)
        .await;

    let store = mock_store(&server, None);
    let found = store.head("notices/a.json").await.unwrap().unwrap();
    assert_eq!(found.url, "https://cdn.example.com/notices/a.json");
    assert!(store.head("notices/missing.json").await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_body_and_classification() {
    let server = MockServer::start().await;
    let base = format!("http://127.0.0.1:{}", server.address().port());

    Mock::given(method("GET"))
        .and(path("/blob/ok.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"title":"ok"}"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blob/limited.json"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blob/gone.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blob/broken.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = mock_store(&server, None);

    let body = store.fetch(&format!("{base}/blob/ok.json")).await.unwrap();
    assert_eq!(body, r#"{"title":"ok"}"#);

    let err = store
        .fetch(&format!("{base}/blob/limited.json"))
        .await
        .unwrap_err();
    assert!(err.is_rate_limited());

    let err = store.fetch(&format!("{base}/blob/gone.json")).await.unwrap_err();
    assert!(err.is_not_found());

    let err = store
        .fetch(&format!("{base}/blob/broken.json"))
        .await
        .unwrap_err();
    assert!(!err.is_rate_limited());
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_fetch_connection_refused_fails_fast() {
    // Bind then drop a server to get a port nothing listens on.
    let server = MockServer::start().await;
    let url = format!("http://127.0.0.1:{}/blob/a.json", server.address().port());
    let store = mock_store(&server, None);
    drop(server);

    let err = store.fetch(&url).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(!err.is_transient());
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_put_sends_body_and_overwrite_flag() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/objects/notices-views/a.json"))
        .and(header("content-type", "application/json"))
        .and(header("x-allow-overwrite", "true"))
        .and(header("authorization", "Bearer t"))
        .and(body_string(r#"{"viewCount":1}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "notices-views/a.json",
            "url": "https://cdn.example.com/notices-views/a.json"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = mock_store(&server, Some("t"));
    let entry = store
        .put(
            "notices-views/a.json",
            r#"{"viewCount":1}"#,
            PutOptions::json_overwrite(),
        )
        .await
        .unwrap();
    assert_eq!(entry.key, "notices-views/a.json");
}

#[tokio::test]
async fn test_put_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/objects/notices/a.json"))
        .and(header("x-allow-overwrite", "false"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "Conflict",
            "message": "object exists"
        })))
        .mount(&server)
        .await;

    let store = mock_store(&server, None);
    let err = store
        .put("notices/a.json", "{}", PutOptions::json_create())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol(ref e) if e.status == 409));
}

#[tokio::test]
async fn test_delete_missing_is_ok() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/objects/notices/a.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let store = mock_store(&server, None);
    store.delete("notices/a.json").await.unwrap();
}
