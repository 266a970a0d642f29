//! End-to-end directory tests against a mock HTTP object store.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitrine::{ContentDirectory, DirectoryConfig, Domain, PageQuery, RetryPolicy, Store, StoreUrl};

fn mock_store(server: &MockServer) -> Store {
    let url = StoreUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
    Store::open(url, Some("test-token"), None).unwrap()
}

fn config() -> DirectoryConfig {
    DirectoryConfig {
        retry: RetryPolicy {
            max_retries: 2,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            backoff_multiplier: 2.0,
        },
        ..DirectoryConfig::default()
    }
}

/// Mount a listing of `notices/0.json..` with bodies served under `/blob/`.
async fn mount_notices(server: &MockServer, count: usize) {
    let base = server.uri();
    let objects: Vec<_> = (0..count)
        .map(|i| json!({"key": format!("notices/{i}.json"), "url": format!("{base}/blob/{i}.json")}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/objects"))
        .and(query_param("prefix", "notices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "objects": objects })))
        .mount(server)
        .await;

    // No counters exist.
    Mock::given(method("GET"))
        .and(path("/objects/meta"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

async fn mount_body(server: &MockServer, i: usize, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/blob/{i}.json")))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_html_error_page_among_five_bodies() {
    let server = MockServer::start().await;
    mount_notices(&server, 5).await;

    for i in 0..5 {
        let template = if i == 3 {
            ResponseTemplate::new(200)
                .set_body_string("<!doctype html><title>Error</title>")
                .insert_header("content-type", "text/html")
        } else {
            ResponseTemplate::new(200).set_body_json(json!({
                "title": format!("Notice {i}"),
                "createdAt": format!("2024-05-0{}T00:00:00Z", i + 1),
            }))
        };
        mount_body(&server, i, template).await;
    }

    let directory = ContentDirectory::new(mock_store(&server), &config());
    let page = directory
        .list_page(&Domain::notices(), &PageQuery::new(1, 10))
        .await
        .unwrap();

    assert_eq!(page.rows.len(), 4);
    assert_eq!(page.total, 4);
    let titles: Vec<&str> = page.rows.iter().map(|r| r.record.title.as_str()).collect();
    assert_eq!(titles, vec!["Notice 4", "Notice 2", "Notice 1", "Notice 0"]);
}

#[tokio::test]
async fn test_rate_limited_body_recovers() {
    let server = MockServer::start().await;
    mount_notices(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/blob/0.json"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_body(
        &server,
        0,
        ResponseTemplate::new(200).set_body_json(json!({"title": "late"})),
    )
    .await;

    let directory = ContentDirectory::new(mock_store(&server), &config());
    let page = directory
        .list_page(&Domain::notices(), &PageQuery::new(1, 10))
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.rows[0].record.title, "late");
    assert!(!page.partial);
}

#[tokio::test]
async fn test_failed_listing_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let directory = ContentDirectory::new(mock_store(&server), &config());
    let err = directory
        .list_page(&Domain::notices(), &PageQuery::new(1, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, vitrine::Error::Unavailable { .. }));
}

#[tokio::test]
async fn test_increment_writes_counter_over_http() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/objects/meta"))
        .and(query_param("key", "notices/a.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "notices/a.json",
            "url": format!("{base}/blob/a.json")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/objects/meta"))
        .and(query_param("key", "notices-views/a.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "notices-views/a.json",
            "url": format!("{base}/blob/views-a.json")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blob/views-a.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"viewCount": 9})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/objects/notices-views/a.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "notices-views/a.json",
            "url": format!("{base}/blob/views-a.json")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let directory = ContentDirectory::new(mock_store(&server), &config());
    let count = directory
        .counters()
        .increment(&Domain::notices(), "notices/a.json")
        .await
        .unwrap();
    assert_eq!(count, 10);

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method == wiremock::http::Method::PUT)
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
    assert_eq!(body["viewCount"], 10);
    assert_eq!(body["key"], "notices/a.json");
}
