use gpu_stock_watcher::http::{RetryPolicy, RetryingClient};
use gpu_stock_watcher::sources::{InventoryApiSource, StockSource};
use once_cell::sync::Lazy;
use std::time::Duration;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

//
// ----------- Global Setup -----------
//

static INIT: Lazy<()> = Lazy::new(|| {
    dotenvy::dotenv().ok();
    gpu_stock_watcher::telemetry::init("warn");
});

const SKU: &str = "NVGFT580";

//
// ----------- Test Helpers -----------
//

fn api_source(server: &MockServer, timeout: Duration) -> InventoryApiSource {
    let client = RetryingClient::new(timeout, RetryPolicy::new(3, Duration::from_millis(1)))
        .expect("client should build");
    InventoryApiSource::new(
        client,
        format!("{}/feinventory", server.uri()),
        SKU,
        "es-es",
        "RTX 5080",
    )
}

/// Helper to create a mock server answering every inventory query with `template`
async fn setup_mock_server(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feinventory"))
        .and(query_param("skus", SKU))
        .and(query_param("locale", "es-es"))
        .and(query_param("status", "1"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .expect("request recording should be enabled")
        .len()
}

//
// ----------- Happy Path Tests -----------
//

#[tokio::test]
async fn active_listing_is_available_with_price() {
    let _ = *INIT;

    let server = setup_mock_server(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "listMap": [{ "is_active": "true", "price": "1199" }]
    })))
    .await;

    let mut source = api_source(&server, Duration::from_secs(2));
    let result = source.check_stock().await;

    assert!(result.available);
    assert_eq!(result.price, Some(1199.0));
    assert!(result.raw_error.is_none());
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn inactive_listing_is_unavailable_without_error() {
    let _ = *INIT;

    let server = setup_mock_server(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "listMap": [{ "is_active": "false" }]
    })))
    .await;

    let mut source = api_source(&server, Duration::from_secs(2));
    let result = source.check_stock().await;

    assert!(!result.available);
    assert!(result.raw_error.is_none());
}

//
// ----------- Sad Path Tests -----------
//

#[tokio::test]
async fn malformed_json_is_reported_not_raised() {
    let _ = *INIT;

    let server =
        setup_mock_server(ResponseTemplate::new(200).set_body_string("{ \"success\": tru")).await;

    let mut source = api_source(&server, Duration::from_secs(2));
    let result = source.check_stock().await;

    assert!(!result.available);
    let raw_error = result.raw_error.expect("raw_error should be populated");
    assert!(raw_error.starts_with("unexpected response"), "got: {raw_error}");
    assert_eq!(request_count(&server).await, 1, "parse errors are not retried");
}

#[tokio::test]
async fn unsuccessful_envelope_is_an_error_result() {
    let _ = *INIT;

    let server = setup_mock_server(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": false,
        "listMap": []
    })))
    .await;

    let mut source = api_source(&server, Duration::from_secs(2));
    let result = source.check_stock().await;

    assert!(!result.available);
    assert!(result.raw_error.is_some());
}

#[tokio::test]
async fn server_errors_are_retried_up_to_the_limit() {
    let _ = *INIT;

    let server = setup_mock_server(ResponseTemplate::new(503)).await;

    let mut source = api_source(&server, Duration::from_secs(2));
    let result = source.check_stock().await;

    assert!(!result.available);
    assert_eq!(
        result.raw_error.as_deref(),
        Some("HTTP status 503 after 4 attempt(s)")
    );
    assert_eq!(request_count(&server).await, 4);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let _ = *INIT;

    let server = setup_mock_server(ResponseTemplate::new(404)).await;

    let mut source = api_source(&server, Duration::from_secs(2));
    let result = source.check_stock().await;

    assert!(!result.available);
    assert_eq!(
        result.raw_error.as_deref(),
        Some("HTTP status 404 after 1 attempt(s)")
    );
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn recovers_when_a_retry_succeeds() {
    let _ = *INIT;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feinventory"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feinventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "listMap": [{ "is_active": true, "price": 1199 }]
        })))
        .mount(&server)
        .await;

    let mut source = api_source(&server, Duration::from_secs(2));
    let result = source.check_stock().await;

    assert!(result.available);
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn timeouts_are_retried_then_reported() {
    let _ = *INIT;

    let server = setup_mock_server(
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(2))
            .set_body_json(serde_json::json!({ "success": true, "listMap": [] })),
    )
    .await;

    let mut source = api_source(&server, Duration::from_millis(100));
    let result = source.check_stock().await;

    assert!(!result.available);
    let raw_error = result.raw_error.expect("raw_error should be populated");
    assert!(
        raw_error.starts_with("transport error after 4 attempt(s)"),
        "got: {raw_error}"
    );
    assert_eq!(request_count(&server).await, 4);
}
