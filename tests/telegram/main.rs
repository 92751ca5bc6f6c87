use gpu_stock_watcher::notifiers::{Notifier, NotifyChannel, NotifyError, TelegramChannel};
use gpu_stock_watcher::sources::StockCheckResult;
use once_cell::sync::Lazy;
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

//
// ----------- Global Setup -----------
//

static INIT: Lazy<()> = Lazy::new(|| {
    dotenvy::dotenv().ok();
    gpu_stock_watcher::telemetry::init("warn");
});

const TOKEN: &str = "123456:test-token";
const CHAT_ID: &str = "987654";

//
// ----------- Test Helpers -----------
//

async fn setup_mock_server(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_partial_json(serde_json::json!({ "chat_id": CHAT_ID })))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

fn channel(server: &MockServer) -> TelegramChannel {
    TelegramChannel::new(server.uri(), TOKEN, CHAT_ID, Duration::from_secs(2))
        .expect("client should build")
}

async fn sent_texts(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .map(|request| {
            let body: serde_json::Value =
                serde_json::from_slice(&request.body).expect("request body should be JSON");
            body["text"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

//
// ----------- Tests -----------
//

#[tokio::test]
async fn send_message_posts_title_and_body() {
    let _ = *INIT;

    let server = setup_mock_server(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "ok": true,
        "result": { "message_id": 1 }
    })))
    .await;

    channel(&server)
        .send("RTX 5080 available!", "Price: 1199")
        .await
        .expect("delivery should succeed");

    assert_eq!(sent_texts(&server).await, vec!["RTX 5080 available!\nPrice: 1199"]);
}

#[tokio::test]
async fn rejected_message_is_a_delivery_error() {
    let _ = *INIT;

    let server = setup_mock_server(ResponseTemplate::new(400).set_body_json(serde_json::json!({
        "ok": false,
        "error_code": 400,
        "description": "Bad Request: chat not found"
    })))
    .await;

    let err = channel(&server)
        .send("title", "body")
        .await
        .expect_err("delivery should fail");

    let NotifyError::Delivery(message) = err;
    assert!(message.contains("chat not found"), "got: {message}");
    assert!(!message.contains("test-token"), "token leaked: {message}");
}

#[tokio::test]
async fn non_json_reply_is_a_delivery_error() {
    let _ = *INIT;

    let server = setup_mock_server(ResponseTemplate::new(502).set_body_string("Bad Gateway")).await;

    let result = channel(&server).send("title", "body").await;

    assert!(result.is_err());
}

#[tokio::test]
async fn notifier_swallows_telegram_failures() {
    let _ = *INIT;

    let server = setup_mock_server(ResponseTemplate::new(401).set_body_json(serde_json::json!({
        "ok": false,
        "description": "Unauthorized"
    })))
    .await;
    let notifier = Notifier::new(Box::new(channel(&server)), "RTX 5080", None);
    let result = StockCheckResult::in_stock("RTX 5080".to_string(), Some(1199.0), None);

    notifier.notify_available(&result).await;
    notifier.notify_error("inventory API unreachable").await;

    let texts = sent_texts(&server).await;
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("1199"));
    assert!(texts[1].contains("inventory API unreachable"));
}
