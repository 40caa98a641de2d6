//! Integration tests for the translator bot
//!
//! These tests run the HTTP API on a local port, with the identity and
//! translation endpoints mocked by wiremock, and drive it the way the chat
//! connector does.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use translator_bot::{config::Config, server};
use wiremock::{
    matchers::{body_string_contains, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

// ==================== Test Helpers ====================

/// Create a test config pointing both translator endpoints at the mock server
fn create_test_config(mock_uri: &str, api_key: Option<&str>) -> Config {
    Config {
        translator_access_key: "test-access-key".to_string(),
        translator_token_url: format!("{}/sts/v1.0/issueToken", mock_uri),
        translator_api_url: format!("{}/v2/http.svc/TranslateArray", mock_uri),
        token_lifetime: Duration::from_secs(600),
        token_refresh_ratio: 0.9,
        request_timeout: Duration::from_secs(5),
        search_access_key: Some("search-key".to_string()),
        search_api_url: format!("{}/bing/v5.0/news/search", mock_uri),
        max_translation_history: 5,
        allow_configuration_via_query: false,
        app_base_uri: "https://bot.example.com".to_string(),
        api_key: api_key.map(String::from),
        port: 0,
    }
}

fn translate_response(from: &str, translated: &str) -> String {
    format!(
        r#"<ArrayOfTranslateArrayResponse xmlns="http://schemas.datacontract.org/2004/07/Microsoft.MT.Web.Service.V2"><TranslateArrayResponse><From>{}</From><TranslatedText>{}</TranslatedText></TranslateArrayResponse></ArrayOfTranslateArrayResponse>"#,
        from, translated
    )
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/sts/v1.0/issueToken"))
        .and(header("Ocp-Apim-Subscription-Key", "test-access-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("integration-bearer"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_translation(server: &MockServer, to: &str, from: &str, translated: &str) {
    Mock::given(method("POST"))
        .and(path("/v2/http.svc/TranslateArray"))
        .and(header("Authorization", "Bearer integration-bearer"))
        .and(body_string_contains(format!("<To>{}</To>", to).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(translate_response(from, translated)))
        .mount(server)
        .await;
}

/// Serve the API on an ephemeral port and return its base URL
async fn spawn_app(config: &Config) -> String {
    let state = server::AppState::from_config(config).expect("Failed to build state");
    let app = server::router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    format!("http://{}", addr)
}

async fn post_json(base: &str, route: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}{}", base, route))
        .json(&body)
        .send()
        .await
        .expect("Request failed");
    let status = response.status().as_u16();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

fn card_titles(body: &Value) -> Vec<String> {
    assert_eq!(body["type"], "results", "unexpected response: {}", body);
    body["cards"]
        .as_array()
        .expect("cards array")
        .iter()
        .map(|card| card["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

// ==================== Health Tests ====================

#[tokio::test]
async fn test_health_endpoint() {
    let mock = MockServer::start().await;
    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    let response = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let mock = MockServer::start().await;
    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    let body: Value = reqwest::get(format!("{}/metrics", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body.get("token_exchanges").is_some());
    assert!(body.get("api_success_rate").is_some());
}

// ==================== Query Tests ====================

#[tokio::test]
async fn test_query_fans_out_with_one_token_and_filters_same_language() {
    let mock = MockServer::start().await;
    mount_token(&mock, 1).await;
    mount_translation(&mock, "fr", "fr", "bonjour").await;
    mount_translation(&mock, "en", "fr", "hello").await;
    mount_translation(&mock, "de", "fr", "hallo").await;

    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    let (status, body) = post_json(
        &base,
        "/api/settings",
        json!({ "user_id": "u1", "state": "fr,en,de" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["languages"], json!(["fr", "en", "de"]));

    let (status, body) = post_json(&base, "/api/query", json!({ "user_id": "u1", "text": "bonjour" })).await;
    assert_eq!(status, 200);
    assert_eq!(card_titles(&body), vec!["hello", "hallo"]);
    assert_eq!(body["cards"][0]["subtitle"], "English");
    assert_eq!(body["cards"][0]["value"]["source_language"], "fr");

    // Second query reuses the cached token (mount_token expects exactly one call)
    let (status, _) = post_json(&base, "/api/query", json!({ "user_id": "u1", "text": "merci" })).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_query_omits_target_that_fails_upstream() {
    let mock = MockServer::start().await;
    mount_token(&mock, 1).await;
    mount_translation(&mock, "es", "en", "hola").await;
    mount_translation(&mock, "it", "en", "ciao").await;

    Mock::given(method("POST"))
        .and(path("/v2/http.svc/TranslateArray"))
        .and(body_string_contains("<To>de</To>"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock)
        .await;

    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    post_json(&base, "/api/settings", json!({ "user_id": "u2", "state": "es,de,it" })).await;
    let (status, body) = post_json(&base, "/api/query", json!({ "user_id": "u2", "text": "hello" })).await;

    assert_eq!(status, 200);
    assert_eq!(card_titles(&body), vec!["hola", "ciao"]);
}

#[tokio::test]
async fn test_query_with_failed_credential_shows_error_message() {
    let mock = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sts/v1.0/issueToken"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/http.svc/TranslateArray"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock)
        .await;

    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    let (status, body) = post_json(
        &base,
        "/api/query",
        json!({ "user_id": "u3", "text": "hello", "locale": "fr-FR" }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["type"], "message");
    assert!(body["text"].as_str().unwrap().contains("Désolé"));
}

#[tokio::test]
async fn test_query_with_every_target_failing_shows_error_message() {
    let mock = MockServer::start().await;
    mount_token(&mock, 1).await;

    Mock::given(method("POST"))
        .and(path("/v2/http.svc/TranslateArray"))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&mock)
        .await;

    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    let (status, body) = post_json(&base, "/api/query", json!({ "user_id": "u6", "text": "hello" })).await;

    assert_eq!(status, 200);
    assert_eq!(body["type"], "message");
    assert!(body["text"].as_str().unwrap().starts_with("Sorry"));
}

// ==================== History Tests ====================

#[tokio::test]
async fn test_selected_items_replay_on_initial_run() {
    let mock = MockServer::start().await;
    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    let (status, body) = post_json(&base, "/api/query", json!({ "user_id": "u4", "initial_run": true })).await;
    assert_eq!(status, 200);
    assert_eq!(body["type"], "message");

    for (source, translated) in [("hello", "bonjour"), ("thanks", "merci"), ("HELLO", "BONJOUR")] {
        let (status, card) = post_json(
            &base,
            "/api/select",
            json!({
                "user_id": "u4",
                "translation": {
                    "source_language": "en",
                    "target_language": "fr",
                    "source_text": source,
                    "translated_text": translated
                }
            }),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(card["title"], translated);
    }

    let (status, body) = post_json(&base, "/api/query", json!({ "user_id": "u4", "initial_run": true })).await;
    assert_eq!(status, 200);
    assert_eq!(card_titles(&body), vec!["BONJOUR", "merci"]);
}

// ==================== News Search Tests ====================

#[tokio::test]
async fn test_news_search_returns_cards_and_keeps_client_id() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bing/v5.0/news/search"))
        .and(header("Ocp-Apim-Subscription-Key", "search-key"))
        .and(header("X-MSEdge-ClientID", "client-42"))
        .and(query_param("q", "rust"))
        .and(query_param("mkt", "en-GB"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"totalEstimatedMatches": 1, "value": [{"name": "Rust news", "url": "https://news.example.com/rust", "description": "All about <Rust>", "provider": [{"name": "Example News"}]}]}"#,
        ))
        .expect(1)
        .mount(&mock)
        .await;

    Mock::given(method("GET"))
        .and(path("/bing/v5.0/news/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-MSEdge-ClientID", "client-42")
                .set_body_string(r#"{"totalEstimatedMatches": 0, "value": []}"#),
        )
        .mount(&mock)
        .await;

    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    // First search has no client id yet and picks one up
    let (status, body) = post_json(&base, "/api/search/query", json!({ "user_id": "s1", "text": "rust" })).await;
    assert_eq!(status, 200);
    assert!(card_titles(&body).is_empty());

    let (status, body) = post_json(&base, "/api/search/settings", json!({ "user_id": "s1", "state": "en-gb" })).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "type": "message", "text": "" }));

    let (status, body) = post_json(&base, "/api/search/query", json!({ "user_id": "s1", "text": "rust" })).await;
    assert_eq!(status, 200);
    assert_eq!(card_titles(&body), vec!["Rust news"]);
    assert_eq!(body["cards"][0]["subtitle"], "Example News");
    assert!(body["cards"][0]["body"].as_str().unwrap().contains("&lt;Rust&gt;"));
    assert!(body["cards"][0].get("value").is_none());
}

#[tokio::test]
async fn test_news_search_failure_shows_error_message() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bing/v5.0/news/search"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock)
        .await;

    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    let (status, body) = post_json(&base, "/api/search/query", json!({ "user_id": "s2", "text": "rust" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["type"], "message");
    assert!(body["text"].as_str().unwrap().contains("news search failed"));
}

#[tokio::test]
async fn test_news_search_settings_url() {
    let mock = MockServer::start().await;
    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    let body: Value = reqwest::get(format!("{}/api/search/settings-url", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["type"], "configuration_url");
    assert_eq!(body["url"], "https://bot.example.com/html/search-settings.html");
}

#[tokio::test]
async fn test_news_search_disabled_without_access_key() {
    let mock = MockServer::start().await;
    let mut config = create_test_config(&mock.uri(), None);
    config.search_access_key = None;
    let base = spawn_app(&config).await;

    let (status, body) = post_json(&base, "/api/search/query", json!({ "user_id": "s3", "text": "rust" })).await;
    assert_eq!(status, 404);
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

// ==================== Auth and Validation Tests ====================

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let mock = MockServer::start().await;
    let base = spawn_app(&create_test_config(&mock.uri(), Some("secret"))).await;

    let (status, _) = post_json(&base, "/api/settings", json!({ "user_id": "u5", "state": "fr" })).await;
    assert_eq!(status, 401);

    let response = reqwest::Client::new()
        .post(format!("{}/api/settings", base))
        .header("X-API-Key", "secret")
        .json(&json!({ "user_id": "u5", "state": "fr" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Health stays open
    let response = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_missing_user_id_is_bad_request() {
    let mock = MockServer::start().await;
    let base = spawn_app(&create_test_config(&mock.uri(), None)).await;

    let (status, body) = post_json(&base, "/api/query", json!({ "user_id": " ", "text": "hi" })).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("user_id"));
}
