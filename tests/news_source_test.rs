//! Integration tests for the news provider adapters.

use std::time::Duration;

use cybernews_poster::error::SourceError;
use cybernews_poster::news::{GNewsSource, NewsApiSource, NewsSource, Provider};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

fn sample_articles() -> serde_json::Value {
    json!({
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": null, "name": "Example"},
                "title": "Ransomware gang hits hospital network",
                "url": "https://example.com/ransomware",
                "description": "Systems were taken offline.",
                "content": "Systems were taken offline on Monday after… [+2310 chars]"
            },
            {
                "title": "[Removed]",
                "url": "https://removed.com",
                "description": "[Removed]",
                "content": "[Removed]"
            },
            {
                "title": "Patch Tuesday fixes zero-day",
                "url": "https://example.com/patch",
                "description": null,
                "content": null
            }
        ]
    })
}

#[tokio::test]
async fn test_newsapi_fetch_normalizes_articles() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "ransomware"))
        .and(query_param("language", "en"))
        .and(query_param("apiKey", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_articles()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = NewsApiSource::new(client(), &mock_server.uri(), "secret-key");
    let articles = source.fetch("ransomware").await.expect("fetch failed");

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title, "Ransomware gang hits hospital network");
    assert_eq!(articles[0].url, "https://example.com/ransomware");
    assert_eq!(articles[0].description, "Systems were taken offline.");
    assert_eq!(articles[0].content, "Systems were taken offline on Monday after");
    assert_eq!(articles[1].title, "Patch Tuesday fixes zero-day");
    assert_eq!(articles[1].description, "");
    assert_eq!(articles[1].content, "");
}

#[tokio::test]
async fn test_gnews_fetch_uses_token_param() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/search"))
        .and(query_param("q", "malware"))
        .and(query_param("language", "en"))
        .and(query_param("token", "gnews-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalArticles": 1,
            "articles": [{
                "title": "New malware strain targets routers",
                "description": "Researchers found a botnet.",
                "content": "Researchers found a botnet spreading through home routers.",
                "url": "https://example.com/malware",
                "image": "https://example.com/img.png",
                "publishedAt": "2024-01-01T00:00:00Z"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = GNewsSource::new(client(), &mock_server.uri(), "gnews-token");
    assert_eq!(source.provider(), Provider::GNews);

    let articles = source.fetch("malware").await.expect("fetch failed");
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].url, "https://example.com/malware");
}

#[tokio::test]
async fn test_empty_result_is_not_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "ok", "totalResults": 0, "articles": []})),
        )
        .mount(&mock_server)
        .await;

    let source = NewsApiSource::new(client(), &mock_server.uri(), "k");
    let articles = source.fetch("phishing attack").await.expect("fetch failed");
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_provider_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid or incorrect."
        })))
        .mount(&mock_server)
        .await;

    let source = NewsApiSource::new(client(), &mock_server.uri(), "bad");
    let err = source.fetch("cybersecurity").await.unwrap_err();
    match err {
        SourceError::Provider {
            provider,
            status,
            message,
        } => {
            assert_eq!(provider, Provider::NewsApi);
            assert_eq!(status, 401);
            assert_eq!(message, "Your API key is invalid or incorrect.");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_gnews_error_list_becomes_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/search"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(
                json!({"errors": ["You have reached your request limit for today."]}),
            ),
        )
        .mount(&mock_server)
        .await;

    let source = GNewsSource::new(client(), &mock_server.uri(), "t");
    let err = source.fetch("hacking").await.unwrap_err();
    assert!(matches!(
        err,
        SourceError::Provider { status: 403, ref message, .. }
            if message == "You have reached your request limit for today."
    ));
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    // Nothing listens on the discard port.
    let source = NewsApiSource::new(client(), "http://127.0.0.1:9", "k");
    let err = source.fetch("cybersecurity").await.unwrap_err();
    assert!(matches!(err, SourceError::Network { .. }), "{err:?}");
    assert_eq!(err.provider(), Provider::NewsApi);
}

#[tokio::test]
async fn test_malformed_json_is_invalid_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let source = NewsApiSource::new(client(), &mock_server.uri(), "k");
    let err = source.fetch("cybersecurity").await.unwrap_err();
    assert!(matches!(err, SourceError::InvalidResponse { .. }), "{err:?}");
}
