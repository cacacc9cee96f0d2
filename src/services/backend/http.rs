/// HTTP transport to the blend service
///
/// Endpoints, relative to the configured base URL:
/// - GET  /mock        pre-generated recommendations
/// - POST /blend       `{ user1_url, user2_url }`
/// - POST /blend/test  `{ user1_name, user2_name }`
/// - GET  /health
use reqwest::Client as HttpClient;

use crate::{
    config::Config,
    services::backend::{
        BlendBackend, BlendPayload, RawResponse, TestBlendRequest, TransportError,
        TransportOutcome,
    },
};

#[derive(Clone)]
pub struct HttpBackend {
    http_client: HttpClient,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(HttpClient::new(), base_url)
    }

    pub fn with_client(http_client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    /// Builds a backend from configuration, applying the timeout when one is set
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        Ok(Self::with_client(http_client, config.backend_base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(&self, request: reqwest::RequestBuilder) -> TransportOutcome {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(
            status = %status,
            body_len = body.len(),
            backend = self.name(),
            "Blend service responded"
        );

        Ok(RawResponse { status, body })
    }
}

#[async_trait::async_trait]
impl BlendBackend for HttpBackend {
    async fn post_blend(&self, payload: &BlendPayload) -> TransportOutcome {
        self.read(self.http_client.post(self.url("/blend")).json(payload))
            .await
    }

    async fn get_mock(&self) -> TransportOutcome {
        self.read(self.http_client.get(self.url("/mock"))).await
    }

    async fn post_test_blend(&self, request: &TestBlendRequest) -> TransportOutcome {
        self.read(self.http_client.post(self.url("/blend/test")).json(request))
            .await
    }

    async fn get_health(&self) -> TransportOutcome {
        self.read(self.http_client.get(self.url("/health"))).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("/mock"), "http://localhost:8000/mock");
    }

    #[test]
    fn test_from_config_uses_base_url() {
        let config = Config {
            backend_base_url: "https://blend.example.com/api/".to_string(),
            request_timeout_secs: Some(60),
            ..Config::default()
        };
        let backend = HttpBackend::from_config(&config).unwrap();
        assert_eq!(backend.base_url(), "https://blend.example.com/api");
    }

    #[tokio::test]
    async fn test_post_blend_sends_both_locators() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/blend"))
            .and(body_json(json!({
                "user1_url": "https://letterboxd.com/alice/films/",
                "user2_url": "https://letterboxd.com/bob/films/"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"title": "Heat"}])))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let payload = BlendPayload {
            user1_url: "https://letterboxd.com/alice/films/".to_string(),
            user2_url: "https://letterboxd.com/bob/films/".to_string(),
        };
        let response = backend.post_blend(&payload).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Heat"));
    }

    #[tokio::test]
    async fn test_get_mock_passes_error_status_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mock"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({"detail": "quota"})))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let response = backend.get_mock().await.unwrap();
        assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_post_test_blend_sends_user_names() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/blend/test"))
            .and(body_json(json!({"user1_name": "rbaveje", "user2_name": "vihaanbinges"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let response = backend
            .post_test_blend(&TestBlendRequest::default())
            .await
            .unwrap();
        assert_eq!(response.body, "[]");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let backend = HttpBackend::new("http://127.0.0.1:1");
        assert!(backend.get_health().await.is_err());
    }
}
