//! HTTP client for the remote nutrition API.
//!
//! The client reports what came back (status and body text) and nothing
//! more. Deciding whether that is a usable item, a confirmed miss or a
//! broken integration belongs to the orchestrator.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout for the readiness ping
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

const API_KEY_HEADER: &str = "x-api-key";

/// Raw answer from the nutrition API
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NutritionApiError {
    /// The request never produced a response
    #[error("{0}")]
    Transport(String),

    #[error("Failed to build nutrition API client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for NutritionApiError {
    fn from(err: reqwest::Error) -> Self {
        NutritionApiError::Transport(err.to_string())
    }
}

#[async_trait]
pub trait NutritionApi: Send + Sync {
    /// Look up nutrition facts for a free-text query.
    async fn query(&self, query: &str) -> Result<UpstreamResponse, NutritionApiError>;

    /// Reachability probe. Any HTTP answer counts as reachable.
    async fn ping(&self) -> Result<(), NutritionApiError>;
}

#[derive(Debug, Clone)]
pub struct CalorieNinjasConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

impl Default for CalorieNinjasConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.calorieninjas.com".to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalorieNinjasClient {
    client: Client,
    base_url: String,
}

impl CalorieNinjasClient {
    pub fn new(config: CalorieNinjasConfig) -> Result<Self, NutritionApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let api_key = header::HeaderValue::try_from(config.api_key.as_str())
            .map_err(|e| NutritionApiError::Client(format!("invalid API key header: {e}")))?;
        headers.insert(API_KEY_HEADER, api_key);

        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| NutritionApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl NutritionApi for CalorieNinjasClient {
    async fn query(&self, query: &str) -> Result<UpstreamResponse, NutritionApiError> {
        debug!(query, "Querying nutrition API");

        let response = self
            .client
            .get(self.url("v1/nutrition"))
            .query(&[("query", query)])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(query, status, "Nutrition API responded");

        Ok(UpstreamResponse { status, body })
    }

    async fn ping(&self) -> Result<(), NutritionApiError> {
        self.client
            .get(&self.base_url)
            .timeout(PING_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Nutrition API unreachable");
                NutritionApiError::Transport(format!(
                    "Timeout reached when reaching nutrition API: {e}"
                ))
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CalorieNinjasClient {
        CalorieNinjasClient::new(CalorieNinjasConfig {
            base_url: server.uri(),
            api_key: "secret".to_string(),
            request_timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_query_sends_key_and_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/nutrition"))
            .and(query_param("query", "100g apple"))
            .and(header("X-Api-Key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items":[]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server).query("100g apple").await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"items":[]}"#);
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_query_passes_error_status_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/nutrition"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let response = client_for(&server).query("apple").await.unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(response.body, "bad key");
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_query_transport_failure() {
        let client = CalorieNinjasClient::new(CalorieNinjasConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "secret".to_string(),
            request_timeout: Duration::from_millis(500),
        })
        .unwrap();

        let result = client.query("apple").await;
        assert!(matches!(result, Err(NutritionApiError::Transport(_))));
    }

    #[tokio::test]
    async fn test_ping_accepts_any_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(client_for(&server).ping().await.is_ok());
    }

    #[test]
    fn test_rejects_unprintable_api_key() {
        let result = CalorieNinjasClient::new(CalorieNinjasConfig {
            api_key: "bad\nkey".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(NutritionApiError::Client(_))));
    }
}
