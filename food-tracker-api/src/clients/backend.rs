//! Calls back into the food item and user info endpoints.
//!
//! The logged item endpoints resolve foods and check users through HTTP
//! rather than reaching into the other services' stores, so each service can
//! be deployed on its own.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::{join_segments, parse_base_url, ClientError, ClientResult};
use crate::dto::{FoodItemEnvelope, FoodItemResponse};

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: url::Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Resolve a food by name through the food item endpoint.
    pub async fn food_item(&self, name: &str) -> ClientResult<FoodItemResponse> {
        let url = join_segments(&self.base_url, &["api", "v1", "food_item", name])?;
        debug!(%url, "Resolving food item");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                what: "food item",
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: FoodItemEnvelope = response.json().await?;
        Ok(envelope.food_item)
    }

    /// `Ok` when the user info endpoint knows `user_id`.
    pub async fn ensure_user_exists(&self, user_id: &str) -> ClientResult<()> {
        let url = join_segments(&self.base_url, &["api", "v1", "user_info", "id", user_id])?;
        debug!(%url, "Checking user exists");

        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(ClientError::UserNotFound(user_id.to_string())),
            status if status.is_success() => Ok(()),
            status => Err(ClientError::Status {
                what: "user info",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(&server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_food_item_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/food_item/greek%20yogurt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "food_item": {
                    "id": "6f1d3a52-3f0e-4d8e-9a57-5d1c2b9f8e01",
                    "name": "greek yogurt",
                    "calories": 59.0,
                    "weight_g": 100.0,
                    "fat_total": 0.4,
                    "fat_saturated": 0.1,
                    "protein": 10.2,
                    "carbohydrates": 3.6,
                    "fiber": 0.0,
                    "sugar": 3.2,
                    "sodium": 36.0,
                    "potassium": 141.0,
                    "cholesterol": 5.0
                }
            })))
            .mount(&server)
            .await;

        let food = client_for(&server).food_item("greek yogurt").await.unwrap();

        assert_eq!(food.name, "greek yogurt");
        assert_eq!(food.nutrition.protein, 10.2);
    }

    #[tokio::test]
    async fn test_food_item_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({"error": "circuit breaker is tripped"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).food_item("apple").await.unwrap_err();
        match err {
            ClientError::Status { status, body, .. } => {
                assert_eq!(status, 503);
                assert!(body.contains("circuit breaker is tripped"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/user_info/id/42"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).ensure_user_exists("42").await.unwrap_err();
        assert!(matches!(err, ClientError::UserNotFound(id) if id == "42"));
    }

    #[tokio::test]
    async fn test_existing_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/user_info/id/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42"})))
            .mount(&server)
            .await;

        assert!(client_for(&server).ensure_user_exists("42").await.is_ok());
    }
}
