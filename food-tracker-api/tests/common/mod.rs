#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use chrono::{TimeDelta, Utc};
use food_tracker_api::clients::BackendClient;
use food_tracker_api::nutrition::{CalorieNinjasClient, CalorieNinjasConfig, NutritionApi};
use food_tracker_api::resilience::{CircuitBreakerConfig, ConstantBackoff};
use food_tracker_api::{AppState, Stores};
use food_tracker_core::{
    CircuitBreakerRecord, CircuitBreakerStore, CircuitState, Clock, FoodItem, ManualClock,
    RawNutritionItem,
};
use food_tracker_storage::MemoryStores;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

pub const EVENT: &str = food_tracker_api::nutrition::NUTRITION_API_EVENT;

/// Pause between attempts, short enough for tests
pub const TEST_RETRY_DELAY: Duration = Duration::from_millis(10);

pub struct TestContext {
    pub state: AppState,
    pub stores: MemoryStores,
    pub clock: Arc<ManualClock>,
    /// Stands in for the remote nutrition API
    pub nutrition: MockServer,
    /// Stands in for the food item and user info endpoints
    pub backend: MockServer,
}

impl TestContext {
    pub async fn new() -> Self {
        let nutrition = MockServer::start().await;
        let api = CalorieNinjasClient::new(CalorieNinjasConfig {
            base_url: nutrition.uri(),
            api_key: "test-key".to_string(),
            request_timeout: Duration::from_secs(2),
        })
        .unwrap();
        Self::with_api(nutrition, Arc::new(api)).await
    }

    pub async fn with_api(nutrition: MockServer, api: Arc<dyn NutritionApi>) -> Self {
        Self::with_stores(nutrition, api, MemoryStores::new(), None).await
    }

    /// `stores_override` replaces individual memory stores, e.g. with a failing mock.
    pub async fn with_stores(
        nutrition: MockServer,
        api: Arc<dyn NutritionApi>,
        stores: MemoryStores,
        stores_override: Option<Stores>,
    ) -> Self {
        let backend = MockServer::start().await;
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let state = AppState::new(
            stores_override.unwrap_or_else(|| stores.clone().into()),
            api,
            BackendClient::new(&backend.uri(), Duration::from_secs(2)).unwrap(),
            clock.clone(),
            CircuitBreakerConfig::default(),
            ConstantBackoff::new(3, TEST_RETRY_DELAY),
        );

        Self {
            state,
            stores,
            clock,
            nutrition,
            backend,
        }
    }

    /// Store an OPEN record written `age` ago.
    pub async fn trip_breaker(&self, age: Duration) -> CircuitBreakerRecord {
        let timestamp = self.clock.now() - TimeDelta::from_std(age).unwrap();
        let record = CircuitBreakerRecord::new(EVENT, CircuitState::Open, timestamp);
        self.stores.circuit_breakers.insert(&record).await.unwrap()
    }

    pub async fn latest_breaker_record(&self) -> Option<CircuitBreakerRecord> {
        self.stores.circuit_breakers.latest(EVENT).await.unwrap()
    }
}

pub fn raw_item(name: &str, serving_size_g: f64) -> RawNutritionItem {
    RawNutritionItem {
        name: name.to_string(),
        calories: 94.6,
        serving_size_g,
        fat_total_g: 0.3,
        fat_saturated_g: 0.1,
        protein_g: 0.5,
        carbohydrates_total_g: 25.1,
        fiber_g: 4.4,
        sugar_g: 18.9,
        sodium_mg: 2.0,
        potassium_mg: 194.0,
        cholesterol_mg: 0.0,
    }
}

pub fn nutrition_body(items: &[RawNutritionItem]) -> Value {
    json!({ "items": items })
}

pub fn food_item(name: &str) -> FoodItem {
    FoodItem::from_raw(&raw_item(name, 200.0)).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
