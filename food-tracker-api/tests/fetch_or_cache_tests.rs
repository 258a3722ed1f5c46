mod common;

use async_trait::async_trait;
use food_tracker_api::nutrition::{
    CalorieNinjasClient, CalorieNinjasConfig, FetchError, NutritionApi, NutritionApiError,
    UpstreamResponse,
};
use food_tracker_api::Stores;
use food_tracker_core::{
    CircuitState, Clock, CoreError, FoodItem, FoodItemId, FoodItemStore, Result,
};
use food_tracker_storage::MemoryStores;
use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

mock! {
    pub Api {}

    #[async_trait]
    impl NutritionApi for Api {
        async fn query(&self, query: &str) -> std::result::Result<UpstreamResponse, NutritionApiError>;
        async fn ping(&self) -> std::result::Result<(), NutritionApiError>;
    }
}

mock! {
    pub FoodStore {}

    #[async_trait]
    impl FoodItemStore for FoodStore {
        async fn find_by_name(&self, name: &str) -> Result<Option<FoodItem>>;
        async fn find_by_id(&self, id: &FoodItemId) -> Result<Option<FoodItem>>;
        async fn insert(&self, item: &FoodItem) -> Result<FoodItem>;
    }
}

async fn mount_apple(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/v1/nutrition"))
        .and(query_param("query", "apple"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(nutrition_body(&[raw_item("Apple", 200.0)])),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetches_once_then_serves_from_cache() {
    let ctx = TestContext::new().await;
    mount_apple(&ctx.nutrition, 1).await;

    let first = ctx.state.nutrition.fetch_or_cache("apple").await.unwrap();
    let second = ctx.state.nutrition.fetch_or_cache("Apple").await.unwrap();

    assert_eq!(first.name, "apple");
    assert_eq!(first, second);
    assert_eq!(first.nutrition.weight_g, 100.0);
    assert!((first.nutrition.calories - 94.6 / 2.0).abs() < 1e-9);
    assert_eq!(ctx.stores.food_items.len().await, 1);
    assert!(ctx.latest_breaker_record().await.is_none());
}

#[tokio::test]
async fn test_transport_failures_exhaust_retries_and_trip() {
    let mut api = MockApi::new();
    api.expect_query()
        .withf(|query| query == "apple")
        .times(3)
        .returning(|_| Err(NutritionApiError::Transport("connection refused".to_string())));
    let ctx = TestContext::with_api(MockServer::start().await, Arc::new(api)).await;

    let err = ctx.state.nutrition.fetch_or_cache("apple").await.unwrap_err();

    assert!(matches!(err, FetchError::UpstreamTransport(_)));
    assert_eq!(err.message(), "connection refused");
    assert_eq!(err.status_code(), 500);
    assert_eq!(
        ctx.state.nutrition.breaker().state(EVENT).await.unwrap(),
        CircuitState::Open
    );
    assert_eq!(ctx.stores.circuit_breakers.history(EVENT).await.len(), 1);
}

#[tokio::test]
async fn test_last_http_error_is_reported() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/v1/nutrition"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API Key"))
        .expect(3)
        .mount(&ctx.nutrition)
        .await;

    let err = ctx.state.nutrition.fetch_or_cache("apple").await.unwrap_err();

    assert_eq!(err.status_code(), 401);
    assert_eq!(err.message(), "Invalid API Key");
    assert_eq!(
        ctx.latest_breaker_record().await.map(|r| r.state),
        Some(CircuitState::Open)
    );
}

#[tokio::test]
async fn test_recovers_within_retry_budget() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/v1/nutrition"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&ctx.nutrition)
        .await;
    mount_apple(&ctx.nutrition, 1).await;

    let item = ctx.state.nutrition.fetch_or_cache("apple").await.unwrap();

    assert_eq!(item.name, "apple");
    assert!(ctx.latest_breaker_record().await.is_none());
}

#[tokio::test]
async fn test_open_breaker_fails_fast() {
    let ctx = TestContext::new().await;
    mount_apple(&ctx.nutrition, 0).await;
    ctx.trip_breaker(Duration::from_secs(5)).await;

    let err = ctx.state.nutrition.fetch_or_cache("apple").await.unwrap_err();

    assert!(matches!(err, FetchError::CircuitOpen));
    assert_eq!(err.message(), "circuit breaker is tripped");
    assert_eq!(err.status_code(), 503);
    assert_eq!(ctx.stores.circuit_breakers.history(EVENT).await.len(), 1);
}

#[tokio::test]
async fn test_cache_hit_ignores_open_breaker() {
    let ctx = TestContext::new().await;
    mount_apple(&ctx.nutrition, 0).await;
    ctx.state
        .nutrition
        .cache()
        .upsert_if_absent(food_item("apple"))
        .await
        .unwrap();
    ctx.trip_breaker(Duration::from_secs(1)).await;

    let item = ctx.state.nutrition.fetch_or_cache("APPLE").await.unwrap();
    assert_eq!(item.name, "apple");
}

#[tokio::test]
async fn test_half_open_success_closes_breaker() {
    let ctx = TestContext::new().await;
    mount_apple(&ctx.nutrition, 1).await;
    ctx.trip_breaker(Duration::from_secs(31)).await;
    assert_eq!(
        ctx.state.nutrition.breaker().state(EVENT).await.unwrap(),
        CircuitState::HalfOpen
    );

    let item = ctx.state.nutrition.fetch_or_cache("apple").await.unwrap();

    assert_eq!(item.name, "apple");
    let latest = ctx.latest_breaker_record().await.unwrap();
    assert_eq!(latest.state, CircuitState::Closed);
    assert_eq!(
        ctx.state.nutrition.breaker().state(EVENT).await.unwrap(),
        CircuitState::Closed
    );
}

#[tokio::test]
async fn test_half_open_failure_reopens_breaker() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/v1/nutrition"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(3)
        .mount(&ctx.nutrition)
        .await;
    ctx.trip_breaker(Duration::from_secs(60)).await;

    let err = ctx.state.nutrition.fetch_or_cache("apple").await.unwrap_err();

    assert_eq!(err.status_code(), 500);
    let latest = ctx.latest_breaker_record().await.unwrap();
    assert_eq!(latest.state, CircuitState::Open);
    assert_eq!(latest.timestamp, ctx.clock.now());
    assert_eq!(
        ctx.state.nutrition.breaker().state(EVENT).await.unwrap(),
        CircuitState::Open
    );
}

#[tokio::test]
async fn test_empty_items_is_not_found_without_retry() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/v1/nutrition"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items": []}"#))
        .expect(1)
        .mount(&ctx.nutrition)
        .await;

    let err = ctx.state.nutrition.fetch_or_cache("unobtainium").await.unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(err.message(), r#"{"items": []}"#);
    assert!(ctx.latest_breaker_record().await.is_none());
    assert!(ctx.stores.food_items.is_empty().await);
}

#[tokio::test]
async fn test_unparseable_body_is_terminal() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/v1/nutrition"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&ctx.nutrition)
        .await;

    let err = ctx.state.nutrition.fetch_or_cache("apple").await.unwrap_err();

    assert!(matches!(err, FetchError::MalformedResponse(_)));
    assert_eq!(err.status_code(), 500);
    assert!(ctx.latest_breaker_record().await.is_none());
}

#[tokio::test]
async fn test_persistence_error_is_not_retried() {
    let mut food_store = MockFoodStore::new();
    food_store.expect_find_by_name().returning(|_| Ok(None));
    food_store
        .expect_insert()
        .times(1)
        .returning(|_| Err(CoreError::Database("disk full".to_string())));

    let memory = MemoryStores::new();
    let stores = Stores {
        food_items: Arc::new(food_store),
        circuit_breakers: Arc::new(memory.circuit_breakers.clone()),
        user_infos: Arc::new(memory.user_infos.clone()),
        logged_items: Arc::new(memory.logged_items.clone()),
    };

    let nutrition = MockServer::start().await;
    mount_apple(&nutrition, 1).await;
    let api = CalorieNinjasClient::new(CalorieNinjasConfig {
        base_url: nutrition.uri(),
        api_key: "test-key".to_string(),
        request_timeout: Duration::from_secs(2),
    })
    .unwrap();
    let ctx = TestContext::with_stores(nutrition, Arc::new(api), memory, Some(stores)).await;
    ctx.trip_breaker(Duration::from_secs(45)).await;

    let err = ctx.state.nutrition.fetch_or_cache("apple").await.unwrap_err();

    assert!(matches!(err, FetchError::Persistence(_)));
    assert_eq!(err.status_code(), 500);
    // the dependency answered, so the trial call still counts as a success
    assert_eq!(
        ctx.latest_breaker_record().await.map(|r| r.state),
        Some(CircuitState::Closed)
    );
}

#[tokio::test]
async fn test_persistence_error_on_lookup_skips_remote_call() {
    let mut food_store = MockFoodStore::new();
    food_store
        .expect_find_by_name()
        .returning(|_| Err(CoreError::Database("connection reset".to_string())));

    let mut api = MockApi::new();
    api.expect_query().never();

    let memory = MemoryStores::new();
    let stores = Stores {
        food_items: Arc::new(food_store),
        circuit_breakers: Arc::new(memory.circuit_breakers.clone()),
        user_infos: Arc::new(memory.user_infos.clone()),
        logged_items: Arc::new(memory.logged_items.clone()),
    };
    let ctx =
        TestContext::with_stores(MockServer::start().await, Arc::new(api), memory, Some(stores))
            .await;

    let err = ctx.state.nutrition.fetch_or_cache("apple").await.unwrap_err();
    assert!(matches!(err, FetchError::Persistence(CoreError::Database(_))));
}
