//! HTTP surface of the food tracker: food lookups through the nutrition API,
//! user profiles, and logged items.

pub mod clients;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod nutrition;
pub mod resilience;

use axum::{
    routing::{delete, get, post},
    Router,
};
use food_tracker_core::{
    CircuitBreakerStore, Clock, FoodItemStore, LoggedItemStore, UserInfoStore,
};
use food_tracker_storage::{postgres::PgStores, MemoryStores};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use clients::{BackendClient, RdaClient};
use nutrition::{FoodCache, NutritionApi, NutritionService};
use resilience::{CircuitBreaker, CircuitBreakerConfig, ConstantBackoff};

pub use error::{ApiError, ApiResult};

/// One handle per store, whichever backend holds them
#[derive(Clone)]
pub struct Stores {
    pub food_items: Arc<dyn FoodItemStore>,
    pub circuit_breakers: Arc<dyn CircuitBreakerStore>,
    pub user_infos: Arc<dyn UserInfoStore>,
    pub logged_items: Arc<dyn LoggedItemStore>,
}

impl From<MemoryStores> for Stores {
    fn from(stores: MemoryStores) -> Self {
        Self {
            food_items: Arc::new(stores.food_items),
            circuit_breakers: Arc::new(stores.circuit_breakers),
            user_infos: Arc::new(stores.user_infos),
            logged_items: Arc::new(stores.logged_items),
        }
    }
}

impl From<PgStores> for Stores {
    fn from(stores: PgStores) -> Self {
        Self {
            food_items: Arc::new(stores.food_items),
            circuit_breakers: Arc::new(stores.circuit_breakers),
            user_infos: Arc::new(stores.user_infos),
            logged_items: Arc::new(stores.logged_items),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub nutrition: NutritionService,
    pub food_items: Arc<dyn FoodItemStore>,
    pub user_infos: Arc<dyn UserInfoStore>,
    pub logged_items: Arc<dyn LoggedItemStore>,
    pub backend: BackendClient,
    /// Absent when no RDA endpoint is configured
    pub rda: Option<RdaClient>,
    pub clock: Arc<dyn Clock>,
    /// Pinged by the readiness probe when running on PostgreSQL
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        stores: Stores,
        nutrition_api: Arc<dyn NutritionApi>,
        backend: BackendClient,
        clock: Arc<dyn Clock>,
        breaker_config: CircuitBreakerConfig,
        retry_policy: ConstantBackoff,
    ) -> Self {
        let breaker = CircuitBreaker::new(stores.circuit_breakers, clock.clone(), breaker_config);
        let nutrition = NutritionService::new(
            FoodCache::new(stores.food_items.clone()),
            nutrition_api,
            breaker,
            retry_policy,
        );

        Self {
            nutrition,
            food_items: stores.food_items,
            user_infos: stores.user_infos,
            logged_items: stores.logged_items,
            backend,
            rda: None,
            clock,
            db_pool: None,
        }
    }

    pub fn with_rda(mut self, rda: RdaClient) -> Self {
        self.rda = Some(rda);
        self
    }

    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

/// Routes served under `/api/v1`
pub fn routes(state: AppState) -> Router {
    use handlers::{food_items, logged_items, user_infos};

    Router::new()
        .route("/", get(handlers::root))
        .route("/food_item/:query", get(food_items::get))
        .route("/user_info", post(user_infos::create))
        .route("/user_info/", post(user_infos::create))
        .route(
            "/user_info/id/:id",
            get(user_infos::get).delete(user_infos::delete),
        )
        .route("/user_info/id/:id/daily_rda", get(user_infos::daily_rda))
        .route(
            "/user_info/username/:username",
            get(user_infos::get_by_username),
        )
        .route(
            "/logged_item/user/:user_id",
            post(logged_items::create).get(logged_items::list),
        )
        .route("/logged_item/:id", delete(logged_items::delete))
        .with_state(state)
}

/// The whole application: greeting, health probes, the API, CORS and tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health/live", get(handlers::health::live))
        .route("/health/ready", get(handlers::health::ready))
        .with_state(state.clone())
        .nest("/api/v1", routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
