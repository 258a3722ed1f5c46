//! Food lookups backed by the remote nutrition API.

pub mod cache;
pub mod client;
pub mod orchestrator;

pub use cache::{FoodCache, Upserted};
pub use client::{
    CalorieNinjasClient, CalorieNinjasConfig, NutritionApi, NutritionApiError, UpstreamResponse,
};
pub use orchestrator::{FetchError, NutritionService, NUTRITION_API_EVENT};
