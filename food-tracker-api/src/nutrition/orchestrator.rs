//! Fetch-or-cache over the remote nutrition API.
//!
//! A query is served from the cache when possible. On a miss the breaker is
//! consulted, the API is called under the retry policy, the breaker is told
//! how it went, and a usable item is cached.
//!
//! Attempt outcomes are three-way:
//!
//! | outcome | retried | breaker |
//! |---|---|---|
//! | usable item | no | resolves HALF_OPEN as success |
//! | unparseable body, missing fields | no | untouched |
//! | `{"items": []}` | no | untouched |
//! | transport error, non-2xx status | yes | trips on exhaustion, or resolves HALF_OPEN as failure |

use food_tracker_core::{CircuitBreakerRecord, CoreError, FoodItem, RawNutritionItem};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::cache::FoodCache;
use super::client::NutritionApi;
use crate::resilience::{retry, BreakerSnapshot, CircuitBreaker, ConstantBackoff, RetryError};

/// Breaker lineage for the nutrition API
pub const NUTRITION_API_EVENT: &str = "calorie_ninjas_api";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("circuit breaker is tripped")]
    CircuitOpen,

    /// The API answered and had nothing for the query. Carries the raw body.
    #[error("{body}")]
    NotFound { body: String },

    #[error("{0}")]
    MalformedResponse(String),

    #[error("{0}")]
    UpstreamTransport(String),

    #[error("{message}")]
    UpstreamHttp { status: u16, message: String },

    #[error("{0}")]
    Persistence(#[from] CoreError),
}

impl FetchError {
    pub fn status_code(&self) -> u16 {
        match self {
            FetchError::CircuitOpen => 503,
            FetchError::NotFound { .. } => 404,
            FetchError::UpstreamHttp { status, .. } => *status,
            FetchError::MalformedResponse(_)
            | FetchError::UpstreamTransport(_)
            | FetchError::Persistence(_) => 500,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Result of one call that stops the retry loop
#[derive(Debug)]
enum Attempt {
    Fetched(FoodItem),
    Terminal(FetchError),
}

#[derive(Clone)]
pub struct NutritionService {
    cache: FoodCache,
    api: Arc<dyn NutritionApi>,
    breaker: CircuitBreaker,
    retry_policy: ConstantBackoff,
    event_name: String,
}

impl NutritionService {
    pub fn new(
        cache: FoodCache,
        api: Arc<dyn NutritionApi>,
        breaker: CircuitBreaker,
        retry_policy: ConstantBackoff,
    ) -> Self {
        Self {
            cache,
            api,
            breaker,
            retry_policy,
            event_name: NUTRITION_API_EVENT.to_string(),
        }
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn cache(&self) -> &FoodCache {
        &self.cache
    }

    /// Readiness hook for the remote API
    pub async fn ping(&self) -> Result<(), String> {
        self.api.ping().await.map_err(|e| e.to_string())
    }

    #[instrument(skip(self), fields(event_name = %self.event_name))]
    pub async fn fetch_or_cache(&self, query: &str) -> Result<FoodItem, FetchError> {
        if let Some(cached) = self.cache.find_by_name(query).await? {
            debug!(id = %cached.id, "Serving food item from cache");
            return Ok(cached);
        }

        let snapshot = self.breaker.snapshot(&self.event_name).await?;
        if snapshot.is_open() {
            warn!("Nutrition API breaker is open, failing fast");
            return Err(FetchError::CircuitOpen);
        }

        match retry(&self.retry_policy, || self.attempt(query)).await {
            Ok(Attempt::Fetched(item)) => {
                let written = self.breaker.record_success(&snapshot).await;
                log_breaker_write(&snapshot, written);

                let stored = self.cache.upsert_if_absent(item).await?;
                let inserted = stored.was_inserted();
                let item = stored.into_inner();
                info!(name = %item.name, id = %item.id, inserted, "Fetched food item");
                Ok(item)
            }
            Ok(Attempt::Terminal(err)) => {
                debug!(status = err.status_code(), error = %err, "Nutrition API lookup ended without a usable item");
                Err(err)
            }
            Err(RetryError { error: err, attempts }) => {
                warn!(attempts, status = err.status_code(), error = %err, "Nutrition API attempts exhausted");
                let written = self.breaker.record_failure(&snapshot).await;
                log_breaker_write(&snapshot, written);
                Err(err)
            }
        }
    }

    /// Transient failures come back as `Err` and are retried.
    async fn attempt(&self, query: &str) -> Result<Attempt, FetchError> {
        let response = self
            .api
            .query(query)
            .await
            .map_err(|e| FetchError::UpstreamTransport(e.to_string()))?;

        if !response.is_success() {
            return Err(FetchError::UpstreamHttp {
                status: response.status,
                message: response.body,
            });
        }

        Ok(interpret_body(response.body))
    }
}

/// Breaker bookkeeping never masks the outcome of the call itself.
fn log_breaker_write(
    snapshot: &BreakerSnapshot,
    written: food_tracker_core::Result<Option<CircuitBreakerRecord>>,
) {
    match written {
        Ok(Some(record)) => {
            debug!(event_name = %snapshot.event_name, state = %record.state, "Breaker record written")
        }
        Ok(None) => {}
        Err(e) => {
            error!(event_name = %snapshot.event_name, error = %e, "Failed to write breaker record")
        }
    }
}

fn interpret_body(body: String) -> Attempt {
    let content: Value = match serde_json::from_str(&body) {
        Ok(content) => content,
        Err(e) => {
            return Attempt::Terminal(FetchError::MalformedResponse(format!(
                "Failed to convert response to JSON: {e}"
            )))
        }
    };

    let Some(items) = content.get("items").and_then(Value::as_array) else {
        return Attempt::Terminal(malformed("missing 'items' array"));
    };

    let Some(first) = items.first() else {
        return Attempt::Terminal(FetchError::NotFound { body });
    };

    let raw = match RawNutritionItem::deserialize(first) {
        Ok(raw) => raw,
        Err(e) => return Attempt::Terminal(malformed(e)),
    };

    match FoodItem::from_raw(&raw) {
        Ok(item) => Attempt::Fetched(item),
        Err(e) => Attempt::Terminal(malformed(e)),
    }
}

fn malformed(reason: impl std::fmt::Display) -> FetchError {
    FetchError::MalformedResponse(format!(
        "Failed to convert food item from API response: {reason}"
    ))
}
