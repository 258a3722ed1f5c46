use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::domain::{
    BreakerRecordId, CircuitBreakerRecord, CircuitState, FoodItem, FoodItemId, LoggedItem,
    LoggedItemId, UserId, UserInfo,
};
use crate::error::Result;

/// Cache of food items materialized from the remote nutrition API
#[async_trait]
pub trait FoodItemStore: Send + Sync {
    /// Case-insensitive exact match on the canonical name; first match wins.
    async fn find_by_name(&self, name: &str) -> Result<Option<FoodItem>>;
    async fn find_by_id(&self, id: &FoodItemId) -> Result<Option<FoodItem>>;
    async fn insert(&self, item: &FoodItem) -> Result<FoodItem>;
}

/// Append-only log of circuit breaker transitions
#[async_trait]
pub trait CircuitBreakerStore: Send + Sync {
    async fn insert(&self, record: &CircuitBreakerRecord) -> Result<CircuitBreakerRecord>;
    async fn find_by_id(&self, id: &BreakerRecordId) -> Result<Option<CircuitBreakerRecord>>;
    /// Latest record by timestamp for one event name
    async fn latest(&self, event_name: &str) -> Result<Option<CircuitBreakerRecord>>;
    /// Set `to` on every record stored as `from` with a timestamp before `older_than`.
    async fn transition_stale(
        &self,
        from: CircuitState,
        to: CircuitState,
        older_than: DateTime<Utc>,
    ) -> Result<u64>;
}

#[async_trait]
pub trait UserInfoStore: Send + Sync {
    async fn insert(&self, user: &UserInfo) -> Result<UserInfo>;
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserInfo>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserInfo>>;
    async fn delete(&self, id: &UserId) -> Result<bool>;
}

#[async_trait]
pub trait LoggedItemStore: Send + Sync {
    async fn insert(&self, item: &LoggedItem) -> Result<LoggedItem>;
    async fn find_by_id(&self, id: &LoggedItemId) -> Result<Option<LoggedItem>>;
    /// Items for a user with `from <= timestamp <= to`
    async fn list_for_user(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LoggedItem>>;
    async fn delete(&self, id: &LoggedItemId) -> Result<bool>;
    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64>;
}

/// Wall-clock source for breaker timestamps and timeout comparison
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.millis.fetch_add(by, Ordering::SeqCst);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}
