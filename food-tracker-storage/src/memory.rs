//! In-process stores with the same semantics as the PostgreSQL repositories.
//!
//! Used by the test suites and by the server when no database URL is
//! configured. Nothing here survives a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use food_tracker_core::{
    BreakerRecordId, CircuitBreakerRecord, CircuitBreakerStore, CircuitState, CoreError,
    FoodItem, FoodItemId, FoodItemStore, LoggedItem, LoggedItemId, LoggedItemStore, Result,
    UserId, UserInfo, UserInfoStore,
};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct MemoryFoodItemStore {
    items: Arc<RwLock<Vec<FoodItem>>>,
}

impl MemoryFoodItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl FoodItemStore for MemoryFoodItemStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<FoodItem>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.matches_name(name)).cloned())
    }

    async fn find_by_id(&self, id: &FoodItemId) -> Result<Option<FoodItem>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| &item.id == id).cloned())
    }

    async fn insert(&self, item: &FoodItem) -> Result<FoodItem> {
        let mut items = self.items.write().await;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(CoreError::AlreadyExists(format!("food item {}", item.id)));
        }
        items.push(item.clone());
        Ok(item.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCircuitBreakerStore {
    records: Arc<RwLock<Vec<CircuitBreakerRecord>>>,
}

impl MemoryCircuitBreakerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record for one event name, oldest first
    pub async fn history(&self, event_name: &str) -> Vec<CircuitBreakerRecord> {
        let records = self.records.read().await;
        let mut history: Vec<_> = records
            .iter()
            .filter(|r| r.event_name == event_name)
            .cloned()
            .collect();
        history.sort_by_key(|r| r.timestamp);
        history
    }
}

#[async_trait]
impl CircuitBreakerStore for MemoryCircuitBreakerStore {
    async fn insert(&self, record: &CircuitBreakerRecord) -> Result<CircuitBreakerRecord> {
        self.records.write().await.push(record.clone());
        Ok(record.clone())
    }

    async fn find_by_id(&self, id: &BreakerRecordId) -> Result<Option<CircuitBreakerRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| &r.id == id).cloned())
    }

    async fn latest(&self, event_name: &str) -> Result<Option<CircuitBreakerRecord>> {
        let records = self.records.read().await;
        // Ties go to the later insert, matching append order
        Ok(records
            .iter()
            .filter(|r| r.event_name == event_name)
            .fold(None::<&CircuitBreakerRecord>, |latest, r| match latest {
                Some(l) if l.timestamp > r.timestamp => Some(l),
                _ => Some(r),
            })
            .cloned())
    }

    async fn transition_stale(
        &self,
        from: CircuitState,
        to: CircuitState,
        older_than: DateTime<Utc>,
    ) -> Result<u64> {
        let mut records = self.records.write().await;
        let mut updated = 0;
        for record in records
            .iter_mut()
            .filter(|r| r.state == from && r.timestamp < older_than)
        {
            record.state = to;
            updated += 1;
        }
        Ok(updated)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryUserInfoStore {
    users: Arc<RwLock<Vec<UserInfo>>>,
}

impl MemoryUserInfoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserInfoStore for MemoryUserInfoStore {
    async fn insert(&self, user: &UserInfo) -> Result<UserInfo> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(CoreError::AlreadyExists(format!(
                "username {} is taken",
                user.username
            )));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserInfo>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserInfo>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn delete(&self, id: &UserId) -> Result<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| &u.id != id);
        Ok(users.len() < before)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLoggedItemStore {
    items: Arc<RwLock<Vec<LoggedItem>>>,
}

impl MemoryLoggedItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoggedItemStore for MemoryLoggedItemStore {
    async fn insert(&self, item: &LoggedItem) -> Result<LoggedItem> {
        self.items.write().await.push(item.clone());
        Ok(item.clone())
    }

    async fn find_by_id(&self, id: &LoggedItemId) -> Result<Option<LoggedItem>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|i| &i.id == id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LoggedItem>> {
        let items = self.items.read().await;
        let mut found: Vec<_> = items
            .iter()
            .filter(|i| &i.user_id == user_id && i.timestamp >= from && i.timestamp <= to)
            .cloned()
            .collect();
        found.sort_by_key(|i| i.timestamp);
        Ok(found)
    }

    async fn delete(&self, id: &LoggedItemId) -> Result<bool> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|i| &i.id != id);
        Ok(items.len() < before)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|i| &i.user_id != user_id);
        Ok((before - items.len()) as u64)
    }
}

/// One of each in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStores {
    pub food_items: MemoryFoodItemStore,
    pub circuit_breakers: MemoryCircuitBreakerStore,
    pub user_infos: MemoryUserInfoStore,
    pub logged_items: MemoryLoggedItemStore,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }
}
