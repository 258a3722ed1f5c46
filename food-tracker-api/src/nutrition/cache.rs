//! Lookup-before-insert over the food item store.
//!
//! The name is a soft-unique key. Two requests racing on the same uncached
//! name can both miss, but the re-check right before insert keeps the common
//! case to a single row. There is no transaction around the pair.

use food_tracker_core::{FoodItem, FoodItemStore, Result};
use std::sync::Arc;
use tracing::debug;

/// What `upsert_if_absent` did
#[derive(Debug, Clone, PartialEq)]
pub enum Upserted {
    Inserted(FoodItem),
    /// Another writer got there first; this is the stored row
    AlreadyPresent(FoodItem),
}

impl Upserted {
    pub fn into_inner(self) -> FoodItem {
        match self {
            Upserted::Inserted(item) | Upserted::AlreadyPresent(item) => item,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, Upserted::Inserted(_))
    }
}

#[derive(Clone)]
pub struct FoodCache {
    store: Arc<dyn FoodItemStore>,
}

impl FoodCache {
    pub fn new(store: Arc<dyn FoodItemStore>) -> Self {
        Self { store }
    }

    /// Case-insensitive exact match, first match wins.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<FoodItem>> {
        self.store.find_by_name(&FoodItem::canonical_name(name)).await
    }

    pub async fn upsert_if_absent(&self, item: FoodItem) -> Result<Upserted> {
        if let Some(existing) = self.find_by_name(&item.name).await? {
            debug!(name = %existing.name, id = %existing.id, "Food item already cached, skipping insert");
            return Ok(Upserted::AlreadyPresent(existing));
        }

        let inserted = self.store.insert(&item).await?;
        debug!(name = %inserted.name, id = %inserted.id, "Cached new food item");

        Ok(Upserted::Inserted(inserted))
    }
}
