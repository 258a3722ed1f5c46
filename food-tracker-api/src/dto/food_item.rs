use food_tracker_core::{FoodItem, LoggedItem, NutritionFacts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A food item with its nutrients flattened next to the id and name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItemResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub nutrition: NutritionFacts,
}

impl FoodItemResponse {
    /// The food scaled to the logged quantity, identified by the logged item.
    pub fn for_logged_item(food: &FoodItem, logged: &LoggedItem) -> Self {
        Self {
            id: *logged.id.as_uuid(),
            name: food.name.clone(),
            nutrition: food.for_quantity(logged.quantity),
        }
    }
}

impl From<FoodItem> for FoodItemResponse {
    fn from(item: FoodItem) -> Self {
        Self {
            id: item.id.into(),
            name: item.name,
            nutrition: item.nutrition,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItemEnvelope {
    pub food_item: FoodItemResponse,
}
