use chrono::{DateTime, Utc};
use food_tracker_core::LoggedItem;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::FoodItemResponse;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateLoggedItemRequest {
    #[validate(custom(function = "not_blank"))]
    pub food_name: String,
    /// grams
    #[validate(range(exclusive_min = 0.0))]
    pub weight: f64,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank")
            .with_message("Food name cannot be empty".into()));
    }
    Ok(())
}

/// `date` in `dd/mm/YYYY`, today when absent
#[derive(Debug, Default, Deserialize)]
pub struct LogDateQuery {
    pub date: Option<String>,
}

/// Inclusive `dd/mm/YYYY` bounds, epoch and today when absent
#[derive(Debug, Default, Deserialize)]
pub struct LoggedItemRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggedItemResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub quantity: f64,
    pub user_id: Uuid,
    pub food_item_id: Uuid,
}

impl From<LoggedItem> for LoggedItemResponse {
    fn from(item: LoggedItem) -> Self {
        Self {
            id: item.id.into(),
            timestamp: item.timestamp,
            quantity: item.quantity,
            user_id: item.user_id.into(),
            food_item_id: item.food_item_id.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoggedItemCreatedResponse {
    pub message: String,
    pub logged_item: LoggedItemResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoggedItemsResponse {
    pub logged_items: Vec<FoodItemResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_food_name_rejected() {
        let request = CreateLoggedItemRequest {
            food_name: "   ".to_string(),
            weight: 100.0,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        let request = CreateLoggedItemRequest {
            food_name: "apple".to_string(),
            weight: 0.0,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_valid_request() {
        let request = CreateLoggedItemRequest {
            food_name: "apple".to_string(),
            weight: 150.0,
        };
        assert!(request.validate().is_ok());
    }
}
