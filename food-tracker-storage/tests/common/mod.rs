#![allow(dead_code)]

use chrono::NaiveDate;
use food_tracker_core::domain::{
    ActivityLevel, FoodItem, Gender, RawNutritionItem, UserInfo,
};
use uuid::Uuid;

/// Build a normalized food item as the nutrition API would produce it
pub fn create_test_food_item(name: &str) -> FoodItem {
    let raw = RawNutritionItem {
        name: name.to_string(),
        calories: 95.0,
        serving_size_g: 190.0,
        fat_total_g: 0.3,
        fat_saturated_g: 0.1,
        protein_g: 0.5,
        carbohydrates_total_g: 25.0,
        fiber_g: 4.4,
        sugar_g: 19.0,
        sodium_mg: 2.0,
        potassium_mg: 195.0,
        cholesterol_mg: 0.0,
    };
    FoodItem::from_raw(&raw).expect("valid test item")
}

pub fn create_test_user(username: &str) -> UserInfo {
    UserInfo::new(
        username.to_string(),
        35,
        190.0,
        80.0,
        Gender::Male,
        ActivityLevel::Moderate,
    )
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Generate a unique test name to avoid conflicts
pub fn unique_test_name(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
