//! Food items cached from the remote nutrition API.
//!
//! Stored nutrient values are always per [`REFERENCE_WEIGHT_G`] grams. Scaling
//! for a logged quantity happens on read through [`NutritionFacts::scaled`]
//! and never mutates the stored item.

use serde::{Deserialize, Serialize};

use super::ids::FoodItemId;
use crate::error::{CoreError, Result};

/// Reference weight every stored item is normalized to
pub const REFERENCE_WEIGHT_G: f64 = 100.0;

/// Nutrient quantities for a given weight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NutritionFacts {
    pub calories: f64,
    pub weight_g: f64,
    pub fat_total: f64,
    pub fat_saturated: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fiber: f64,
    pub sugar: f64,
    /// milligrams
    pub sodium: f64,
    /// milligrams
    pub potassium: f64,
    /// milligrams
    pub cholesterol: f64,
}

impl NutritionFacts {
    /// Multiply every nutrient and the weight itself by `multiplier`.
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            weight_g: self.weight_g * multiplier,
            fat_total: self.fat_total * multiplier,
            fat_saturated: self.fat_saturated * multiplier,
            protein: self.protein * multiplier,
            carbohydrates: self.carbohydrates * multiplier,
            fiber: self.fiber * multiplier,
            sugar: self.sugar * multiplier,
            sodium: self.sodium * multiplier,
            potassium: self.potassium * multiplier,
            cholesterol: self.cholesterol * multiplier,
        }
    }
}

/// One entry of the upstream `items` array, in the upstream field naming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawNutritionItem {
    pub name: String,
    pub calories: f64,
    pub serving_size_g: f64,
    pub fat_total_g: f64,
    pub fat_saturated_g: f64,
    pub protein_g: f64,
    pub carbohydrates_total_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
    pub potassium_mg: f64,
    pub cholesterol_mg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    pub id: FoodItemId,
    /// Canonical lowercase name, the soft-unique cache key
    pub name: String,
    /// Serving weight reported upstream, before normalization
    pub serving_size_g: f64,
    /// Per-100g values
    pub nutrition: NutritionFacts,
}

impl FoodItem {
    /// Canonical form of a food name or query used for cache lookups.
    pub fn canonical_name(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Normalize an upstream item to per-100g values.
    pub fn from_raw(raw: &RawNutritionItem) -> Result<Self> {
        if !raw.serving_size_g.is_finite() || raw.serving_size_g <= 0.0 {
            return Err(CoreError::Validation(format!(
                "serving_size_g must be positive, got {}",
                raw.serving_size_g
            )));
        }

        let multiplier = REFERENCE_WEIGHT_G / raw.serving_size_g;
        let as_served = NutritionFacts {
            calories: raw.calories,
            weight_g: raw.serving_size_g,
            fat_total: raw.fat_total_g,
            fat_saturated: raw.fat_saturated_g,
            protein: raw.protein_g,
            carbohydrates: raw.carbohydrates_total_g,
            fiber: raw.fiber_g,
            sugar: raw.sugar_g,
            sodium: raw.sodium_mg,
            potassium: raw.potassium_mg,
            cholesterol: raw.cholesterol_mg,
        };

        let nutrition = NutritionFacts {
            weight_g: REFERENCE_WEIGHT_G,
            ..as_served.scaled(multiplier)
        };

        Ok(Self {
            id: FoodItemId::new(),
            name: Self::canonical_name(&raw.name),
            serving_size_g: raw.serving_size_g,
            nutrition,
        })
    }

    /// Nutrition for `grams` of this food.
    pub fn for_quantity(&self, grams: f64) -> NutritionFacts {
        self.nutrition.scaled(grams / REFERENCE_WEIGHT_G)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name == Self::canonical_name(name)
    }
}
