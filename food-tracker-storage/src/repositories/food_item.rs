use async_trait::async_trait;
use food_tracker_core::{FoodItem, FoodItemId, FoodItemStore, NutritionFacts, Result};
use sqlx::{PgPool, Row};
use uuid::Uuid;

const COLUMNS: &str = "id, name, serving_size_g, calories, weight_g, fat_total, fat_saturated, \
                       protein, carbohydrates, fiber, sugar, sodium, potassium, cholesterol";

#[derive(Debug, Clone)]
pub struct PgFoodItemRepository {
    pool: PgPool,
}

impl PgFoodItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FoodItemStore for PgFoodItemRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<FoodItem>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM food_items WHERE lower(name) = $1 ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(FoodItem::canonical_name(name))
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_food_item).transpose()
    }

    async fn find_by_id(&self, id: &FoodItemId) -> Result<Option<FoodItem>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM food_items WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_food_item).transpose()
    }

    async fn insert(&self, item: &FoodItem) -> Result<FoodItem> {
        let n = &item.nutrition;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO food_items ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(item.serving_size_g)
        .bind(n.calories)
        .bind(n.weight_g)
        .bind(n.fat_total)
        .bind(n.fat_saturated)
        .bind(n.protein)
        .bind(n.carbohydrates)
        .bind(n.fiber)
        .bind(n.sugar)
        .bind(n.sodium)
        .bind(n.potassium)
        .bind(n.cholesterol)
        .fetch_one(&self.pool)
        .await?;

        row_to_food_item(row)
    }
}

fn row_to_food_item(row: sqlx::postgres::PgRow) -> Result<FoodItem> {
    let id: Uuid = row.try_get("id")?;

    Ok(FoodItem {
        id: FoodItemId::from_uuid(id),
        name: row.try_get("name")?,
        serving_size_g: row.try_get("serving_size_g")?,
        nutrition: NutritionFacts {
            calories: row.try_get("calories")?,
            weight_g: row.try_get("weight_g")?,
            fat_total: row.try_get("fat_total")?,
            fat_saturated: row.try_get("fat_saturated")?,
            protein: row.try_get("protein")?,
            carbohydrates: row.try_get("carbohydrates")?,
            fiber: row.try_get("fiber")?,
            sugar: row.try_get("sugar")?,
            sodium: row.try_get("sodium")?,
            potassium: row.try_get("potassium")?,
            cholesterol: row.try_get("cholesterol")?,
        },
    })
}
