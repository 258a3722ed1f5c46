use async_trait::async_trait;
use chrono::{DateTime, Utc};
use food_tracker_core::{
    FoodItemId, LoggedItem, LoggedItemId, LoggedItemStore, Result, UserId,
};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgLoggedItemRepository {
    pool: PgPool,
}

impl PgLoggedItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoggedItemStore for PgLoggedItemRepository {
    async fn insert(&self, item: &LoggedItem) -> Result<LoggedItem> {
        let row = sqlx::query(
            r#"
            INSERT INTO logged_items (id, logged_at, quantity, user_id, food_item_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, logged_at, quantity, user_id, food_item_id
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.timestamp)
        .bind(item.quantity)
        .bind(item.user_id.as_uuid())
        .bind(item.food_item_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        row_to_logged_item(row)
    }

    async fn find_by_id(&self, id: &LoggedItemId) -> Result<Option<LoggedItem>> {
        let row = sqlx::query(
            r#"
            SELECT id, logged_at, quantity, user_id, food_item_id
            FROM logged_items
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_logged_item).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LoggedItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, logged_at, quantity, user_id, food_item_id
            FROM logged_items
            WHERE user_id = $1 AND logged_at >= $2 AND logged_at <= $3
            ORDER BY logged_at ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_logged_item).collect()
    }

    async fn delete(&self, id: &LoggedItemId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM logged_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM logged_items WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn row_to_logged_item(row: sqlx::postgres::PgRow) -> Result<LoggedItem> {
    let id: Uuid = row.try_get("id")?;
    let user_id: Uuid = row.try_get("user_id")?;
    let food_item_id: Uuid = row.try_get("food_item_id")?;

    Ok(LoggedItem {
        id: LoggedItemId::from_uuid(id),
        timestamp: row.try_get("logged_at")?,
        quantity: row.try_get("quantity")?,
        user_id: UserId::from_uuid(user_id),
        food_item_id: FoodItemId::from_uuid(food_item_id),
    })
}
