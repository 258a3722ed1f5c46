use async_trait::async_trait;
use food_tracker_core::{CoreError, Result, UserId, UserInfo, UserInfoStore};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgUserInfoRepository {
    pool: PgPool,
}

impl PgUserInfoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserInfoStore for PgUserInfoRepository {
    async fn insert(&self, user: &UserInfo) -> Result<UserInfo> {
        let age = i32::try_from(user.age)
            .map_err(|_| CoreError::Validation(format!("age out of range: {}", user.age)))?;

        let row = sqlx::query(
            r#"
            INSERT INTO user_infos (id, username, age, height, weight, gender, activity_level)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, age, height, weight, gender, activity_level
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(age)
        .bind(user.height)
        .bind(user.weight)
        .bind(user.gender.as_str())
        .bind(user.activity_level.as_str())
        .fetch_one(&self.pool)
        .await?;

        row_to_user(row)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserInfo>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, age, height, weight, gender, activity_level
            FROM user_infos
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserInfo>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, age, height, weight, gender, activity_level
            FROM user_infos
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_infos WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: sqlx::postgres::PgRow) -> Result<UserInfo> {
    let id: Uuid = row.try_get("id")?;
    let age: i32 = row.try_get("age")?;
    let gender: String = row.try_get("gender")?;
    let activity_level: String = row.try_get("activity_level")?;

    Ok(UserInfo {
        id: UserId::from_uuid(id),
        username: row.try_get("username")?,
        age: u32::try_from(age)
            .map_err(|_| CoreError::Serialization(format!("negative age stored: {age}")))?,
        height: row.try_get("height")?,
        weight: row.try_get("weight")?,
        gender: gender.parse()?,
        activity_level: activity_level.parse()?,
    })
}
