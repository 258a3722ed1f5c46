use async_trait::async_trait;
use chrono::{DateTime, Utc};
use food_tracker_core::{
    BreakerRecordId, CircuitBreakerRecord, CircuitBreakerStore, CircuitState, Result,
};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgCircuitBreakerRepository {
    pool: PgPool,
}

impl PgCircuitBreakerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CircuitBreakerStore for PgCircuitBreakerRepository {
    async fn insert(&self, record: &CircuitBreakerRecord) -> Result<CircuitBreakerRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO circuit_breakers (id, event_name, state, recorded_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, event_name, state, recorded_at
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.event_name)
        .bind(record.state.as_str())
        .bind(record.timestamp)
        .fetch_one(&self.pool)
        .await?;

        row_to_record(row)
    }

    async fn find_by_id(&self, id: &BreakerRecordId) -> Result<Option<CircuitBreakerRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, event_name, state, recorded_at
            FROM circuit_breakers
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_record).transpose()
    }

    async fn latest(&self, event_name: &str) -> Result<Option<CircuitBreakerRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, event_name, state, recorded_at
            FROM circuit_breakers
            WHERE event_name = $1
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .bind(event_name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_record).transpose()
    }

    async fn transition_stale(
        &self,
        from: CircuitState,
        to: CircuitState,
        older_than: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE circuit_breakers
            SET state = $1
            WHERE state = $2 AND recorded_at < $3
            "#,
        )
        .bind(to.as_str())
        .bind(from.as_str())
        .bind(older_than)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn row_to_record(row: sqlx::postgres::PgRow) -> Result<CircuitBreakerRecord> {
    let id: Uuid = row.try_get("id")?;
    let state: String = row.try_get("state")?;

    Ok(CircuitBreakerRecord {
        id: BreakerRecordId::from_uuid(id),
        event_name: row.try_get("event_name")?,
        state: state.parse()?,
        timestamp: row.try_get("recorded_at")?,
    })
}
