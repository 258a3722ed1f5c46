//! PostgreSQL connection pool and schema management.

use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::repositories::{
    PgCircuitBreakerRepository, PgFoodItemRepository, PgLoggedItemRepository,
    PgUserInfoRepository,
};

/// Configuration for PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl PostgresConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Create a PostgreSQL connection pool with default settings
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(&PostgresConfig::new(database_url)).await
}

/// Create a PostgreSQL connection pool with custom configuration
pub async fn create_pool_with_config(config: &PostgresConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .connect(&config.database_url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "PostgreSQL connection pool created"
    );

    Ok(pool)
}

/// Run database migrations
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

/// Health check for database connection
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;

    tracing::debug!("Database health check passed");
    Ok(())
}

/// Every repository over one shared pool
#[derive(Debug, Clone)]
pub struct PgStores {
    pub food_items: PgFoodItemRepository,
    pub circuit_breakers: PgCircuitBreakerRepository,
    pub user_infos: PgUserInfoRepository,
    pub logged_items: PgLoggedItemRepository,
}

impl PgStores {
    pub fn new(pool: PgPool) -> Self {
        Self {
            food_items: PgFoodItemRepository::new(pool.clone()),
            circuit_breakers: PgCircuitBreakerRepository::new(pool.clone()),
            user_infos: PgUserInfoRepository::new(pool.clone()),
            logged_items: PgLoggedItemRepository::new(pool),
        }
    }
}
