use anyhow::Result;
use food_tracker_api::{
    clients::{BackendClient, RdaClient},
    nutrition::{CalorieNinjasClient, CalorieNinjasConfig},
    resilience::{CircuitBreaker, CircuitBreakerConfig},
    AppState, Stores,
};
use food_tracker_core::SystemClock;
use food_tracker_storage::{postgres, MemoryStores};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first, the log format depends on it
    let config = config::Config::load()?;
    init_tracing(&config);

    tracing::info!("Starting food tracker server");

    let (stores, db_pool) = match &config.database_url {
        Some(url) => {
            let pool = postgres::create_pool(url).await?;
            postgres::migrate(&pool).await?;
            tracing::info!("Database pool initialized");
            (Stores::from(postgres::PgStores::new(pool.clone())), Some(pool))
        }
        None => {
            tracing::warn!("No database_url configured, using in-memory stores");
            (Stores::from(MemoryStores::new()), None)
        }
    };

    let nutrition_api = CalorieNinjasClient::new(CalorieNinjasConfig {
        base_url: config.nutrition_api_url.clone(),
        api_key: config.nutrition_api_key.clone(),
        request_timeout: config.request_timeout(),
    })?;
    let backend = BackendClient::new(&config.backend_url, config.request_timeout())?;

    let mut state = AppState::new(
        stores,
        Arc::new(nutrition_api),
        backend,
        Arc::new(SystemClock),
        CircuitBreakerConfig {
            timeout: config.breaker_timeout(),
        },
        config.retry_policy(),
    );

    match (&config.rda_url, &config.rda_auth) {
        (Some(url), Some(auth)) => {
            state = state.with_rda(RdaClient::new(url, auth, config.request_timeout())?);
            tracing::info!("Daily RDA client initialized");
        }
        _ => tracing::info!("Daily RDA endpoint not configured"),
    }

    if let Some(pool) = db_pool {
        state = state.with_db_pool(pool);
    }

    tokio::spawn(sweep_stale_breakers(
        state.nutrition.breaker().clone(),
        config.breaker_sweep_interval(),
    ));

    let app = food_tracker_api::app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &config::Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Directives used when `RUST_LOG` is unset: every workspace crate at `level`.
fn default_filter(level: &str) -> String {
    format!(
        "food_tracker={level},food_tracker_api={level},food_tracker_storage={level},\
         food_tracker_core={level},tower_http=debug"
    )
}

/// Periodically move OPEN records past their cutoff to HALF_OPEN.
async fn sweep_stale_breakers(breaker: CircuitBreaker, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        if let Err(e) = breaker.sweep_stale_open().await {
            tracing::error!(error = %e, "Circuit breaker sweep failed");
        }
    }
}
