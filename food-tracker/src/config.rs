use anyhow::Result;
use config::{Config as ConfigLoader, Environment, File};
use food_tracker_api::resilience::ConstantBackoff;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variables override files, e.g. `FOOD_TRACKER_PORT=8080`.
pub const ENV_PREFIX: &str = "FOOD_TRACKER";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    /// In-memory stores are used when unset
    pub database_url: Option<String>,
    pub log_level: String,
    /// `pretty` or `json`
    pub log_format: String,
    pub nutrition_api_url: String,
    pub nutrition_api_key: String,
    /// Base URL of the service answering food item and user lookups
    pub backend_url: String,
    pub rda_url: Option<String>,
    pub rda_auth: Option<String>,
    pub breaker_timeout_secs: u64,
    pub breaker_sweep_interval_secs: u64,
    pub retry_attempts: usize,
    pub retry_delay_secs: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config"))
    }

    /// Read `default` and `local` files from `dir`, then the environment.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let default = dir.join("default");
        let local = dir.join("local");

        let config = ConfigLoader::builder()
            .add_source(File::with_name(&default.to_string_lossy()).required(false))
            .add_source(File::with_name(&local.to_string_lossy()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn breaker_timeout(&self) -> Duration {
        Duration::from_secs(self.breaker_timeout_secs)
    }

    pub fn breaker_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.breaker_sweep_interval_secs.max(1))
    }

    /// Attempts and pause used for nutrition API calls
    pub fn retry_policy(&self) -> ConstantBackoff {
        ConstantBackoff::new(self.retry_attempts, Duration::from_secs(self.retry_delay_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            nutrition_api_url: "https://api.calorieninjas.com".to_string(),
            nutrition_api_key: String::new(),
            backend_url: "http://localhost:3000".to_string(),
            rda_url: None,
            rda_auth: None,
            breaker_timeout_secs: 30,
            breaker_sweep_interval_secs: 15,
            retry_attempts: 3,
            retry_delay_secs: 3,
            request_timeout_secs: 10,
        }
    }
}
