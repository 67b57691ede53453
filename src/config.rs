use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ENV: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Loads configuration from built-in defaults overridden by `APP__`-prefixed
/// environment variables (e.g. `APP__DATABASE_URL`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("database_url", "sqlite://larder.db?mode=rwc")?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("db_max_connections", 10)?
        .set_default("db_min_connections", 1)?
        .add_source(Environment::with_prefix("APP").separator("__"));

    let cfg: AppConfig = builder.build()?.try_deserialize()?;
    info!(environment = %cfg.environment, "Configuration loaded");
    Ok(cfg)
}

/// Installs the global tracing subscriber. Safe to call more than once; later
/// calls are no-ops.
pub fn init_telemetry(cfg: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_level.clone()));

    if cfg.log_json {
        let _ = tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}
