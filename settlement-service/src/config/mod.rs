use serde::Deserialize;
use settlement_core::config as core_config;
use settlement_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// When false the service runs on the in-memory store.
    #[serde(default)]
    pub enabled: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            enabled: false,
        }
    }
}

impl SettlementConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))
    }
}
