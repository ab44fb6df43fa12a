use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct InvoiceConfig {
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub database: DatabaseConfig,
    pub numbering: NumberingConfig,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone)]
pub struct NumberingConfig {
    /// Upper bound on a counter call; a slower call fails the save.
    pub counter_timeout_ms: u64,
}

impl NumberingConfig {
    pub fn counter_timeout(&self) -> Duration {
        Duration::from_millis(self.counter_timeout_ms)
    }
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            counter_timeout_ms: 5_000,
        }
    }
}

impl InvoiceConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend: StoreBackend = get_env("STORE_BACKEND", Some("postgres"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let url = match backend {
            StoreBackend::Postgres => Some(get_env("DATABASE_URL", None, is_prod)?),
            StoreBackend::Memory => env::var("DATABASE_URL").ok(),
        };

        Ok(InvoiceConfig {
            common: common_config,
            store: StoreConfig { backend },
            database: DatabaseConfig {
                url,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", 1)?,
                run_migrations: parse_env("DATABASE_RUN_MIGRATIONS", true)?,
            },
            numbering: NumberingConfig {
                counter_timeout_ms: parse_env(
                    "COUNTER_TIMEOUT_MS",
                    NumberingConfig::default().counter_timeout_ms,
                )?,
            },
        })
    }

    /// In-memory configuration for tests and local runs.
    pub fn in_memory() -> Self {
        InvoiceConfig {
            common: core_config::Config::default(),
            store: StoreConfig {
                backend: StoreBackend::Memory,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 1,
                min_connections: 0,
                run_migrations: false,
            },
            numbering: NumberingConfig::default(),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
