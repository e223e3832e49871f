use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::errors::StoreError;
use crate::models::is_safe_identifier;
use crate::services::bar_cache::DEFAULT_CACHE_SIZE;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Store configuration, usually read from the environment (with `.env`
/// support via dotenvy).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Principal newly created tables are handed to; `None` leaves tables
    /// owned by the connecting role.
    pub table_owner: Option<String>,
    pub max_connections: u32,
    /// Capacity of the in-memory read cache; zero disables it.
    pub cache_size: usize,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            table_owner: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }

    pub fn from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::config("DATABASE_URL is not set"))?;
        let table_owner = std::env::var("OHLCV_STORE_TABLE_OWNER").ok();
        let max_connections = std::env::var("OHLCV_STORE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let cache_size = std::env::var("OHLCV_STORE_CACHE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CACHE_SIZE);

        let config = Self {
            database_url,
            table_owner,
            max_connections,
            cache_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.database_url.is_empty() {
            return Err(StoreError::config("database URL is empty"));
        }
        if self.max_connections == 0 {
            return Err(StoreError::config("max_connections must be at least 1"));
        }
        if let Some(owner) = &self.table_owner {
            if !is_safe_identifier(owner) {
                return Err(StoreError::constraint(format!(
                    "invalid table owner '{}'",
                    owner
                )));
            }
        }
        Ok(())
    }

    /// Build a connection pool for this configuration.
    pub async fn connect(&self) -> Result<PgPool, StoreError> {
        self.validate()?;
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.database_url)
            .await?;
        Ok(pool)
    }
}
