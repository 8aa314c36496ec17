use std::sync::Arc;
use std::time::Duration;

use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::{AppConfig, DatabaseConfig, StoreBackend};

use super::memory::MemoryStore;
use super::postgres::PgStore;
use super::store::{Store, StoreError};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Builds connection pools and the configured store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a PostgreSQL pool using the configured URL and limits
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not configured".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Apply pending migrations from `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        MIGRATOR.run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Build the store selected by `APP_STORE`
    pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, StoreError> {
        match config.database.backend {
            StoreBackend::Memory => {
                warn!("Using in-memory store; data is lost on restart");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreBackend::Postgres => {
                let pool = Self::connect(&config.database).await?;
                if config.database.run_migrations {
                    Self::migrate(&pool).await?;
                }
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }
}
