use crate::config::AppConfig;
use crate::errors::ServiceError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, error, info};

pub type DbPool = DatabaseConnection;

/// Pool settings, normally taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

pub async fn connect(config: &DbConfig) -> Result<DbPool, ServiceError> {
    let backend = config.url.split(':').next().unwrap_or("unknown");
    debug!(backend, max = config.max_connections, "opening database pool");

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    let pool = Database::connect(opt).await.map_err(|e| {
        error!(backend, error = %e, "database unreachable");
        ServiceError::DatabaseError(e)
    })?;
    info!(backend, "database pool ready");
    Ok(pool)
}

pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    connect(&DbConfig::from(cfg)).await
}

/// Connects to a private in-memory SQLite database with the schema applied.
///
/// The pool is pinned to a single connection: every SQLite connection opened
/// on `sqlite::memory:` gets its own empty database.
pub async fn connect_in_memory() -> Result<DbPool, ServiceError> {
    let config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        idle_timeout: Duration::from_secs(24 * 60 * 60),
        ..Default::default()
    };
    let pool = connect(&config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Applies every migration not yet recorded. Safe to call on each start.
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    let started = std::time::Instant::now();
    crate::migrator::Migrator::up(pool, None).await.map_err(|e| {
        error!(error = %e, "migrations failed");
        ServiceError::DatabaseError(e)
    })?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "schema up to date");
    Ok(())
}

pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    pool.ping().await.map_err(ServiceError::DatabaseError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_migrates_and_pings() {
        let pool = connect_in_memory().await.expect("in-memory database");
        assert!(check_connection(&pool).await.is_ok());
        // Re-running is a no-op once every migration is recorded.
        assert!(run_migrations(&pool).await.is_ok());
    }
}
