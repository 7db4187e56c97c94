use crate::config::AppConfig;
use crate::errors::ServiceError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Pool tuning for the SQLite connection.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    fn connect_options(&self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .sqlx_logging(true);
        opt
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 16,
            min_connections: 2,
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

/// Opens a pool against `database_url` with default tuning.
pub async fn connect(database_url: &str) -> Result<DbPool, ServiceError> {
    let config = DbConfig {
        url: database_url.to_string(),
        ..Default::default()
    };
    connect_with(&config).await
}

/// Opens a pool with explicit tuning.
pub async fn connect_with(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!(url = %config.url, max_connections = config.max_connections, "opening database pool");

    let pool = Database::connect(config.connect_options())
        .await
        .map_err(ServiceError::DatabaseError)?;

    info!("database pool ready");
    Ok(pool)
}

/// Opens a pool using the tuning carried in [`AppConfig`].
pub async fn connect_from_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg: DbConfig = cfg.into();
    connect_with(&db_cfg).await
}

/// Brings the schema up to date. Safe to call on every process start:
/// applied migrations are skipped and the schema statements themselves
/// are `IF NOT EXISTS`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    match crate::migrator::Migrator::up(pool, None).await {
        Ok(()) => {
            info!("database schema is up to date");
            Ok(())
        }
        Err(e) => {
            error!("database schema setup failed: {}", e);
            Err(ServiceError::DatabaseError(e))
        }
    }
}

/// Pings the database, for health reporting.
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    pool.ping().await.map_err(ServiceError::DatabaseError)
}
