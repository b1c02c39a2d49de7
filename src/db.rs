use std::sync::{Arc, Mutex};

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info, instrument};

use crate::config::DbConfig;
use crate::error::{Error, Result};

/// Handle to a single PostgreSQL database.
///
/// Starts uninitialized; `initialize` opens the pool, and opens a fresh one
/// if the previous pool was closed. Clones share the pool, so closing one
/// clone closes them all.
#[derive(Clone)]
pub struct Database {
    config: Option<Arc<DbConfig>>,
    pool: Arc<Mutex<Option<PgPool>>>,
}

impl Database {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config: Some(Arc::new(config)),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            config: None,
            pool: Arc::new(Mutex::new(Some(pool))),
        }
    }

    pub async fn connect(config: DbConfig) -> Result<Self> {
        let db = Self::new(config);
        db.initialize().await?;
        Ok(db)
    }

    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        // a pool handed in from outside cannot be reopened
        let Some(config) = self.config.as_deref() else {
            return Err(Error::NotConnected);
        };

        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_with(config.connect_options())
            .await
            .map_err(Error::Connection)?;
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "connected to database"
        );

        let stale = self.slot().replace(pool);
        if let Some(stale) = stale {
            // the closed pool, or one opened by a concurrent initialize
            stale.close().await;
        }
        Ok(())
    }

    /// Run the embedded migrations in `./migrations`.
    pub async fn migrate(&self) -> Result<()> {
        let pool = self.pool()?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!("migrations applied");
        Ok(())
    }

    /// The live pool. `PgPool` is reference counted, so this is a cheap clone.
    pub fn pool(&self) -> Result<PgPool> {
        match self.slot().as_ref() {
            Some(pool) if !pool.is_closed() => Ok(pool.clone()),
            _ => Err(Error::NotConnected),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.pool().is_ok()
    }

    pub async fn close(&self) {
        let pool = self.slot().clone();
        if let Some(pool) = pool {
            if !pool.is_closed() {
                pool.close().await;
                info!("database connections closed");
            }
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<PgPool>> {
        self.pool.lock().unwrap_or_else(|e| e.into_inner())
    }
}
