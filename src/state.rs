//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// SQLite connection pool.
    db: SqlitePool,
}

impl AppState {
    /// Connect to the database, apply migrations, and build shared state.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config).await?;
        db::run_migrations(&pool).await?;

        Ok(Self::from_pool(pool))
    }

    /// Build state around an existing pool.
    ///
    /// Integration tests use this with in-memory databases that already
    /// have migrations applied.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { db: pool }),
        }
    }

    /// Database connection pool.
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// True when the database answers a trivial query.
    pub async fn database_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
