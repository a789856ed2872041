use async_trait::async_trait;
use sqlx::sqlite::{self, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration as StdDuration;
use tracing::info;

use common::models::Signal;
use common::store::SignalStore;

use crate::repositories::SignalRepository;

const SCHEMA: &str = include_str!("../../../sql/schema.sql");

/// Shared handle to the bot database.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn open(db_path: &str) -> Result<Self, sqlx::Error> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))?
            .create_if_missing(true)
            .journal_mode(sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlite::SqliteSynchronous::Normal)
            .busy_timeout(StdDuration::from_secs(30))
            .statement_cache_capacity(100);

        let pool = SqlitePool::connect_with(options).await?;
        Self::initialize(&pool).await?;
        info!("Database ready at {}", db_path);

        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection keeps every query on
    /// the same memory store.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::initialize(&pool).await?;
        Ok(Self { pool })
    }

    async fn initialize(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(SCHEMA).execute(pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SignalStore for Database {
    async fn save_signal(&self, signal: &Signal) -> anyhow::Result<()> {
        SignalRepository::insert(&self.pool, signal).await?;
        Ok(())
    }
}
