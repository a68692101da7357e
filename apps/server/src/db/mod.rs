//! Database module providing connection management, migrations, and queries.

pub mod history;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::DatabaseSettings;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

pub use history::HistoryEntry;

/// Database connection pool wrapper.
/// SeaORM pools connections internally; cloning shares the pool.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Open (creating if needed) the SQLite database described by `settings`.
    pub async fn new(settings: &DatabaseSettings) -> AppResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = settings.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Database(format!("Failed to create database directory: {}", e))
            })?;
        }

        let mut options = ConnectOptions::new(settings.url());
        options
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections.min(settings.max_connections))
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        info!("Database opened: {}", settings.path.display());

        Ok(Self { conn })
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply pending migrations, including the legacy `stored_name` backfill.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))
    }

    /// Round-trip a trivial query to confirm the database answers.
    pub async fn ping(&self) -> AppResult<()> {
        let stmt = Statement::from_string(DatabaseBackend::Sqlite, "SELECT 1".to_owned());
        self.conn.query_one_raw(stmt).await?;
        Ok(())
    }
}
