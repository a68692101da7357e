//! Migration: Create history table.
//!
//! AUTOINCREMENT keeps SQLite from handing out the id of a deleted row again.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    filename TEXT NOT NULL,
                    stored_name TEXT NOT NULL,   -- blob name under the upload dir
                    label TEXT NOT NULL,
                    confidence REAL NOT NULL,
                    created_at TEXT NOT NULL     -- ISO-8601 UTC
                );
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS history;")
            .await?;

        Ok(())
    }
}
