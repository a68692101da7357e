//! Migration: Backfill `stored_name` on history tables created before blobs were renamed.
//!
//! Older databases only tracked the client filename. The column is added with an
//! empty default so existing rows survive; an empty name means "no blob to clean up".

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.has_column("history", "stored_name").await? {
            return Ok(());
        }

        manager
            .alter_table(
                Table::alter()
                    .table(History::Table)
                    .add_column(
                        ColumnDef::new(History::StoredName)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Current schemas own the column from creation; nothing to undo.
        Ok(())
    }
}

#[derive(DeriveIden)]
enum History {
    Table,
    StoredName,
}
