//! History entity for SeaORM.
//!
//! One row per accepted prediction. `stored_name` points at the blob on disk.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub filename: String,
    pub stored_name: String,
    pub label: String,
    #[sea_orm(column_type = "Double")]
    pub confidence: f64,
    // ISO-8601 UTC text, sortable as stored
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
