//! Database queries for prediction history.
//!
//! Each operation is a single statement; nothing spans a request-wide transaction.

use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, QuerySelect, Set};

use crate::entity::history::{self, ActiveModel, Entity as History};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// History entry to insert into the database.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub filename: String,
    pub stored_name: String,
    pub label: String,
    pub confidence: f64,
    pub created_at: String,
}

impl DbPool {
    /// Insert a history row and return its generated id.
    pub async fn create_history(&self, entry: HistoryEntry) -> AppResult<i64> {
        let model = ActiveModel {
            filename: Set(entry.filename),
            stored_name: Set(entry.stored_name),
            label: Set(entry.label),
            confidence: Set(entry.confidence),
            created_at: Set(entry.created_at),
            ..Default::default()
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert history: {}", e)))?;

        Ok(inserted.id)
    }

    /// All history rows, newest (highest id) first.
    pub async fn list_history(&self) -> AppResult<Vec<history::Model>> {
        let rows = History::find()
            .order_by_desc(history::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list history: {}", e)))?;

        Ok(rows)
    }

    /// Blob name recorded for a row. `None` when the row does not exist;
    /// legacy rows yield an empty string.
    pub async fn get_stored_name(&self, id: i64) -> AppResult<Option<String>> {
        let name = History::find_by_id(id)
            .select_only()
            .column(history::Column::StoredName)
            .into_tuple::<String>()
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get stored name: {}", e)))?;

        Ok(name)
    }

    /// Delete a row. Returns false when no row had that id.
    pub async fn delete_history(&self, id: i64) -> AppResult<bool> {
        let result = History::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete history: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}
