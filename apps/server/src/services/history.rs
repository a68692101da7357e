//! History operations composing the history store with blob cleanup.

use tracing::{info, warn};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::PredictResult;

use super::blob_store::{BlobDeletion, BlobStore};

const RECORD_NOT_FOUND: &str = "record not found";

/// What a successful delete did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDeletion {
    pub id: i64,
    /// Blob cleanup outcome; `None` when the row had no blob (legacy rows).
    pub blob: Option<BlobDeletion>,
}

/// Every record, newest first.
pub async fn list_records(pool: &DbPool) -> AppResult<Vec<PredictResult>> {
    let rows = pool.list_history().await?;
    Ok(rows.into_iter().map(PredictResult::from).collect())
}

/// Delete a record and, best-effort, its blob.
///
/// The request succeeds once the row is gone; blob cleanup never changes that.
pub async fn delete_record(pool: &DbPool, blobs: &BlobStore, id: i64) -> AppResult<RecordDeletion> {
    let stored_name = pool
        .get_stored_name(id)
        .await?
        .ok_or_else(|| AppError::NotFound(RECORD_NOT_FOUND.to_string()))?;

    // Another request may have removed the row since the lookup.
    if !pool.delete_history(id).await? {
        return Err(AppError::NotFound(RECORD_NOT_FOUND.to_string()));
    }

    let blob = if stored_name.is_empty() {
        None
    } else {
        let outcome = blobs.delete(&stored_name).await;
        if let BlobDeletion::Failed(ref reason) = outcome {
            warn!(
                "History {} deleted but blob {} remains: {}",
                id, stored_name, reason
            );
        }
        Some(outcome)
    };

    info!("History {} deleted (blob: {:?})", id, blob);

    Ok(RecordDeletion { id, blob })
}
