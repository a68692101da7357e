//! Predict pipeline: validate, persist blob, recognize, record, respond.
//!
//! Steps run strictly in order and stop at the first failure. A blob written
//! before a later failure is left in place; no compensation is attempted.

use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::db::{DbPool, HistoryEntry};
use crate::error::{AppError, AppResult};
use crate::models::PredictResult;

use super::blob_store::BlobStore;
use super::image_check::validate_image;
use super::recognizer::Recognizer;

/// Image file received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Filename supplied by the client.
    pub filename: String,
    /// Declared media type of the part, if any.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Current UTC time as ISO-8601 with microseconds, e.g. `2025-03-01T08:00:00.123456+00:00`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Run one prediction request end to end.
pub async fn run_predict(
    pool: &DbPool,
    blobs: &BlobStore,
    recognizer: &dyn Recognizer,
    upload: Option<ImageUpload>,
) -> AppResult<PredictResult> {
    let ImageUpload {
        filename,
        content_type,
        data,
    } = upload.ok_or_else(|| AppError::BadRequest("no file".to_string()))?;

    // Full decode is CPU-bound; keep it off the async workers.
    let declared = content_type.clone();
    let (data, checked) = tokio::task::spawn_blocking(move || {
        let checked = validate_image(&data, declared.as_deref());
        (data, checked)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Image check task failed: {}", e)))?;

    if let Err(reason) = checked {
        warn!(
            "Rejected upload {:?} ({:?}): {}",
            filename, content_type, reason
        );
        return Err(AppError::BadRequest("invalid image".to_string()));
    }

    let extension = BlobStore::extension_of(&filename);
    let stored_name = blobs.put(&data, extension.as_deref()).await?;

    info!(
        "Upload accepted: filename={}, size={}, stored_name={}",
        filename,
        data.len(),
        stored_name
    );

    let started = Instant::now();
    let recognition = recognizer.recognize(&data).await;
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    let created_at = timestamp_now();
    let id = pool
        .create_history(HistoryEntry {
            filename: filename.clone(),
            stored_name,
            label: recognition.label.clone(),
            confidence: recognition.confidence,
            created_at: created_at.clone(),
        })
        .await?;

    info!(
        "Recognition complete: id={}, filename={}, label={}, confidence={:.2}, duration_ms={:.2}",
        id, filename, recognition.label, recognition.confidence, duration_ms
    );

    Ok(PredictResult {
        id,
        filename,
        label: recognition.label,
        confidence: recognition.confidence,
        created_at,
    })
}
