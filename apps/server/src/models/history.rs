//! Prediction history DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::history;

/// One prediction as returned by `POST /predict` and `GET /history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictResult {
    /// History record ID.
    pub id: i64,
    /// Filename as uploaded by the client (display only).
    pub filename: String,
    /// Recognized label.
    pub label: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Creation time, ISO-8601 UTC.
    pub created_at: String,
}

impl From<history::Model> for PredictResult {
    fn from(model: history::Model) -> Self {
        Self {
            id: model.id,
            filename: model.filename,
            label: model.label,
            confidence: model.confidence,
            created_at: model.created_at,
        }
    }
}

/// Body returned after a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

/// Root endpoint payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub endpoints: Vec<String>,
}
