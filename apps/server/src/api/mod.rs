//! API endpoint modules.

pub mod health;
pub mod history;
pub mod openapi;
pub mod predict;

use actix_web::HttpResponse;

use crate::error::{AppError, AppResult};

pub use health::configure_health_routes;
pub use history::configure_routes as configure_history_routes;
pub use openapi::ApiDoc;
pub use openapi::configure_routes as configure_docs_routes;
pub use predict::{UploadLimit, configure_routes as configure_predict_routes};

/// Configure every API route.
pub fn configure_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_predict_routes)
        .configure(configure_history_routes)
        .configure(configure_docs_routes);
}

/// Fallback for unknown routes, keeping the standard error envelope.
pub async fn not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound("Not Found".to_string()))
}
