//! History API handlers.

use actix_web::{HttpResponse, web};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::DeleteResponse;
use crate::services::BlobStore;
use crate::services::history::{delete_record, list_records};

/// List all predictions, newest first.
#[utoipa::path(
    get,
    path = "/history",
    tag = "History",
    responses(
        (status = 200, description = "Prediction history", body = Vec<crate::models::PredictResult>),
        (status = 500, description = "Database failure", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_history(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let records = list_records(&pool).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Delete a prediction and its stored image.
#[utoipa::path(
    delete,
    path = "/history/{record_id}",
    tag = "History",
    params(
        ("record_id" = i64, Path, description = "History record ID")
    ),
    responses(
        (status = 200, description = "Record deleted", body = DeleteResponse),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Record ID is not an integer", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_history(
    pool: web::Data<DbPool>,
    blobs: web::Data<BlobStore>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    delete_record(&pool, &blobs, id).await?;

    Ok(HttpResponse::Ok().json(DeleteResponse {
        message: "deleted".to_string(),
    }))
}

/// Configure history routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::validation(&["path", "record_id"], err.to_string(), "int_parsing").into()
    }))
    .service(web::resource("/history").route(web::get().to(list_history)))
    .service(web::resource("/history/{record_id}").route(web::delete().to(delete_history)));
}
