//! Predict API handler.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::{BlobStore, ImageUpload, Recognizer, run_predict};

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Maximum accepted image size in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

/// Multipart form accepted by `POST /predict` (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct PredictForm {
    /// Image file to recognize.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Recognize an uploaded image and record the result.
#[utoipa::path(
    post,
    path = "/predict",
    tag = "Predict",
    request_body(content = PredictForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image recognized", body = crate::models::PredictResult),
        (status = 400, description = "File part without a filename, or invalid image", body = crate::error::ErrorResponse),
        (status = 413, description = "Image too large", body = crate::error::ErrorResponse),
        (status = 422, description = "Malformed multipart request or missing file field", body = crate::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse),
    )
)]
pub async fn predict(
    pool: web::Data<DbPool>,
    blobs: web::Data<BlobStore>,
    recognizer: web::Data<dyn Recognizer>,
    limit: web::Data<UploadLimit>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let upload = read_image_part(&mut payload, limit.0).await?;

    let result = run_predict(&pool, &blobs, recognizer.get_ref(), upload).await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Pull the `file` part out of the multipart stream.
///
/// Other parts are drained and ignored. A body with no `file` part is a
/// validation error; a `file` part without a filename is not a file upload and
/// yields `None`.
async fn read_image_part(payload: &mut Multipart, max_size: usize) -> AppResult<Option<ImageUpload>> {
    let mut upload = None;
    let mut saw_file_field = false;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            AppError::validation(&["body", FILE_FIELD], format!("Multipart error: {}", e), "multipart")
        })?;

        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(str::to_string),
                cd.get_filename().map(str::to_string),
            ),
            None => (None, None),
        };
        let content_type = field.content_type().map(|mime| mime.to_string());
        let wanted = upload.is_none() && name.as_deref() == Some(FILE_FIELD);
        saw_file_field |= wanted;

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::validation(&["body", FILE_FIELD], format!("Read error: {}", e), "multipart")
            })?;

            if !wanted {
                continue;
            }
            if data.len() + chunk.len() > max_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "file exceeds maximum size of {} bytes",
                    max_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if wanted && let Some(filename) = filename.filter(|f| !f.is_empty()) {
            upload = Some(ImageUpload {
                filename,
                content_type,
                data,
            });
        }
    }

    if !saw_file_field {
        return Err(AppError::validation(&["body", FILE_FIELD], "Field required", "missing"));
    }

    Ok(upload)
}

/// Configure predict routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(predict)));
}
