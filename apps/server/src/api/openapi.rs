//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, web};
use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Image Recognition Server",
        version = "0.1.0",
        description = "Upload an image, get a (placeholder) recognition result, manage prediction history"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        api::health::root,
        api::health::health,
        api::health::ready,
        api::predict::predict,
        api::history::list_history,
        api::history::delete_history,
    ),
    components(
        schemas(
            error::ErrorResponse,
            error::FieldError,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            api::predict::PredictForm,
            models::PredictResult,
            models::DeleteResponse,
            models::ServiceInfo,
        )
    ),
    tags(
        (name = "Health", description = "Service info and health checks"),
        (name = "Predict", description = "Image recognition"),
        (name = "History", description = "Prediction history")
    )
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document.
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Configure documentation routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api-docs/openapi.json").route(web::get().to(openapi_json)));
}
