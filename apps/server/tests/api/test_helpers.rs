//! Shared helpers for API tests.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header;
use actix_web::{App, dev::ServiceResponse, test, web};
use image::{ImageBuffer, ImageFormat, Rgb};
use image_recognition_lib::api::{self, UploadLimit};
use image_recognition_lib::config::DatabaseSettings;
use image_recognition_lib::db::DbPool;
use image_recognition_lib::middleware::RequestLogger;
use image_recognition_lib::services::{BlobStore, PlaceholderRecognizer, Recognizer};
use serde_json::Value;
use tempfile::TempDir;

/// Upload limit used unless a test overrides it.
pub const TEST_UPLOAD_LIMIT: usize = 1024 * 1024;

const BOUNDARY: &str = "----recognition-test-boundary";

/// Database, blob directory and their backing temp dir.
pub struct TestEnv {
    pub _dir: TempDir,
    pub pool: DbPool,
    pub blobs: BlobStore,
}

impl TestEnv {
    /// Number of blobs currently on disk.
    pub async fn blob_count(&self) -> usize {
        let mut count = 0;
        if let Ok(mut entries) = tokio::fs::read_dir(self.blobs.root()).await {
            while let Ok(Some(_)) = entries.next_entry().await {
                count += 1;
            }
        }
        count
    }
}

/// Fresh database with migrations applied and an empty upload directory.
pub async fn create_test_env() -> TestEnv {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let settings = DatabaseSettings::for_path(dir.path().join("history.db"));
    let pool = DbPool::new(&settings)
        .await
        .expect("Failed to open database");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");
    let blobs = BlobStore::new(dir.path().join("uploads"));

    TestEnv {
        _dir: dir,
        pool,
        blobs,
    }
}

/// Create a test app with no inference delay.
pub async fn create_test_app(
    env: &TestEnv,
) -> impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    create_test_app_with(env, Duration::ZERO, TEST_UPLOAD_LIMIT).await
}

/// Create a test app with a specific inference delay and upload limit.
pub async fn create_test_app_with(
    env: &TestEnv,
    delay: Duration,
    upload_limit: usize,
) -> impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    let recognizer: Arc<dyn Recognizer> = Arc::new(PlaceholderRecognizer::new(delay));

    test::init_service(
        App::new()
            .wrap(RequestLogger)
            .app_data(web::Data::new(env.pool.clone()))
            .app_data(web::Data::new(env.blobs.clone()))
            .app_data(web::Data::from(recognizer))
            .app_data(web::Data::new(UploadLimit(upload_limit)))
            .configure(api::configure_routes)
            .default_service(web::route().to(api::not_found)),
    )
    .await
}

/// A small valid PNG.
pub fn png_bytes() -> Vec<u8> {
    encode(ImageFormat::Png)
}

/// A small valid JPEG.
pub fn jpeg_bytes() -> Vec<u8> {
    encode(ImageFormat::Jpeg)
}

fn encode(format: ImageFormat) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(8, 8, Rgb([30, 200, 90]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("Failed to encode test image");
    out.into_inner()
}

/// One multipart form part.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    /// The usual `file` part.
    pub fn file(filename: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: "file",
            filename: Some(filename),
            content_type: Some(content_type),
            data,
        }
    }
}

/// Encode parts as `multipart/form-data`; returns (content type header, body).
pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", filename));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// Build a `POST /predict` request from parts.
pub fn predict_request(parts: &[Part<'_>]) -> actix_http::Request {
    let (content_type, body) = multipart_body(parts);
    test::TestRequest::post()
        .uri("/predict")
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request()
}

/// Upload a PNG and return the decoded JSON response (asserting 200).
pub async fn predict_png<S>(app: &S, filename: &str) -> Value
where
    S: actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let png = png_bytes();
    let req = predict_request(&[Part::file(filename, "image/png", &png)]);
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "predict should succeed");
    test::read_body_json(resp).await
}

/// GET /history as JSON.
pub async fn get_history<S>(app: &S) -> Vec<Value>
where
    S: actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::get().uri("/history").to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200);
    test::read_body_json(resp).await
}
