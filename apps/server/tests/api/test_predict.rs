//! Tests for POST /predict.

use std::time::{Duration, Instant};

use actix_web::http::header;
use actix_web::test;
use serde_json::Value;

use super::test_helpers::{
    Part, create_test_app, create_test_app_with, create_test_env, get_history, jpeg_bytes,
    png_bytes, predict_png, predict_request,
};

#[actix_web::test]
async fn test_predict_returns_record() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let body = predict_png(&app, "cat.png").await;

    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["filename"], "cat.png");
    assert_eq!(body["label"], "示例物体");
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
    assert!(body["created_at"].as_str().unwrap().contains('T'));
    assert_eq!(env.blob_count().await, 1);
}

#[actix_web::test]
async fn test_predict_ids_strictly_increase() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let mut last = 0;
    for name in ["a.png", "b.png", "c.png"] {
        let id = predict_png(&app, name).await["id"].as_i64().unwrap();
        assert!(id > last);
        last = id;
    }
}

#[actix_web::test]
async fn test_new_record_heads_history() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    predict_png(&app, "first.png").await;
    let created = predict_png(&app, "second.png").await;

    let history = get_history(&app).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], created);
    assert_eq!(history[1]["filename"], "first.png");
}

#[actix_web::test]
async fn test_predict_accepts_jpeg() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let jpeg = jpeg_bytes();
    let req = predict_request(&[Part::file("Photo.JPEG", "image/jpeg", &jpeg)]);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    let stored = env
        .pool
        .get_stored_name(body["id"].as_i64().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(stored.ends_with(".jpeg"));
    assert!(env.blobs.exists(&stored).await);
}

#[actix_web::test]
async fn test_non_image_type_rejected() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let png = png_bytes();
    let req = predict_request(&[Part::file("cat.png", "text/plain", &png)]);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "HTTP_ERROR");
    assert_eq!(body["message"], "invalid image");
    assert_eq!(body["detail"], "invalid image");

    assert!(get_history(&app).await.is_empty());
    assert_eq!(env.blob_count().await, 0);
}

#[actix_web::test]
async fn test_corrupt_image_rejected() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let mut png = png_bytes();
    png.truncate(20);
    let req = predict_request(&[Part::file("broken.png", "image/png", &png)]);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let garbage = b"plain text pretending to be a picture".to_vec();
    let req = predict_request(&[Part::file("broken.gif", "image/gif", &garbage)]);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    assert!(get_history(&app).await.is_empty());
    assert_eq!(env.blob_count().await, 0);
}

#[actix_web::test]
async fn test_png_cut_inside_image_data_rejected() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let png = png_bytes();
    let idat = png.windows(4).position(|w| w == b"IDAT").unwrap();
    let cut = &png[..idat + 4 + 3];
    let req = predict_request(&[Part::file("cut.png", "image/png", cut)]);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "invalid image");
    assert!(get_history(&app).await.is_empty());
    assert_eq!(env.blob_count().await, 0);
}

#[actix_web::test]
async fn test_missing_file_field_is_validation_error() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let req = predict_request(&[Part {
        name: "comment",
        filename: None,
        content_type: None,
        data: b"hello",
    }]);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["errors"][0]["loc"][0], "body");
    assert_eq!(body["errors"][0]["loc"][1], "file");
    assert_eq!(body["errors"][0]["type"], "missing");
    assert!(get_history(&app).await.is_empty());
    assert_eq!(env.blob_count().await, 0);
}

#[actix_web::test]
async fn test_file_part_without_filename_rejected() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let png = png_bytes();
    let req = predict_request(&[Part {
        name: "file",
        filename: None,
        content_type: Some("image/png"),
        data: &png,
    }]);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "no file");
    assert_eq!(env.blob_count().await, 0);
}

#[actix_web::test]
async fn test_extra_parts_are_ignored() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let png = png_bytes();
    let req = predict_request(&[
        Part {
            name: "note",
            filename: None,
            content_type: None,
            data: b"ignored",
        },
        Part::file("dog.png", "image/png", &png),
    ]);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_non_multipart_body_is_validation_error() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(r#"{"file": "cat.png"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["errors"][0]["loc"][0], "body");
    assert_eq!(body["errors"][0]["loc"][1], "file");
}

#[actix_web::test]
async fn test_oversized_upload_rejected() {
    let env = create_test_env().await;
    let app = create_test_app_with(&env, Duration::ZERO, 16).await;

    let png = png_bytes();
    assert!(png.len() > 16);
    let req = predict_request(&[Part::file("big.png", "image/png", &png)]);
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 413);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "HTTP_ERROR");
    assert_eq!(env.blob_count().await, 0);
}

#[actix_web::test]
async fn test_inference_delay_does_not_serialize_requests() {
    let env = create_test_env().await;
    let delay = Duration::from_millis(400);
    let app = create_test_app_with(&env, delay, 1024 * 1024).await;

    let png = png_bytes();
    let started = Instant::now();
    let (a, b) = futures_util::join!(
        test::call_service(&app, predict_request(&[Part::file("a.png", "image/png", &png)])),
        test::call_service(&app, predict_request(&[Part::file("b.png", "image/png", &png)])),
    );
    let elapsed = started.elapsed();

    assert_eq!(a.status(), 200);
    assert_eq!(b.status(), 200);
    assert!(elapsed >= delay);
    assert!(elapsed < delay * 2, "requests ran back to back: {:?}", elapsed);
    assert_eq!(get_history(&app).await.len(), 2);
}
