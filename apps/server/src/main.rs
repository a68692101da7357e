//! Image recognition server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use image_recognition_lib::api::{self, UploadLimit};
use image_recognition_lib::config::Config;
use image_recognition_lib::db::DbPool;
use image_recognition_lib::middleware::RequestLogger;
use image_recognition_lib::services::{BlobStore, PlaceholderRecognizer, Recognizer};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Image Recognition Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - CORS allows any origin");
    }

    // Create upload directory
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("Upload directory: {}", config.upload_dir.display());

    // Initialize database
    let pool = match DbPool::new(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.run_migrations().await {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("Database ready: {}", config.database.path.display());

    // Prepare shared state
    let bind_address = config.bind_address();
    let blobs = BlobStore::new(config.upload_dir.clone());
    let recognizer: Arc<dyn Recognizer> =
        Arc::new(PlaceholderRecognizer::new(config.inference_delay));
    let upload_limit = UploadLimit(config.max_upload_size);
    let is_development = config.is_development();

    info!(
        "Upload limit: {}KB, inference delay: {}ms",
        config.max_upload_size / 1024,
        config.inference_delay.as_millis()
    );

    let worker_count = if is_development { 4 } else { num_cpus::get() };
    info!(
        "Starting server at http://{} ({} workers)",
        bind_address, worker_count
    );

    // Start HTTP server
    let server = HttpServer::new(move || {
        let cors = if is_development {
            Cors::permissive()
        } else {
            // Same-origin only in production
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            // CORS must wrap before other middleware
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(blobs.clone()))
            .app_data(web::Data::from(recognizer.clone()))
            .app_data(web::Data::new(upload_limit))
            .configure(api::configure_routes)
            .default_service(web::route().to(api::not_found))
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
