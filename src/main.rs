use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod seed;
mod service;
mod store;
mod utils;

use config::{Config, StoreBackend};
use db::init_db;
use service::attendance::AttendanceService;
use store::{AttendanceStore, MemoryStore, MySqlStore, UserDirectory};

use crate::docs::ApiDoc;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Absensi API"
}

async fn open_stores(
    config: &Config,
) -> anyhow::Result<(Arc<dyn AttendanceStore>, Arc<dyn UserDirectory>)> {
    match (config.store_backend, &config.database_url) {
        (StoreBackend::MySql, Some(url)) => {
            let store = Arc::new(MySqlStore::new(init_db(url).await?));
            let attendance: Arc<dyn AttendanceStore> = store.clone();
            let users: Arc<dyn UserDirectory> = store;
            Ok((attendance, users))
        }
        (StoreBackend::MySql, None) => Err(anyhow::anyhow!("DATABASE_URL must be set")),
        (StoreBackend::Memory, _) => {
            warn!("Using in-memory store; attendance is lost on restart");
            let store = Arc::new(MemoryStore::new());
            let attendance: Arc<dyn AttendanceStore> = store.clone();
            let users: Arc<dyn UserDirectory> = store;
            Ok((attendance, users))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            std::process::exit(1);
        }
    };

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let (attendance_store, users) = match open_stores(&config).await {
        Ok(stores) => stores,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Failed to open stores");
            eprintln!("Startup error: {e:#}");
            std::process::exit(1);
        }
    };

    if config.seed_demo_users {
        if let Err(e) = seed::seed_demo_users(users.as_ref()).await {
            error!(error = %format!("{e:#}"), "Failed to seed demo users");
        }
    }

    let attendance = Data::new(AttendanceService::new(attendance_store));
    let users: Data<dyn UserDirectory> = Data::from(users);
    let config_data = Data::new(config.clone());
    let server_addr = config.server_addr.clone();

    info!(addr = %server_addr, backend = ?config.store_backend, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config_data.clone())
            .app_data(attendance.clone())
            .app_data(users.clone())
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await
}
