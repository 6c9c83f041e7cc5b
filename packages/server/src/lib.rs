#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the traffic accidents application.
//!
//! Serves accident records per municipality or police station, the filter
//! metadata the frontend builds its controls from, and a health probe.
//! Every query goes through the filter compiler before it reaches the
//! store, and every record passes through the label canonicalizer on the
//! way out.

pub mod config;
mod handlers;
pub mod middleware;
pub mod rate_limit;

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware as actix_middleware, web};
use traffic_accidents_database::memory::MemoryStore;
use traffic_accidents_database::{AccidentStore, StoreConfig};
use traffic_accidents_ingest::{DEFAULT_BATCH_SIZE, import_files};
use traffic_accidents_source::labels::LabelStrategy;

use crate::config::ServerConfig;
use crate::middleware::{AllowedOrigins, cors, reject_foreign_origins, security_headers};
use crate::rate_limit::{ClientRateLimiter, limit_requests};

/// Shared application state.
pub struct AppState {
    /// Where accident records are read from.
    pub store: Arc<dyn AccidentStore>,
    /// Timeouts applied to store queries.
    pub store_config: StoreConfig,
    /// How stored type and category strings become display labels.
    pub label_strategy: LabelStrategy,
}

/// Registers the `/api` routes.
///
/// The accident endpoints are rate limited; the health probe is not.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/accidents")
                    .wrap(actix_middleware::from_fn(limit_requests))
                    .route("", web::get().to(handlers::accidents))
                    .route("/station", web::get().to(handlers::station))
                    .route("/metadata", web::get().to(handlers::metadata)),
            ),
    );
}

/// Loads the configured CSV exports into a fresh in-memory store.
///
/// Files that fail to load are logged and skipped.
///
/// # Errors
///
/// Returns an `std::io::Error` if the import cannot run at all.
pub async fn preload_store(config: &ServerConfig) -> std::io::Result<MemoryStore> {
    let store = MemoryStore::new();
    if config.accidents_csv.is_empty() {
        log::warn!("ACCIDENTS_CSV is not set, serving an empty store");
        return Ok(store);
    }

    let summary = import_files(&store, &config.accidents_csv, DEFAULT_BATCH_SIZE)
        .await
        .map_err(std::io::Error::other)?;
    log::info!(
        "Loaded {} accidents from {} file(s), {} failed",
        summary.records_upserted,
        summary.files_imported,
        summary.files_failed
    );

    Ok(store)
}

/// Starts the traffic accidents API server.
///
/// Preloads the store and starts the Actix-Web HTTP server. The caller is
/// responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`) and for initializing logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let store = preload_store(&config).await?;

    let state = web::Data::new(AppState {
        store: Arc::new(store),
        store_config: config.store,
        label_strategy: config.label_strategy,
    });
    let origins = web::Data::new(AllowedOrigins(config.allowed_origins.clone()));
    let limiter = web::Data::new(ClientRateLimiter::per_minute(config.rate_limit_per_minute));

    log::info!(
        "Starting server on {}:{} (labels: {}, query timeout: {}ms)",
        config.bind_addr,
        config.port,
        config.label_strategy,
        config.store.query_timeout.as_millis()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(origins.clone())
            .app_data(limiter.clone())
            .wrap(cors(&origins))
            .wrap(actix_middleware::from_fn(reject_foreign_origins))
            .wrap(actix_middleware::Logger::default())
            .wrap(security_headers())
            .configure(routes)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
