#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for crime hotspot prediction.
//!
//! Exposes the clustering pipeline as `POST /api/predict-hotspots`. Each
//! request is handled independently; the server keeps no state between
//! requests beyond the immutable [`HotspotConfig`].

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crime_hotspots::HotspotConfig;

/// Largest request body accepted by the prediction endpoint.
pub const MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared application state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppState {
    /// Clustering parameters applied to every request.
    pub config: HotspotConfig,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route(
                    "/predict-hotspots",
                    web::post().to(handlers::predict_hotspots),
                ),
        );
}

/// Starts the hotspot API server.
///
/// Reads clustering parameters with [`HotspotConfig::from_env`] and binds
/// to `BIND_ADDR` (default `127.0.0.1`) on `PORT` (default `8080`). The
/// caller provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        config: HotspotConfig::from_env(),
    });
    log::info!("Clustering with {:?}", state.config);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
