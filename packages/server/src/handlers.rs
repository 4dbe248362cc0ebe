//! HTTP handler functions for the hotspot API.

use actix_web::{HttpResponse, web};
use crime_hotspots::HotspotError;
use crime_hotspots_models::{PredictionRequest, PredictionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AppState;

/// Error text for a request without a `crimes` array.
const CRIMES_REQUIRED: &str = "Invalid input: crimes array required";

/// Body of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `true` while the server is answering.
    pub healthy: bool,
    /// Crate version of the running server.
    pub version: String,
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/predict-hotspots`
///
/// Validates the request shape, then runs the clustering pipeline on the
/// blocking thread pool. A prediction that fails on its data (too few
/// incidents, bad coordinates) is still a `200` carrying `success: false`;
/// only malformed requests are rejected with `400`.
pub async fn predict_hotspots(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let request = match parse_body(&body) {
        Ok(request) => request,
        Err(message) => {
            log::warn!("Rejected hotspot request: {message}");
            return HttpResponse::BadRequest().json(PredictionResult::failure(message));
        }
    };

    let config = state.config;
    log::debug!(
        "Predicting hotspots for {} incidents (n_clusters={})",
        request.crimes.len(),
        request.n_clusters
    );

    match web::block(move || crime_hotspots::predict_hotspots(&request, &config)).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            log::error!("Hotspot prediction worker failed: {e}");
            HttpResponse::InternalServerError().json(PredictionResult::failure(format!(
                "Prediction worker failed: {e}"
            )))
        }
    }
}

fn parse_body(body: &[u8]) -> Result<PredictionRequest, String> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| HotspotError::InvalidJson(e).to_string())?;

    if !value.get("crimes").is_some_and(Value::is_array) {
        return Err(CRIMES_REQUIRED.to_string());
    }

    serde_json::from_value(value).map_err(|e| {
        HotspotError::InvalidRequest {
            message: e.to_string(),
        }
        .to_string()
    })
}
