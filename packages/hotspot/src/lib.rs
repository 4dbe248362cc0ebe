#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime hotspot detection.
//!
//! Groups geotagged incidents into `k` spatial clusters with seeded k-means
//! over standardized coordinates, classifies each cluster's risk level by
//! its incident count, and returns a ranked report.
//!
//! The pipeline runs synchronously and keeps no state between calls:
//!
//! 1. [`aggregate::parse_records`] validates the raw incident objects.
//! 2. [`normalize::StandardScaler`] rescales coordinates per axis.
//! 3. [`kmeans::fit`] clusters the scaled points.
//! 4. [`aggregate::build_hotspots`] summarizes each cluster.
//! 5. [`assemble::assemble`] ranks the hotspots and annotates the input.
//!
//! [`predict_hotspots`] wraps all of it and turns any error into the
//! uniform failure payload.

pub mod aggregate;
pub mod assemble;
pub mod config;
pub mod kmeans;
pub mod normalize;

use crime_hotspots_models::{Coordinate, PredictionRequest, PredictionResult};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

pub use config::HotspotConfig;

/// A 2-D point as `[latitude, longitude]`.
pub type Point = [f64; 2];

/// Errors that can occur during hotspot prediction.
#[derive(Debug, Error)]
pub enum HotspotError {
    /// The request payload is not valid JSON.
    #[error("Invalid JSON input")]
    InvalidJson(#[source] serde_json::Error),

    /// The request payload is JSON but does not have the request shape.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what went wrong.
        message: String,
    },

    /// Fewer than two incidents were supplied.
    #[error("Insufficient data for clustering (need at least 2 data points)")]
    InsufficientData,

    /// An incident could not be interpreted as a geotagged record.
    #[error("Invalid crime record at index {index}: {message}")]
    InvalidRecord {
        /// Position of the record in the request.
        index: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// The requested cluster count is not positive.
    #[error("n_clusters must be at least 1, got {requested}")]
    InvalidClusterCount {
        /// The value the caller asked for.
        requested: i64,
    },

    /// Numeric failure while normalizing, clustering, or aggregating.
    #[error("Computation error: {message}")]
    Computation {
        /// Description of what went wrong.
        message: String,
    },
}

impl HotspotError {
    pub(crate) fn computation(message: impl Into<String>) -> Self {
        Self::Computation {
            message: message.into(),
        }
    }
}

/// Parses a request payload.
///
/// # Errors
///
/// * [`HotspotError::InvalidJson`] if the payload is not well-formed JSON
/// * [`HotspotError::InvalidRequest`] if it is JSON of the wrong shape
pub fn parse_request(payload: &str) -> Result<PredictionRequest, HotspotError> {
    serde_json::from_str(payload).map_err(|e| {
        if e.is_syntax() || e.is_eof() {
            HotspotError::InvalidJson(e)
        } else {
            HotspotError::InvalidRequest {
                message: e.to_string(),
            }
        }
    })
}

/// Runs the full pipeline, propagating the first error encountered.
///
/// # Errors
///
/// * [`HotspotError::InsufficientData`] if fewer than two incidents are given
/// * [`HotspotError::InvalidRecord`] if an incident lacks usable coordinates
/// * [`HotspotError::InvalidClusterCount`] if `n_clusters` is below 1
/// * [`HotspotError::Computation`] if normalization or clustering fails
pub fn try_predict(
    request: &PredictionRequest,
    config: &HotspotConfig,
) -> Result<PredictionResult, HotspotError> {
    aggregate::ensure_sufficient(request.crimes.len())?;

    let records = aggregate::parse_records(&request.crimes)?;
    let n_clusters = aggregate::effective_clusters(request.n_clusters, records.len())?;

    let points: Vec<Point> = records
        .iter()
        .map(|record| record.coordinate().to_array())
        .collect();
    let (scaler, scaled) = normalize::StandardScaler::fit_transform(&points)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let fit = kmeans::fit(&scaled, &config.kmeans(n_clusters), &mut rng)?;

    let centroids: Vec<Coordinate> = scaler
        .inverse_transform(&fit.centroids)
        .into_iter()
        .map(Coordinate::from_array)
        .collect();
    let hotspots = aggregate::build_hotspots(&records, &fit.assignments, &centroids)?;

    log::info!(
        "Clustered {} incidents into {n_clusters} hotspots (inertia {:.6})",
        records.len(),
        fit.inertia
    );

    assemble::assemble(records, &fit.assignments, hotspots)
}

/// Runs the full pipeline and never fails.
///
/// Any error is converted into [`PredictionResult::failure`] carrying the
/// error's message; no partial results are returned.
#[must_use]
pub fn predict_hotspots(request: &PredictionRequest, config: &HotspotConfig) -> PredictionResult {
    try_predict(request, config).unwrap_or_else(|e| {
        log::warn!("Hotspot prediction failed: {e}");
        PredictionResult::failure(e.to_string())
    })
}

/// Parses `payload` and runs [`predict_hotspots`] on it.
///
/// A payload that cannot be parsed yields the failure shape as well.
#[must_use]
pub fn predict_from_json(payload: &str, config: &HotspotConfig) -> PredictionResult {
    match parse_request(payload) {
        Ok(request) => predict_hotspots(&request, config),
        Err(e) => {
            log::warn!("Rejected request payload: {e}");
            PredictionResult::failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crime_hotspots_models::RiskLevel;
    use serde_json::{Value, json};

    fn request(crimes: Value, n_clusters: i64) -> PredictionRequest {
        serde_json::from_value(json!({ "crimes": crimes, "n_clusters": n_clusters })).unwrap()
    }

    fn grid_crimes() -> Value {
        let mut crimes = Vec::new();
        for (base_lat, base_lng, count) in [(38.90, -77.03, 7), (38.95, -76.95, 4), (38.80, -77.10, 2)] {
            for i in 0..count {
                let offset = f64::from(i) * 0.001;
                crimes.push(json!({
                    "latitude": base_lat + offset,
                    "longitude": base_lng - offset,
                    "title": format!("Incident {i}"),
                    "priority": "high"
                }));
            }
        }
        Value::Array(crimes)
    }

    #[test]
    fn splits_near_and_far_points() {
        let result = predict_hotspots(
            &request(
                json!([
                    { "latitude": 10.0, "longitude": 10.0 },
                    { "latitude": 10.01, "longitude": 10.01 },
                    { "latitude": 50.0, "longitude": 50.0 }
                ]),
                2,
            ),
            &HotspotConfig::default(),
        );

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.total_clusters, Some(2));
        assert_eq!(result.total_crimes, Some(3));

        let first = &result.hotspots[0];
        assert_eq!(first.crime_count, 2);
        assert_eq!(first.risk_level, RiskLevel::Low);
        assert!((first.centroid.latitude - 10.005).abs() < 1e-9);
        assert!((first.centroid.longitude - 10.005).abs() < 1e-9);

        let second = &result.hotspots[1];
        assert_eq!(second.crime_count, 1);
        assert_eq!(second.risk_level, RiskLevel::Low);
        assert!((second.centroid.latitude - 50.0).abs() < 1e-9);
        assert!((second.centroid.longitude - 50.0).abs() < 1e-9);

        assert_eq!(
            result.clustered_crimes[0].cluster_id,
            result.clustered_crimes[1].cluster_id
        );
        assert_ne!(
            result.clustered_crimes[0].cluster_id,
            result.clustered_crimes[2].cluster_id
        );
    }

    #[test]
    fn counts_add_up_and_hotspots_are_ranked() {
        let crimes = grid_crimes();
        let total = crimes.as_array().unwrap().len();
        let result = predict_hotspots(&request(crimes, 3), &HotspotConfig::default());

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.total_crimes, Some(total));
        assert_eq!(result.hotspots.len(), 3);
        assert_eq!(
            result.hotspots.iter().map(|h| h.crime_count).sum::<usize>(),
            total
        );
        assert!(
            result
                .hotspots
                .windows(2)
                .all(|w| w[0].crime_count >= w[1].crime_count)
        );
        assert_eq!(
            result
                .hotspots
                .iter()
                .map(|h| h.crime_count)
                .collect::<Vec<_>>(),
            vec![7, 4, 2]
        );
        assert_eq!(result.hotspots[0].risk_level, RiskLevel::High);
        assert_eq!(result.hotspots[1].risk_level, RiskLevel::Medium);
        assert_eq!(result.hotspots[2].risk_level, RiskLevel::Low);
    }

    #[test]
    fn every_record_gets_a_valid_cluster_id_in_order() {
        let crimes = grid_crimes();
        let result = predict_hotspots(&request(crimes.clone(), 3), &HotspotConfig::default());

        let input = crimes.as_array().unwrap();
        assert_eq!(result.clustered_crimes.len(), input.len());
        for (clustered, original) in result.clustered_crimes.iter().zip(input) {
            let id: usize = clustered.cluster_id.parse().unwrap();
            assert!(id < result.total_clusters.unwrap());
            assert_eq!(clustered.record.title.as_ref(), original.get("title"));
            assert!((clustered.record.latitude - original["latitude"].as_f64().unwrap()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn more_clusters_than_records_gives_singletons() {
        let result = predict_hotspots(
            &request(
                json!([
                    { "latitude": 1.0, "longitude": 1.0 },
                    { "latitude": 2.0, "longitude": 5.0 },
                    { "latitude": 3.0, "longitude": 2.0 }
                ]),
                10,
            ),
            &HotspotConfig::default(),
        );

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.total_clusters, Some(3));
        assert!(result.hotspots.iter().all(|h| h.crime_count == 1));

        let mut ids: Vec<&str> = result
            .clustered_crimes
            .iter()
            .map(|c| c.cluster_id.as_str())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["0", "1", "2"]);
    }

    #[test]
    fn identical_runs_are_identical() {
        let config = HotspotConfig::default();
        let first = predict_hotspots(&request(grid_crimes(), 4), &config);
        let second = predict_hotspots(&request(grid_crimes(), 4), &config);
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_too_few_records() {
        for crimes in [json!([]), json!([{ "latitude": 1.0, "longitude": 1.0 }])] {
            let result = predict_hotspots(&request(crimes, 5), &HotspotConfig::default());
            assert!(!result.success);
            assert!(result.error.unwrap().contains("Insufficient data"));
            assert!(result.hotspots.is_empty());
            assert!(result.clustered_crimes.is_empty());
        }
    }

    #[test]
    fn rejects_malformed_json() {
        let result = predict_from_json("{ not json", &HotspotConfig::default());
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid JSON input"));
        assert!(result.hotspots.is_empty());
        assert!(result.clustered_crimes.is_empty());
    }

    #[test]
    fn rejects_wrong_request_shape() {
        let err = parse_request(r#"{ "crimes": "none" }"#).unwrap_err();
        assert!(matches!(err, HotspotError::InvalidRequest { .. }));
    }

    #[test]
    fn missing_coordinate_is_reported() {
        let result = predict_hotspots(
            &request(
                json!([
                    { "latitude": 1.0, "longitude": 1.0 },
                    { "latitude": 2.0 }
                ]),
                2,
            ),
            &HotspotConfig::default(),
        );
        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.contains("index 1"), "{error}");
        assert!(error.contains("longitude"), "{error}");
    }

    #[test]
    fn non_numeric_coordinate_is_reported() {
        let result = predict_hotspots(
            &request(
                json!([
                    { "latitude": 1.0, "longitude": 1.0 },
                    { "latitude": "north", "longitude": 2.0 }
                ]),
                2,
            ),
            &HotspotConfig::default(),
        );
        assert!(!result.success);
        assert!(result.error.unwrap().contains("index 1"));
    }

    #[test]
    fn zero_clusters_is_reported() {
        let result = predict_from_json(
            r#"{ "crimes": [{"latitude": 1, "longitude": 1}, {"latitude": 2, "longitude": 2}], "n_clusters": 0 }"#,
            &HotspotConfig::default(),
        );
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("n_clusters must be at least 1, got 0")
        );
    }

    #[test]
    fn identical_points_keep_empty_hotspot() {
        let result = predict_hotspots(
            &request(
                json!([
                    { "latitude": 5.0, "longitude": 5.0 },
                    { "latitude": 5.0, "longitude": 5.0 },
                    { "latitude": 5.0, "longitude": 5.0 }
                ]),
                2,
            ),
            &HotspotConfig::default(),
        );

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.hotspots.len(), 2);
        assert_eq!(result.hotspots[0].crime_count, 3);
        assert_eq!(result.hotspots[1].crime_count, 0);
        for hotspot in &result.hotspots {
            assert!((hotspot.centroid.latitude - 5.0).abs() < 1e-9);
            assert!((hotspot.centroid.longitude - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn extra_fields_survive_and_cluster_id_is_appended() {
        let result = predict_hotspots(
            &request(
                json!([
                    { "latitude": 1.0, "longitude": 1.0, "id": "r-1", "status": "open" },
                    { "latitude": 9.0, "longitude": 9.0, "id": "r-2", "cluster_id": "stale" }
                ]),
                2,
            ),
            &HotspotConfig::default(),
        );

        assert!(result.success, "{:?}", result.error);
        let first = serde_json::to_value(&result.clustered_crimes[0]).unwrap();
        assert_eq!(first["id"], json!("r-1"));
        assert_eq!(first["status"], json!("open"));
        assert!(first["cluster_id"].is_string());

        let second = serde_json::to_value(&result.clustered_crimes[1]).unwrap();
        assert_ne!(second["cluster_id"], json!("stale"));
    }

    #[test]
    fn null_and_numeric_text_fields_pass_through() {
        let result = predict_hotspots(
            &request(
                json!([
                    { "latitude": 1.0, "longitude": 1.0, "title": null },
                    { "latitude": 1.0, "longitude": 1.1, "priority": 3 }
                ]),
                1,
            ),
            &HotspotConfig::default(),
        );

        assert!(result.success, "{:?}", result.error);
        assert_eq!(
            serde_json::to_value(&result.clustered_crimes[0]).unwrap(),
            json!({ "latitude": 1.0, "longitude": 1.0, "title": null, "cluster_id": "0" })
        );
        assert_eq!(
            serde_json::to_value(&result.clustered_crimes[1]).unwrap(),
            json!({ "latitude": 1.0, "longitude": 1.1, "priority": 3, "cluster_id": "0" })
        );

        let crimes = &result.hotspots[0].crimes;
        assert_eq!(crimes[0].title, Value::Null);
        assert_eq!(crimes[0].priority, "medium");
        assert_eq!(crimes[1].title, "Unknown Crime");
        assert_eq!(crimes[1].priority, json!(3));
    }

    #[test]
    fn summaries_use_defaults() {
        let result = predict_hotspots(
            &request(
                json!([
                    { "latitude": 1.0, "longitude": 1.0 },
                    { "latitude": 1.0, "longitude": 1.1, "title": "Robbery", "category": "violent", "priority": "high" }
                ]),
                1,
            ),
            &HotspotConfig::default(),
        );

        assert!(result.success, "{:?}", result.error);
        let crimes = &result.hotspots[0].crimes;
        assert_eq!(crimes[0].title, "Unknown Crime");
        assert_eq!(crimes[0].category, "other");
        assert_eq!(crimes[0].priority, "medium");
        assert_eq!(crimes[1].title, "Robbery");
        assert_eq!(crimes[1].priority, "high");
    }
}
