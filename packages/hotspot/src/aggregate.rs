//! Record validation and per-cluster hotspot summaries.

use crime_hotspots_models::{Coordinate, CrimeSummary, HotspotReport, IncidentRecord, RiskLevel};
use serde_json::Value;

use crate::HotspotError;

/// Minimum number of incidents needed to compute hotspots.
pub const MIN_RECORDS: usize = 2;

/// Rejects batches too small to cluster.
///
/// # Errors
///
/// * [`HotspotError::InsufficientData`] if `record_count` is below [`MIN_RECORDS`]
pub fn ensure_sufficient(record_count: usize) -> Result<(), HotspotError> {
    if record_count < MIN_RECORDS {
        return Err(HotspotError::InsufficientData);
    }
    Ok(())
}

/// Converts raw incident objects into typed records.
///
/// # Errors
///
/// * [`HotspotError::InvalidRecord`] for the first incident that is not an
///   object, is missing a coordinate, or has a non-numeric or non-finite
///   coordinate
pub fn parse_records(crimes: &[Value]) -> Result<Vec<IncidentRecord>, HotspotError> {
    crimes
        .iter()
        .enumerate()
        .map(|(index, raw)| parse_record(index, raw))
        .collect()
}

fn parse_record(index: usize, raw: &Value) -> Result<IncidentRecord, HotspotError> {
    if !raw.is_object() {
        return Err(HotspotError::InvalidRecord {
            index,
            message: format!("expected an object, got {}", kind(raw)),
        });
    }

    let record: IncidentRecord =
        serde_json::from_value(raw.clone()).map_err(|e| HotspotError::InvalidRecord {
            index,
            message: e.to_string(),
        })?;

    if !record.latitude.is_finite() || !record.longitude.is_finite() {
        return Err(HotspotError::InvalidRecord {
            index,
            message: "coordinates must be finite numbers".to_string(),
        });
    }

    Ok(record)
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Number of clusters actually computed: the requested count, capped at
/// the number of records.
///
/// # Errors
///
/// * [`HotspotError::InvalidClusterCount`] if `requested` is below 1
pub fn effective_clusters(requested: i64, record_count: usize) -> Result<usize, HotspotError> {
    if requested < 1 {
        return Err(HotspotError::InvalidClusterCount { requested });
    }
    let requested = usize::try_from(requested).unwrap_or(usize::MAX);
    Ok(requested.min(record_count))
}

/// Builds one hotspot per cluster index, in index order.
///
/// Clusters without members still produce a report with a zero count.
///
/// # Errors
///
/// * If `assignments` and `records` differ in length
/// * If an assignment refers to a cluster without a centroid
pub fn build_hotspots(
    records: &[IncidentRecord],
    assignments: &[usize],
    centroids: &[Coordinate],
) -> Result<Vec<HotspotReport>, HotspotError> {
    if records.len() != assignments.len() {
        return Err(HotspotError::computation(format!(
            "{} cluster assignments for {} records",
            assignments.len(),
            records.len()
        )));
    }

    let mut members: Vec<Vec<&IncidentRecord>> = vec![Vec::new(); centroids.len()];
    for (record, &cluster) in records.iter().zip(assignments) {
        members
            .get_mut(cluster)
            .ok_or_else(|| {
                HotspotError::computation(format!(
                    "cluster index {cluster} out of range for {} clusters",
                    centroids.len()
                ))
            })?
            .push(record);
    }

    Ok(centroids
        .iter()
        .zip(members)
        .enumerate()
        .map(|(idx, (centroid, members))| {
            let crime_count = members.len();
            HotspotReport {
                id: idx.to_string(),
                centroid: *centroid,
                crime_count,
                risk_level: RiskLevel::from_count(crime_count),
                crimes: members.into_iter().map(CrimeSummary::from).collect(),
            }
        })
        .collect())
}
