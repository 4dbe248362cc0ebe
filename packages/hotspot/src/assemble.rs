//! Ranking and final result assembly.

use crime_hotspots_models::{ClusteredIncident, HotspotReport, IncidentRecord, PredictionResult};

use crate::HotspotError;

/// Field appended to every clustered incident.
pub const CLUSTER_ID_FIELD: &str = "cluster_id";

/// Sorts hotspots by descending `crime_count`. Equal counts keep their
/// existing (cluster index) order.
pub fn rank_hotspots(hotspots: &mut [HotspotReport]) {
    hotspots.sort_by(|a, b| b.crime_count.cmp(&a.crime_count));
}

/// Annotates each record with its cluster index, preserving input order.
///
/// A caller-supplied `cluster_id` field is replaced by the computed one.
///
/// # Errors
///
/// * If `assignments` and `records` differ in length
pub fn attach_cluster_ids(
    records: Vec<IncidentRecord>,
    assignments: &[usize],
) -> Result<Vec<ClusteredIncident>, HotspotError> {
    if records.len() != assignments.len() {
        return Err(HotspotError::computation(format!(
            "{} cluster assignments for {} records",
            assignments.len(),
            records.len()
        )));
    }

    Ok(records
        .into_iter()
        .zip(assignments)
        .map(|(mut record, cluster)| {
            record.extra.remove(CLUSTER_ID_FIELD);
            ClusteredIncident {
                record,
                cluster_id: cluster.to_string(),
            }
        })
        .collect())
}

/// Ranks `hotspots` and wraps everything into a successful result.
///
/// # Errors
///
/// * If `assignments` and `records` differ in length
pub fn assemble(
    records: Vec<IncidentRecord>,
    assignments: &[usize],
    mut hotspots: Vec<HotspotReport>,
) -> Result<PredictionResult, HotspotError> {
    let total_crimes = records.len();
    let total_clusters = hotspots.len();

    rank_hotspots(&mut hotspots);
    let clustered_crimes = attach_cluster_ids(records, assignments)?;

    Ok(PredictionResult::success(
        hotspots,
        clustered_crimes,
        total_clusters,
        total_crimes,
    ))
}
