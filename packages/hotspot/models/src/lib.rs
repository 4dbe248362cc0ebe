#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request, response, and record types for crime hotspot prediction.
//!
//! These types define the JSON contract shared by the CLI harness and the
//! HTTP server. Field names are `snake_case` on the wire to stay compatible
//! with existing consumers of the hotspot payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

/// Title reported for an incident that does not carry one.
pub const DEFAULT_TITLE: &str = "Unknown Crime";

/// Category reported for an incident that does not carry one.
pub const DEFAULT_CATEGORY: &str = "other";

/// Priority reported for an incident that does not carry one.
pub const DEFAULT_PRIORITY: &str = "medium";

/// Number of clusters requested when the caller does not specify one.
pub const DEFAULT_N_CLUSTERS: i64 = 5;

/// A geotagged incident as submitted by the caller.
///
/// Only the coordinates are required. The text fields accept any JSON value
/// and an explicit `null` is kept as `Some(Value::Null)`, so a record
/// serializes back to the object it was read from. Any fields beyond the
/// known ones are kept in [`Self::extra`] and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Latitude in the caller's coordinate system.
    pub latitude: f64,
    /// Longitude in the caller's coordinate system.
    pub longitude: f64,
    /// Short human-readable title.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Value>,
    /// Free-form category label.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Value>,
    /// Free-form priority label.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Value>,
    /// Caller-supplied fields with no special meaning to the pipeline.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IncidentRecord {
    /// Creates a record with only coordinates set.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            title: None,
            category: None,
            priority: None,
            extra: Map::new(),
        }
    }

    /// Returns the record's coordinate pair.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Title, falling back to [`DEFAULT_TITLE`] when the field is absent.
    #[must_use]
    pub fn title_or_default(&self) -> Value {
        value_or(self.title.as_ref(), DEFAULT_TITLE)
    }

    /// Category, falling back to [`DEFAULT_CATEGORY`] when the field is absent.
    #[must_use]
    pub fn category_or_default(&self) -> Value {
        value_or(self.category.as_ref(), DEFAULT_CATEGORY)
    }

    /// Priority, falling back to [`DEFAULT_PRIORITY`] when the field is absent.
    #[must_use]
    pub fn priority_or_default(&self) -> Value {
        value_or(self.priority.as_ref(), DEFAULT_PRIORITY)
    }
}

fn value_or(field: Option<&Value>, default: &str) -> Value {
    field.cloned().unwrap_or_else(|| Value::from(default))
}

/// Treats a present key as `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A latitude/longitude pair treated as a plain 2-D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns the coordinate as an `[latitude, longitude]` array.
    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }

    /// Builds a coordinate from an `[latitude, longitude]` array.
    #[must_use]
    pub const fn from_array(point: [f64; 2]) -> Self {
        Self::new(point[0], point[1])
    }
}

/// Coarse risk classification of a hotspot by incident count.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RiskLevel {
    /// At most 2 incidents.
    Low,
    /// 3 to 5 incidents.
    Medium,
    /// More than 5 incidents.
    High,
}

impl RiskLevel {
    /// Classifies a cluster by its member count.
    #[must_use]
    pub const fn from_count(count: usize) -> Self {
        match count {
            0..=2 => Self::Low,
            3..=5 => Self::Medium,
            _ => Self::High,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// Simplified view of a member incident inside a hotspot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeSummary {
    /// Incident title as supplied, or the default when absent.
    pub title: Value,
    /// Incident category as supplied, or the default when absent.
    pub category: Value,
    /// Incident priority as supplied, or the default when absent.
    pub priority: Value,
    /// Latitude, copied as-is.
    pub latitude: f64,
    /// Longitude, copied as-is.
    pub longitude: f64,
}

impl From<&IncidentRecord> for CrimeSummary {
    fn from(record: &IncidentRecord) -> Self {
        Self {
            title: record.title_or_default(),
            category: record.category_or_default(),
            priority: record.priority_or_default(),
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

/// A single spatial cluster of incidents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotReport {
    /// Cluster index, as text.
    pub id: String,
    /// Cluster centroid in the original coordinate scale.
    #[serde(flatten)]
    pub centroid: Coordinate,
    /// Number of incidents assigned to this cluster.
    pub crime_count: usize,
    /// Risk classification derived from `crime_count`.
    pub risk_level: RiskLevel,
    /// Member incidents, in input order.
    pub crimes: Vec<CrimeSummary>,
}

/// An input incident annotated with the cluster it was assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteredIncident {
    /// The original record.
    #[serde(flatten)]
    pub record: IncidentRecord,
    /// Cluster index, as text.
    pub cluster_id: String,
}

/// A hotspot prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Raw incident objects, validated individually by the pipeline.
    #[serde(default)]
    pub crimes: Vec<Value>,
    /// Requested number of clusters.
    #[serde(default = "default_n_clusters")]
    pub n_clusters: i64,
}

const fn default_n_clusters() -> i64 {
    DEFAULT_N_CLUSTERS
}

/// Outcome of a hotspot prediction.
///
/// On failure `error` is set, both lists are empty, and the totals are
/// omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Whether the prediction completed.
    pub success: bool,
    /// Diagnostic text for a failed prediction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Hotspots sorted by descending `crime_count`.
    #[serde(default)]
    pub hotspots: Vec<HotspotReport>,
    /// Input incidents annotated with their cluster, in input order.
    #[serde(default)]
    pub clustered_crimes: Vec<ClusteredIncident>,
    /// Number of clusters computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_clusters: Option<usize>,
    /// Number of incidents analyzed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_crimes: Option<usize>,
}

impl PredictionResult {
    /// Builds a successful result.
    #[must_use]
    pub const fn success(
        hotspots: Vec<HotspotReport>,
        clustered_crimes: Vec<ClusteredIncident>,
        total_clusters: usize,
        total_crimes: usize,
    ) -> Self {
        Self {
            success: true,
            error: None,
            hotspots,
            clustered_crimes,
            total_clusters: Some(total_clusters),
            total_crimes: Some(total_crimes),
        }
    }

    /// Builds the uniform failure shape.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            hotspots: Vec::new(),
            clustered_crimes: Vec::new(),
            total_clusters: None,
            total_crimes: None,
        }
    }
}
