//! Tuning parameters for the clustering pipeline.

use std::str::FromStr;

use crate::kmeans::KMeansConfig;

/// Environment variable overriding [`HotspotConfig::seed`].
pub const SEED_ENV: &str = "HOTSPOT_SEED";
/// Environment variable overriding [`HotspotConfig::restarts`].
pub const RESTARTS_ENV: &str = "HOTSPOT_RESTARTS";
/// Environment variable overriding [`HotspotConfig::max_iterations`].
pub const MAX_ITERATIONS_ENV: &str = "HOTSPOT_MAX_ITERATIONS";

/// Parameters that control how hotspots are computed.
///
/// Defaults to seed 42, ten k-means restarts, and at most 300 Lloyd
/// iterations per restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotspotConfig {
    /// Seed for the k-means initialization generator.
    pub seed: u64,
    /// Number of independent k-means runs; the lowest-inertia run wins.
    pub restarts: usize,
    /// Upper bound on Lloyd iterations within a single run.
    pub max_iterations: usize,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            restarts: 10,
            max_iterations: 300,
        }
    }
}

impl HotspotConfig {
    /// Builds a config from the defaults, overridden by any of
    /// `HOTSPOT_SEED`, `HOTSPOT_RESTARTS`, and `HOTSPOT_MAX_ITERATIONS`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            seed: env_override(SEED_ENV).unwrap_or(defaults.seed),
            restarts: env_override(RESTARTS_ENV).unwrap_or(defaults.restarts),
            max_iterations: env_override(MAX_ITERATIONS_ENV).unwrap_or(defaults.max_iterations),
        }
    }

    /// Returns a copy with a different seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns a copy with a different restart count.
    #[must_use]
    pub const fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Returns a copy with a different iteration bound.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Clustering parameters for `n_clusters` clusters.
    #[must_use]
    pub const fn kmeans(&self, n_clusters: usize) -> KMeansConfig {
        KMeansConfig {
            n_clusters,
            restarts: self.restarts,
            max_iterations: self.max_iterations,
        }
    }
}

fn env_override<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    parse_override(name, &raw)
}

fn parse_override<T: FromStr>(name: &str, raw: &str) -> Option<T> {
    let value = raw.trim().parse().ok();
    if value.is_none() {
        log::warn!("Ignoring {name}={raw:?}: not a valid value");
    }
    value
}
