//! Seeded k-means clustering.
//!
//! Centroids are seeded with k-means++ and refined with Lloyd's algorithm.
//! The whole procedure is repeated [`KMeansConfig::restarts`] times with
//! the same generator, and the run with the lowest inertia is kept. Given
//! the same generator state, input, and config the result is identical on
//! every call.

use rand::Rng;

use crate::{HotspotError, Point};

/// Parameters for a single [`fit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeansConfig {
    /// Number of clusters to find.
    pub n_clusters: usize,
    /// Number of independently initialized runs.
    pub restarts: usize,
    /// Upper bound on Lloyd iterations per run.
    pub max_iterations: usize,
}

/// Outcome of the best k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster index of each input point, in input order.
    pub assignments: Vec<usize>,
    /// One centroid per cluster index. A cluster that lost all of its
    /// points keeps the centroid it had when it became empty.
    pub centroids: Vec<Point>,
    /// Total squared distance from each point to its centroid.
    pub inertia: f64,
    /// Centroid updates performed by the winning run.
    pub iterations: usize,
}

/// Clusters `points` into `config.n_clusters` groups.
///
/// # Errors
///
/// * If `points` is empty
/// * If `n_clusters` is zero or exceeds the number of points
/// * If `restarts` or `max_iterations` is zero
pub fn fit<R: Rng + ?Sized>(
    points: &[Point],
    config: &KMeansConfig,
    rng: &mut R,
) -> Result<KMeansFit, HotspotError> {
    validate(points, config)?;

    let mut best: Option<KMeansFit> = None;

    for restart in 0..config.restarts {
        let run = fit_once(points, config.n_clusters, config.max_iterations, rng);
        log::debug!(
            "k-means restart {restart}: inertia {:.6} after {} iterations",
            run.inertia,
            run.iterations
        );

        if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }

    best.ok_or_else(|| HotspotError::computation("k-means produced no result"))
}

fn validate(points: &[Point], config: &KMeansConfig) -> Result<(), HotspotError> {
    if points.is_empty() {
        return Err(HotspotError::computation("cannot cluster an empty set of points"));
    }
    if config.n_clusters == 0 || config.n_clusters > points.len() {
        return Err(HotspotError::computation(format!(
            "invalid number of clusters {} for {} points",
            config.n_clusters,
            points.len()
        )));
    }
    if config.restarts == 0 {
        return Err(HotspotError::computation("k-means needs at least one restart"));
    }
    if config.max_iterations == 0 {
        return Err(HotspotError::computation("k-means needs at least one iteration"));
    }
    Ok(())
}

fn fit_once<R: Rng + ?Sized>(
    points: &[Point],
    n_clusters: usize,
    max_iterations: usize,
    rng: &mut R,
) -> KMeansFit {
    let mut centroids = init_plus_plus(points, n_clusters, rng);
    // Out-of-range sentinel so the first assignment pass always counts as a change.
    let mut assignments = vec![usize::MAX; points.len()];
    let mut iterations = 0;

    while assign(points, &centroids, &mut assignments) && iterations < max_iterations {
        update_centroids(points, &assignments, &mut centroids);
        iterations += 1;
    }

    let inertia = inertia(points, &assignments, &centroids);

    KMeansFit {
        assignments,
        centroids,
        inertia,
        iterations,
    }
}

/// k-means++ seeding.
///
/// The first centroid is a uniformly chosen point; every further centroid
/// is drawn with probability proportional to its squared distance from the
/// nearest centroid chosen so far. When every point already coincides with
/// a centroid the draw falls back to a uniform pick.
fn init_plus_plus<R: Rng + ?Sized>(points: &[Point], n_clusters: usize, rng: &mut R) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(n_clusters);
    centroids.push(points[rng.gen_range(0..points.len())]);

    let mut closest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < n_clusters {
        let total: f64 = closest.iter().sum();
        let index = if total > 0.0 && total.is_finite() {
            weighted_index(&closest, total, rng)
        } else {
            rng.gen_range(0..points.len())
        };

        let chosen = points[index];
        centroids.push(chosen);

        for (d, p) in closest.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &chosen));
        }
    }

    centroids
}

fn weighted_index<R: Rng + ?Sized>(weights: &[f64], total: f64, rng: &mut R) -> usize {
    let target = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last_positive = 0;

    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = i;
        if target < cumulative {
            return i;
        }
    }

    // Rounding can leave `cumulative` just short of `total`.
    last_positive
}

/// Assigns every point to its nearest centroid, ties going to the lowest
/// index. Returns whether any assignment changed.
fn assign(points: &[Point], centroids: &[Point], assignments: &mut [usize]) -> bool {
    let mut changed = false;
    for (point, slot) in points.iter().zip(assignments.iter_mut()) {
        let nearest = nearest_centroid(point, centroids);
        if *slot != nearest {
            *slot = nearest;
            changed = true;
        }
    }
    changed
}

#[allow(clippy::cast_precision_loss)]
fn update_centroids(points: &[Point], assignments: &[usize], centroids: &mut [Point]) {
    let mut sums = vec![[0.0; 2]; centroids.len()];
    let mut counts = vec![0_usize; centroids.len()];

    for (point, &cluster) in points.iter().zip(assignments) {
        sums[cluster][0] += point[0];
        sums[cluster][1] += point[1];
        counts[cluster] += 1;
    }

    for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
        if count > 0 {
            let n = count as f64;
            *centroid = [sum[0] / n, sum[1] / n];
        }
    }
}

/// Index of the centroid nearest to `point`.
#[must_use]
pub fn nearest_centroid(point: &Point, centroids: &[Point]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    best
}

/// Total squared distance from each point to its assigned centroid.
#[must_use]
pub fn inertia(points: &[Point], assignments: &[usize], centroids: &[Point]) -> f64 {
    points
        .iter()
        .zip(assignments)
        .map(|(p, &c)| squared_distance(p, &centroids[c]))
        .sum()
}

/// Squared Euclidean distance.
#[must_use]
pub fn squared_distance(a: &Point, b: &Point) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx.mul_add(dx, dy * dy)
}
