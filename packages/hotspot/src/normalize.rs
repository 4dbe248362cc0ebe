//! Per-axis standardization of coordinates.
//!
//! Clustering runs on standardized points so that neither axis dominates
//! the distance metric just because its values spread wider.

use crate::{HotspotError, Point};

/// Zero-mean, unit-variance rescaling fitted to a set of points.
///
/// An axis with (numerically) zero variance is given a scale of `1.0`: its
/// standardized values are all `0` and [`Self::inverse_transform`] maps
/// them back to the axis mean exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    mean: Point,
    scale: Point,
}

impl StandardScaler {
    /// Computes per-axis mean and population standard deviation.
    ///
    /// # Errors
    ///
    /// * If `points` is empty
    /// * If the statistics are not finite (e.g. the coordinate sums overflow)
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(points: &[Point]) -> Result<Self, HotspotError> {
        if points.is_empty() {
            return Err(HotspotError::computation(
                "cannot standardize an empty set of points",
            ));
        }

        let n = points.len() as f64;
        let mut mean = [0.0; 2];
        let mut scale = [1.0; 2];

        for axis in 0..2 {
            let axis_mean = points.iter().map(|p| p[axis]).sum::<f64>() / n;
            let variance = points
                .iter()
                .map(|p| (p[axis] - axis_mean).powi(2))
                .sum::<f64>()
                / n;
            let std = variance.sqrt();

            if !axis_mean.is_finite() || !std.is_finite() {
                return Err(HotspotError::computation(format!(
                    "coordinate statistics are not finite (mean {axis_mean}, std {std})"
                )));
            }

            mean[axis] = axis_mean;
            scale[axis] = if is_degenerate(std, axis_mean) { 1.0 } else { std };
        }

        Ok(Self { mean, scale })
    }

    /// Fits the scaler to `points` and returns it with the scaled points.
    ///
    /// # Errors
    ///
    /// See [`Self::fit`].
    pub fn fit_transform(points: &[Point]) -> Result<(Self, Vec<Point>), HotspotError> {
        let scaler = Self::fit(points)?;
        let scaled = scaler.transform(points);
        Ok((scaler, scaled))
    }

    /// Applies `(p - mean) / scale` per axis.
    #[must_use]
    pub fn transform(&self, points: &[Point]) -> Vec<Point> {
        points
            .iter()
            .map(|p| {
                [
                    (p[0] - self.mean[0]) / self.scale[0],
                    (p[1] - self.mean[1]) / self.scale[1],
                ]
            })
            .collect()
    }

    /// Applies `p * scale + mean` per axis.
    #[must_use]
    pub fn inverse_transform(&self, points: &[Point]) -> Vec<Point> {
        points
            .iter()
            .map(|p| {
                [
                    p[0].mul_add(self.scale[0], self.mean[0]),
                    p[1].mul_add(self.scale[1], self.mean[1]),
                ]
            })
            .collect()
    }

    /// Per-axis means captured by [`Self::fit`].
    #[must_use]
    pub const fn mean(&self) -> Point {
        self.mean
    }

    /// Per-axis divisors captured by [`Self::fit`].
    #[must_use]
    pub const fn scale(&self) -> Point {
        self.scale
    }
}

/// A standard deviation that is zero, subnormal, or lost in the rounding
/// noise of the mean is treated as no variance at all.
fn is_degenerate(std: f64, mean: f64) -> bool {
    !std.is_normal() || std <= 10.0 * f64::EPSILON * mean.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn standardizes_each_axis() {
        let points = [[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&points).unwrap();

        assert_close(scaler.mean(), [2.5, 25.0]);
        for axis in 0..2 {
            let mean: f64 = scaled.iter().map(|p| p[axis]).sum::<f64>() / 4.0;
            let var: f64 = scaled.iter().map(|p| p[axis].powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn inverse_undoes_transform() {
        let points = [[38.9, -77.03], [38.91, -77.01], [39.2, -76.6]];
        let (scaler, scaled) = StandardScaler::fit_transform(&points).unwrap();
        for (restored, original) in scaler.inverse_transform(&scaled).iter().zip(&points) {
            assert_close(*restored, *original);
        }
    }

    #[test]
    fn constant_axis_maps_to_zero_and_back_to_mean() {
        let points = [[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&points).unwrap();

        assert!((scaler.scale()[0] - 1.0).abs() < f64::EPSILON);
        assert!(scaled.iter().all(|p| p[0].abs() < f64::EPSILON));
        assert_close(scaler.inverse_transform(&[[0.0, 0.0]])[0], [5.0, 2.0]);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            StandardScaler::fit(&[]),
            Err(HotspotError::Computation { .. })
        ));
    }

    #[test]
    fn rejects_overflowing_input() {
        let points = [[f64::MAX, 0.0], [f64::MAX, 1.0]];
        assert!(StandardScaler::fit(&points).is_err());
    }
}
