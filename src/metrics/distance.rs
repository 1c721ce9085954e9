//! Pairwise distance computation.
//!
//! Condensed distances store the strict upper triangle in row-major order:
//! `[d(0,1), d(0,2), ..., d(0,n-1), d(1,2), ..., d(n-2,n-1)]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AgruparError, Result};
use crate::primitives::Matrix;

/// Distance metric between two feature rows.
///
/// # Examples
///
/// ```
/// use agrupar::metrics::DistanceMetric;
///
/// let metric: DistanceMetric = "cityblock".parse().unwrap();
/// assert_eq!(metric, DistanceMetric::Manhattan);
/// assert_eq!(metric.distance(&[0.0, 0.0], &[3.0, 4.0]), 7.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// L2 norm of the difference.
    #[default]
    Euclidean,
    /// Squared L2 norm of the difference.
    SqEuclidean,
    /// L1 norm of the difference.
    Manhattan,
    /// L∞ norm of the difference.
    Chebyshev,
    /// One minus the cosine of the angle between the rows.
    Cosine,
}

impl DistanceMetric {
    /// Canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::SqEuclidean => "sqeuclidean",
            Self::Manhattan => "manhattan",
            Self::Chebyshev => "chebyshev",
            Self::Cosine => "cosine",
        }
    }

    /// Distance between two rows of equal length.
    ///
    /// The cosine distance involving a zero vector is 1.
    #[must_use]
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "rows must have the same length");
        let diffs = a.iter().zip(b).map(|(x, y)| x - y);
        match self {
            Self::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Self::SqEuclidean => diffs.map(|d| d * d).sum(),
            Self::Manhattan => diffs.map(f64::abs).sum(),
            Self::Chebyshev => diffs.map(f64::abs).fold(0.0, f64::max),
            Self::Cosine => {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
                let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    (1.0 - dot / (norm_a * norm_b)).clamp(0.0, 2.0)
                }
            }
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = AgruparError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "sqeuclidean" => Ok(Self::SqEuclidean),
            "manhattan" | "cityblock" | "l1" => Ok(Self::Manhattan),
            "chebyshev" => Ok(Self::Chebyshev),
            "cosine" => Ok(Self::Cosine),
            _ => Err(AgruparError::InvalidHyperparameter {
                param: "metric".to_string(),
                value: s.to_string(),
                constraint: "one of euclidean, sqeuclidean, manhattan, chebyshev, cosine"
                    .to_string(),
            }),
        }
    }
}

/// Condensed pairwise distances between the rows of `x`.
///
/// Returns `n * (n - 1) / 2` values.
#[must_use]
pub fn pdist(x: &Matrix<f64>, metric: DistanceMetric) -> Vec<f64> {
    let n = x.n_rows();
    let mut condensed = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            condensed.push(metric.distance(x.row(i), x.row(j)));
        }
    }
    condensed
}

/// Expands condensed distances into a symmetric `n x n` matrix with a zero
/// diagonal.
///
/// # Errors
///
/// Returns `DimensionMismatch` if `condensed.len() != n * (n - 1) / 2`.
pub fn squareform(condensed: &[f64], n: usize) -> Result<Matrix<f64>> {
    let expected = n * n.saturating_sub(1) / 2;
    if condensed.len() != expected {
        return Err(AgruparError::dimension_mismatch(
            "condensed length",
            expected,
            condensed.len(),
        ));
    }

    let mut square = Matrix::zeros(n, n);
    let mut k = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            square.set(i, j, condensed[k]);
            square.set(j, i, condensed[k]);
            k += 1;
        }
    }
    Ok(square)
}

/// Full `n x n` distance matrix between the rows of `x`.
///
/// # Examples
///
/// ```
/// use agrupar::metrics::{pairwise_distances, DistanceMetric};
/// use agrupar::primitives::Matrix;
///
/// let x = Matrix::from_rows(&[vec![0.0], vec![10.0]]).unwrap();
/// let d = pairwise_distances(&x, DistanceMetric::Euclidean);
/// assert_eq!(d.as_slice(), &[0.0, 10.0, 10.0, 0.0]);
/// ```
#[must_use]
pub fn pairwise_distances(x: &Matrix<f64>, metric: DistanceMetric) -> Matrix<f64> {
    let n = x.n_rows();
    let mut square = Matrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = metric.distance(x.row(i), x.row(j));
            square.set(i, j, d);
            square.set(j, i, d);
        }
    }
    square
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Matrix<f64> {
        Matrix::from_rows(&[vec![0.0, 0.0], vec![3.0, 0.0], vec![0.0, 4.0]])
            .expect("rows have equal length")
    }

    #[test]
    fn test_distance_metric_name() {
        assert_eq!(DistanceMetric::Euclidean.name(), "euclidean");
        assert_eq!(DistanceMetric::Manhattan.name(), "manhattan");
        assert_eq!(DistanceMetric::Cosine.to_string(), "cosine");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(
            "L2".parse::<DistanceMetric>().expect("alias"),
            DistanceMetric::Euclidean
        );
        assert_eq!(
            "l1".parse::<DistanceMetric>().expect("alias"),
            DistanceMetric::Manhattan
        );
        assert_eq!(
            "sqeuclidean".parse::<DistanceMetric>().expect("name"),
            DistanceMetric::SqEuclidean
        );
    }

    #[test]
    fn test_parse_unknown_metric() {
        let err = "hamming".parse::<DistanceMetric>().unwrap_err();
        assert!(err.to_string().contains("metric"));
        assert!(err.to_string().contains("hamming"));
    }

    #[test]
    fn test_each_metric() {
        let a = [1.0, 2.0];
        let b = [4.0, 6.0];
        assert!((DistanceMetric::Euclidean.distance(&a, &b) - 5.0).abs() < 1e-12);
        assert!((DistanceMetric::SqEuclidean.distance(&a, &b) - 25.0).abs() < 1e-12);
        assert!((DistanceMetric::Manhattan.distance(&a, &b) - 7.0).abs() < 1e-12);
        assert!((DistanceMetric::Chebyshev.distance(&a, &b) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_distance() {
        let d = DistanceMetric::Cosine.distance(&[1.0, 0.0], &[0.0, 2.0]);
        assert!((d - 1.0).abs() < 1e-12);
        let same = DistanceMetric::Cosine.distance(&[1.0, 1.0], &[3.0, 3.0]);
        assert!(same.abs() < 1e-12);
        let opposite = DistanceMetric::Cosine.distance(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((opposite - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let d = DistanceMetric::Cosine.distance(&[0.0, 0.0], &[1.0, 1.0]);
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pdist_order() {
        let condensed = pdist(&triangle(), DistanceMetric::Euclidean);
        assert_eq!(condensed.len(), 3);
        assert!((condensed[0] - 3.0).abs() < 1e-12);
        assert!((condensed[1] - 4.0).abs() < 1e-12);
        assert!((condensed[2] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_pdist_single_row() {
        let x = Matrix::from_rows(&[vec![1.0, 2.0]]).expect("one row");
        assert!(pdist(&x, DistanceMetric::Euclidean).is_empty());
    }

    #[test]
    fn test_squareform_matches_pairwise() {
        let x = triangle();
        let square = squareform(&pdist(&x, DistanceMetric::Manhattan), 3).expect("length matches");
        assert_eq!(square, pairwise_distances(&x, DistanceMetric::Manhattan));
        assert!(square.is_symmetric(0.0));
        assert!((0..3).all(|i| square.get(i, i) == 0.0));
    }

    #[test]
    fn test_squareform_length_mismatch() {
        assert!(squareform(&[1.0, 2.0], 3).is_err());
    }

    #[test]
    fn test_metric_serde_names() {
        let json = serde_json::to_string(&DistanceMetric::SqEuclidean).expect("serialises");
        assert_eq!(json, "\"sqeuclidean\"");
        let back: DistanceMetric = serde_json::from_str("\"chebyshev\"").expect("deserialises");
        assert_eq!(back, DistanceMetric::Chebyshev);
    }
}
