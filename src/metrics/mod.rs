//! Cluster-validity metrics.
//!
//! Measures how well a predicted label vector agrees with the geometry of
//! the dataset: the incidence matrix marks same-cluster pairs, the
//! similarity matrix rescales pairwise distances into `[0, 1]`, and
//! [`correlation`] compares the two. [`wss`] and [`bss`] split the total
//! squared pairwise distance into its within-cluster and between-cluster
//! parts.

pub mod distance;

pub use distance::{pairwise_distances, pdist, squareform, DistanceMetric};

use tracing::warn;

use crate::error::{AgruparError, Result};
use crate::primitives::Matrix;

/// Computes the `n x n` incidence matrix of a label vector.
///
/// Entry `(i, j)` is 1 when samples `i` and `j` carry the same cluster id.
/// Cluster ids are expected to be the contiguous range `0..k`, where `k` is
/// the number of distinct labels. Samples whose id is `>= k` are left
/// unmarked (their rows, columns and diagonal entries stay 0); a warning is
/// logged when this happens.
///
/// # Examples
///
/// ```
/// use agrupar::metrics::incidence_mat;
///
/// let inc = incidence_mat(&[0, 0, 1]);
/// assert_eq!(inc.as_slice(), &[
///     1.0, 1.0, 0.0,
///     1.0, 1.0, 0.0,
///     0.0, 0.0, 1.0,
/// ]);
/// ```
#[must_use]
pub fn incidence_mat(labels: &[usize]) -> Matrix<f64> {
    let n = labels.len();
    let mut mat = Matrix::zeros(n, n);

    let mut clusters = labels.to_vec();
    clusters.sort_unstable();
    clusters.dedup();
    let n_clusters = clusters.len();

    if clusters.last().is_some_and(|&max_id| max_id >= n_clusters) {
        warn!(
            n_clusters,
            max_id = clusters[n_clusters - 1],
            "cluster ids are not contiguous from 0; ids >= n_clusters are left out of the incidence matrix"
        );
    }

    for id in 0..n_clusters {
        let members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == id)
            .map(|(i, _)| i)
            .collect();
        for &i in &members {
            for &j in &members {
                mat.set(i, j, 1.0);
            }
        }
    }

    mat
}

/// Computes the similarity matrix of a dataset.
///
/// Distances are rescaled with `1 - (d - min) / (max - min)`, taken over the
/// whole distance matrix (diagonal included), so the closest pair maps to 1
/// and the farthest to 0. When every distance is equal (identical points or
/// fewer than two samples) the division is by zero and the entries are NaN.
///
/// # Examples
///
/// ```
/// use agrupar::metrics::{similarity_mat, DistanceMetric};
/// use agrupar::primitives::Matrix;
///
/// let x = Matrix::from_rows(&[vec![0.0], vec![5.0], vec![10.0]]).unwrap();
/// let sim = similarity_mat(&x, DistanceMetric::Euclidean);
/// assert_eq!(sim.get(0, 0), 1.0);
/// assert_eq!(sim.get(0, 1), 0.5);
/// assert_eq!(sim.get(0, 2), 0.0);
/// ```
#[must_use]
pub fn similarity_mat(x: &Matrix<f64>, metric: DistanceMetric) -> Matrix<f64> {
    let dist_mat = pairwise_distances(x, metric);
    let (Some(min_dist), Some(max_dist)) = (dist_mat.min(), dist_mat.max()) else {
        return dist_mat;
    };

    let range = max_dist - min_dist;
    dist_mat.map(|d| 1.0 - (d - min_dist) / range)
}

/// Correlation between cluster co-membership and pairwise similarity.
///
/// Both the incidence matrix and the similarity matrix are flattened,
/// L2-normalised and combined with a dot product. Since both are
/// non-negative the score lies in `[0, 1]`; higher means same-cluster pairs
/// are the similar ones.
///
/// # Errors
///
/// Returns `DimensionMismatch` if `labels.len() != x.n_rows()`.
///
/// # Examples
///
/// ```
/// use agrupar::metrics::{correlation, DistanceMetric};
/// use agrupar::primitives::Matrix;
///
/// let x = Matrix::from_rows(&[vec![0.0], vec![0.0], vec![10.0], vec![10.0]]).unwrap();
/// let corr = correlation(&x, &[0, 0, 1, 1], DistanceMetric::Euclidean).unwrap();
/// assert!((corr - 1.0).abs() < 1e-12);
/// ```
pub fn correlation(x: &Matrix<f64>, labels: &[usize], metric: DistanceMetric) -> Result<f64> {
    check_labels(x, labels)?;

    let inc = l2_normalize(incidence_mat(labels).as_slice());
    let sim = l2_normalize(similarity_mat(x, metric).as_slice());

    Ok(inc.iter().zip(&sim).map(|(a, b)| a * b).sum())
}

/// Within-cluster sum of squares.
///
/// Sum of squared distances over every same-cluster pair `(i, j)` with
/// `i < j`.
///
/// # Errors
///
/// Returns `DimensionMismatch` if `labels.len() != x.n_rows()`.
///
/// # Examples
///
/// ```
/// use agrupar::metrics::{wss, DistanceMetric};
/// use agrupar::primitives::Matrix;
///
/// let x = Matrix::from_rows(&[vec![0.0], vec![1.0], vec![10.0]]).unwrap();
/// let within = wss(&x, &[0, 0, 1], DistanceMetric::Euclidean).unwrap();
/// assert!((within - 1.0).abs() < 1e-12);
/// ```
pub fn wss(x: &Matrix<f64>, labels: &[usize], metric: DistanceMetric) -> Result<f64> {
    check_labels(x, labels)?;
    Ok(masked_upper_sum_sq(x, labels, metric, true))
}

/// Between-cluster sum of squares.
///
/// Sum of squared distances over every pair `(i, j)` with `i < j` that is
/// not marked in the incidence matrix. `wss + bss` equals the sum of squared
/// distances over all unique pairs.
///
/// # Errors
///
/// Returns `DimensionMismatch` if `labels.len() != x.n_rows()`.
///
/// # Examples
///
/// ```
/// use agrupar::metrics::{bss, DistanceMetric};
/// use agrupar::primitives::Matrix;
///
/// let x = Matrix::from_rows(&[vec![0.0], vec![0.0], vec![10.0], vec![10.0]]).unwrap();
/// let between = bss(&x, &[0, 0, 1, 1], DistanceMetric::Euclidean).unwrap();
/// assert!((between - 400.0).abs() < 1e-9);
/// ```
pub fn bss(x: &Matrix<f64>, labels: &[usize], metric: DistanceMetric) -> Result<f64> {
    check_labels(x, labels)?;
    Ok(masked_upper_sum_sq(x, labels, metric, false))
}

/// Sums `d(i, j)^2` over `i < j` where the incidence entry equals `same`.
fn masked_upper_sum_sq(
    x: &Matrix<f64>,
    labels: &[usize],
    metric: DistanceMetric,
    same: bool,
) -> f64 {
    let inc = incidence_mat(labels);
    let dist_mat = pairwise_distances(x, metric);
    let n = x.n_rows();

    let mut total = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            if (inc.get(i, j) == 1.0) == same {
                total += dist_mat.get(i, j).powi(2);
            }
        }
    }
    total
}

/// Scales `values` to unit L2 norm; a zero vector is returned unchanged.
fn l2_normalize(values: &[f64]) -> Vec<f64> {
    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm == 0.0 {
        return values.to_vec();
    }
    values.iter().map(|v| v / norm).collect()
}

fn check_labels(x: &Matrix<f64>, labels: &[usize]) -> Result<()> {
    if labels.len() != x.n_rows() {
        return Err(AgruparError::dimension_mismatch(
            "labels",
            x.n_rows(),
            labels.len(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests_validity_contract.rs"]
mod tests_validity_contract;
