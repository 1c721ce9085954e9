//! Linkage matrices and dendrogram geometry.
//!
//! A linkage matrix encodes a hierarchical clustering of `n` samples as
//! `n - 1` merges. Row `i` joins two nodes and creates node `n + i`; node
//! ids below `n` are the original samples. Each row stores both children,
//! the merge height and the number of samples under the new node.

mod layout;

pub use layout::{DendrogramLayout, LinkColor};

use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::cluster::{AgglomerativeClustering, Linkage};
use crate::error::{AgruparError, Result};
use crate::metrics::DistanceMetric;
use crate::primitives::Matrix;

/// Margin added to a merge height so that the cut includes that merge.
pub const COLOR_THRESHOLD_EPSILON: f64 = 1e-6;

/// One merge of a linkage matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkageRow {
    /// First child node id.
    pub left: usize,
    /// Second child node id.
    pub right: usize,
    /// Merge height.
    pub distance: f64,
    /// Number of samples under the new node.
    pub count: usize,
}

/// A validated `(n - 1) x 4` linkage matrix.
///
/// Every child id refers to a sample or to an earlier merge and is used at
/// most once, so the rows always form a single binary tree.
///
/// # Examples
///
/// ```
/// use agrupar::hierarchy::LinkageMatrix;
/// use agrupar::primitives::Matrix;
///
/// let z = LinkageMatrix::from_matrix(&Matrix::from_vec(3, 4, vec![
///     0.0, 1.0, 1.0, 2.0,
///     2.0, 3.0, 2.0, 2.0,
///     4.0, 5.0, 10.0, 4.0,
/// ]).unwrap()).unwrap();
///
/// assert_eq!(z.n_samples(), 4);
/// assert_eq!(z.node_leaves(1).unwrap(), vec![2, 3]);
/// assert_eq!(z.node_leaves(2).unwrap(), vec![0, 1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkageMatrix {
    rows: Vec<LinkageRow>,
    n_samples: usize,
}

impl<'de> Deserialize<'de> for LinkageMatrix {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Parts {
            rows: Vec<LinkageRow>,
            n_samples: usize,
        }

        let parts = Parts::deserialize(deserializer)?;
        Self::from_rows(parts.rows, parts.n_samples).map_err(de::Error::custom)
    }
}

impl LinkageMatrix {
    /// Builds a linkage matrix from merge rows.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` for zero samples and `InvalidLinkage` when the
    /// rows do not form a tree over `n_samples` leaves: wrong number of
    /// rows, a child id referencing the merge itself or a later one, a node
    /// used twice, a negative or NaN height, or a count that is not the sum
    /// of the children's counts.
    pub fn from_rows(rows: Vec<LinkageRow>, n_samples: usize) -> Result<Self> {
        if n_samples == 0 {
            return Err(AgruparError::empty_input("linkage matrix samples"));
        }
        if rows.len() != n_samples - 1 {
            return Err(AgruparError::invalid_linkage(format!(
                "{} rows for {n_samples} samples, expected {}",
                rows.len(),
                n_samples - 1
            )));
        }

        let mut used = vec![false; n_samples + rows.len()];
        let mut counts = vec![1_usize; n_samples + rows.len()];
        for (i, row) in rows.iter().enumerate() {
            let node = n_samples + i;
            for child in [row.left, row.right] {
                if child >= node {
                    return Err(AgruparError::invalid_linkage(format!(
                        "row {i} references node {child}, only nodes below {node} exist"
                    )));
                }
                if used[child] {
                    return Err(AgruparError::invalid_linkage(format!(
                        "node {child} is merged more than once (row {i})"
                    )));
                }
                used[child] = true;
            }
            if row.distance.is_nan() || row.distance < 0.0 {
                return Err(AgruparError::invalid_linkage(format!(
                    "row {i} has invalid height {}",
                    row.distance
                )));
            }
            counts[node] = counts[row.left] + counts[row.right];
            if row.count != counts[node] {
                return Err(AgruparError::invalid_linkage(format!(
                    "row {i} counts {} samples, its children hold {}",
                    row.count, counts[node]
                )));
            }
        }

        Ok(Self { rows, n_samples })
    }

    /// Reads the standard 4-column layout
    /// `[child1, child2, distance, count]`.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` when the matrix does not have 4 columns,
    /// `InvalidLinkage` when an id or count is not a non-negative integer,
    /// plus every error of [`LinkageMatrix::from_rows`].
    pub fn from_matrix(m: &Matrix<f64>) -> Result<Self> {
        if m.n_cols() != 4 {
            return Err(AgruparError::dimension_mismatch(
                "linkage columns",
                4,
                m.n_cols(),
            ));
        }

        let as_index = |value: f64, row: usize, what: &str| -> Result<usize> {
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
                Ok(value as usize)
            } else {
                Err(AgruparError::invalid_linkage(format!(
                    "row {row} has non-integral {what} {value}"
                )))
            }
        };

        let rows = (0..m.n_rows())
            .map(|i| {
                Ok(LinkageRow {
                    left: as_index(m.get(i, 0), i, "child id")?,
                    right: as_index(m.get(i, 1), i, "child id")?,
                    distance: m.get(i, 2),
                    count: as_index(m.get(i, 3), i, "count")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_rows(rows, m.n_rows() + 1)
    }

    /// Rebuilds a linkage matrix from a merge tree and its heights.
    ///
    /// The count of each merge is the sum over its two children of 1 for a
    /// sample or the count of the earlier merge it refers to.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `children` and `distances` differ in
    /// length, plus every error of [`LinkageMatrix::from_rows`].
    pub fn from_children(
        children: &[[usize; 2]],
        distances: &[f64],
        n_samples: usize,
    ) -> Result<Self> {
        if children.len() != distances.len() {
            return Err(AgruparError::dimension_mismatch(
                "merge distances",
                children.len(),
                distances.len(),
            ));
        }

        let mut counts: Vec<usize> = Vec::with_capacity(children.len());
        for merge in children {
            let mut current_count = 0;
            for &child in merge {
                current_count += if child < n_samples {
                    1
                } else {
                    counts.get(child - n_samples).copied().ok_or_else(|| {
                        AgruparError::invalid_linkage(format!(
                            "merge {} references node {child} before it exists",
                            counts.len()
                        ))
                    })?
                };
            }
            counts.push(current_count);
        }

        let rows = children
            .iter()
            .zip(distances)
            .zip(counts)
            .map(|((&[left, right], &distance), count)| LinkageRow {
                left,
                right,
                distance,
                count,
            })
            .collect();

        Self::from_rows(rows, n_samples)
    }

    /// Computes the linkage matrix of a dataset directly.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` for a dataset without rows,
    /// `InvalidHyperparameter` for a Euclidean-only linkage paired with
    /// another metric and `Other` when a pairwise dissimilarity is not
    /// finite.
    pub fn compute(x: &Matrix<f64>, linkage: Linkage, metric: DistanceMetric) -> Result<Self> {
        let n_samples = x.n_rows();
        if n_samples == 0 {
            return Err(AgruparError::empty_input("linkage dataset"));
        }
        linkage.check_metric(metric)?;

        let rows = if n_samples == 1 {
            Vec::new()
        } else {
            linkage
                .dendrogram(x, metric)?
                .steps()
                .iter()
                .map(|step| LinkageRow {
                    left: step.cluster1,
                    right: step.cluster2,
                    distance: step.dissimilarity,
                    count: step.size,
                })
                .collect()
        };

        debug!(n_samples, %linkage, %metric, "computed linkage matrix");
        Self::from_rows(rows, n_samples)
    }

    /// Linkage matrix of a fitted agglomerative model.
    ///
    /// Uses the model's merge tree when it kept its merge distances;
    /// otherwise recomputes the tree from `x` with the model's linkage and
    /// metric.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` when the tree must be recomputed and `x`
    /// does not have one row per training sample, plus the errors of
    /// [`LinkageMatrix::from_children`] and [`LinkageMatrix::compute`].
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    pub fn from_model(model: &AgglomerativeClustering, x: &Matrix<f64>) -> Result<Self> {
        if let Some(distances) = model.distances() {
            debug!(
                n_samples = model.n_samples(),
                "rebuilding linkage matrix from model merges"
            );
            return Self::from_children(model.children(), distances, model.n_samples());
        }

        if x.n_rows() != model.n_samples() {
            return Err(AgruparError::dimension_mismatch(
                "dataset rows",
                model.n_samples(),
                x.n_rows(),
            ));
        }
        Self::compute(x, model.linkage(), model.metric())
    }

    /// Merge rows in order.
    #[must_use]
    pub fn rows(&self) -> &[LinkageRow] {
        &self.rows
    }

    /// Number of original samples (leaves).
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of merges, `n_samples - 1`.
    #[must_use]
    pub fn n_merges(&self) -> usize {
        self.rows.len()
    }

    /// Largest merge height, 0 without merges.
    #[must_use]
    pub fn max_distance(&self) -> f64 {
        self.rows.iter().map(|r| r.distance).fold(0.0, f64::max)
    }

    /// Writes the standard 4-column layout.
    #[must_use]
    pub fn to_matrix(&self) -> Matrix<f64> {
        let mut m = Matrix::zeros(self.rows.len(), 4);
        for (i, row) in self.rows.iter().enumerate() {
            m.set(i, 0, row.left as f64);
            m.set(i, 1, row.right as f64);
            m.set(i, 2, row.distance);
            m.set(i, 3, row.count as f64);
        }
        m
    }

    /// Cut height that leaves `n_clusters` clusters below it.
    ///
    /// This is the height of the `n_clusters`-th merge counted from the
    /// last one, plus [`COLOR_THRESHOLD_EPSILON`] so that the merge itself
    /// falls under the cut.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` unless `1 <= n_clusters <= n_merges`.
    pub fn color_threshold_for(&self, n_clusters: usize) -> Result<f64> {
        if n_clusters == 0 || n_clusters > self.rows.len() {
            return Err(AgruparError::InvalidHyperparameter {
                param: "n_clusters".to_string(),
                value: n_clusters.to_string(),
                constraint: format!("1..={}", self.rows.len()),
            });
        }
        Ok(self.rows[self.rows.len() - n_clusters].distance + COLOR_THRESHOLD_EPSILON)
    }

    /// Merge row for a node label.
    ///
    /// Negative labels count back from the last merge, the way dendrogram
    /// annotations print them: `-1` is the root and `-n_merges` the first
    /// merge. Labels `0..n_merges` are rows already.
    ///
    /// # Errors
    ///
    /// Returns `Other` when `label` is outside `-n_merges..n_merges`.
    ///
    /// # Examples
    ///
    /// ```
    /// use agrupar::hierarchy::{LinkageMatrix, LinkageRow};
    ///
    /// let z = LinkageMatrix::from_rows(vec![
    ///     LinkageRow { left: 0, right: 1, distance: 1.0, count: 2 },
    ///     LinkageRow { left: 3, right: 2, distance: 4.0, count: 3 },
    /// ], 3).unwrap();
    ///
    /// assert_eq!(z.row_for_label(-1).unwrap(), 1);
    /// assert_eq!(z.row_for_label(-2).unwrap(), 0);
    /// assert_eq!(z.node_leaves(z.row_for_label(-1).unwrap()).unwrap(), vec![0, 1, 2]);
    /// ```
    pub fn row_for_label(&self, label: i64) -> Result<usize> {
        let n_merges = self.rows.len() as i64;
        let row = if label < 0 { label + n_merges } else { label };
        if (0..n_merges).contains(&row) {
            Ok(row as usize)
        } else {
            Err(format!("node label {label} outside -{n_merges}..{n_merges}").into())
        }
    }

    /// Sample indices under merge row `node`, left subtree first.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` unless `node < n_merges`.
    pub fn node_leaves(&self, node: usize) -> Result<Vec<usize>> {
        let row = self
            .rows
            .get(node)
            .ok_or_else(|| AgruparError::index_out_of_bounds(node, self.rows.len()))?;

        let mut leaves = Vec::with_capacity(row.count);
        self.collect_leaves(node, &mut leaves);
        Ok(leaves)
    }

    fn collect_leaves(&self, node: usize, leaves: &mut Vec<usize>) {
        let row = self.rows[node];
        for child in [row.left, row.right] {
            if child < self.n_samples {
                leaves.push(child);
            } else {
                self.collect_leaves(child - self.n_samples, leaves);
            }
        }
    }
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests_leaves_contract.rs"]
mod tests_leaves_contract;
