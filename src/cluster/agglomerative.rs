//! Agglomerative (hierarchical) clustering.

use std::fmt;
use std::str::FromStr;

use kodama::{Dendrogram, Method};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgruparError, Result};
use crate::metrics::{pdist, DistanceMetric};
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;

/// Linkage criterion: how the distance between two clusters is measured.
///
/// `Ward`, `Centroid` and `Median` are only defined for Euclidean distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Minimum distance between members.
    Single,
    /// Maximum distance between members.
    Complete,
    /// Mean distance between members (UPGMA).
    Average,
    /// Mean of the two merged clusters' distances (WPGMA).
    Weighted,
    /// Minimum increase of within-cluster variance.
    Ward,
    /// Distance between centroids.
    Centroid,
    /// Distance between medians of the merged clusters (WPGMC).
    Median,
}

impl Linkage {
    /// Canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Complete => "complete",
            Self::Average => "average",
            Self::Weighted => "weighted",
            Self::Ward => "ward",
            Self::Centroid => "centroid",
            Self::Median => "median",
        }
    }

    /// True for the criteria that assume Euclidean geometry.
    #[must_use]
    pub fn requires_euclidean(self) -> bool {
        matches!(self, Self::Ward | Self::Centroid | Self::Median)
    }

    pub(crate) fn method(self) -> Method {
        match self {
            Self::Single => Method::Single,
            Self::Complete => Method::Complete,
            Self::Average => Method::Average,
            Self::Weighted => Method::Weighted,
            Self::Ward => Method::Ward,
            Self::Centroid => Method::Centroid,
            Self::Median => Method::Median,
        }
    }

    /// Runs the linkage over the pairwise `metric` dissimilarities of `x`.
    ///
    /// `x` must have at least two rows.
    ///
    /// # Errors
    ///
    /// Returns `Other` naming the first sample pair whose dissimilarity is
    /// NaN or infinite.
    pub(crate) fn dendrogram(
        self,
        x: &Matrix<f64>,
        metric: DistanceMetric,
    ) -> Result<Dendrogram<f64>> {
        let n_samples = x.n_rows();
        let mut condensed = pdist(x, metric);
        if let Some(pos) = condensed.iter().position(|d| !d.is_finite()) {
            let (i, j) = condensed_pair(pos, n_samples);
            return Err(format!(
                "non-finite {metric} dissimilarity {} between samples {i} and {j}",
                condensed[pos]
            )
            .into());
        }
        Ok(kodama::linkage(&mut condensed, n_samples, self.method()))
    }

    /// Checks that this criterion can be combined with `metric`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for a Euclidean-only criterion paired
    /// with another metric.
    pub fn check_metric(self, metric: DistanceMetric) -> Result<()> {
        if self.requires_euclidean() && metric != DistanceMetric::Euclidean {
            return Err(AgruparError::InvalidHyperparameter {
                param: "metric".to_string(),
                value: metric.to_string(),
                constraint: format!("euclidean for {} linkage", self.name()),
            });
        }
        Ok(())
    }
}

/// Sample pair `(i, j)`, `i < j`, at position `pos` of a condensed matrix.
fn condensed_pair(mut pos: usize, n_samples: usize) -> (usize, usize) {
    for i in 0..n_samples {
        let len = n_samples - 1 - i;
        if pos < len {
            return (i, i + 1 + pos);
        }
        pos -= len;
    }
    (n_samples, n_samples)
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Linkage {
    type Err = AgruparError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "complete" => Ok(Self::Complete),
            "average" => Ok(Self::Average),
            "weighted" => Ok(Self::Weighted),
            "ward" => Ok(Self::Ward),
            "centroid" => Ok(Self::Centroid),
            "median" => Ok(Self::Median),
            _ => Err(AgruparError::InvalidHyperparameter {
                param: "linkage".to_string(),
                value: s.to_string(),
                constraint: "one of single, complete, average, weighted, ward, centroid, median"
                    .to_string(),
            }),
        }
    }
}

/// Agglomerative clustering with a full merge tree.
///
/// Fitting always builds all `n - 1` merges so the tree can be drawn as a
/// dendrogram. Node ids follow the usual convention: samples are `0..n`
/// and merge `i` creates node `n + i`. The labels are obtained by replaying
/// the first `n - n_clusters` merges and are numbered `0..n_clusters` in
/// order of first appearance.
///
/// Merge distances are only kept when [`with_compute_distances`] is set.
///
/// [`with_compute_distances`]: AgglomerativeClustering::with_compute_distances
///
/// # Examples
///
/// ```
/// use agrupar::prelude::*;
///
/// let data = Matrix::from_vec(4, 2, vec![
///     0.0, 0.0,
///     0.1, 0.1,
///     10.0, 10.0,
///     10.1, 10.1,
/// ]).unwrap();
///
/// let mut hc = AgglomerativeClustering::new(2, Linkage::Single).with_compute_distances(true);
/// hc.fit(&data).unwrap();
///
/// assert_eq!(hc.labels(), &[0, 0, 1, 1]);
/// assert_eq!(hc.children().len(), 3);
/// assert_eq!(hc.distances().map(<[f64]>::len), Some(3));
/// ```
#[derive(Debug, Clone)]
pub struct AgglomerativeClustering {
    /// Number of flat clusters for the labels.
    n_clusters: usize,
    /// Linkage criterion.
    linkage: Linkage,
    /// Metric for the pairwise dissimilarities.
    metric: DistanceMetric,
    /// Keep the merge distances after fitting.
    compute_distances: bool,
    /// Number of samples seen during fit.
    n_samples: usize,
    /// Merge tree: the two node ids joined at each step.
    children: Option<Vec<[usize; 2]>>,
    /// Merge heights, parallel to `children`.
    distances: Option<Vec<f64>>,
    /// Flat cluster labels for the training data.
    labels: Option<Vec<usize>>,
}

impl AgglomerativeClustering {
    /// Creates a new estimator producing `n_clusters` flat clusters.
    #[must_use]
    pub fn new(n_clusters: usize, linkage: Linkage) -> Self {
        Self {
            n_clusters,
            linkage,
            metric: DistanceMetric::Euclidean,
            compute_distances: false,
            n_samples: 0,
            children: None,
            distances: None,
            labels: None,
        }
    }

    /// Sets the distance metric.
    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Keeps merge distances after fitting.
    #[must_use]
    pub fn with_compute_distances(mut self, compute_distances: bool) -> Self {
        self.compute_distances = compute_distances;
        self
    }

    /// Number of flat clusters.
    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Linkage criterion.
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Distance metric.
    #[must_use]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of samples seen during fit (0 before fitting).
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.labels.is_some()
    }

    /// Merge tree, one pair of node ids per merge.
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted.
    #[must_use]
    pub fn children(&self) -> &[[usize; 2]] {
        self.children
            .as_ref()
            .expect("Model not fitted. Call fit() first.")
    }

    /// Merge heights, or `None` when distances were not requested.
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted.
    #[must_use]
    pub fn distances(&self) -> Option<&[f64]> {
        assert!(self.is_fitted(), "Model not fitted. Call fit() first.");
        self.distances.as_deref()
    }

    /// Flat cluster labels for the training data.
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        self.labels
            .as_ref()
            .expect("Model not fitted. Call fit() first.")
    }

    /// Labels from replaying the first `n - n_clusters` merges.
    fn cut_labels(children: &[[usize; 2]], n_samples: usize, n_clusters: usize) -> Vec<usize> {
        let n_nodes = n_samples + children.len();
        let mut parent: Vec<usize> = (0..n_nodes).collect();
        for (step, &[a, b]) in children.iter().enumerate().take(n_samples - n_clusters) {
            parent[a] = n_samples + step;
            parent[b] = n_samples + step;
        }

        let root_of = |mut node: usize| {
            while parent[node] != node {
                node = parent[node];
            }
            node
        };

        let mut roots: Vec<usize> = Vec::with_capacity(n_clusters);
        (0..n_samples)
            .map(|i| {
                let root = root_of(i);
                match roots.iter().position(|&r| r == root) {
                    Some(label) => label,
                    None => {
                        roots.push(root);
                        roots.len() - 1
                    }
                }
            })
            .collect()
    }
}

impl UnsupervisedEstimator for AgglomerativeClustering {
    type Labels = Vec<usize>;

    fn fit(&mut self, x: &Matrix<f64>) -> Result<()> {
        let n_samples = x.n_rows();
        if n_samples == 0 {
            return Err(AgruparError::empty_input("agglomerative clustering data"));
        }
        if self.n_clusters == 0 || self.n_clusters > n_samples {
            return Err(AgruparError::InvalidHyperparameter {
                param: "n_clusters".to_string(),
                value: self.n_clusters.to_string(),
                constraint: format!("1..={n_samples}"),
            });
        }
        self.linkage.check_metric(self.metric)?;

        let (children, heights): (Vec<[usize; 2]>, Vec<f64>) = if n_samples == 1 {
            (Vec::new(), Vec::new())
        } else {
            self.linkage
                .dendrogram(x, self.metric)?
                .steps()
                .iter()
                .map(|step| ([step.cluster1, step.cluster2], step.dissimilarity))
                .unzip()
        };

        debug!(
            n_samples,
            n_merges = children.len(),
            linkage = %self.linkage,
            metric = %self.metric,
            "fitted agglomerative clustering"
        );

        self.labels = Some(Self::cut_labels(&children, n_samples, self.n_clusters));
        self.distances = self.compute_distances.then_some(heights);
        self.children = Some(children);
        self.n_samples = n_samples;
        Ok(())
    }

    /// Returns the labels assigned during fit.
    fn predict(&self, _x: &Matrix<f64>) -> Vec<usize> {
        self.labels().to_vec()
    }
}
