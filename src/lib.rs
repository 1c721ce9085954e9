//! Agrupar: hierarchical clustering, cluster-validity metrics and
//! dendrogram plots in pure Rust.
//!
//! Agrupar scores a clustering against the geometry of its data and
//! draws the merge tree of an agglomerative clustering.
//!
//! # Quick Start
//!
//! ```
//! use agrupar::prelude::*;
//!
//! let x = Matrix::from_vec(4, 1, vec![0.0, 0.0, 10.0, 10.0]).unwrap();
//!
//! let mut model = AgglomerativeClustering::new(2, Linkage::Average)
//!     .with_compute_distances(true);
//! model.fit(&x).unwrap();
//! let labels = model.predict(&x);
//!
//! // All spread is between the two clusters.
//! assert_eq!(wss(&x, &labels, DistanceMetric::Euclidean).unwrap(), 0.0);
//! assert_eq!(bss(&x, &labels, DistanceMetric::Euclidean).unwrap(), 400.0);
//!
//! // Samples under the root merge.
//! let z = LinkageMatrix::from_model(&model, &x).unwrap();
//! assert_eq!(z.node_leaves(2).unwrap().len(), 4);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Matrix type
//! - [`metrics`]: Pairwise distances and cluster-validity metrics
//! - [`cluster`]: Agglomerative clustering
//! - [`hierarchy`]: Linkage matrices, node backtracking and dendrogram layout
//! - [`viz`]: SVG dendrograms and node image grids

pub mod cluster;
pub mod error;
pub mod hierarchy;
pub mod metrics;
pub mod prelude;
pub mod primitives;
pub mod traits;
pub mod viz;

pub use error::{AgruparError, Result};
pub use primitives::Matrix;
pub use traits::UnsupervisedEstimator;
