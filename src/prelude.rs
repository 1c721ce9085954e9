//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use agrupar::prelude::*;
//! ```

pub use crate::cluster::{AgglomerativeClustering, Linkage};
pub use crate::error::AgruparError;
pub use crate::hierarchy::{DendrogramLayout, LinkColor, LinkageMatrix, LinkageRow};
pub use crate::metrics::{bss, correlation, incidence_mat, similarity_mat, wss, DistanceMetric};
pub use crate::primitives::Matrix;
pub use crate::traits::UnsupervisedEstimator;
pub use crate::viz::{
    plot_dendrogram, plot_node, DendrogramOptions, DendrogramSource, NodePlotOptions,
};
