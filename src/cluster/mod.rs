//! Clustering algorithms.
//!
//! Provides the agglomerative estimator whose merge tree feeds the
//! dendrogram helpers in [`crate::hierarchy`] and [`crate::viz`].

mod agglomerative;

pub use agglomerative::{AgglomerativeClustering, Linkage};

#[cfg(test)]
#[path = "tests/agglomerative.rs"]
mod tests;

#[cfg(test)]
#[path = "tests_agglomerative_contract.rs"]
mod tests_agglomerative_contract;
