//! Core compute primitives.
//!
//! [`Matrix`] holds datasets (one sample per row) as well as the square
//! incidence, distance and similarity matrices.

mod matrix;

pub use matrix::Matrix;
