//! Dendrogram geometry.
//!
//! Leaves are placed at `x = 5, 15, 25, ...` in traversal order and every
//! merge becomes a U-shaped link drawn through four points.

use serde::{Deserialize, Serialize};

use super::LinkageMatrix;

/// Fraction of the largest merge height used when no threshold is given.
pub const DEFAULT_COLOR_THRESHOLD_RATIO: f64 = 0.7;

/// Colour class of a dendrogram link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkColor {
    /// Link at or above the colour threshold.
    AboveThreshold,
    /// Link inside the `n`-th subtree that lies entirely below the threshold.
    Cluster(usize),
}

/// Coordinates and colours of every link of a dendrogram.
///
/// All per-link vectors are parallel and ordered the way the links are
/// produced by a left-to-right post-order traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DendrogramLayout {
    /// X coordinates of the four corners of each link.
    pub icoord: Vec<[f64; 4]>,
    /// Heights of the four corners of each link.
    pub dcoord: Vec<[f64; 4]>,
    /// Colour class of each link.
    pub colors: Vec<LinkColor>,
    /// Linkage row drawn by each link.
    pub link_rows: Vec<usize>,
    /// Sample indices from left to right.
    pub leaves: Vec<usize>,
    /// Threshold used for colouring.
    pub color_threshold: f64,
}

impl DendrogramLayout {
    /// Lays out the dendrogram of `z`.
    ///
    /// Links lower than `color_threshold` are grouped by subtree and share
    /// that subtree's colour; the rest are [`LinkColor::AboveThreshold`].
    /// `None` uses `0.7` times the largest merge height, and a threshold
    /// `<= 0` puts every link above it.
    ///
    /// # Examples
    ///
    /// ```
    /// use agrupar::hierarchy::{DendrogramLayout, LinkColor, LinkageMatrix, LinkageRow};
    ///
    /// let z = LinkageMatrix::from_rows(vec![
    ///     LinkageRow { left: 0, right: 1, distance: 1.0, count: 2 },
    ///     LinkageRow { left: 3, right: 2, distance: 4.0, count: 3 },
    /// ], 3).unwrap();
    ///
    /// let layout = DendrogramLayout::compute(&z, None);
    /// assert_eq!(layout.leaves, vec![0, 1, 2]);
    /// assert_eq!(layout.icoord[1], [10.0, 10.0, 25.0, 25.0]);
    /// assert_eq!(layout.colors, vec![LinkColor::Cluster(0), LinkColor::AboveThreshold]);
    /// ```
    #[must_use]
    pub fn compute(z: &LinkageMatrix, color_threshold: Option<f64>) -> Self {
        let color_threshold =
            color_threshold.unwrap_or_else(|| DEFAULT_COLOR_THRESHOLD_RATIO * z.max_distance());

        let mut walker = Walker {
            z,
            color_threshold,
            current_color: 0,
            below_threshold: false,
            layout: Self {
                icoord: Vec::with_capacity(z.n_merges()),
                dcoord: Vec::with_capacity(z.n_merges()),
                colors: Vec::with_capacity(z.n_merges()),
                link_rows: Vec::with_capacity(z.n_merges()),
                leaves: Vec::with_capacity(z.n_samples()),
                color_threshold,
            },
        };

        let root = z.n_samples() + z.n_merges() - 1;
        walker.visit(root);
        walker.layout
    }

    /// Number of links.
    #[must_use]
    pub fn n_links(&self) -> usize {
        self.link_rows.len()
    }

    /// Horizontal extent of the drawing, `10 * n_leaves`.
    #[must_use]
    pub fn width(&self) -> f64 {
        10.0 * self.leaves.len() as f64
    }

    /// X coordinate of the `k`-th leaf from the left.
    #[must_use]
    pub fn leaf_x(k: usize) -> f64 {
        5.0 + 10.0 * k as f64
    }
}

struct Walker<'a> {
    z: &'a LinkageMatrix,
    color_threshold: f64,
    current_color: usize,
    below_threshold: bool,
    layout: DendrogramLayout,
}

impl Walker<'_> {
    /// Returns the x position and height of `node`.
    fn visit(&mut self, node: usize) -> (f64, f64) {
        let n_samples = self.z.n_samples();
        if node < n_samples {
            let x = DendrogramLayout::leaf_x(self.layout.leaves.len());
            self.layout.leaves.push(node);
            return (x, 0.0);
        }

        let row_idx = node - n_samples;
        let row = self.z.rows()[row_idx];
        let h = row.distance;

        let (left_x, left_h) = self.visit(row.left);

        // Decided between the two subtrees: leaving a below-threshold
        // subtree moves the right-hand side on to the next colour.
        let color = if self.color_threshold <= 0.0 || h >= self.color_threshold {
            if self.below_threshold {
                self.current_color += 1;
            }
            self.below_threshold = false;
            LinkColor::AboveThreshold
        } else {
            self.below_threshold = true;
            LinkColor::Cluster(self.current_color)
        };

        let (right_x, right_h) = self.visit(row.right);

        self.layout.icoord.push([left_x, left_x, right_x, right_x]);
        self.layout.dcoord.push([left_h, h, h, right_h]);
        self.layout.colors.push(color);
        self.layout.link_rows.push(row_idx);

        (0.5 * (left_x + right_x), h)
    }
}
