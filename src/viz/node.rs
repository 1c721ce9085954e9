//! Image grids of the samples under a dendrogram node.

use std::collections::BTreeMap;
use std::fmt;

use colored::Colorize;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Figure;
use crate::error::{AgruparError, Result};
use crate::hierarchy::LinkageMatrix;
use crate::primitives::Matrix;

/// Options for [`plot_node`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePlotOptions {
    /// Maximum number of tiles drawn.
    pub max_count: usize,
    /// Tile image shape as (rows, columns); must cover every feature.
    pub image_shape: (usize, usize),
    /// Grid rows and columns are both capped at this value.
    pub grid_size: usize,
    /// Side of one tile in pixels.
    pub tile_px: u32,
    /// Seed for picking the shown samples. `None` draws from the OS.
    pub seed: Option<u64>,
    /// Print the frequency table and cluster size to stdout.
    pub print_summary: bool,
}

impl Default for NodePlotOptions {
    fn default() -> Self {
        Self {
            max_count: 15 * 15,
            image_shape: (8, 8),
            grid_size: 15,
            tile_px: 64,
            seed: None,
            print_summary: true,
        }
    }
}

impl NodePlotOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of tiles.
    #[must_use]
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    /// Sets the tile image shape.
    #[must_use]
    pub fn with_image_shape(mut self, rows: usize, cols: usize) -> Self {
        self.image_shape = (rows, cols);
        self
    }

    /// Fixes the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables the console summary.
    #[must_use]
    pub fn with_print_summary(mut self, print_summary: bool) -> Self {
        self.print_summary = print_summary;
        self
    }
}

/// Count of each distinct target, sorted by target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<T> {
    entries: Vec<(T, usize)>,
}

impl<T: Ord + Clone> FrequencyTable<T> {
    /// Counts the values yielded by `values`.
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut counts: BTreeMap<T, usize> = BTreeMap::new();
        for v in values {
            *counts.entry(v.clone()).or_insert(0) += 1;
        }
        Self {
            entries: counts.into_iter().collect(),
        }
    }

    /// Count of `value`, zero when absent.
    #[must_use]
    pub fn get(&self, value: &T) -> usize {
        self.entries
            .binary_search_by(|(k, _)| k.cmp(value))
            .map_or(0, |i| self.entries[i].1)
    }
}

impl<T> FrequencyTable<T> {
    /// (value, count) pairs in ascending value order.
    #[must_use]
    pub fn entries(&self) -> &[(T, usize)] {
        &self.entries
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}

const FREQUENCY_ROW: &str = "Frequency:";

impl<T: fmt::Display> fmt::Display for FrequencyTable<T> {
    /// One header line of values and one line of counts, right-aligned
    /// in shared columns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<(String, String)> = self
            .entries
            .iter()
            .map(|(v, c)| (v.to_string(), c.to_string()))
            .collect();

        write!(f, "{:width$}", "", width = FREQUENCY_ROW.len())?;
        for (value, count) in &cells {
            let w = value.len().max(count.len());
            write!(f, "  {value:>w$}")?;
        }
        writeln!(f)?;
        write!(f, "{FREQUENCY_ROW}")?;
        for (value, count) in &cells {
            let w = value.len().max(count.len());
            write!(f, "  {count:>w$}")?;
        }
        Ok(())
    }
}

/// Result of [`plot_node`].
#[derive(Debug, Clone)]
pub struct NodePlot<T> {
    /// Every sample under the node, left subtree first.
    pub leaves: Vec<usize>,
    /// Samples drawn, in grid order.
    pub shown: Vec<usize>,
    /// Target frequencies over all leaves.
    pub frequencies: FrequencyTable<T>,
    /// Number of samples in the dataset.
    pub n_samples: usize,
    /// Grid shape as (rows, columns).
    pub grid: (usize, usize),
    /// Rendered figure.
    pub figure: Figure,
}

/// Draws the samples under linkage row `node` as a grid of image tiles.
///
/// Each row of `x` is reshaped to `image_shape` and drawn in greys
/// (low values white), with its target printed in red. Up to
/// `max_count` samples are picked at random. The grid has
/// `min(n / grid_size + 1, grid_size)` rows and `min(n, grid_size)`
/// columns for `n` leaves; surplus cells stay blank.
///
/// # Errors
///
/// Returns an error if `node` is not a row of `z`, if `x` or `targets`
/// do not have one entry per sample of `z`, if `image_shape` does not
/// cover the feature count, or if rendering fails.
pub fn plot_node<T>(
    z: &LinkageMatrix,
    x: &Matrix<f64>,
    targets: &[T],
    node: usize,
    options: &NodePlotOptions,
) -> Result<NodePlot<T>>
where
    T: Ord + Clone + fmt::Display,
{
    let n_samples = z.n_samples();
    if x.n_rows() != n_samples {
        return Err(AgruparError::dimension_mismatch("x rows", n_samples, x.n_rows()));
    }
    if targets.len() != n_samples {
        return Err(AgruparError::dimension_mismatch("targets", n_samples, targets.len()));
    }
    let (img_rows, img_cols) = options.image_shape;
    if img_rows * img_cols != x.n_cols() {
        return Err(AgruparError::InvalidHyperparameter {
            param: "image_shape".to_string(),
            value: format!("{img_rows}x{img_cols}"),
            constraint: format!("{} pixels, one per feature", x.n_cols()),
        });
    }
    if options.grid_size == 0 || options.tile_px == 0 {
        return Err(AgruparError::InvalidHyperparameter {
            param: "grid_size/tile_px".to_string(),
            value: format!("{}/{}", options.grid_size, options.tile_px),
            constraint: "> 0".to_string(),
        });
    }

    let leaves = z.node_leaves(node)?;
    let frequencies = FrequencyTable::from_values(leaves.iter().map(|&i| &targets[i]));

    if options.print_summary {
        println!("{frequencies}");
        println!(
            "{} {} / {}",
            "Images in the cluster:".bold(),
            leaves.len().to_string().cyan(),
            n_samples
        );
    }

    let n_leaves = leaves.len();
    let grid = (
        (n_leaves / options.grid_size + 1).min(options.grid_size),
        n_leaves.min(options.grid_size),
    );

    let mut shown = leaves.clone();
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    shown.shuffle(&mut rng);
    shown.truncate(options.max_count.min(grid.0 * grid.1));

    debug!(
        node,
        leaves = n_leaves,
        shown = shown.len(),
        rows = grid.0,
        cols = grid.1,
        "Rendering node tiles"
    );

    let width = grid.1 as u32 * options.tile_px;
    let height = grid.0 as u32 * options.tile_px;
    let svg = render_tiles(x, targets, &shown, grid, options)?;

    Ok(NodePlot {
        leaves,
        shown,
        frequencies,
        n_samples,
        grid,
        figure: Figure::new(svg, width, height),
    })
}

fn render_tiles<T: fmt::Display>(
    x: &Matrix<f64>,
    targets: &[T],
    shown: &[usize],
    grid: (usize, usize),
    options: &NodePlotOptions,
) -> Result<String> {
    let (img_rows, img_cols) = options.image_shape;
    let size = (grid.1 as u32 * options.tile_px, grid.0 as u32 * options.tile_px);
    let gap = (options.tile_px / 20).max(1) as i32;
    let label_style = TextStyle::from(FontDesc::new(
        FontFamily::SansSerif,
        f64::from(options.tile_px) / 4.0,
        FontStyle::Normal,
    ))
    .color(&RED)
    .pos(Pos::new(HPos::Left, VPos::Bottom));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(AgruparError::render)?;

        let cells = root.split_evenly(grid);
        for (cell, &sample) in cells.iter().zip(shown) {
            let area = cell.margin(gap, gap, gap, gap);
            let (w, h) = area.dim_in_pixel();
            let pixels = x.row(sample);
            let (lo, hi) = pixels
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

            for r in 0..img_rows {
                for c in 0..img_cols {
                    let shade = grey(pixels[r * img_cols + c], lo, hi);
                    let x0 = (c as u32 * w / img_cols as u32) as i32;
                    let x1 = ((c as u32 + 1) * w / img_cols as u32) as i32;
                    let y0 = (r as u32 * h / img_rows as u32) as i32;
                    let y1 = ((r as u32 + 1) * h / img_rows as u32) as i32;
                    area.draw(&Rectangle::new(
                        [(x0, y0), (x1, y1)],
                        RGBColor(shade, shade, shade).filled(),
                    ))
                    .map_err(AgruparError::render)?;
                }
            }

            area.draw(&Text::new(
                targets[sample].to_string(),
                (1, h as i32 - 1),
                label_style.clone(),
            ))
            .map_err(AgruparError::render)?;
        }

        root.present().map_err(AgruparError::render)?;
    }
    Ok(svg)
}

/// Grey level of `v` on a white-to-black ramp over `[lo, hi]`.
fn grey(v: f64, lo: f64, hi: f64) -> u8 {
    let t = if hi > lo { ((v - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.0 };
    (255.0 * (1.0 - t)).round() as u8
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
