//! Dendrogram plots.

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{link_rgb, Figure, PALETTE};
use crate::cluster::AgglomerativeClustering;
use crate::error::{AgruparError, Result};
use crate::hierarchy::{DendrogramLayout, LinkColor, LinkageMatrix};
use crate::primitives::Matrix;

/// Where the merge tree of a dendrogram comes from.
#[derive(Debug, Clone, Copy)]
pub enum DendrogramSource<'a> {
    /// A precomputed linkage matrix.
    Linkage(&'a LinkageMatrix),
    /// A fitted model together with the data it was fitted on.
    Model {
        /// Fitted model.
        model: &'a AgglomerativeClustering,
        /// Training data, used when the model did not keep merge distances.
        data: &'a Matrix<f64>,
    },
}

/// Drawing options for [`plot_dendrogram`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DendrogramOptions {
    /// Merges higher than this are marked and labelled with their node id.
    pub annotate_above: f64,
    /// Colour the tree as if cut into this many clusters. Overrides
    /// `color_threshold`.
    pub n_clusters: Option<usize>,
    /// Height separating coloured subtrees from the upper links.
    pub color_threshold: Option<f64>,
    /// Figure width in pixels.
    pub width: u32,
    /// Figure height in pixels.
    pub height: u32,
    /// Draw sample indices under the leaves.
    pub leaf_labels: bool,
    /// Font size of leaf and node labels.
    pub font_size: u32,
    /// Optional caption.
    pub title: Option<String>,
}

impl Default for DendrogramOptions {
    fn default() -> Self {
        Self {
            annotate_above: 0.0,
            n_clusters: None,
            color_threshold: None,
            width: 2000,
            height: 1000,
            leaf_labels: true,
            font_size: 12,
            title: None,
        }
    }
}

impl DendrogramOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the annotation height.
    #[must_use]
    pub fn with_annotate_above(mut self, height: f64) -> Self {
        self.annotate_above = height;
        self
    }

    /// Colours the tree as cut into `n_clusters` clusters.
    #[must_use]
    pub fn with_n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = Some(n_clusters);
        self
    }

    /// Sets an explicit colour threshold.
    #[must_use]
    pub fn with_color_threshold(mut self, threshold: f64) -> Self {
        self.color_threshold = Some(threshold);
        self
    }

    /// Sets the figure size in pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enables or disables leaf labels.
    #[must_use]
    pub fn with_leaf_labels(mut self, leaf_labels: bool) -> Self {
        self.leaf_labels = leaf_labels;
        self
    }

    /// Sets the caption.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A merge point marked on the dendrogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeAnnotation {
    /// Horizontal position, midway between the two children.
    pub x: f64,
    /// Merge height.
    pub y: f64,
    /// Linkage row of the merge.
    pub row: usize,
    /// Printed label: `row - n_merges`, so the root is `-1` and earlier
    /// merges count further down. [`LinkageMatrix::row_for_label`] maps it
    /// back to the row.
    pub label: i64,
    /// Colour class of the link.
    pub color: LinkColor,
}

/// Result of [`plot_dendrogram`].
#[derive(Debug, Clone)]
pub struct DendrogramPlot {
    /// Rendered figure.
    pub figure: Figure,
    /// Linkage matrix that was drawn.
    pub linkage: LinkageMatrix,
    /// Link geometry and colours.
    pub layout: DendrogramLayout,
    /// Threshold drawn as a horizontal line, if one was requested.
    pub color_threshold: Option<f64>,
    /// Annotated merges in drawing order.
    pub annotations: Vec<NodeAnnotation>,
}

/// Draws the dendrogram of a linkage matrix or fitted model.
///
/// With `n_clusters = Some(k)` the colour threshold is placed just above
/// the `k`-th highest merge, so each of the `k` clusters gets its own
/// colour. An explicit or derived threshold is also drawn as a horizontal
/// line. Every merge higher than `annotate_above` is marked with a dot and
/// labelled with its node id.
///
/// # Errors
///
/// Returns an error if the model's tree cannot be rebuilt, `n_clusters`
/// is out of range, or rendering fails.
///
/// # Examples
///
/// ```
/// use agrupar::hierarchy::{LinkageMatrix, LinkageRow};
/// use agrupar::viz::{plot_dendrogram, DendrogramOptions, DendrogramSource};
///
/// let z = LinkageMatrix::from_rows(vec![
///     LinkageRow { left: 0, right: 1, distance: 1.0, count: 2 },
///     LinkageRow { left: 2, right: 3, distance: 5.0, count: 3 },
/// ], 3).unwrap();
///
/// let plot = plot_dendrogram(
///     DendrogramSource::Linkage(&z),
///     &DendrogramOptions::new().with_n_clusters(2),
/// ).unwrap();
/// assert_eq!(plot.annotations.len(), 2);
/// assert!(plot.figure.svg().contains("<svg"));
/// ```
pub fn plot_dendrogram(
    source: DendrogramSource<'_>,
    options: &DendrogramOptions,
) -> Result<DendrogramPlot> {
    let linkage = match source {
        DendrogramSource::Linkage(z) => z.clone(),
        DendrogramSource::Model { model, data } => LinkageMatrix::from_model(model, data)?,
    };

    let color_threshold = match options.n_clusters {
        Some(k) => Some(linkage.color_threshold_for(k)?),
        None => options.color_threshold,
    };
    let layout = DendrogramLayout::compute(&linkage, color_threshold);

    let n_merges = linkage.n_merges() as i64;
    let annotations: Vec<NodeAnnotation> = layout
        .icoord
        .iter()
        .zip(&layout.dcoord)
        .zip(layout.link_rows.iter().zip(&layout.colors))
        .filter(|((_, d), _)| d[1] > options.annotate_above)
        .map(|((i, d), (&row, &color))| NodeAnnotation {
            x: 0.5 * (i[1] + i[2]),
            y: d[1],
            row,
            label: row as i64 - n_merges,
            color,
        })
        .collect();

    debug!(
        n_samples = linkage.n_samples(),
        links = layout.n_links(),
        annotated = annotations.len(),
        threshold = layout.color_threshold,
        "Rendering dendrogram"
    );

    let svg = render(&layout, &annotations, color_threshold, linkage.max_distance(), options)?;

    Ok(DendrogramPlot {
        figure: Figure::new(svg, options.width, options.height),
        linkage,
        layout,
        color_threshold,
        annotations,
    })
}

fn render(
    layout: &DendrogramLayout,
    annotations: &[NodeAnnotation],
    threshold_line: Option<f64>,
    max_height: f64,
    options: &DendrogramOptions,
) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(AgruparError::render)?;

        let x_max = layout.width().max(10.0);
        let y_max = if max_height > 0.0 { max_height * 1.05 } else { 1.0 };

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(20)
            .x_label_area_size(if options.leaf_labels { 40 } else { 10 })
            .y_label_area_size(60);
        if let Some(title) = &options.title {
            builder.caption(title, ("sans-serif", 24));
        }
        let mut chart = builder
            .build_cartesian_2d(0.0..x_max, 0.0..y_max)
            .map_err(AgruparError::render)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(0)
            .y_desc("distance")
            .draw()
            .map_err(AgruparError::render)?;

        chart
            .draw_series(layout.icoord.iter().zip(&layout.dcoord).zip(&layout.colors).map(
                |((xs, ys), &color)| {
                    let points: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
                    PathElement::new(points, link_rgb(color).stroke_width(2))
                },
            ))
            .map_err(AgruparError::render)?;

        if let Some(t) = threshold_line.filter(|&t| t > 0.0) {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0.0, t), (x_max, t)],
                    BLACK.stroke_width(1),
                )))
                .map_err(AgruparError::render)?;
        }

        let font = FontDesc::new(
            FontFamily::SansSerif,
            f64::from(options.font_size),
            FontStyle::Normal,
        );
        let node_style = TextStyle::from(font.clone()).pos(Pos::new(HPos::Center, VPos::Top));
        chart
            .draw_series(annotations.iter().map(|a| {
                EmptyElement::at((a.x, a.y))
                    + Circle::new((0, 0), 4, link_rgb(a.color).filled())
                    + Text::new(a.label.to_string(), (0, 6), node_style.clone())
            }))
            .map_err(AgruparError::render)?;

        if options.leaf_labels {
            let leaf_style = font
                .transform(FontTransform::Rotate90)
                .color(&PALETTE[7]);
            chart
                .draw_series(layout.leaves.iter().enumerate().map(|(k, &leaf)| {
                    EmptyElement::at((DendrogramLayout::leaf_x(k), 0.0))
                        + Text::new(leaf.to_string(), (4, 4), leaf_style.clone())
                }))
                .map_err(AgruparError::render)?;
        }

        root.present().map_err(AgruparError::render)?;
    }
    Ok(svg)
}

#[cfg(test)]
#[path = "dendrogram_tests.rs"]
mod tests;
