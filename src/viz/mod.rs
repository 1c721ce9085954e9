//! SVG plots of hierarchical clusterings.
//!
//! - [`plot_dendrogram`]: coloured dendrogram of a linkage matrix or fitted model
//! - [`plot_node`]: image grid of the samples under one merge
//!
//! Figures are rendered in memory with the `plotters` SVG backend and
//! returned as [`Figure`] values.

mod dendrogram;
mod figure;
mod node;

pub use dendrogram::{
    plot_dendrogram, DendrogramOptions, DendrogramPlot, DendrogramSource, NodeAnnotation,
};
pub use figure::Figure;
pub use node::{plot_node, FrequencyTable, NodePlot, NodePlotOptions};

use plotters::style::RGBColor;

use crate::hierarchy::LinkColor;

/// Ten-colour categorical palette (`C0`..`C9`).
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Colour used to draw a link.
///
/// Links above the threshold use `C0`; clusters cycle through `C1`..`C9`.
#[must_use]
pub fn link_rgb(color: LinkColor) -> RGBColor {
    match color {
        LinkColor::AboveThreshold => PALETTE[0],
        LinkColor::Cluster(k) => PALETTE[1 + k % (PALETTE.len() - 1)],
    }
}
