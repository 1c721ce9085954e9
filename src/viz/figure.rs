//! Rendered figures.

use std::path::Path;

use crate::error::Result;

/// An in-memory SVG document produced by the plotting helpers.
///
/// Nothing is written to disk until [`Figure::save`] is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    svg: String,
    width: u32,
    height: u32,
}

impl Figure {
    pub(crate) fn new(svg: String, width: u32, height: u32) -> Self {
        Self { svg, width, height }
    }

    /// SVG markup.
    #[must_use]
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Consumes the figure and returns its SVG markup.
    #[must_use]
    pub fn into_svg(self) -> String {
        self.svg
    }

    /// Size in pixels as (width, height).
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Writes the SVG document to `path`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.svg)?;
        Ok(())
    }
}
