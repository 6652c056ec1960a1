use std::{fs, path::Path};

use plotters::prelude::*;

use crate::{
    axes::Axes,
    error::{RenderError, draw_error},
    settings::plot_settings,
};

/// One or more [`Axes`] laid out on a grid, written as SVG.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    rows: usize,
    cols: usize,
    /// Row-major; empty cells are left blank.
    panels: Vec<Axes>,
    size: Option<(u32, u32)>,
}

impl Figure {
    #[must_use]
    pub fn single(axes: Axes) -> Self {
        Self {
            rows: 1,
            cols: 1,
            panels: vec![axes],
            size: None,
        }
    }

    /// A `rows` x `cols` grid filled row by row.
    pub fn grid(rows: usize, cols: usize, panels: Vec<Axes>) -> Result<Self, RenderError> {
        if rows == 0 || cols == 0 || panels.len() > rows * cols {
            return Err(RenderError::InvalidGrid {
                rows,
                cols,
                panels: panels.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            panels,
            size: None,
        })
    }

    /// Overrides the canvas size, which otherwise is one settings-sized cell per panel.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    #[must_use]
    pub fn panels(&self) -> &[Axes] {
        &self.panels
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn to_svg(&self) -> Result<String, RenderError> {
        let settings = plot_settings();
        let size = self.size.unwrap_or((
            settings.width * self.cols as u32,
            settings.height * self.rows as u32,
        ));

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;
            let cells = root.split_evenly((self.rows, self.cols));
            for (axes, cell) in self.panels.iter().zip(&cells) {
                axes.draw(cell, &settings)?;
            }
            root.present().map_err(draw_error)?;
        }
        Ok(svg)
    }

    /// Renders and writes the SVG to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), RenderError> {
        let svg = self.to_svg()?;
        fs::write(path, svg).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
