//! Drawing seam between a computed [`Figure`](crate::figure::Figure) and a
//! concrete surface.

use crate::color::Rgb8;
use crate::error::Result;
use crate::missing::layout::PanelExtent;
use crate::missing::ticks::Tick;

pub mod export;
pub mod pdf_canvas;
pub mod plotters_canvas;

pub use pdf_canvas::PdfCanvas;
pub use plotters_canvas::PlottersCanvas;

/// Row-major block of colours shown inside one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    rows: usize,
    cols: usize,
    pixels: Vec<Rgb8>,
}

impl PixelGrid {
    pub fn from_fn(rows: usize, cols: usize, mut color: impl FnMut(usize, usize) -> Rgb8) -> Self {
        let pixels = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| color(r, c))
            .collect();
        Self { rows, cols, pixels }
    }

    /// A single column, one pixel per row.
    pub fn column(colors: Vec<Rgb8>) -> Self {
        Self {
            rows: colors.len(),
            cols: 1,
            pixels: colors,
        }
    }

    /// A single row, one pixel per column.
    pub fn row(colors: Vec<Rgb8>) -> Self {
        Self {
            rows: 1,
            cols: colors.len(),
            pixels: colors,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Rgb8 {
        self.pixels[row * self.cols + col]
    }
}

/// Side of a panel that carries tick labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl TickSide {
    /// Ticks on the left/right index rows, top/bottom ones index columns.
    pub fn indexes_rows(self) -> bool {
        matches!(self, TickSide::Left | TickSide::Right)
    }
}

/// A drawing surface addressed in normalized figure coordinates.
pub trait Canvas {
    fn fill(&mut self, color: Rgb8) -> Result<()>;

    /// Stretch `grid` over `extent`, one rectangle per grid cell.
    fn draw_pixels(&mut self, extent: &PanelExtent, grid: &PixelGrid) -> Result<()>;

    /// Draw tick marks and their text along one side of `extent`.
    ///
    /// `slots` is the number of item positions along that side; tick `i`
    /// sits in the middle of slot `ticks[i].position`.
    fn draw_ticks(
        &mut self,
        extent: &PanelExtent,
        side: TickSide,
        slots: usize,
        ticks: &[Tick],
    ) -> Result<()>;

    /// Draw `text` centred on the figure point `(x, y)`.
    fn draw_text(&mut self, x: f64, y: f64, text: &str) -> Result<()>;
}

/// Centre of slot `position` out of `slots`, as a fraction in `[0, 1]` from
/// the panel's top (rows) or left (columns) edge.
pub fn slot_center(position: usize, slots: usize) -> f64 {
    (position as f64 + 0.5) / slots.max(1) as f64
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_row_major() {
        let grid = PixelGrid::from_fn(2, 3, |r, c| Rgb8::new(r as u8, c as u8, 0));
        assert_eq!((grid.rows(), grid.cols()), (2, 3));
        assert_eq!(grid.get(1, 2), Rgb8::new(1, 2, 0));
    }

    #[test]
    fn slot_centres_split_evenly() {
        assert_eq!(slot_center(0, 4), 0.125);
        assert_eq!(slot_center(3, 4), 0.875);
        assert_eq!(slot_center(0, 0), 0.5);
    }
}
