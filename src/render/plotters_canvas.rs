use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{slot_center, Canvas, PixelGrid, TickSide};
use crate::color::Rgb8;
use crate::error::{Error, Result};
use crate::missing::layout::PanelExtent;
use crate::missing::ticks::Tick;

const TICK_PX: i32 = 4;
const TICK_PAD_PX: i32 = 2;

/// [`Canvas`] over any plotters drawing backend.
pub struct PlottersCanvas<DB: DrawingBackend> {
    area: DrawingArea<DB, Shift>,
    font_px: u32,
}

fn render_err<E: std::fmt::Debug>(e: E) -> Error {
    Error::Render(format!("{e:?}"))
}

fn rgb(color: Rgb8) -> RGBColor {
    RGBColor(color.red, color.green, color.blue)
}

impl<DB: DrawingBackend> PlottersCanvas<DB> {
    pub fn new(area: DrawingArea<DB, Shift>) -> Self {
        let (_, h) = area.dim_in_pixel();
        let font_px = ((h as f64) * 0.012).round().max(8.0) as u32;
        Self { area, font_px }
    }

    /// Flush everything drawn so far to the backend.
    pub fn present(self) -> Result<()> {
        self.area.present().map_err(render_err)
    }

    fn x_px(&self, x: f64) -> i32 {
        let (w, _) = self.area.dim_in_pixel();
        (x * w as f64).round() as i32
    }

    /// Figure y grows upwards, pixel y downwards.
    fn y_px(&self, y: f64) -> i32 {
        let (_, h) = self.area.dim_in_pixel();
        ((1.0 - y) * h as f64).round() as i32
    }

    fn style(&self, h: HPos, v: VPos) -> TextStyle<'static> {
        TextStyle::from(("sans-serif", self.font_px).into_font())
            .color(&BLACK)
            .pos(Pos::new(h, v))
    }
}

impl<DB: DrawingBackend> Canvas for PlottersCanvas<DB> {
    fn fill(&mut self, color: Rgb8) -> Result<()> {
        self.area.fill(&rgb(color)).map_err(render_err)
    }

    fn draw_pixels(&mut self, extent: &PanelExtent, grid: &PixelGrid) -> Result<()> {
        let (rows, cols) = (grid.rows(), grid.cols());
        if rows == 0 || cols == 0 {
            return Ok(());
        }
        let cell_w = extent.width / cols as f64;
        let cell_h = extent.height / rows as f64;
        for r in 0..rows {
            let y0 = self.y_px(extent.top() - r as f64 * cell_h);
            let y1 = self.y_px(extent.top() - (r + 1) as f64 * cell_h);
            for c in 0..cols {
                let x0 = self.x_px(extent.left + c as f64 * cell_w);
                let x1 = self.x_px(extent.left + (c + 1) as f64 * cell_w);
                let cell = Rectangle::new([(x0, y0), (x1, y1)], rgb(grid.get(r, c)).filled());
                self.area.draw(&cell).map_err(render_err)?;
            }
        }
        Ok(())
    }

    fn draw_ticks(
        &mut self,
        extent: &PanelExtent,
        side: TickSide,
        slots: usize,
        ticks: &[Tick],
    ) -> Result<()> {
        for tick in ticks {
            let offset = slot_center(tick.position, slots);
            let (anchor, outward, style) = match side {
                TickSide::Left => (
                    (self.x_px(extent.left), self.y_px(extent.top() - offset * extent.height)),
                    (-TICK_PX, 0),
                    self.style(HPos::Right, VPos::Center),
                ),
                TickSide::Right => (
                    (self.x_px(extent.right()), self.y_px(extent.top() - offset * extent.height)),
                    (TICK_PX, 0),
                    self.style(HPos::Left, VPos::Center),
                ),
                TickSide::Top => (
                    (self.x_px(extent.left + offset * extent.width), self.y_px(extent.top())),
                    (0, -TICK_PX),
                    self.style(HPos::Left, VPos::Center)
                        .transform(FontTransform::Rotate270),
                ),
                TickSide::Bottom => (
                    (self.x_px(extent.left + offset * extent.width), self.y_px(extent.bottom)),
                    (0, TICK_PX),
                    self.style(HPos::Center, VPos::Top),
                ),
            };
            let end = (anchor.0 + outward.0, anchor.1 + outward.1);
            self.area
                .draw(&PathElement::new(vec![anchor, end], BLACK.stroke_width(1)))
                .map_err(render_err)?;

            let pad = (outward.0.signum() * TICK_PAD_PX, outward.1.signum() * TICK_PAD_PX);
            let at = (end.0 + pad.0, end.1 + pad.1);
            self.area
                .draw(&Text::new(tick.text.as_str(), at, style))
                .map_err(render_err)?;
        }
        Ok(())
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str) -> Result<()> {
        let at = (self.x_px(x), self.y_px(y));
        let style = self.style(HPos::Center, VPos::Center);
        self.area
            .draw(&Text::new(text, at, style))
            .map_err(render_err)
    }
}
