use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Pt, Rgb, TextMatrix,
};

use super::{slot_center, Canvas, PixelGrid, TickSide};
use crate::color::Rgb8;
use crate::error::{Error, Result};
use crate::missing::layout::PanelExtent;
use crate::missing::ticks::Tick;

const MM_PER_INCH: f64 = 25.4;
const MM_PER_PT: f64 = MM_PER_INCH / 72.0;
const TICK_MM: f64 = 1.0;
const TICK_PAD_MM: f64 = 0.5;
/// Mean Helvetica advance, as a fraction of the font size.
const GLYPH_WIDTH_EM: f64 = 0.5;

fn pdf_err(e: printpdf::Error) -> Error {
    Error::Render(format!("pdf: {e}"))
}

fn fill_color(color: Rgb8) -> Color {
    let (r, g, b) = color.into_format::<f32>().into_components();
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn point(x: f64, y: f64) -> (Point, bool) {
    (Point::new(Mm(x as f32), Mm(y as f32)), false)
}

/// [`Canvas`] over a single vector PDF page of the figure's size.
///
/// PDF space grows upwards like figure space, so coordinates only scale.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    width_mm: f64,
    height_mm: f64,
    font_pt: f64,
}

impl PdfCanvas {
    /// One page of `figsize` inches (width, height).
    pub fn new(title: &str, figsize: (f64, f64)) -> Result<Self> {
        let width_mm = figsize.0 * MM_PER_INCH;
        let height_mm = figsize.1 * MM_PER_INCH;
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(width_mm as f32),
            Mm(height_mm as f32),
            "figure",
        );
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            font,
            width_mm,
            height_mm,
            font_pt: (figsize.1 * 72.0 * 0.012).max(4.0),
        })
    }

    /// Serialize the finished document.
    pub fn finish(self) -> Result<Vec<u8>> {
        self.doc.save_to_bytes().map_err(pdf_err)
    }

    fn x_mm(&self, x: f64) -> f64 {
        x * self.width_mm
    }

    fn y_mm(&self, y: f64) -> f64 {
        y * self.height_mm
    }

    fn font_mm(&self) -> f64 {
        self.font_pt * MM_PER_PT
    }

    fn text_width_mm(&self, text: &str) -> f64 {
        text.chars().count() as f64 * GLYPH_WIDTH_EM * self.font_mm()
    }

    fn rect(&self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb8) {
        self.layer.set_fill_color(fill_color(color));
        self.layer.add_polygon(Polygon {
            rings: vec![vec![
                point(x0, y0),
                point(x1, y0),
                point(x1, y1),
                point(x0, y1),
            ]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    /// Text with its baseline starting at `(x, y)` mm, optionally reading upwards.
    fn text(&self, text: &str, x: f64, y: f64, upright: bool) {
        self.layer.set_fill_color(fill_color(palette::named::BLACK));
        if upright {
            self.layer.begin_text_section();
            self.layer.set_font(&self.font, self.font_pt as f32);
            self.layer.set_text_matrix(TextMatrix::TranslateRotate(
                Pt::from(Mm(x as f32)),
                Pt::from(Mm(y as f32)),
                90.0,
            ));
            self.layer.write_text(text, &self.font);
            self.layer.end_text_section();
        } else {
            self.layer.use_text(
                text,
                self.font_pt as f32,
                Mm(x as f32),
                Mm(y as f32),
                &self.font,
            );
        }
    }
}

impl Canvas for PdfCanvas {
    fn fill(&mut self, color: Rgb8) -> Result<()> {
        self.rect(0.0, 0.0, self.width_mm, self.height_mm, color);
        Ok(())
    }

    fn draw_pixels(&mut self, extent: &PanelExtent, grid: &PixelGrid) -> Result<()> {
        let (rows, cols) = (grid.rows(), grid.cols());
        if rows == 0 || cols == 0 {
            return Ok(());
        }
        let cell_w = extent.width / cols as f64;
        let cell_h = extent.height / rows as f64;
        for r in 0..rows {
            let y1 = self.y_mm(extent.top() - r as f64 * cell_h);
            let y0 = self.y_mm(extent.top() - (r + 1) as f64 * cell_h);
            for c in 0..cols {
                let x0 = self.x_mm(extent.left + c as f64 * cell_w);
                let x1 = self.x_mm(extent.left + (c + 1) as f64 * cell_w);
                self.rect(x0, y0, x1, y1, grid.get(r, c));
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
        self.layer.set_outline_color(fill_color(palette::named::BLACK));
        self.layer.set_outline_thickness(0.5);
        // Baseline drop that centres a line of text on a point.
        let half_cap = 0.35 * self.font_mm();

        for tick in ticks {
            let offset = slot_center(tick.position, slots);
            let width = self.text_width_mm(&tick.text);
            let (anchor, outward) = match side {
                TickSide::Left => (
                    (self.x_mm(extent.left), self.y_mm(extent.top() - offset * extent.height)),
                    (-TICK_MM, 0.0),
                ),
                TickSide::Right => (
                    (self.x_mm(extent.right()), self.y_mm(extent.top() - offset * extent.height)),
                    (TICK_MM, 0.0),
                ),
                TickSide::Top => (
                    (self.x_mm(extent.left + offset * extent.width), self.y_mm(extent.top())),
                    (0.0, TICK_MM),
                ),
                TickSide::Bottom => (
                    (self.x_mm(extent.left + offset * extent.width), self.y_mm(extent.bottom)),
                    (0.0, -TICK_MM),
                ),
            };
            let end = (anchor.0 + outward.0, anchor.1 + outward.1);
            self.layer.add_line(Line {
                points: vec![point(anchor.0, anchor.1), point(end.0, end.1)],
                is_closed: false,
            });

            match side {
                TickSide::Left => {
                    self.text(&tick.text, end.0 - TICK_PAD_MM - width, end.1 - half_cap, false)
                }
                TickSide::Right => self.text(&tick.text, end.0 + TICK_PAD_MM, end.1 - half_cap, false),
                TickSide::Top => self.text(&tick.text, end.0 + half_cap, end.1 + TICK_PAD_MM, true),
                TickSide::Bottom => self.text(
                    &tick.text,
                    end.0 - width / 2.0,
                    end.1 - TICK_PAD_MM - self.font_mm(),
                    false,
                ),
            }
        }
        Ok(())
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str) -> Result<()> {
        let width = self.text_width_mm(text);
        let half_cap = 0.35 * self.font_mm();
        self.text(text, self.x_mm(x) - width / 2.0, self.y_mm(y) - half_cap, false);
        Ok(())
    }
}
