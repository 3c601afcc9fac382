use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{ImageFormat, RgbImage};
use plotters::prelude::*;

use super::{PdfCanvas, PlottersCanvas};
use crate::error::{invalid, Error, Result};
use crate::figure::Figure;

/// File formats a figure can be written to, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Png,
    Svg,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            other => invalid!("cannot export to .{other}; use .pdf, .png or .svg"),
        }
    }
}

/// Largest raster drawn in memory, in pixels.
const MAX_RASTER_PIXELS: u64 = 1 << 28;

/// Pixel dimensions of a figure of `figsize` inches at `dpi`.
pub fn pixel_size(figsize: (f64, f64), dpi: u32) -> (u32, u32) {
    let px = |inches: f64| (inches * dpi as f64).round().max(1.0) as u32;
    (px(figsize.0), px(figsize.1))
}

/// Render `figure` into an in-memory RGB image.
pub fn render_rgb(figure: &Figure, dpi: u32) -> Result<RgbImage> {
    let (w, h) = pixel_size(figure.figsize, dpi);
    if w as u64 * h as u64 > MAX_RASTER_PIXELS {
        return Err(Error::Render(format!(
            "{w} x {h} pixels at {dpi} DPI is too large to rasterize"
        )));
    }
    let mut buf = vec![0u8; w as usize * h as usize * 3];
    {
        let backend = BitMapBackend::with_buffer(&mut buf, (w, h));
        let mut canvas = PlottersCanvas::new(backend.into_drawing_area());
        figure.draw(&mut canvas)?;
        canvas.present()?;
    }
    RgbImage::from_raw(w, h, buf)
        .ok_or_else(|| Error::Render(format!("pixel buffer does not match {w}x{h}")))
}

/// Render `figure` as an SVG document.
pub fn render_svg(figure: &Figure, dpi: u32) -> Result<String> {
    let size = pixel_size(figure.figsize, dpi);
    let mut svg = String::new();
    {
        let backend = SVGBackend::with_string(&mut svg, size);
        let mut canvas = PlottersCanvas::new(backend.into_drawing_area());
        figure.draw(&mut canvas)?;
        canvas.present()?;
    }
    Ok(svg)
}

/// Render `figure` as a one-page vector PDF of `figsize` inches.
pub fn render_pdf(figure: &Figure) -> Result<Vec<u8>> {
    let mut canvas = PdfCanvas::new("blackholes", figure.figsize)?;
    figure.draw(&mut canvas)?;
    canvas.finish()
}

/// Write `figure` to `path` at `dpi`; the extension picks the format.
///
/// `dpi` only sizes raster output. PDF and SVG pages are `figsize` inches.
pub fn save(figure: &Figure, path: &Path, dpi: u32) -> Result<()> {
    match ExportFormat::from_path(path)? {
        ExportFormat::Pdf => {
            let pdf = render_pdf(figure)?;
            std::fs::write(path, pdf)?;
        }
        ExportFormat::Png => {
            let image = render_rgb(figure, dpi)?;
            let mut out = BufWriter::new(File::create(path)?);
            image.write_to(&mut out, ImageFormat::Png)?;
        }
        ExportFormat::Svg => {
            let svg = render_svg(figure, dpi)?;
            std::fs::write(path, svg)?;
        }
    }
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a/b.PNG")).unwrap(), ExportFormat::Png);
        assert_eq!(ExportFormat::from_path(Path::new("b.svg")).unwrap(), ExportFormat::Svg);
        assert_eq!(ExportFormat::from_path(Path::new("c.Pdf")).unwrap(), ExportFormat::Pdf);
        assert!(matches!(
            ExportFormat::from_path(Path::new("b.tiff")),
            Err(Error::Validation(_))
        ));
        assert!(ExportFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn pdf_page_holds_ticks_and_groups() {
        use crate::config::BlackholesOptions;
        use crate::data::model::{CellValue, Table};
        use crate::figure::blackholes;

        let rows = (0..6)
            .map(|r| {
                (0..4)
                    .map(|c| if (r + c) % 3 == 0 { CellValue::Null } else { CellValue::from(1.0) })
                    .collect()
            })
            .collect();
        let table = Table::new(vec!["w".into(), "x".into(), "y".into(), "z".into()], rows).unwrap();
        let opts = BlackholesOptions {
            group_rows_by: Some(["a", "b", "a", "b", "a", "b"].map(CellValue::from).to_vec()),
            group_wise_colorbar: true,
            figsize: (4.0, 3.0),
            ..Default::default()
        };
        let figure = blackholes(&table, &opts).unwrap();
        assert!(!figure.freq_over_col.ticks.as_ref().unwrap().ticks.is_empty());

        let pdf = render_pdf(&figure).unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.pdf");
        save(&figure, &path, 300).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn oversized_raster_is_refused() {
        use crate::config::BlackholesOptions;
        use crate::data::model::{CellValue, Table};
        use crate::figure::blackholes;

        let rows = vec![
            vec![CellValue::Null, CellValue::from(1.0)],
            vec![CellValue::from(2.0), CellValue::from(3.0)],
        ];
        let table = Table::new(vec!["a".into(), "b".into()], rows).unwrap();
        let opts = BlackholesOptions {
            figsize: (4.0, 3.0),
            ..Default::default()
        };
        let figure = blackholes(&table, &opts).unwrap();
        assert!(matches!(figure.to_rgb(100_000), Err(Error::Render(_))));
        assert!(figure.to_rgb(10).is_ok());
    }

    #[test]
    fn pixel_size_scales_with_dpi() {
        assert_eq!(pixel_size((15.0, 9.0), 300), (4500, 2700));
        assert_eq!(pixel_size((0.001, 1.0), 10), (1, 10));
    }
}
