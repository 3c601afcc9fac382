use std::path::Path;

use image::RgbImage;

use crate::color::{resolve_color, FrequencyRamp, GroupColors, Rgb8};
use crate::config::{BlackholesOptions, EXPORT_DPI};
use crate::data::model::{CellValue, MissingMask, Table};
use crate::error::{invalid, Result};
use crate::missing::filter::{self, FilterSpec};
use crate::missing::grouping::{self, GroupAnnotation};
use crate::missing::labels::resolve_labels;
use crate::missing::layout::{compute_layout, LayoutRequest, PanelExtent, PanelKind, PanelLayout};
use crate::missing::ticks::{select_labels, LabelFilter, Tick};
use crate::missing::Axis;
use crate::render::export::{self, ExportFormat};
use crate::render::{slot_center, Canvas, PixelGrid, TickSide};

// ---------------------------------------------------------------------------
// Figure – the composite output
// ---------------------------------------------------------------------------

/// Tick labels along one side of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSet {
    pub side: TickSide,
    /// Number of item positions along that side.
    pub slots: usize,
    pub ticks: Vec<Tick>,
}

/// Free text at a figure coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// One rectangular panel of the figure and everything drawn in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub extent: PanelExtent,
    pub pixels: PixelGrid,
    pub ticks: Option<TickSet>,
    pub annotations: Vec<Annotation>,
}

impl Panel {
    fn new(extent: PanelExtent, pixels: PixelGrid) -> Self {
        Self {
            extent,
            pixels,
            ticks: None,
            annotations: Vec::new(),
        }
    }

    fn with_ticks(mut self, side: TickSide, ticks: Vec<Tick>) -> Self {
        let slots = if side.indexes_rows() {
            self.pixels.rows()
        } else {
            self.pixels.cols()
        };
        self.ticks = Some(TickSet { side, slots, ticks });
        self
    }

    fn draw<C: Canvas>(&self, canvas: &mut C) -> Result<()> {
        canvas.draw_pixels(&self.extent, &self.pixels)?;
        if let Some(set) = &self.ticks {
            if !set.ticks.is_empty() {
                canvas.draw_ticks(&self.extent, set.side, set.slots, &set.ticks)?;
            }
        }
        for note in &self.annotations {
            canvas.draw_text(note.x, note.y, &note.text)?;
        }
        Ok(())
    }
}

/// Group statistics of one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// Distinct group labels, sorted.
    pub names: Vec<CellValue>,
    /// Group of each displayed item, as an index into `names`.
    pub index: Vec<usize>,
    /// Sum of the member frequencies of each group.
    pub frequencies: Vec<f64>,
    pub annotations: Vec<GroupAnnotation>,
}

/// What ended up on one axis of the frame, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSummary {
    pub labels: Vec<String>,
    /// Missing fraction of each displayed item, measured on the input table.
    pub frequencies: Vec<f64>,
    /// Position of each displayed item in the input table.
    pub original: Vec<usize>,
    pub groups: Option<GroupSummary>,
}

/// The blackholes figure. Optional panels are `None` when their feature was
/// not requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Size in inches (width, height).
    pub figsize: (f64, f64),
    pub face_color: Rgb8,
    pub layout: PanelLayout,
    pub frame: Panel,
    /// Column frequencies, above the frame.
    pub freq_over_row: Panel,
    /// Row frequencies, left of the frame.
    pub freq_over_col: Panel,
    pub row_groups: Option<Panel>,
    pub col_groups: Option<Panel>,
    pub row_group_colorbar: Option<Panel>,
    pub col_group_colorbar: Option<Panel>,
    pub rows: AxisSummary,
    pub cols: AxisSummary,
}

impl Figure {
    /// Every present panel by name, in drawing order.
    pub fn panels(&self) -> impl Iterator<Item = (PanelKind, &Panel)> {
        [
            (PanelKind::Frame, Some(&self.frame)),
            (PanelKind::FreqOverCol, Some(&self.freq_over_col)),
            (PanelKind::FreqOverRow, Some(&self.freq_over_row)),
            (PanelKind::RowGroups, self.row_groups.as_ref()),
            (PanelKind::ColGroups, self.col_groups.as_ref()),
            (PanelKind::RowGroupColorbar, self.row_group_colorbar.as_ref()),
            (PanelKind::ColGroupColorbar, self.col_group_colorbar.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, panel)| panel.map(|p| (kind, p)))
    }

    pub fn draw<C: Canvas>(&self, canvas: &mut C) -> Result<()> {
        canvas.fill(self.face_color)?;
        for (_, panel) in self.panels() {
            panel.draw(canvas)?;
        }
        Ok(())
    }

    pub fn to_rgb(&self, dpi: u32) -> Result<RgbImage> {
        export::render_rgb(self, dpi)
    }

    /// Write the figure to a `.png` or `.svg` file.
    pub fn save(&self, path: &Path, dpi: u32) -> Result<()> {
        export::save(self, path, dpi)
    }
}

// ---------------------------------------------------------------------------
// blackholes – the pipeline
// ---------------------------------------------------------------------------

/// Build the missingness figure of `table`.
///
/// All options are validated before any filtering, grouping or drawing, so
/// an invalid call never produces a partial figure. When `out_path` is set
/// the figure is also written to disk at 300 DPI (PDF, PNG or SVG by extension).
pub fn blackholes(table: &Table, opts: &BlackholesOptions) -> Result<Figure> {
    let (num_rows, num_cols) = table.shape();

    // -- validation --
    opts.validate()?;
    if table.is_empty() {
        return invalid!("table is empty ({num_rows} rows, {num_cols} columns)");
    }
    let missing_color = resolve_color(&opts.missing_color)?;
    let background_color = resolve_color(&opts.background_color)?;
    let label_filter = LabelFilter::new(opts.freq_thresh_show_labels)?;
    if let Some(path) = &opts.out_path {
        ExportFormat::from_path(path)?;
    }
    check_membership(opts.group_rows_by.as_deref(), num_rows, Axis::Rows)?;
    check_membership(opts.group_cols_by.as_deref(), num_cols, Axis::Cols)?;

    let row_labels = resolve_labels(
        table,
        opts.label_rows_with.as_ref(),
        num_rows,
        "row",
        Axis::Rows,
    )?;
    let col_labels = match &opts.label_cols_with {
        Some(spec) => resolve_labels(table, Some(spec), num_cols, "col", Axis::Cols)?,
        None => table.columns.clone(),
    };

    let layout = compute_layout(
        &opts.layout,
        LayoutRequest {
            row_groups: opts.group_rows_by.is_some(),
            col_groups: opts.group_cols_by.is_some(),
            group_wise_colorbar: opts.group_wise_colorbar,
        },
    )?;

    // -- filtering --
    let row_spec = opts
        .filter_spec_samples
        .clone()
        .unwrap_or_else(|| FilterSpec::default_for(Axis::Rows, num_rows, &opts.display));
    let col_spec = opts
        .filter_spec_variables
        .clone()
        .unwrap_or_else(|| FilterSpec::default_for(Axis::Cols, num_cols, &opts.display));
    let filtered = filter::filter(table, &row_spec, &col_spec);
    if filtered.table.is_empty() {
        return invalid!(
            "nothing left to display: filters kept {} of {num_rows} rows and {} of {num_cols} columns",
            filtered.table.num_rows(),
            filtered.table.num_cols()
        );
    }

    let rows = AxisSummary {
        labels: filter::select(&row_labels, &filtered.keep_rows),
        frequencies: filtered.kept_row_freq(),
        original: filtered.table.original_rows().to_vec(),
        groups: None,
    };
    let cols = AxisSummary {
        labels: filter::select(&col_labels, &filtered.keep_cols),
        frequencies: filtered.kept_col_freq(),
        original: filtered.table.original_cols().to_vec(),
        groups: None,
    };
    let row_members = opts
        .group_rows_by
        .as_ref()
        .map(|m| filter::select(m, &filtered.keep_rows));
    let col_members = opts
        .group_cols_by
        .as_ref()
        .map(|m| filter::select(m, &filtered.keep_cols));

    // -- grouping --
    let mask = filtered.table.missing_mask();
    let (mask, rows) = group_axis(mask, rows, row_members, Axis::Rows)?;
    let (mask, cols) = group_axis(mask, cols, col_members, Axis::Cols)?;

    // -- tick labels --
    let row_ticks = select_labels(
        &rows.labels,
        &rows.frequencies,
        opts.display.max_rows_displayable,
        opts.show_all_labels,
        &label_filter,
    )?;
    let col_ticks = select_labels(
        &cols.labels,
        &cols.frequencies,
        opts.display.max_cols_displayable,
        opts.show_all_labels,
        &label_filter,
    )?;

    // -- panels --
    let frame = Panel::new(
        layout.frame,
        PixelGrid::from_fn(mask.num_rows(), mask.num_cols(), |r, c| {
            if mask.get(r, c) {
                missing_color
            } else {
                background_color
            }
        }),
    );
    let freq_over_col = Panel::new(
        layout.freq_over_col,
        PixelGrid::column(ramp_colors(&rows.frequencies, background_color, missing_color)),
    )
    .with_ticks(TickSide::Left, row_ticks);
    let freq_over_row = Panel::new(
        layout.freq_over_row,
        PixelGrid::row(ramp_colors(&cols.frequencies, background_color, missing_color)),
    )
    .with_ticks(TickSide::Top, col_ticks);

    let row_groups = layout
        .row_groups
        .zip(rows.groups.as_ref())
        .map(|(extent, groups)| group_strip(extent, groups, Axis::Rows));
    let col_groups = layout
        .col_groups
        .zip(cols.groups.as_ref())
        .map(|(extent, groups)| group_strip(extent, groups, Axis::Cols));

    let row_group_colorbar = layout
        .row_group_colorbar
        .zip(rows.groups.as_ref())
        .map(|(extent, groups)| -> Result<Panel> {
            let pixels =
                PixelGrid::column(ramp_colors(&groups.frequencies, background_color, missing_color));
            let ticks = group_name_ticks(groups, opts.display.max_rows_displayable)?;
            Ok(Panel::new(extent, pixels).with_ticks(TickSide::Right, ticks))
        })
        .transpose()?;
    let col_group_colorbar = layout
        .col_group_colorbar
        .zip(cols.groups.as_ref())
        .map(|(extent, groups)| -> Result<Panel> {
            let pixels =
                PixelGrid::row(ramp_colors(&groups.frequencies, background_color, missing_color));
            let ticks = group_name_ticks(groups, opts.display.max_cols_displayable)?;
            Ok(Panel::new(extent, pixels).with_ticks(TickSide::Bottom, ticks))
        })
        .transpose()?;

    let figure = Figure {
        figsize: opts.figsize,
        face_color: palette::named::WHITE,
        layout,
        frame,
        freq_over_row,
        freq_over_col,
        row_groups,
        col_groups,
        row_group_colorbar,
        col_group_colorbar,
        rows,
        cols,
    };
    log::debug!(
        "blackholes: {}x{} frame, {} panels",
        mask.num_rows(),
        mask.num_cols(),
        figure.panels().count()
    );

    if opts.show_fig {
        log::debug!("show_fig requested; display is left to the interactive viewer");
    }
    if let Some(path) = &opts.out_path {
        figure.save(path, EXPORT_DPI)?;
    }
    Ok(figure)
}

fn check_membership(members: Option<&[CellValue]>, axis_length: usize, axis: Axis) -> Result<()> {
    match members {
        Some(m) if m.len() != axis_length => invalid!(
            "group_{axis}_by has {} entries but the table has {axis_length} {axis}",
            m.len()
        ),
        _ => Ok(()),
    }
}

/// Reorder one axis by group, if membership was given, and collect its group
/// statistics.
fn group_axis(
    mask: MissingMask,
    summary: AxisSummary,
    members: Option<Vec<CellValue>>,
    axis: Axis,
) -> Result<(MissingMask, AxisSummary)> {
    let Some(members) = members else {
        return Ok((mask, summary));
    };
    let grouped = grouping::group(&mask, &summary.labels, &members, axis)?;
    let frequencies = grouped.permute(&summary.frequencies);
    let group_freq =
        grouping::group_frequencies(&frequencies, &grouped.index, grouped.num_groups());
    let annotations = grouping::group_annotations(&grouped.groups, &grouped.index, &group_freq);

    let summary = AxisSummary {
        original: grouped.permute(&summary.original),
        frequencies,
        groups: Some(GroupSummary {
            names: grouped.groups.clone(),
            index: grouped.index.clone(),
            frequencies: group_freq,
            annotations,
        }),
        labels: grouped.labels,
    };
    Ok((grouped.mask, summary))
}

fn ramp_colors(frequencies: &[f64], low: Rgb8, high: Rgb8) -> Vec<Rgb8> {
    let max = frequencies.iter().cloned().fold(0.0, f64::max);
    let ramp = FrequencyRamp::new(low, high, max);
    frequencies.iter().map(|&f| ramp.color_for(f)).collect()
}

/// Contiguous colour blocks, one per group, with the percentage annotations.
fn group_strip(extent: PanelExtent, groups: &GroupSummary, axis: Axis) -> Panel {
    let colors = GroupColors::new(&groups.names);
    let items: Vec<Rgb8> = groups
        .index
        .iter()
        .map(|&g| colors.color_for(&groups.names[g]))
        .collect();
    let slots = items.len();
    let pixels = match axis {
        Axis::Rows => PixelGrid::column(items),
        Axis::Cols => PixelGrid::row(items),
    };

    let annotations = groups
        .annotations
        .iter()
        .map(|a| {
            let offset = slot_center(a.position, slots);
            let (x, y) = match axis {
                Axis::Rows => (
                    extent.left + extent.width / 2.0,
                    extent.top() - offset * extent.height,
                ),
                Axis::Cols => (
                    extent.left + offset * extent.width,
                    extent.bottom + extent.height / 2.0,
                ),
            };
            Annotation {
                x,
                y,
                text: a.text.clone(),
            }
        })
        .collect();

    Panel {
        annotations,
        ..Panel::new(extent, pixels)
    }
}

/// Group names on a group-wise colorbar, shown while the group count is
/// displayable.
fn group_name_ticks(groups: &GroupSummary, displayable: usize) -> Result<Vec<Tick>> {
    let names: Vec<String> = groups.names.iter().map(ToString::to_string).collect();
    select_labels(
        &names,
        &groups.frequencies,
        displayable,
        false,
        &LabelFilter::disabled(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::missing::labels::LabelSpec;
    use crate::render::recording::{Op, RecordingCanvas};

    fn diagonal() -> Table {
        let rows = (0..4)
            .map(|r| {
                (0..3)
                    .map(|c| {
                        if r == c {
                            CellValue::Null
                        } else {
                            CellValue::Integer(1)
                        }
                    })
                    .collect()
            })
            .collect();
        Table::new(vec!["a".into(), "b".into(), "c".into()], rows).unwrap()
    }

    #[test]
    fn small_table_keeps_everything_by_default() {
        let fig = blackholes(&diagonal(), &BlackholesOptions::default()).unwrap();
        assert_eq!(fig.frame.pixels.rows(), 4);
        assert_eq!(fig.cols.labels, vec!["a", "b", "c"]);
        assert_eq!(fig.rows.labels, vec!["row0", "row1", "row2", "row3"]);
        assert!(fig.row_groups.is_none());
        assert!(fig.col_groups.is_none());
        assert!(fig.row_group_colorbar.is_none());
        assert!(fig.col_group_colorbar.is_none());
        assert_eq!(fig.panels().count(), 3);
    }

    #[test]
    fn frame_pixels_follow_the_mask() {
        let opts = BlackholesOptions {
            missing_color: "red".into(),
            background_color: "white".into(),
            ..Default::default()
        };
        let fig = blackholes(&diagonal(), &opts).unwrap();
        assert_eq!(fig.frame.pixels.get(1, 1), Rgb8::new(255, 0, 0));
        assert_eq!(fig.frame.pixels.get(1, 0), Rgb8::new(255, 255, 255));
        // complete row 3 gets the background end of the ramp
        assert_eq!(fig.freq_over_col.pixels.get(3, 0), Rgb8::new(255, 255, 255));
        assert_eq!(fig.freq_over_col.pixels.get(0, 0), Rgb8::new(255, 0, 0));
    }

    #[test]
    fn row_grouping_reorders_everything_together() {
        let opts = BlackholesOptions {
            group_rows_by: Some(["A", "B", "A", "C"].into_iter().map(CellValue::from).collect()),
            ..Default::default()
        };
        let fig = blackholes(&diagonal(), &opts).unwrap();
        assert_eq!(fig.rows.original, vec![0, 2, 1, 3]);
        assert_eq!(fig.rows.labels, vec!["row0", "row2", "row1", "row3"]);
        // row 2 of the input misses column c
        assert_eq!(fig.frame.pixels.get(1, 2), resolve_color("black").unwrap());
        let groups = fig.rows.groups.as_ref().unwrap();
        assert_eq!(groups.index, vec![0, 0, 1, 2]);
        let strip = fig.row_groups.as_ref().unwrap();
        assert_eq!(strip.annotations.len(), 3);
        assert_eq!(strip.pixels.get(0, 0), strip.pixels.get(1, 0));
        assert_ne!(strip.pixels.get(1, 0), strip.pixels.get(2, 0));
    }

    #[test]
    fn grouping_follows_the_filter() {
        let opts = BlackholesOptions {
            filter_spec_samples: Some(FilterSpec::any_missing()),
            group_rows_by: Some(["x", "y", "x", "z"].into_iter().map(CellValue::from).collect()),
            group_wise_colorbar: true,
            ..Default::default()
        };
        let fig = blackholes(&diagonal(), &opts).unwrap();
        let groups = fig.rows.groups.as_ref().unwrap();
        // row 3 (group z) was filtered out before grouping
        assert_eq!(groups.names, vec![CellValue::from("x"), CellValue::from("y")]);
        let colorbar = fig.row_group_colorbar.as_ref().unwrap();
        assert_eq!(colorbar.pixels.rows(), 2);
        assert_eq!(colorbar.ticks.as_ref().unwrap().ticks.len(), 2);
        assert!(fig.col_group_colorbar.is_none());
    }

    #[test]
    fn membership_must_cover_the_input_table() {
        let opts = BlackholesOptions {
            filter_spec_samples: Some(FilterSpec::any_missing()),
            group_rows_by: Some(["x", "y", "x"].into_iter().map(CellValue::from).collect()),
            ..Default::default()
        };
        assert!(blackholes(&diagonal(), &opts).is_err());
    }

    #[test]
    fn filtering_everything_is_an_error() {
        let opts = BlackholesOptions {
            filter_spec_variables: Some(FilterSpec::interval(0.9, 1.0).unwrap()),
            ..Default::default()
        };
        assert!(blackholes(&diagonal(), &opts).is_err());
    }

    #[test]
    fn bad_options_fail_before_work() {
        let table = diagonal();
        let bad = [
            BlackholesOptions {
                missing_color: "no-such-colour".into(),
                ..Default::default()
            },
            BlackholesOptions {
                freq_thresh_show_labels: 1.0,
                ..Default::default()
            },
            BlackholesOptions {
                out_path: Some("figure.tiff".into()),
                ..Default::default()
            },
            BlackholesOptions {
                label_rows_with: Some(LabelSpec::Reference("missing".into())),
                ..Default::default()
            },
        ];
        for opts in &bad {
            assert!(blackholes(&table, opts).is_err(), "{opts:?}");
        }
    }

    #[test]
    fn threshold_limits_row_ticks() {
        let opts = BlackholesOptions {
            freq_thresh_show_labels: 0.2,
            show_all_labels: true,
            ..Default::default()
        };
        let fig = blackholes(&diagonal(), &opts).unwrap();
        let ticks = &fig.freq_over_col.ticks.as_ref().unwrap().ticks;
        let positions: Vec<usize> = ticks.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn draw_visits_every_panel() {
        let opts = BlackholesOptions {
            group_cols_by: Some(vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Integer(1)]),
            ..Default::default()
        };
        let fig = blackholes(&diagonal(), &opts).unwrap();
        let mut canvas = RecordingCanvas::default();
        fig.draw(&mut canvas).unwrap();

        assert_eq!(canvas.ops[0], Op::Fill(palette::named::WHITE));
        let pixel_ops = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Pixels(..)))
            .count();
        assert_eq!(pixel_ops, 4);
        let texts: Vec<&str> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Text(_, _, t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["1 66.67%", "2 33.33%"]);
    }
}
