//! Panel geometry of the blackholes figure.
//!
//! All extents live in normalized figure coordinates: `(0, 0)` is the
//! bottom-left corner, `(1, 1)` the top-right one.
//!
//! ```text
//!            ┌──────────────────────┐
//!            │    freq_over_row     │  column frequencies
//!            ├──────────────────────┤
//!            │      col_groups      │  (column grouping)
//!            ├──────────────────────┤
//!  ┌──┐ ┌──┐ │                      │ ┌──┐
//!  │fc│ │rg│ │        frame         │ │rb│  row group-wise colorbar
//!  └──┘ └──┘ │                      │ └──┘
//!            ├──────────────────────┤
//!            │  col group colorbar  │
//!            └──────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::config::LayoutConfig;
use crate::error::{invalid, Result};

/// A rectangle in normalized figure coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelExtent {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl PanelExtent {
    pub fn new(left: f64, bottom: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }

    /// Whether the interiors of two extents intersect. Shared edges do not
    /// count as overlap.
    pub fn overlaps(&self, other: &PanelExtent) -> bool {
        const EPS: f64 = 1e-12;
        self.left < other.right() - EPS
            && other.left < self.right() - EPS
            && self.bottom < other.top() - EPS
            && other.bottom < self.top() - EPS
    }

    pub fn within_unit_square(&self) -> bool {
        const EPS: f64 = 1e-12;
        self.left >= -EPS
            && self.bottom >= -EPS
            && self.right() <= 1.0 + EPS
            && self.top() <= 1.0 + EPS
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Names of the panels a figure can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PanelKind {
    Frame,
    /// Row frequencies, left of the frame.
    FreqOverCol,
    /// Column frequencies, above the frame.
    FreqOverRow,
    RowGroups,
    ColGroups,
    RowGroupColorbar,
    ColGroupColorbar,
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PanelKind::Frame => "frame",
            PanelKind::FreqOverCol => "freq_over_col",
            PanelKind::FreqOverRow => "freq_over_row",
            PanelKind::RowGroups => "row_groups",
            PanelKind::ColGroups => "col_groups",
            PanelKind::RowGroupColorbar => "row_group_colorbar",
            PanelKind::ColGroupColorbar => "col_group_colorbar",
        };
        f.write_str(name)
    }
}

/// Which optional panels to lay out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutRequest {
    pub row_groups: bool,
    pub col_groups: bool,
    /// Only takes effect on axes whose grouping is active.
    pub group_wise_colorbar: bool,
}

/// Extents of every panel; optional ones are `None` when not requested.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub frame: PanelExtent,
    pub freq_over_col: PanelExtent,
    pub freq_over_row: PanelExtent,
    pub row_groups: Option<PanelExtent>,
    pub col_groups: Option<PanelExtent>,
    pub row_group_colorbar: Option<PanelExtent>,
    pub col_group_colorbar: Option<PanelExtent>,
}

impl PanelLayout {
    /// Every present panel by name.
    pub fn extents(&self) -> BTreeMap<PanelKind, PanelExtent> {
        [
            (PanelKind::Frame, Some(self.frame)),
            (PanelKind::FreqOverCol, Some(self.freq_over_col)),
            (PanelKind::FreqOverRow, Some(self.freq_over_row)),
            (PanelKind::RowGroups, self.row_groups),
            (PanelKind::ColGroups, self.col_groups),
            (PanelKind::RowGroupColorbar, self.row_group_colorbar),
            (PanelKind::ColGroupColorbar, self.col_group_colorbar),
        ]
        .into_iter()
        .filter_map(|(kind, extent)| extent.map(|e| (kind, e)))
        .collect()
    }

    /// First pair of panels whose interiors intersect, if any.
    pub fn first_overlap(&self) -> Option<(PanelKind, PanelKind)> {
        let extents: Vec<(PanelKind, PanelExtent)> = self.extents().into_iter().collect();
        for (i, (a, ea)) in extents.iter().enumerate() {
            for (b, eb) in &extents[i + 1..] {
                if ea.overlaps(eb) {
                    return Some((*a, *b));
                }
            }
        }
        None
    }
}

/// Place every requested panel.
///
/// Chained panels are positioned at their predecessor's position plus its
/// size plus the gap: left to right for the row strips and the frame, bottom
/// to top for the frame and the column strips. Group-wise colorbars hang off
/// the frame's final extent. Fails when a panel leaves the unit square or two
/// panels overlap.
pub fn compute_layout(config: &LayoutConfig, request: LayoutRequest) -> Result<PanelLayout> {
    let LayoutConfig {
        frame_width,
        frame_height,
        left_margin,
        bottom_margin,
        strip_size,
        gap,
        colorbar_gap,
    } = *config;

    // left to right
    let freq_over_col = PanelExtent::new(left_margin, bottom_margin, strip_size, frame_height);
    let mut right_edge = freq_over_col.right();
    let row_groups = request.row_groups.then(|| {
        let strip = PanelExtent::new(right_edge + gap, bottom_margin, strip_size, frame_height);
        right_edge = strip.right();
        strip
    });
    let frame = PanelExtent::new(right_edge + gap, bottom_margin, frame_width, frame_height);

    // bottom to top
    let mut top_edge = frame.top();
    let col_groups = request.col_groups.then(|| {
        let strip = PanelExtent::new(frame.left, top_edge + gap, frame_width, strip_size);
        top_edge = strip.top();
        strip
    });
    let freq_over_row = PanelExtent::new(frame.left, top_edge + gap, frame_width, strip_size);

    // aggregate-only panels, outside the chain
    let row_group_colorbar = (request.group_wise_colorbar && request.row_groups)
        .then(|| PanelExtent::new(frame.right() + gap, frame.bottom, strip_size, frame_height));
    let col_group_colorbar = (request.group_wise_colorbar && request.col_groups).then(|| {
        PanelExtent::new(
            frame.left,
            frame.bottom - colorbar_gap - strip_size,
            frame_width,
            strip_size,
        )
    });

    let layout = PanelLayout {
        frame,
        freq_over_col,
        freq_over_row,
        row_groups,
        col_groups,
        row_group_colorbar,
        col_group_colorbar,
    };

    if let Some((kind, extent)) = layout
        .extents()
        .into_iter()
        .find(|(_, e)| !e.within_unit_square())
    {
        return invalid!("layout: panel {kind} at {extent:?} leaves the figure");
    }
    if let Some((a, b)) = layout.first_overlap() {
        return invalid!("layout: panels {a} and {b} overlap");
    }
    log::debug!("layout for {request:?}: frame at {:?}", layout.frame);
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn all_requests() -> Vec<LayoutRequest> {
        let mut out = Vec::new();
        for bits in 0..8u8 {
            out.push(LayoutRequest {
                row_groups: bits & 1 != 0,
                col_groups: bits & 2 != 0,
                group_wise_colorbar: bits & 4 != 0,
            });
        }
        out
    }

    #[test]
    fn default_layout_fits_for_every_panel_combination() {
        let config = LayoutConfig::default();
        for request in all_requests() {
            let layout = compute_layout(&config, request).unwrap();
            assert!(layout.extents().values().all(PanelExtent::within_unit_square));
            assert_eq!(layout.first_overlap(), None, "{request:?}");
        }
    }

    #[test]
    fn base_layout_has_three_panels() {
        let layout = compute_layout(&LayoutConfig::default(), LayoutRequest::default()).unwrap();
        assert_eq!(layout.extents().len(), 3);
        assert_approx_eq!(layout.frame.left, 0.1 + 0.03 + 0.01);
        assert_approx_eq!(layout.freq_over_row.bottom, 0.1 + 0.6 + 0.01);
        assert!(layout.row_groups.is_none() && layout.row_group_colorbar.is_none());
    }

    #[test]
    fn row_groups_shift_the_frame_right() {
        let config = LayoutConfig::default();
        let base = compute_layout(&config, LayoutRequest::default()).unwrap();
        let grouped = compute_layout(
            &config,
            LayoutRequest {
                row_groups: true,
                ..Default::default()
            },
        )
        .unwrap();
        let strip = grouped.row_groups.unwrap();
        assert_approx_eq!(strip.left, base.freq_over_col.right() + config.gap);
        assert_approx_eq!(grouped.frame.left, base.frame.left + config.strip_size + config.gap);
        assert_eq!(grouped.freq_over_row.left, grouped.frame.left);
    }

    #[test]
    fn col_groups_push_column_frequencies_up() {
        let config = LayoutConfig::default();
        let layout = compute_layout(
            &config,
            LayoutRequest {
                col_groups: true,
                ..Default::default()
            },
        )
        .unwrap();
        let strip = layout.col_groups.unwrap();
        assert_approx_eq!(strip.bottom, layout.frame.top() + config.gap);
        assert_approx_eq!(layout.freq_over_row.bottom, strip.top() + config.gap);
    }

    #[test]
    fn colorbars_sit_opposite_the_strips() {
        let layout = compute_layout(
            &LayoutConfig::default(),
            LayoutRequest {
                row_groups: true,
                col_groups: true,
                group_wise_colorbar: true,
            },
        )
        .unwrap();
        let rows = layout.row_group_colorbar.unwrap();
        let cols = layout.col_group_colorbar.unwrap();
        assert!(rows.left >= layout.frame.right());
        assert!(cols.top() <= layout.frame.bottom);
    }

    #[test]
    fn colorbar_needs_grouping() {
        let layout = compute_layout(
            &LayoutConfig::default(),
            LayoutRequest {
                group_wise_colorbar: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(layout.row_group_colorbar.is_none());
        assert!(layout.col_group_colorbar.is_none());
    }

    #[test]
    fn oversized_configuration_is_rejected() {
        let config = LayoutConfig {
            frame_width: 0.9,
            ..Default::default()
        };
        assert!(compute_layout(&config, LayoutRequest::default()).is_err());

        let config = LayoutConfig {
            bottom_margin: 0.03,
            ..Default::default()
        };
        let request = LayoutRequest {
            col_groups: true,
            group_wise_colorbar: true,
            ..Default::default()
        };
        assert!(compute_layout(&config, request).is_err());
    }
}
