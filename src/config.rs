use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::model::CellValue;
use crate::error::{invalid, Error, Result};
use crate::missing::filter::FilterSpec;
use crate::missing::Axis;
use crate::missing::labels::LabelSpec;

/// Output resolution of exported figures.
pub const EXPORT_DPI: u32 = 300;

/// Largest accepted figure side, in inches.
pub const MAX_FIGSIZE_INCHES: f64 = 100.0;

// ---------------------------------------------------------------------------
// Display thresholds
// ---------------------------------------------------------------------------

/// Axis lengths above which per-item tick labels are suppressed and the
/// default filters start dropping complete rows/columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_rows_displayable: usize,
    pub max_cols_displayable: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_rows_displayable: 60,
            max_cols_displayable: 80,
        }
    }
}

impl DisplayConfig {
    pub fn threshold(&self, axis: Axis) -> usize {
        match axis {
            Axis::Rows => self.max_rows_displayable,
            Axis::Cols => self.max_cols_displayable,
        }
    }
}

// ---------------------------------------------------------------------------
// Panel geometry constants
// ---------------------------------------------------------------------------

/// Fractions of the figure used by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of the main frame.
    pub frame_width: f64,
    /// Height of the main frame.
    pub frame_height: f64,
    /// Left edge of the row-frequency strip.
    pub left_margin: f64,
    /// Bottom edge of the main frame.
    pub bottom_margin: f64,
    /// Thickness of every one-cell strip.
    pub strip_size: f64,
    /// Gap between chained panels.
    pub gap: f64,
    /// Gap between the frame and the column group-wise colorbar.
    pub colorbar_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            frame_width: 0.7,
            frame_height: 0.6,
            left_margin: 0.1,
            bottom_margin: 0.1,
            strip_size: 0.03,
            gap: 0.01,
            colorbar_gap: 0.02,
        }
    }
}

// ---------------------------------------------------------------------------
// Options surface of `blackholes`
// ---------------------------------------------------------------------------

/// Every knob of the blackholes figure. All fields have defaults, so an
/// options file only needs the keys it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlackholesOptions {
    /// Row filter; `None` picks the size-dependent default.
    pub filter_spec_samples: Option<FilterSpec>,
    /// Column filter; `None` picks the size-dependent default.
    pub filter_spec_variables: Option<FilterSpec>,
    pub label_rows_with: Option<LabelSpec>,
    /// Column labels; `None` uses the table headers.
    pub label_cols_with: Option<LabelSpec>,
    /// One group label per row of the input table.
    pub group_rows_by: Option<Vec<CellValue>>,
    /// One group label per column of the input table.
    pub group_cols_by: Option<Vec<CellValue>>,
    pub missing_color: String,
    pub background_color: String,
    pub freq_thresh_show_labels: f64,
    pub show_all_labels: bool,
    pub group_wise_colorbar: bool,
    /// Figure size in inches (width, height).
    pub figsize: (f64, f64),
    pub show_fig: bool,
    pub out_path: Option<PathBuf>,
    pub display: DisplayConfig,
    pub layout: LayoutConfig,
}

impl Default for BlackholesOptions {
    fn default() -> Self {
        Self {
            filter_spec_samples: None,
            filter_spec_variables: None,
            label_rows_with: None,
            label_cols_with: None,
            group_rows_by: None,
            group_cols_by: None,
            missing_color: "black".to_string(),
            background_color: "silver".to_string(),
            freq_thresh_show_labels: 0.0,
            show_all_labels: false,
            group_wise_colorbar: false,
            figsize: (15.0, 9.0),
            show_fig: false,
            out_path: None,
            display: DisplayConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl BlackholesOptions {
    /// Read options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Validation(format!("options: {e}")))
    }

    /// Checks that need nothing but the options themselves.
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.figsize;
        if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
            return invalid!("figsize must be positive, got ({w}, {h})");
        }
        if w > MAX_FIGSIZE_INCHES || h > MAX_FIGSIZE_INCHES {
            return invalid!(
                "figsize sides must be at most {MAX_FIGSIZE_INCHES} inches, got ({w}, {h})"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_file_gives_defaults() {
        let opts = BlackholesOptions::from_json_str("{}").unwrap();
        assert_eq!(opts.missing_color, "black");
        assert_eq!(opts.display.max_rows_displayable, 60);
        assert_eq!(opts.layout, LayoutConfig::default());
        assert!(opts.filter_spec_samples.is_none());
    }

    #[test]
    fn options_file_reads_specs_and_groups() {
        let text = r#"{
            "filter_spec_samples": [0.05, 1.0],
            "label_rows_with": "SUBJLABEL",
            "label_cols_with": ["a", "b"],
            "group_cols_by": ["x", 2, null],
            "figsize": [10, 6],
            "display": { "max_rows_displayable": 20 }
        }"#;
        let opts = BlackholesOptions::from_json_str(text).unwrap();
        let spec = opts.filter_spec_samples.unwrap();
        assert!(spec.keeps(0.05) && !spec.keeps(0.01));
        assert_eq!(opts.label_rows_with, Some(LabelSpec::Reference("SUBJLABEL".into())));
        assert_eq!(
            opts.group_cols_by,
            Some(vec![CellValue::from("x"), CellValue::Integer(2), CellValue::Null])
        );
        assert_eq!(opts.figsize, (10.0, 6.0));
        assert_eq!(opts.display.max_rows_displayable, 20);
        assert_eq!(opts.display.max_cols_displayable, 80);
    }

    #[test]
    fn out_of_range_filter_in_options_file_is_rejected() {
        let err = BlackholesOptions::from_json_str(r#"{"filter_spec_variables": [1.5, 2.0]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn non_positive_figsize_is_invalid() {
        let opts = BlackholesOptions {
            figsize: (0.0, 9.0),
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn huge_figsize_is_invalid() {
        let opts = BlackholesOptions {
            figsize: (1e9, 9.0),
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(Error::Validation(_))));

        let opts = BlackholesOptions {
            figsize: (MAX_FIGSIZE_INCHES, MAX_FIGSIZE_INCHES),
            ..Default::default()
        };
        assert!(opts.validate().is_ok());
    }
}
