use std::path::{Path, PathBuf};

use image::RgbImage;
use missingdata::data::model::Table;
use missingdata::missing::filter::{self, FilterSpec};
use missingdata::missing::labels::LabelSpec;
use missingdata::{blackholes, BlackholesOptions, Figure};

/// Resolution used for the on-screen preview.
const VIEW_DPI: u32 = 100;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until user loads a file).
    pub table: Option<Table>,

    /// Where the table came from.
    pub source: Option<PathBuf>,

    /// Figure options; filters and grouping are rebuilt from the fields below.
    pub options: BlackholesOptions,

    /// Column whose values label the rows.
    pub label_column: Option<String>,

    /// Column whose values group the rows.
    pub group_column: Option<String>,

    /// Use the size-dependent default filters instead of the intervals below.
    pub default_filters: bool,
    pub row_interval: (f64, f64),
    pub col_interval: (f64, f64),

    /// Per-column missing fraction of the loaded table (cached).
    pub column_frequencies: Vec<(String, f64)>,
    pub missing_cells: usize,

    /// Most recent figure and its preview raster.
    pub figure: Option<Figure>,
    pub preview: Option<RgbImage>,
    /// Bumped whenever `preview` changes.
    pub preview_version: u64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            source: None,
            options: BlackholesOptions::default(),
            label_column: None,
            group_column: None,
            default_filters: true,
            row_interval: (0.0, 1.0),
            col_interval: (0.0, 1.0),
            column_frequencies: Vec::new(),
            missing_cells: 0,
            figure: None,
            preview: None,
            preview_version: 0,
            status_message: None,
        }
    }
}

impl AppState {
    /// Start from options read on the command line.
    pub fn with_options(options: BlackholesOptions) -> Self {
        let label_column = match &options.label_rows_with {
            Some(LabelSpec::Reference(col)) => Some(col.clone()),
            _ => None,
        };
        let bounds = |spec: &Option<FilterSpec>| match spec {
            Some(FilterSpec::Interval { low, high }) => (*low, *high),
            _ => (0.0, 1.0),
        };
        Self {
            default_filters: options.filter_spec_samples.is_none()
                && options.filter_spec_variables.is_none(),
            row_interval: bounds(&options.filter_spec_samples),
            col_interval: bounds(&options.filter_spec_variables),
            label_column,
            options: BlackholesOptions {
                out_path: None,
                ..options
            },
            ..Default::default()
        }
    }

    /// Ingest a newly loaded table and draw it.
    pub fn set_table(&mut self, table: Table, source: Option<PathBuf>) {
        let mask = table.missing_mask();
        self.column_frequencies = table
            .columns
            .iter()
            .cloned()
            .zip(filter::col_frequencies(&mask))
            .collect();
        self.missing_cells = mask.total_missing();

        // Selections referring to another table's columns are dropped.
        if let Some(col) = &self.label_column {
            if table.column_position(col).is_none() {
                self.label_column = None;
            }
        }
        self.group_column = None;

        self.table = Some(table);
        self.source = source;
        self.status_message = None;
        self.refresh();
    }

    /// Options for the next `blackholes` call.
    fn effective_options(&self, table: &Table) -> BlackholesOptions {
        let interval = |(low, high): (f64, f64)| FilterSpec::interval(low, high).ok();
        let (rows, cols) = if self.default_filters {
            (None, None)
        } else {
            (interval(self.row_interval), interval(self.col_interval))
        };
        BlackholesOptions {
            filter_spec_samples: rows,
            filter_spec_variables: cols,
            label_rows_with: self.label_column.clone().map(LabelSpec::Reference),
            group_rows_by: self
                .group_column
                .as_deref()
                .and_then(|col| table.column_by_name(col)),
            ..self.options.clone()
        }
    }

    /// Recompute the figure and its preview after any option change.
    pub fn refresh(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let options = self.effective_options(table);
        let result = blackholes(table, &options).and_then(|fig| {
            let preview = fig.to_rgb(VIEW_DPI)?;
            Ok((fig, preview))
        });
        match result {
            Ok((figure, preview)) => {
                log::debug!(
                    "figure refreshed: {} x {} shown",
                    figure.rows.labels.len(),
                    figure.cols.labels.len()
                );
                self.figure = Some(figure);
                self.preview = Some(preview);
                self.preview_version += 1;
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("cannot draw figure: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Write the current figure to disk at export resolution.
    pub fn export(&mut self, path: &Path) {
        let Some(figure) = &self.figure else {
            return;
        };
        match figure.save(path, missingdata::config::EXPORT_DPI) {
            Ok(()) => self.status_message = Some(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("Failed to export figure: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Set the row-label column and redraw.
    pub fn set_label_column(&mut self, col: Option<String>) {
        self.label_column = col;
        self.refresh();
    }

    /// Set the row-group column and redraw.
    pub fn set_group_column(&mut self, col: Option<String>) {
        self.group_column = col;
        self.refresh();
    }
}
