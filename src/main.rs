mod app;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use app::MissingDataApp;
use clap::Parser;
use eframe::egui;
use missingdata::data::loader::load_file;
use missingdata::missing::labels::LabelSpec;
use missingdata::{blackholes, BlackholesOptions};
use state::AppState;

/// Draw the missing cells of a table, with row and column missingness.
#[derive(Parser, Debug)]
#[command(name = "missingdata", version, about)]
struct Args {
    /// Table to load (.csv, .json, .parquet).
    input: Option<PathBuf>,

    /// JSON file with figure options.
    #[arg(long, value_name = "FILE.json")]
    options: Option<PathBuf>,

    /// Write the figure here (.pdf, .png or .svg).
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Column whose values label the rows.
    #[arg(long, value_name = "COL")]
    label_rows_with: Option<String>,

    /// Column whose values group the rows.
    #[arg(long, value_name = "COL")]
    group_rows_by: Option<String>,

    /// Render without opening the viewer.
    #[arg(long)]
    no_gui: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut options = match &args.options {
        Some(path) => BlackholesOptions::from_json_file(path)
            .with_context(|| format!("reading options from {}", path.display()))?,
        None => BlackholesOptions::default(),
    };
    if let Some(out) = &args.out {
        options.out_path = Some(out.clone());
    }
    if let Some(col) = &args.label_rows_with {
        options.label_rows_with = Some(LabelSpec::Reference(col.clone()));
    }
    options.show_fig = !args.no_gui;

    let table = match &args.input {
        Some(path) => Some(load_file(path)?),
        None => None,
    };
    if let Some(col) = &args.group_rows_by {
        let table = table.as_ref().context("--group-rows-by needs an input table")?;
        let members = table
            .column_by_name(col)
            .with_context(|| format!("no column named {col:?}"))?;
        options.group_rows_by = Some(members);
    }

    if let (Some(table), Some(out)) = (&table, &options.out_path) {
        let figure = blackholes(table, &options)
            .with_context(|| format!("drawing {}", out.display()))?;
        log::info!(
            "{} of {} rows and {} of {} columns shown",
            figure.rows.labels.len(),
            table.num_rows(),
            figure.cols.labels.len(),
            table.num_cols()
        );
    }

    if args.no_gui {
        if table.is_none() {
            anyhow::bail!("--no-gui needs an input table");
        }
        if options.out_path.is_none() {
            log::warn!("--no-gui without --out draws nothing");
        }
        return Ok(());
    }

    let mut state = AppState::with_options(options);
    if let Some(table) = table {
        state.set_table(table, args.input.clone());
    }
    run_viewer(state)
}

fn run_viewer(state: AppState) -> anyhow::Result<()> {
    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Missing Data – Blackholes",
        native,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(MissingDataApp::new(state)))
        }),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
