use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use missingdata::color::GroupColors;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – figure options
// ---------------------------------------------------------------------------

/// Render the left options panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Options");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No table loaded.");
        return;
    };
    let columns = table.columns.clone();
    let mut changed = false;

    // ---- Row labels / row groups ----
    ui.strong("Label rows with");
    if let Some(choice) = column_combo(ui, "label_rows", &state.label_column, &columns) {
        state.set_label_column(choice);
    }
    ui.strong("Group rows by");
    if let Some(choice) = column_combo(ui, "group_rows", &state.group_column, &columns) {
        state.set_group_column(choice);
    }
    group_legend(ui, state);
    ui.separator();

    // ---- Filters ----
    changed |= ui
        .checkbox(&mut state.default_filters, "Size-dependent filters")
        .changed();
    ui.add_enabled_ui(!state.default_filters, |ui: &mut Ui| {
        changed |= interval_sliders(ui, "Rows", &mut state.row_interval);
        changed |= interval_sliders(ui, "Columns", &mut state.col_interval);
    });
    ui.separator();

    // ---- Labels ----
    ui.strong("Tick labels");
    changed |= ui
        .add(
            egui::Slider::new(&mut state.options.freq_thresh_show_labels, 0.0..=0.99)
                .text("min. missing"),
        )
        .changed();
    changed |= ui
        .checkbox(&mut state.options.show_all_labels, "Show all labels")
        .changed();
    changed |= ui
        .checkbox(&mut state.options.group_wise_colorbar, "Group-wise colorbar")
        .changed();
    ui.separator();

    // ---- Per-column summary ----
    ui.strong("Missing per column");
    column_summary(ui, state);

    if changed {
        state.refresh();
    }
}

/// Column picker with a "(none)" entry. Returns the new choice when it changed.
fn column_combo(
    ui: &mut Ui,
    id: &str,
    current: &Option<String>,
    columns: &[String],
) -> Option<Option<String>> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.as_deref().unwrap_or("(none)"))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), "(none)").clicked() {
                picked = Some(None);
            }
            for col in columns {
                if ui
                    .selectable_label(current.as_deref() == Some(col.as_str()), col)
                    .clicked()
                {
                    picked = Some(Some(col.clone()));
                }
            }
        });
    picked.filter(|choice| choice != current)
}

/// Colour swatch and share of missingness for each row group.
fn group_legend(ui: &mut Ui, state: &AppState) {
    let Some(groups) = state.figure.as_ref().and_then(|f| f.rows.groups.as_ref()) else {
        return;
    };
    let colors = GroupColors::new(&groups.names);
    for ((name, rgb), note) in colors.legend_entries().iter().zip(&groups.annotations) {
        let (r, g, b) = rgb.into_components();
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new("■").color(Color32::from_rgb(r, g, b)));
            ui.label(format!("{name}  {:.1}%", note.percentage));
        });
    }
}

/// Low/high sliders over a missing-ratio interval.
fn interval_sliders(ui: &mut Ui, name: &str, interval: &mut (f64, f64)) -> bool {
    ui.label(name);
    let (low, high) = interval;
    let mut changed = ui
        .add(egui::Slider::new(&mut *low, 0.0..=1.0).text("low"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut *high, 0.0..=1.0).text("high"))
        .changed();
    if *low > *high {
        *high = *low;
    }
    changed
}

fn column_summary(ui: &mut Ui, state: &AppState) {
    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(320.0)
        .column(Column::remainder())
        .column(Column::auto())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("Column");
            });
            header.col(|ui| {
                ui.strong("Missing");
            });
        })
        .body(|body| {
            body.rows(16.0, state.column_frequencies.len(), |mut row| {
                let (name, freq) = &state.column_frequencies[row.index()];
                row.col(|ui| {
                    ui.label(name);
                });
                row.col(|ui| {
                    ui.label(format!("{:.1}%", freq * 100.0));
                });
            });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.figure.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(fig)) = (&state.table, &state.figure) {
            ui.label(format!(
                "{} × {} loaded ({} missing), {} × {} shown",
                table.num_rows(),
                table.num_cols(),
                state.missing_cells,
                fig.rows.labels.len(),
                fig.cols.labels.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open table")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match missingdata::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    table.num_rows(),
                    table.columns
                );
                state.set_table(table, Some(path));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let stem = state
        .source
        .as_deref()
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or("table");
    let file = rfd::FileDialog::new()
        .set_title("Export figure")
        .set_file_name(format!("{stem}_missing.pdf"))
        .add_filter("PDF", &["pdf"])
        .add_filter("PNG", &["png"])
        .add_filter("SVG", &["svg"])
        .save_file();

    if let Some(path) = file {
        state.export(&path);
    }
}
