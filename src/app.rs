use eframe::egui;

use crate::state::AppState;
use crate::ui::figure_view::{self, FigureTexture};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MissingDataApp {
    pub state: AppState,
    texture: FigureTexture,
}

impl MissingDataApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            texture: FigureTexture::default(),
        }
    }
}

impl eframe::App for MissingDataApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: options ----
        egui::SidePanel::left("options_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: figure ----
        egui::CentralPanel::default().show(ctx, |ui| {
            figure_view::figure_view(ui, &self.state, &mut self.texture);
        });
    }
}
