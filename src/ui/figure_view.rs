use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Figure preview (central panel)
// ---------------------------------------------------------------------------

/// GPU copy of the latest preview raster.
#[derive(Default)]
pub struct FigureTexture {
    handle: Option<TextureHandle>,
    version: u64,
}

impl FigureTexture {
    /// Upload the preview again if the state holds a newer one.
    fn sync(&mut self, ctx: &egui::Context, state: &AppState) {
        if self.handle.is_some() && self.version == state.preview_version {
            return;
        }
        let Some(preview) = &state.preview else {
            return;
        };
        let size = [preview.width() as usize, preview.height() as usize];
        let image = ColorImage::from_rgb(size, preview.as_raw());
        self.handle = Some(ctx.load_texture("blackholes", image, TextureOptions::LINEAR));
        self.version = state.preview_version;
    }
}

/// Render the figure in the central panel.
pub fn figure_view(ui: &mut Ui, state: &AppState, texture: &mut FigureTexture) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view its missing data  (File → Open…)");
        });
        return;
    }

    texture.sync(ui.ctx(), state);
    match &texture.handle {
        Some(handle) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.add(egui::Image::new(handle).shrink_to_fit());
            });
        }
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label("Nothing to draw.");
            });
        }
    }
}
