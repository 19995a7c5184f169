use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyBarberApp {
    pub state: AppState,
}

impl RustyBarberApp {
    /// Build the app, loading `initial` straight away when given.
    pub fn new(cc: &eframe::CreationContext<'_>, initial: Option<PathBuf>) -> Self {
        let mut state = AppState::new(cc.egui_ctx.clone());
        if let Some(path) = initial {
            state.open_table(&path);
        }
        Self { state }
    }
}

impl eframe::App for RustyBarberApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: cut controls ----
        egui::SidePanel::left("cut_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plots ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::cut_plots(ui, &self.state);
        });
    }
}
