use eframe::egui;

use crate::config::DataSource;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyWrappedApp {
    pub state: AppState,
    /// Source of the current history, reused by File → Reload.
    pub source: Option<DataSource>,
}

impl RustyWrappedApp {
    /// Build the app and run the startup load from `source`.
    pub fn new(source: DataSource) -> Self {
        let mut state = AppState::default();
        state.load(&source);
        Self {
            state,
            source: Some(source),
        }
    }
}

impl eframe::App for RustyWrappedApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &mut self.source);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts and tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &mut self.state);
        });
    }
}
