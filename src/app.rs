use std::time::Instant;

use eframe::egui;

use crate::config::ViewerConfig;
use crate::data::loader;
use crate::state::AppState;
use crate::ui::{map, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AqiMapApp {
    pub state: AppState,
}

impl AqiMapApp {
    /// Build the app and load the configured dataset, if any.
    pub fn new(config: ViewerConfig) -> Self {
        let data_path = config.data_path.clone();
        let mut state = AppState::new(config);
        match data_path {
            Some(path) => match loader::load_file(&path) {
                Ok(dataset) => state.set_dataset(dataset),
                Err(e) => state.load_failed(&e),
            },
            None => log::info!("No dataset configured; use File → Open"),
        }
        Self { state }
    }
}

impl Default for AqiMapApp {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl eframe::App for AqiMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.state.expire_link(now);
        if let Some(remaining) = self.state.link_remaining(now) {
            ctx.request_repaint_after(remaining);
        }

        // ---- Top panel: menu, search, locate ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Right side panel: station details, health advice, legend ----
        egui::SidePanel::right("station_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            map::station_map(ui, &mut self.state);
        });

        panels::alert_window(ctx, &mut self.state);
    }
}
