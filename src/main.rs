mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::path::PathBuf;

use app::DashboardApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = DashboardConfig::discover().unwrap_or_else(|e| {
        log::warn!("{e}; using default settings");
        DashboardConfig::default()
    });
    if let Some(arg) = std::env::args_os().nth(1) {
        config.data_path = Some(PathBuf::from(arg));
    }

    let [width, height] = config.window_size;
    let mut state = AppState::new(config);
    if let Some(path) = state.config.data_path.clone() {
        state.open(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SuperStore Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
}
