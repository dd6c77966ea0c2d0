mod app;
mod color;
mod config;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use app::EsimDashboardApp;
use clap::Parser;
use config::DashboardConfig;
use eframe::egui;
use esim_dashboard::{load_file, Dataset};
use state::AppState;

/// The one-time dataset load; the result is shared read-only for the
/// lifetime of the process.
fn load_dataset(config: &DashboardConfig) -> anyhow::Result<Dataset> {
    load_file(&config.dataset, config.derivation_policy())
        .with_context(|| format!("loading {}", config.dataset.display()))
}

fn main() -> eframe::Result {
    env_logger::init();
    let config = DashboardConfig::parse();

    let mut state = AppState::new(config.page, config.derivation_policy());
    match load_dataset(&config) {
        Ok(dataset) => state.set_dataset(Arc::new(dataset)),
        Err(e) => {
            log::error!("{e:#}");
            state.set_load_error(format!("Error: {e:#}"));
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "eSIM Market Analysis",
        options,
        Box::new(|_cc| Ok(Box::new(EsimDashboardApp::new(state)))),
    )
}
