mod app;
mod chart;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::AntennaPlotsApp;
use eframe::egui;
use state::AppState;

/// Workbook opened at start-up when no path is given on the command line.
const DEFAULT_WORKBOOK: &str = "antenna.xlsx";

fn main() -> eframe::Result {
    env_logger::init();

    let workbook = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK));

    let mut state = AppState::default();
    if workbook.is_file() {
        state.load_workbook(&workbook);
    } else {
        log::warn!("Input file {} does not exist", workbook.display());
        state.status_message = Some(format!("{} does not exist", workbook.display()));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Antenna Plots",
        options,
        Box::new(|_cc| Ok(Box::new(AntennaPlotsApp::new(state)))),
    )
}
