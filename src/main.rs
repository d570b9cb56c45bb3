//! Fisiodash - Physiotherapy Outpatient Indicators Dashboard
//!
//! Loads a REDCap CSV export, decodes coded fields into display labels,
//! filters by visit type, department, and start date, and shows the filtered
//! rows with frequency charts. The filtered view exports to Excel.

mod charts;
mod config;
mod data;
mod gui;
mod stats;
mod xlsx;

use eframe::egui;
use gui::FisioDashApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Indicadores de Fisioterapia"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Indicadores de Fisioterapia",
        options,
        Box::new(|cc| Ok(Box::new(FisioDashApp::new(cc)))),
    )
}
