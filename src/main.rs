//! PCA Commentary Generator - desktop front end
//!
//! Pick a PowerPoint template and a PCA workbook, choose slides, generate.
//! An optional first argument names a JSON generator config.

use eframe::egui;
use pca_commentary::gui::PcaApp;
use pca_commentary::GeneratorConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => GeneratorConfig::from_json_file(Path::new(&path)).unwrap_or_else(|e| {
            tracing::error!("Ignoring config {}: {}", path, e);
            GeneratorConfig::default()
        }),
        None => GeneratorConfig::default(),
    };

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("PCA Commentary Generator"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "PCA Commentary Generator",
        options,
        Box::new(|cc| Ok(Box::new(PcaApp::new(cc, config)))),
    )
}
