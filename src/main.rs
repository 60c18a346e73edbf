mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::RustyWrappedApp;
use config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = Config::from_env().unwrap_or_else(|e| {
        log::warn!("{e}; falling back to the local data file");
        Config::local_only()
    });
    let source = config.source();
    log::info!("Startup source: {}", source.describe());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Wrapped – Listening History",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyWrappedApp::new(source)))),
    )
}
