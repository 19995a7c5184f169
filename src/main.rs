mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyBarberApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional table to open on start-up.
    let initial = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Barber – Data Cuts",
        options,
        Box::new(move |cc| Ok(Box::new(RustyBarberApp::new(cc, initial)))),
    )
}
