mod app;
mod cli;
mod color;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::BikeDashApp;
use clap::Parser;
use cli::Cli;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // Without data there is nothing to render.
    let dataset = data::loader::load_file(&cli.path)
        .with_context(|| format!("loading {}", cli.path.display()))
        .inspect_err(|e| log::error!("{e:#}"))?;
    log::info!(
        "Loaded {} records for years {:?} from {}",
        dataset.len(),
        dataset.years(),
        cli.path.display()
    );

    let state = AppState::new(dataset, cli.path, cli.year);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bike Sharing Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(BikeDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}
