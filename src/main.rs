use std::path::PathBuf;

use anyhow::Context;
use aqi_map::app::AqiMapApp;
use aqi_map::config::ViewerConfig;
use aqi_map::geo::LatLon;
use clap::Parser;
use eframe::egui;

/// Map viewer for station air-quality forecasts.
#[derive(Parser)]
#[command(name = "aqi-map")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Forecast document (.json or published .js)
    data: Option<PathBuf>,

    /// Viewer configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Position reported by "locate me", as "LAT,LON"
    #[arg(long, value_parser = |s: &str| LatLon::parse(s))]
    home: Option<LatLon>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(data) = cli.data {
        config.data_path = Some(data);
    }
    if let Some(home) = cli.home {
        config.home = Some(home);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AQI Map – Station Forecasts",
        options,
        Box::new(|_cc| Ok(Box::new(AqiMapApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running viewer")
}
