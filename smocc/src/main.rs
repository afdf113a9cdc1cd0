mod app;
mod config;
mod engine;
mod logging;
mod simulation;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use app::SmoccApp;
use clap::Parser;
use config::{GameConfig, window_conf};
use log::{debug, error, info};

/// Command-line arguments for SMOCC.
#[derive(Parser)]
#[command(name = "SMOCC", version, about = "Top-down arena shooter with friendly bots")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print debug logs.
    #[arg(short, long)]
    verbose: bool,

    /// Seed for a reproducible game.
    #[arg(long)]
    seed: Option<u64>,
}

/// Loads the game configuration from a TOML file or uses defaults.
fn load_config(path: Option<PathBuf>) -> Result<GameConfig> {
    match path {
        Some(path) => {
            let config = GameConfig::load_from_path(&path)?;
            info!("Loaded config from '{}'", path.display());
            debug!("Config: {:?}", config);
            Ok(config)
        }
        None => {
            info!("No config file provided, using defaults.");
            Ok(GameConfig::default())
        }
    }
}

/// Main entry point for the SMOCC application.
#[macroquad::main(window_conf)]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match load_config(cli.config) {
        Ok(config) => {
            let mut app = SmoccApp::new(&config, cli.seed);
            app.run().await;
        }
        Err(e) => {
            error!("Error loading config: {:#}", e);
        }
    }
}
