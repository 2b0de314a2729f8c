mod app;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use pairmatch_core::{
    config::{self, AppConfig},
    MatchGame, Timers, TurnEngine,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config)?;
    info!(?config, "Starting pairmatch");

    let catalog = config.catalog()?;
    let engine = TurnEngine::new(catalog)?;

    let (timer_tx, timer_rx) = mpsc::channel(16);
    let timers = Timers::new(timer_tx, config.reveal_delay(), config.tick_interval());
    let game = MatchGame::new(engine, timers);

    let mut app = app::PairMatchApp::new(game, config.columns);
    app.attach_timers(timer_rx);
    app.run().await
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let log_dir = &config.log_dir;
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("pairmatch.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::from_default_env();

    // Stdout belongs to the board, so everything goes to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
