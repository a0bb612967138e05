//! Headless Carcassonne autoplay.
//!
//! Plays one shuffled base-game deck onto a board and prints a JSON summary.
//!
//! Environment:
//! - `CARCASSONNE_SEED`: deck shuffle seed (random when unset)
//! - `CARCASSONNE_CONFIG`: path to a JSON board config
//! - `RUST_LOG`: log filter (default `info`)

use anyhow::Context;
use carcassonne_core::BoardConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod game;

use game::Simulation;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let seed: u64 = match std::env::var("CARCASSONNE_SEED") {
        Ok(value) => value
            .parse()
            .with_context(|| format!("CARCASSONNE_SEED is not a number: {value}"))?,
        Err(_) => rand::random(),
    };

    let config = match std::env::var("CARCASSONNE_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Reading board config {path}"))?;
            BoardConfig::from_json(&json).with_context(|| format!("Parsing board config {path}"))?
        }
        Err(_) => BoardConfig::default(),
    };

    info!(seed, grid_size = config.grid_size, "Starting Carcassonne autoplay...");

    let summary = Simulation::new(seed, config)?.run()?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
