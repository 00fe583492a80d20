//! Anagram Board (headless)
//!
//! Runs a scripted session against the anagram core and prints the final
//! snapshot as JSON. Useful for checking layouts and animation timing
//! without a front end.
//!
//! # Usage
//!
//! ```bash
//! # Scatter a phrase, shuffle, undo and redo
//! anagram-board dirty room
//!
//! # Reproducible layout, with per-tile logging
//! RUST_LOG=anagram_core=debug anagram-board --seed 42 dormitory
//! ```
//!
//! # Environment Variables
//!
//! - `ANAGRAM_PHRASE`: Phrase used when none is given on the command line
//! - `ANAGRAM_SEED`, `ANAGRAM_ANIMATION_MS`, ...: see `anagram_core::config`
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info};

use anagram_core::{
    load_config, BoundingBox, ConfigOverrides, ContainerFrame, Coords, EventSink, HistoryEvent,
    TileEvent, TokioDriver, Workbench,
};

/// Board container used when there is no real page
const BOARD_RECT: BoundingBox = BoundingBox::new(0, 0, 960, 600);

/// Anagram Board - headless tile session for the crossie anagram helper
#[derive(Parser, Debug)]
#[command(name = "anagram-board")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Phrase to scatter; words are joined with spaces
    #[arg(env = "ANAGRAM_PHRASE", default_value = "dormitory", value_name = "WORD")]
    phrase: Vec<String>,

    /// Fixed seed for random layouts
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Length of each animation in milliseconds
    #[arg(long, value_name = "MS")]
    duration_ms: Option<u64>,

    /// Cancel in-flight animations before re-targeting a tile
    #[arg(long, value_name = "BOOL")]
    cancel_superseded: Option<bool>,
}

impl Args {
    /// Phrase as one string
    fn phrase(&self) -> String {
        self.phrase.join(" ")
    }

    /// Command-line values as configuration overrides
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(seed) = self.seed {
            overrides = overrides.with_seed(seed);
        }
        if let Some(ms) = self.duration_ms {
            overrides = overrides.with_duration_ms(ms);
        }
        if let Some(cancel) = self.cancel_superseded {
            overrides = overrides.with_cancel_superseded(cancel);
        }
        overrides
    }
}

async fn log_tile_events(mut rx: mpsc::UnboundedReceiver<TileEvent>) {
    while let Some(event) = rx.recv().await {
        debug!(tile = %event.tile_id(), ?event, "Tile event");
    }
}

async fn log_history_events(mut rx: mpsc::UnboundedReceiver<HistoryEvent>) {
    while let Some(event) = rx.recv().await {
        info!(
            cursor = event.cursor,
            len = event.len,
            can_undo = event.can_undo(),
            can_redo = event.can_redo(),
            "History changed"
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("anagram_board=info".parse()?)
                .add_directive("anagram_core=info".parse()?),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = load_config()?;
    args.overrides().apply(&mut config);
    config.validate()?;
    info!(source = %config.source(), path = ?config.config_file_path, "Configuration loaded");

    let phrase = args.phrase();

    let (tile_events, tile_rx) = EventSink::channel();
    let (history_events, history_rx) = EventSink::channel();
    let tile_logger = tokio::spawn(log_tile_events(tile_rx));
    let history_logger = tokio::spawn(log_history_events(history_rx));

    let mut board = Workbench::builder(Coords::new(ContainerFrame::new(BOARD_RECT)))
        .config(&config)
        .driver(Arc::new(TokioDriver::new()))
        .tile_events(tile_events)
        .history_events(history_events)
        .build();

    board.change_phrase(&phrase);
    board.settle().await;

    board.shuffle();
    board.settle().await;

    board.undo();
    board.redo();
    board.settle().await;

    info!(tiles = board.tiles().len(), phrase = %board.phrase(), "Session finished");
    println!("{}", board.snapshot().to_json()?);

    drop(board);
    tile_logger.await?;
    history_logger.await?;
    Ok(())
}
