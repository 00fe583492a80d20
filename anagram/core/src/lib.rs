//! Anagram Core - Tile Reconciliation and History for the crossie Anagram Board
//!
//! This crate holds the logic behind the anagram helper: a set of letter
//! tiles on a board that can be scattered, shuffled and dragged, with every
//! programmatic change undoable. It renders nothing. A presentation adapter
//! observes tile positions and listens to [`TileEvent`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         Workbench                              │
//! │  change_phrase / shuffle / restore / undo / redo / drag        │
//! │         │                                   │                  │
//! │         ▼                                   ▼                  │
//! │  ┌─────────────┐   replay (state, not  ┌────────────┐          │
//! │  │  TxnStack   │ ────── inverse) ────> │   Board    │          │
//! │  │ Txn history │                       │ phrase +   │          │
//! │  └─────────────┘                       │ TileSet    │          │
//! │                                        └─────┬──────┘          │
//! │                                              │ sync_to_layout  │
//! │                                              ▼                 │
//! │                        exact ─> position ─> value ─> spawn/drop│
//! │                                              │                 │
//! │                                   ┌──────────┴──────────┐      │
//! │                                   │ Tile (id, value,    │      │
//! │                                   │ TileVisual)         │      │
//! │                                   └──────────┬──────────┘      │
//! └──────────────────────────────────────────────┼─────────────────┘
//!                                                │ AnimationPlan
//!                                                ▼
//!                          AnimationDriver (tokio interval per animation)
//! ```
//!
//! # Key Types
//!
//! - [`Workbench`]: board plus history, the entry point for a page
//! - [`Layout`] / [`TileState`]: an immutable tile arrangement
//! - [`TileSet`]: live tiles and the reconciler
//! - [`TxnStack`] / [`Txn`]: replayable undo/redo history
//! - [`AnimationDriver`]: how animation plans are played
//! - [`Coords`]: container-relative vs absolute coordinates
//!
//! # Quick Start
//!
//! ```ignore
//! use anagram_core::{BoundingBox, ContainerFrame, Coords, Workbench};
//!
//! #[tokio::main]
//! async fn main() {
//!     let frame = ContainerFrame::new(BoundingBox::new(0, 0, 960, 600));
//!     let mut board = Workbench::builder(Coords::new(frame)).seed(7).build();
//!
//!     board.change_phrase("dormitory");
//!     board.shuffle();
//!     board.undo();
//!     board.settle().await;
//!
//!     println!("{}", board.snapshot().to_json().unwrap());
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`geometry`]: points, bounding boxes and coordinate conversion
//! - [`layout`]: layouts, snapshots and the random grid generator
//! - [`animation`]: appear/move/retype/disappear plans and drivers
//! - [`tile`]: tile identity and per-tile mutations
//! - [`reconcile`]: three-pass matching of tiles to a layout
//! - [`txn`]: transactions and the undo/redo stack
//! - [`events`]: tile and history notifications
//! - [`board`]: the board context and workbench
//! - [`config`]: TOML and environment configuration

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod board;
pub mod config;
pub mod events;
pub mod geometry;
pub mod layout;
pub mod reconcile;
pub mod tile;
pub mod txn;

pub use animation::{
    AnimationConfig, AnimationDriver, AnimationHandle, AnimationPlan, AnimationStatus, Effect,
    InstantDriver, TileVisual, TokioDriver,
};
pub use board::{Board, Workbench, WorkbenchBuilder};
pub use config::{load_config, BoardConfig, ConfigError, ConfigOverrides, ConfigSource};
pub use events::{EventSink, HistoryEvent, TileEvent};
pub use geometry::{BoundingBox, Container, ContainerFrame, Coords, Point};
pub use layout::generator::GridConfig;
pub use layout::{random_layout, Layout, Snapshot, SnapshotError, TileState};
pub use reconcile::{plan_sync, SyncReport, TileSet};
pub use tile::{Tile, TileContext, TileId};
pub use txn::{Txn, TxnStack, TxnTarget};
