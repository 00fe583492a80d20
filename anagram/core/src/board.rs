//! Board and Workbench - The Anagram Page Context
//!
//! [`Board`] is the state transactions act on: the live tiles plus the phrase
//! in the companion text field. [`Workbench`] owns a board and its history
//! and exposes the operations the anagram page performs: change the phrase,
//! shuffle, undo/redo, drag a tile, snapshot and restore.
//!
//! There are no globals. Everything a transaction touches is reachable from
//! the workbench that applies it.
//!
//! # Snapshots
//!
//! After every history change the workbench publishes a [`Snapshot`] of the
//! phrase and the *target* layout on a `watch` channel, so subscribers see
//! the settled state without waiting for animations. [`Workbench::snapshot`]
//! instead reads the live tiles, which includes drags and mid-flight
//! positions.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;

use crate::animation::{AnimationConfig, AnimationDriver, TokioDriver};
use crate::config::BoardConfig;
use crate::events::{EventSink, HistoryEvent, TileEvent};
use crate::geometry::{Coords, Point};
use crate::layout::generator::GridConfig;
use crate::layout::{random_layout, Layout, Snapshot};
use crate::reconcile::{SyncReport, TileSet};
use crate::tile::{TileContext, TileId};
use crate::txn::{Txn, TxnStack, TxnTarget};

/// Live tiles plus the phrase field
#[derive(Debug)]
pub struct Board {
    tiles: TileSet,
    phrase: String,
    target: Layout,
}

impl Board {
    /// Create an empty board
    #[must_use]
    pub fn new(ctx: TileContext) -> Self {
        let target = Layout::empty(ctx.coords.bounding_box());
        Self {
            tiles: TileSet::new(ctx),
            phrase: String::new(),
            target,
        }
    }

    /// Live tiles
    #[must_use]
    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    /// Current phrase
    #[must_use]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Layout most recently synced to
    #[must_use]
    pub fn target(&self) -> &Layout {
        &self.target
    }
}

impl TxnTarget for Board {
    fn sync_to_layout(&mut self, layout: &Layout) -> SyncReport {
        let report = self.tiles.sync_to_layout(layout);
        self.target = layout.clone();
        report
    }

    fn set_phrase(&mut self, phrase: &str) {
        if self.phrase != phrase {
            tracing::debug!(from = %self.phrase, to = %phrase, "Phrase changed");
            phrase.clone_into(&mut self.phrase);
        }
    }
}

/// Builder for [`Workbench`]
#[derive(Debug)]
pub struct WorkbenchBuilder {
    coords: Coords,
    driver: Arc<dyn AnimationDriver>,
    animation: AnimationConfig,
    grid: GridConfig,
    seed: Option<u64>,
    tile_events: EventSink<TileEvent>,
    history_events: EventSink<HistoryEvent>,
}

impl WorkbenchBuilder {
    /// Take animation, grid and seed from a loaded configuration
    #[must_use]
    pub fn config(mut self, config: &BoardConfig) -> Self {
        self.animation = config.animation;
        self.grid = config.grid;
        self.seed = config.seed;
        self
    }

    /// Animation driver (defaults to [`TokioDriver`])
    #[must_use]
    pub fn driver(mut self, driver: Arc<dyn AnimationDriver>) -> Self {
        self.driver = driver;
        self
    }

    /// Animation timing
    #[must_use]
    pub fn animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    /// Grid geometry for random layouts
    #[must_use]
    pub fn grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Fixed layout seed
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Where tile events go
    #[must_use]
    pub fn tile_events(mut self, sink: EventSink<TileEvent>) -> Self {
        self.tile_events = sink;
        self
    }

    /// Where history events go
    #[must_use]
    pub fn history_events(mut self, sink: EventSink<HistoryEvent>) -> Self {
        self.history_events = sink;
        self
    }

    /// Build the workbench with an empty board
    #[must_use]
    pub fn build(self) -> Workbench {
        let ctx = TileContext {
            coords: self.coords,
            driver: self.driver,
            animation: self.animation,
            events: self.tile_events,
        };
        let board = Board::new(ctx);
        let baseline = Txn::Batch(vec![
            Txn::ChangePhrase(String::new()),
            Txn::Layout(board.target().clone()),
        ]);
        let rng = self
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let (snapshots, _) = watch::channel(Snapshot::new("", board.target().clone()));

        tracing::info!(
            seed = ?self.seed,
            cancel_superseded = self.animation.cancel_superseded,
            "Workbench ready"
        );

        Workbench {
            board,
            history: TxnStack::new(baseline).with_observer(self.history_events),
            grid: self.grid,
            rng,
            snapshots,
        }
    }
}

/// A board with history
pub struct Workbench {
    board: Board,
    history: TxnStack,
    grid: GridConfig,
    rng: StdRng,
    snapshots: watch::Sender<Snapshot>,
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("board", &self.board)
            .field("history", &self.history)
            .field("grid", &self.grid)
            .finish_non_exhaustive()
    }
}

impl Workbench {
    /// Start building a workbench over the container behind `coords`
    #[must_use]
    pub fn builder(coords: Coords) -> WorkbenchBuilder {
        WorkbenchBuilder {
            coords,
            driver: Arc::new(TokioDriver::new()),
            animation: AnimationConfig::default(),
            grid: GridConfig::default(),
            seed: None,
            tile_events: EventSink::disconnected(),
            history_events: EventSink::disconnected(),
        }
    }

    /// The board
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Live tiles
    #[must_use]
    pub fn tiles(&self) -> &TileSet {
        self.board.tiles()
    }

    /// Current phrase
    #[must_use]
    pub fn phrase(&self) -> &str {
        self.board.phrase()
    }

    /// Transaction history
    #[must_use]
    pub fn history(&self) -> &TxnStack {
        &self.history
    }

    /// Set a new phrase and scatter its letters, as one undoable step
    pub fn change_phrase(&mut self, phrase: &str) {
        let layout = self.random_layout_for(phrase);
        tracing::info!(phrase, tiles = layout.len(), "Changing phrase");
        self.apply(Txn::Batch(vec![
            Txn::ChangePhrase(phrase.to_string()),
            Txn::Layout(layout),
        ]));
    }

    /// Scatter the current phrase again
    pub fn shuffle(&mut self) {
        let phrase = self.board.phrase.clone();
        let layout = self.random_layout_for(&phrase);
        self.apply(Txn::Layout(layout));
    }

    /// Move the tiles to an explicit layout
    pub fn apply_layout(&mut self, layout: Layout) {
        self.apply(Txn::Layout(layout));
    }

    /// Apply any transaction and record it
    pub fn apply(&mut self, txn: Txn) {
        self.history.apply(txn, &mut self.board);
        self.publish();
    }

    /// Step back one transaction; `false` at the baseline
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.board);
        if undone {
            self.publish();
        }
        undone
    }

    /// Step forward one transaction; `false` at the newest entry
    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.board);
        if redone {
            self.publish();
        }
        redone
    }

    /// Drop a tile at an absolute point; not recorded in history
    pub fn drag(&mut self, id: TileId, absolute: Point) -> Option<Point> {
        let dropped = self.board.tiles.drag(id, absolute);
        if dropped.is_none() {
            tracing::warn!(tile = %id, "Drag for unknown tile ignored");
        }
        dropped
    }

    /// Phrase and live tile arrangement
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.board.phrase.clone(), self.board.tiles.current_layout())
    }

    /// Recreate a snapshot as one undoable step
    pub fn restore(&mut self, snapshot: Snapshot) {
        tracing::info!(
            phrase = %snapshot.phrase,
            tiles = snapshot.layout.len(),
            "Restoring snapshot"
        );
        self.apply(Txn::Batch(vec![
            Txn::ChangePhrase(snapshot.phrase),
            Txn::Layout(snapshot.layout),
        ]));
    }

    /// Receive the settled snapshot after every history change
    #[must_use]
    pub fn subscribe_snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Wait until every animation has ended
    pub async fn settle(&mut self) {
        self.board.tiles.settle().await;
    }

    fn random_layout_for(&mut self, phrase: &str) -> Layout {
        random_layout(phrase, &self.board.tiles.context().coords, &self.grid, &mut self.rng)
    }

    fn publish(&self) {
        self.snapshots.send_replace(Snapshot::new(
            self.board.phrase.clone(),
            self.board.target.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::InstantDriver;
    use crate::geometry::{BoundingBox, ContainerFrame};
    use crate::layout::TileState;
    use pretty_assertions::assert_eq;

    fn workbench() -> Workbench {
        Workbench::builder(Coords::new(ContainerFrame::new(BoundingBox::new(0, 0, 960, 600))))
            .driver(Arc::new(InstantDriver))
            .seed(3)
            .build()
    }

    #[test]
    fn test_change_phrase_is_one_step() {
        let mut wb = workbench();
        wb.change_phrase("cat nap");

        assert_eq!(wb.phrase(), "cat nap");
        assert_eq!(wb.tiles().len(), 6);
        assert_eq!(wb.history().len(), 2);

        assert!(wb.undo());
        assert_eq!(wb.phrase(), "");
        assert!(wb.tiles().is_empty());
        assert!(!wb.undo());
    }

    #[test]
    fn test_shuffle_keeps_tile_identities() {
        let mut wb = workbench();
        wb.change_phrase("listen");
        let mut before: Vec<TileId> = wb.tiles().tiles().iter().map(|t| t.id()).collect();

        wb.shuffle();
        let mut after: Vec<TileId> = wb.tiles().tiles().iter().map(|t| t.id()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
        assert_eq!(wb.phrase(), "listen");
    }

    #[test]
    fn test_drag_is_not_history() {
        let mut wb = workbench();
        wb.change_phrase("ab");
        let id = wb.tiles().tiles()[0].id();

        assert_eq!(wb.drag(id, Point::new(5, 6)), Some(Point::new(5, 6)));
        assert_eq!(wb.history().len(), 2);
        assert_eq!(wb.tiles().get(id).unwrap().position(), Point::new(5, 6));
        assert_eq!(wb.drag(TileId::new(999), Point::new(0, 0)), None);
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut wb = workbench();
        wb.change_phrase("dormitory");
        let saved = wb.snapshot();

        wb.change_phrase("dirty room");
        wb.restore(saved.clone());

        assert_eq!(wb.phrase(), "dormitory");
        let mut restored = wb.snapshot().layout.tile_states().to_vec();
        let mut expected = saved.layout.tile_states().to_vec();
        restored.sort_by_key(|s| (s.position.x, s.position.y, s.value));
        expected.sort_by_key(|s| (s.position.x, s.position.y, s.value));
        assert_eq!(restored, expected);
    }

    #[test]
    fn test_published_snapshot_follows_history() {
        let mut wb = workbench();
        let rx = wb.subscribe_snapshots();
        wb.apply_layout(Layout::new(
            BoundingBox::new(0, 0, 960, 600),
            vec![TileState::new('q', Point::new(1, 2))],
        ));
        assert_eq!(rx.borrow().layout.letters(), "q");

        wb.undo();
        assert!(rx.borrow().layout.is_empty());
    }
}
