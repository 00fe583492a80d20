//! Reconciler - Syncing Live Tiles to a Layout
//!
//! [`TileSet::sync_to_layout`] maps the live tiles onto a target [`Layout`]
//! while keeping as many tile identities as possible, so the board changes
//! with the least visual churn.
//!
//! # Matching
//!
//! Three passes run in decreasing specificity:
//!
//! 1. [`MatchPass::Exact`]: value and position equal, nothing to animate
//! 2. [`MatchPass::Position`]: same position, the tile is retyped in place
//! 3. [`MatchPass::Value`]: same letter, the tile moves
//!
//! Within a pass, targets are visited in layout order and each takes the
//! first unclaimed tile (in current tile order) that satisfies the pass.
//! This order is deterministic and tests rely on it.
//!
//! Leftover targets spawn new tiles; leftover tiles are destroyed. The whole
//! matching is computed by [`plan_sync`] before any animation starts.

use serde::{Deserialize, Serialize};

use crate::animation::AnimationHandle;
use crate::geometry::Point;
use crate::layout::{Layout, TileState};
use crate::tile::{IdAllocator, Tile, TileContext, TileId};

/// One matching round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPass {
    /// Value and position both equal
    Exact,
    /// Position equal, value may differ
    Position,
    /// Value equal, position may differ
    Value,
}

impl MatchPass {
    /// Passes in the order they run
    pub const ALL: [Self; 3] = [Self::Exact, Self::Position, Self::Value];

    /// Whether an observed tile satisfies this pass for a target
    #[must_use]
    pub fn matches(self, have: &TileState, want: &TileState) -> bool {
        match self {
            Self::Exact => have == want,
            Self::Position => have.position == want.position,
            Self::Value => have.value == want.value,
        }
    }
}

/// A tile claiming a target state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Claim {
    /// Index into the observed tiles
    pub tile: usize,
    /// Index into the target states
    pub target: usize,
    /// Pass that made the match
    pub pass: MatchPass,
}

/// Outcome of matching, before anything is mutated
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Matches in the order they were made
    pub claims: Vec<Claim>,
    /// Target indices that need a new tile, in layout order
    pub spawns: Vec<usize>,
    /// Tile indices with no match, in tile order
    pub drops: Vec<usize>,
}

/// Match observed tiles against target states
#[must_use]
pub fn plan_sync(observed: &[TileState], targets: &[TileState]) -> SyncPlan {
    let mut unclaimed: Vec<usize> = (0..observed.len()).collect();
    let mut allocated = vec![false; targets.len()];
    let mut claims = Vec::with_capacity(targets.len().min(observed.len()));

    for pass in MatchPass::ALL {
        for (target, want) in targets.iter().enumerate() {
            if allocated[target] {
                continue;
            }
            let found = unclaimed
                .iter()
                .position(|&tile| pass.matches(&observed[tile], want));
            if let Some(slot) = found {
                let tile = unclaimed.remove(slot);
                allocated[target] = true;
                claims.push(Claim { tile, target, pass });
            }
        }
    }

    let spawns = allocated
        .iter()
        .enumerate()
        .filter(|(_, done)| !**done)
        .map(|(target, _)| target)
        .collect();

    SyncPlan {
        claims,
        spawns,
        drops: unclaimed,
    }
}

/// Counts from one reconciliation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Tiles kept untouched
    pub exact: usize,
    /// Tiles retyped in place
    pub retyped_in_place: usize,
    /// Tiles moved to a same-letter target
    pub moved: usize,
    /// Tiles created
    pub created: usize,
    /// Tiles destroyed
    pub destroyed: usize,
}

impl SyncReport {
    fn record(&mut self, pass: MatchPass) {
        match pass {
            MatchPass::Exact => self.exact += 1,
            MatchPass::Position => self.retyped_in_place += 1,
            MatchPass::Value => self.moved += 1,
        }
    }

    /// Tiles that kept their identity
    #[must_use]
    pub fn reused(&self) -> usize {
        self.exact + self.retyped_in_place + self.moved
    }
}

/// The live tiles of a board
#[derive(Debug)]
pub struct TileSet {
    ctx: TileContext,
    ids: IdAllocator,
    tiles: Vec<Tile>,
    departing: Vec<AnimationHandle>,
}

impl TileSet {
    /// Create an empty tile set
    #[must_use]
    pub fn new(ctx: TileContext) -> Self {
        Self {
            ctx,
            ids: IdAllocator::new(),
            tiles: Vec::new(),
            departing: Vec::new(),
        }
    }

    /// Shared tile context
    #[must_use]
    pub fn context(&self) -> &TileContext {
        &self.ctx
    }

    /// Live tiles in iteration order
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of live tiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether there are no live tiles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Look up a live tile
    #[must_use]
    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id() == id)
    }

    /// Layout mirroring the live tiles, in iteration order
    #[must_use]
    pub fn current_layout(&self) -> Layout {
        Layout::new(
            self.ctx.coords.bounding_box(),
            self.tiles.iter().map(Tile::state).collect(),
        )
    }

    /// Reconcile the live tiles with `layout`
    ///
    /// All matching decisions are made before the first animation starts.
    /// The new tile order is: matched tiles in claim order, then created
    /// tiles in layout order.
    ///
    /// # Panics
    ///
    /// Panics if the resulting tile count differs from the layout's, which is
    /// an internal consistency failure.
    pub fn sync_to_layout(&mut self, layout: &Layout) -> SyncReport {
        let targets = layout.tile_states();
        let observed: Vec<TileState> = self.tiles.iter().map(Tile::state).collect();
        let plan = plan_sync(&observed, targets);

        let ctx = &self.ctx;
        let mut pool: Vec<Option<Tile>> = self.tiles.drain(..).map(Some).collect();
        let mut live = Vec::with_capacity(targets.len());
        let mut report = SyncReport::default();

        for claim in &plan.claims {
            let Some(mut tile) = pool[claim.tile].take() else {
                continue;
            };
            let have = observed[claim.tile];
            let want = targets[claim.target];
            if have != want && ctx.animation.cancel_superseded {
                tile.cancel_animations();
            }
            if have.value != want.value {
                tile.set_value(want.value, ctx);
            }
            if have.position != want.position {
                tile.move_to(want.position, ctx);
            }
            report.record(claim.pass);
            live.push(tile);
        }

        for &index in &plan.drops {
            if let Some(tile) = pool[index].take() {
                self.departing.push(tile.destroy(ctx));
                report.destroyed += 1;
            }
        }

        for &target in &plan.spawns {
            let id = self.ids.next_id();
            live.push(Tile::spawn(id, targets[target], ctx));
            report.created += 1;
        }

        self.tiles = live;
        self.departing.retain(|h| !h.is_finished());

        if self.tiles.len() != targets.len() {
            tracing::error!(
                tiles = self.tiles.len(),
                wanted = targets.len(),
                "Tile count does not match layout after sync"
            );
            panic!("sync_to_layout: invariant violated");
        }

        tracing::debug!(
            exact = report.exact,
            retyped = report.retyped_in_place,
            moved = report.moved,
            created = report.created,
            destroyed = report.destroyed,
            "Synced tiles to layout"
        );
        report
    }

    /// Drop a tile at an absolute point (direct manipulation)
    ///
    /// Not recorded in history. Returns the new container-relative position,
    /// or `None` if no live tile has `id`.
    pub fn drag(&mut self, id: TileId, absolute: Point) -> Option<Point> {
        let ctx = &self.ctx;
        let tile = self.tiles.iter_mut().find(|t| t.id() == id)?;
        Some(tile.drag_to(absolute, ctx))
    }

    /// Animations still running, including those of departing tiles
    pub fn pending_animations(&mut self) -> Vec<AnimationHandle> {
        self.departing.retain(|h| !h.is_finished());
        let mut pending = self.departing.clone();
        for tile in &mut self.tiles {
            pending.extend_from_slice(tile.in_flight());
        }
        pending
    }

    /// Wait for every running animation to end
    pub async fn settle(&mut self) {
        for handle in self.pending_animations() {
            handle.wait().await;
        }
        self.departing.retain(|h| !h.is_finished());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::animation::{AnimationConfig, InstantDriver};
    use crate::events::EventSink;
    use crate::geometry::{BoundingBox, ContainerFrame, Coords};
    use pretty_assertions::assert_eq;

    fn ts(value: char, x: i32, y: i32) -> TileState {
        TileState::new(value, Point::new(x, y))
    }

    fn tile_set() -> TileSet {
        TileSet::new(TileContext {
            coords: Coords::new(ContainerFrame::new(BoundingBox::new(0, 0, 800, 600))),
            driver: Arc::new(InstantDriver),
            animation: AnimationConfig::default(),
            events: EventSink::disconnected(),
        })
    }

    fn layout(states: Vec<TileState>) -> Layout {
        Layout::new(BoundingBox::new(0, 0, 800, 600), states)
    }

    #[test]
    fn test_plan_exact_pass_wins_over_value() {
        let observed = [ts('A', 0, 0)];
        let targets = [ts('A', 5, 5), ts('A', 0, 0)];
        let plan = plan_sync(&observed, &targets);

        assert_eq!(
            plan.claims,
            vec![Claim {
                tile: 0,
                target: 1,
                pass: MatchPass::Exact
            }]
        );
        assert_eq!(plan.spawns, vec![0]);
        assert!(plan.drops.is_empty());
    }

    #[test]
    fn test_plan_position_pass_runs_before_value_pass() {
        let observed = [ts('A', 5, 5), ts('B', 1, 1)];
        let targets = [ts('B', 5, 5), ts('A', 1, 1)];
        let plan = plan_sync(&observed, &targets);

        assert!(plan.claims.iter().all(|c| c.pass == MatchPass::Position));
        assert_eq!(plan.claims[0].tile, 0);
        assert_eq!(plan.claims[0].target, 0);
        assert_eq!(plan.claims[1].tile, 1);
        assert_eq!(plan.claims[1].target, 1);
    }

    #[test]
    fn test_plan_first_unclaimed_tile_wins() {
        let observed = [ts('x', 0, 0), ts('x', 9, 9)];
        let targets = [ts('x', 3, 3)];
        let plan = plan_sync(&observed, &targets);

        assert_eq!(plan.claims[0].tile, 0);
        assert_eq!(plan.drops, vec![1]);
    }

    #[test]
    fn test_plan_spawns_in_layout_order() {
        let plan = plan_sync(&[], &[ts('a', 0, 0), ts('b', 1, 0), ts('c', 2, 0)]);
        assert_eq!(plan.spawns, vec![0, 1, 2]);
        assert!(plan.claims.is_empty());
    }

    #[test]
    fn test_sync_creates_then_reuses() {
        let mut tiles = tile_set();
        let target = layout(vec![ts('c', 0, 0), ts('a', 120, 0), ts('t', 240, 0)]);

        let first = tiles.sync_to_layout(&target);
        assert_eq!(first.created, 3);
        assert_eq!(tiles.len(), 3);

        let ids: Vec<TileId> = tiles.tiles().iter().map(Tile::id).collect();
        let second = tiles.sync_to_layout(&target);
        assert_eq!(
            second,
            SyncReport {
                exact: 3,
                ..SyncReport::default()
            }
        );
        assert_eq!(tiles.tiles().iter().map(Tile::id).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_crosswise_targets_retype_in_place() {
        let mut tiles = tile_set();
        tiles.sync_to_layout(&layout(vec![ts('A', 5, 5), ts('B', 1, 1)]));
        let before: Vec<TileId> = tiles.tiles().iter().map(Tile::id).collect();

        let report = tiles.sync_to_layout(&layout(vec![ts('B', 5, 5), ts('A', 1, 1)]));
        assert_eq!(report.retyped_in_place, 2);
        assert_eq!(report.moved, 0);

        let t1 = tiles.get(before[0]).unwrap();
        let t2 = tiles.get(before[1]).unwrap();
        assert_eq!(t1.state(), ts('B', 5, 5));
        assert_eq!(t2.state(), ts('A', 1, 1));
    }

    #[test]
    fn test_value_pass_moves_and_extra_tiles_die() {
        let mut tiles = tile_set();
        tiles.sync_to_layout(&layout(vec![ts('n', 0, 0), ts('a', 10, 0), ts('p', 20, 0)]));

        let report = tiles.sync_to_layout(&layout(vec![ts('p', 0, 40), ts('a', 10, 0)]));
        assert_eq!(report.exact, 1);
        assert_eq!(report.retyped_in_place, 0);
        assert_eq!(report.moved, 1);
        assert_eq!(report.destroyed, 1);
        assert_eq!(tiles.len(), 2);
        assert_eq!(
            tiles.current_layout().tile_states(),
            &[ts('a', 10, 0), ts('p', 0, 40)]
        );
    }

    #[test]
    fn test_duplicate_letters_keep_claim_order() {
        let mut tiles = tile_set();
        tiles.sync_to_layout(&layout(vec![ts('a', 0, 0), ts('b', 10, 0), ts('a', 20, 0)]));

        let report = tiles.sync_to_layout(&layout(vec![ts('c', 0, 0), ts('a', 50, 50)]));
        assert_eq!(report.retyped_in_place, 1);
        assert_eq!(report.moved, 1);
        assert_eq!(report.destroyed, 1);

        let ids: Vec<TileId> = tiles.tiles().iter().map(Tile::id).collect();
        assert_eq!(ids, vec![TileId::new(1), TileId::new(3)]);
        assert_eq!(
            tiles.current_layout().tile_states(),
            &[ts('c', 0, 0), ts('a', 50, 50)]
        );
    }

    #[test]
    fn test_ids_are_not_reused_after_destroy() {
        let mut tiles = tile_set();
        tiles.sync_to_layout(&layout(vec![ts('a', 0, 0)]));
        tiles.sync_to_layout(&layout(vec![]));
        tiles.sync_to_layout(&layout(vec![ts('a', 0, 0)]));
        assert_eq!(tiles.tiles()[0].id(), TileId::new(2));
    }

    #[test]
    fn test_drag_unknown_tile() {
        let mut tiles = tile_set();
        assert_eq!(tiles.drag(TileId::new(42), Point::new(0, 0)), None);
    }
}
