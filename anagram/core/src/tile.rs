//! Tiles - Live Letter Entities
//!
//! A [`Tile`] has a stable identity, a logical value and a visual handle. Its
//! position is never stored on the tile: it is read back from the visual and
//! converted into container-relative coordinates on every query, so an
//! in-flight move or a user drag is always reflected.
//!
//! Every mutation (`set_value`, `move_to`, `destroy`) starts an animation and
//! emits a [`TileEvent`]; none of them block.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::{
    AnimationConfig, AnimationDriver, AnimationHandle, AnimationPlan, TileVisual,
};
use crate::events::{EventSink, TileEvent};
use crate::geometry::{Coords, Point};
use crate::layout::TileState;

/// Tile identifier, unique for the lifetime of a tile set
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(u64);

impl TileId {
    /// Wrap a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Hands out monotonically increasing tile ids; ids are never reused
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    /// Create an allocator whose first id is `t1`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id
    pub fn next_id(&mut self) -> TileId {
        self.last += 1;
        TileId(self.last)
    }

    /// Number of ids handed out so far
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.last
    }
}

/// Everything a tile needs to animate and report itself
#[derive(Clone, Debug)]
pub struct TileContext {
    /// Coordinate system of the board container
    pub coords: Coords,
    /// Driver that plays animations
    pub driver: Arc<dyn AnimationDriver>,
    /// Animation timing
    pub animation: AnimationConfig,
    /// Outbound tile events
    pub events: EventSink<TileEvent>,
}

/// A live tile
#[derive(Debug)]
pub struct Tile {
    id: TileId,
    value: char,
    coords: Coords,
    visual: TileVisual,
    in_flight: Vec<AnimationHandle>,
}

impl Tile {
    /// Create a tile for `state` and fade it in
    #[must_use]
    pub fn spawn(id: TileId, state: TileState, ctx: &TileContext) -> Self {
        let visual = TileVisual::new(state.value, ctx.coords.to_absolute(state.position));
        let appear = ctx.driver.start(&visual, AnimationPlan::appear(&ctx.animation));

        tracing::debug!(
            tile = %id,
            value = %state.value,
            position = %state.position,
            "Tile created"
        );
        ctx.events.emit(TileEvent::TileCreated {
            id,
            value: state.value,
            position: state.position,
        });

        Self {
            id,
            value: state.value,
            coords: ctx.coords.clone(),
            visual,
            in_flight: vec![appear],
        }
    }

    /// Tile identity
    #[must_use]
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Logical letter (updated immediately, the glyph follows mid-animation)
    #[must_use]
    pub fn value(&self) -> char {
        self.value
    }

    /// Container-relative position, read from the visual
    #[must_use]
    pub fn position(&self) -> Point {
        self.coords.to_relative(self.visual.position())
    }

    /// Value and position as a [`TileState`]
    #[must_use]
    pub fn state(&self) -> TileState {
        TileState::new(self.value, self.position())
    }

    /// Visual handle
    #[must_use]
    pub fn visual(&self) -> &TileVisual {
        &self.visual
    }

    /// Animations that have not finished yet
    pub fn in_flight(&mut self) -> &[AnimationHandle] {
        self.in_flight.retain(|h| !h.is_finished());
        &self.in_flight
    }

    /// Cancel every in-flight animation, leaving each in its end state
    pub fn cancel_animations(&mut self) -> usize {
        let cancelled = self.in_flight.drain(..).filter(AnimationHandle::cancel).count();
        if cancelled > 0 {
            tracing::debug!(tile = %self.id, cancelled, "Cancelled superseded animations");
        }
        cancelled
    }

    /// Change the letter with a cross-fade; no-op if it is unchanged
    pub fn set_value(&mut self, value: char, ctx: &TileContext) {
        if self.value == value {
            return;
        }
        let from = self.value;
        self.value = value;
        self.track(ctx.driver.start(&self.visual, AnimationPlan::retype(&ctx.animation, value)));

        tracing::debug!(tile = %self.id, %from, to = %value, "Tile retyped");
        ctx.events.emit(TileEvent::TileRetyped {
            id: self.id,
            from,
            to: value,
        });
    }

    /// Slide to a container-relative position
    pub fn move_to(&mut self, position: Point, ctx: &TileContext) {
        let from = self.position();
        let plan = AnimationPlan::move_to(
            &ctx.animation,
            self.visual.position(),
            ctx.coords.to_absolute(position),
        );
        self.track(ctx.driver.start(&self.visual, plan));

        tracing::debug!(tile = %self.id, %from, to = %position, "Tile moved");
        ctx.events.emit(TileEvent::TileMoved {
            id: self.id,
            from,
            to: position,
        });
    }

    /// Place the tile at an absolute point immediately (user drag)
    ///
    /// Returns the new container-relative position.
    pub fn drag_to(&mut self, absolute: Point, ctx: &TileContext) -> Point {
        self.visual.set_position(absolute);
        let position = self.position();
        tracing::debug!(tile = %self.id, %position, "Tile dragged");
        ctx.events.emit(TileEvent::TileDragged {
            id: self.id,
            position,
        });
        position
    }

    /// Fade the tile out and detach its visual
    ///
    /// Returns the disappear animation so callers can wait for it.
    pub fn destroy(self, ctx: &TileContext) -> AnimationHandle {
        let handle = ctx.driver.start(&self.visual, AnimationPlan::disappear(&ctx.animation));
        tracing::debug!(tile = %self.id, value = %self.value, "Tile destroyed");
        ctx.events.emit(TileEvent::TileDestroyed { id: self.id });
        handle
    }

    fn track(&mut self, handle: AnimationHandle) {
        self.in_flight.retain(|h| !h.is_finished());
        if !handle.is_finished() {
            self.in_flight.push(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::InstantDriver;
    use crate::geometry::{BoundingBox, ContainerFrame};

    fn context() -> (TileContext, tokio::sync::mpsc::UnboundedReceiver<TileEvent>) {
        let (events, rx) = EventSink::channel();
        let ctx = TileContext {
            coords: Coords::new(ContainerFrame::new(BoundingBox::new(100, 50, 900, 650))),
            driver: Arc::new(InstantDriver),
            animation: AnimationConfig::default(),
            events,
        };
        (ctx, rx)
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_id().to_string(), "t1");
        assert_eq!(ids.next_id().to_string(), "t2");
        assert_eq!(ids.allocated(), 2);
    }

    #[test]
    fn test_spawn_places_visual_in_absolute_space() {
        let (ctx, mut rx) = context();
        let tile = Tile::spawn(TileId::new(1), TileState::new('a', Point::new(10, 20)), &ctx);

        assert_eq!(tile.visual().position(), Point::new(110, 70));
        assert_eq!(tile.position(), Point::new(10, 20));
        assert!((tile.visual().opacity() - 1.0).abs() < f32::EPSILON);
        assert!(matches!(rx.try_recv(), Ok(TileEvent::TileCreated { value: 'a', .. })));
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let (ctx, mut rx) = context();
        let mut tile = Tile::spawn(TileId::new(1), TileState::new('a', Point::new(0, 0)), &ctx);
        rx.try_recv().unwrap();

        tile.set_value('a', &ctx);
        assert!(rx.try_recv().is_err());

        tile.set_value('b', &ctx);
        assert_eq!(tile.value(), 'b');
        assert_eq!(tile.visual().glyph(), 'b');
        assert_eq!(
            rx.try_recv().unwrap(),
            TileEvent::TileRetyped {
                id: TileId::new(1),
                from: 'a',
                to: 'b'
            }
        );
    }

    #[test]
    fn test_move_and_drag() {
        let (ctx, _rx) = context();
        let mut tile = Tile::spawn(TileId::new(3), TileState::new('z', Point::new(0, 0)), &ctx);

        tile.move_to(Point::new(240, 120), &ctx);
        assert_eq!(tile.position(), Point::new(240, 120));

        let dropped = tile.drag_to(Point::new(150, 75), &ctx);
        assert_eq!(dropped, Point::new(50, 25));
        assert_eq!(tile.state(), TileState::new('z', Point::new(50, 25)));
    }

    #[test]
    fn test_destroy_detaches() {
        let (ctx, _rx) = context();
        let tile = Tile::spawn(TileId::new(1), TileState::new('a', Point::new(0, 0)), &ctx);
        let visual = tile.visual().clone();
        let handle = tile.destroy(&ctx);
        assert!(handle.is_finished());
        assert!(!visual.is_attached());
    }
}
