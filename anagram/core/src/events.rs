//! Board Events
//!
//! Typed notifications sent from the core to a presentation adapter. The core
//! never renders anything itself: it tells the adapter which tiles were
//! created, moved, retyped, dragged or destroyed, and when the history
//! changed. Delivery is over unbounded tokio channels so emitting never
//! blocks the synchronous reconciliation path.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::geometry::Point;
use crate::tile::TileId;

/// Tile lifecycle events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileEvent {
    /// A tile was created and is fading in
    TileCreated {
        /// New tile
        id: TileId,
        /// Letter on the tile
        value: char,
        /// Container-relative position
        position: Point,
    },

    /// A tile started moving to a new position
    TileMoved {
        /// Tile being moved
        id: TileId,
        /// Position when the move started
        from: Point,
        /// Target position
        to: Point,
    },

    /// A tile started cross-fading to a new letter
    TileRetyped {
        /// Tile being retyped
        id: TileId,
        /// Previous letter
        from: char,
        /// New letter
        to: char,
    },

    /// A tile is fading out and will be detached
    TileDestroyed {
        /// Tile being removed
        id: TileId,
    },

    /// The user dragged a tile (not recorded in history)
    TileDragged {
        /// Tile that was dragged
        id: TileId,
        /// Container-relative drop position
        position: Point,
    },
}

impl TileEvent {
    /// Tile the event refers to
    #[must_use]
    pub fn tile_id(&self) -> &TileId {
        match self {
            Self::TileCreated { id, .. }
            | Self::TileMoved { id, .. }
            | Self::TileRetyped { id, .. }
            | Self::TileDestroyed { id }
            | Self::TileDragged { id, .. } => id,
        }
    }
}

/// History position after an apply, undo or redo
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    /// Index of the current transaction
    pub cursor: usize,
    /// Number of stored transactions, including the baseline
    pub len: usize,
}

impl HistoryEvent {
    /// Whether an undo would have an effect
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo would have an effect
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.len
    }
}

/// Optional outbound channel
///
/// Emitting to a sink with no channel, or whose receiver was dropped, is not
/// an error: the core keeps working headless.
#[derive(Clone, Debug)]
pub struct EventSink<T> {
    tx: Option<mpsc::UnboundedSender<T>>,
}

impl<T> Default for EventSink<T> {
    fn default() -> Self {
        Self { tx: None }
    }
}

impl<T: std::fmt::Debug> EventSink<T> {
    /// A sink that drops every event
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A sink feeding `tx`
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<T>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Create a connected sink and its receiver
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Send an event
    pub fn emit(&self, event: T) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.send(event) {
            tracing::warn!(event = ?e.0, "Event receiver dropped");
        }
    }
}
