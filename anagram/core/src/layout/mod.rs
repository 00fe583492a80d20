//! Layouts - Immutable Tile Arrangements
//!
//! A [`Layout`] is a bounding box plus an ordered list of [`TileState`]s.
//! It serves both as the target handed to the reconciler and as the payload a
//! stored transaction replays, so it always describes a complete end state,
//! never a delta.
//!
//! The order of `tile_states` is meaningful: the reconciler walks targets in
//! that order and earlier entries win ties.

pub mod generator;

pub use generator::{random_layout, GridSize};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{BoundingBox, Point};

/// A desired or observed tile description (no identity)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileState {
    /// Letter shown on the tile
    pub value: char,
    /// Container-relative position of the tile's top-left corner
    pub position: Point,
}

impl TileState {
    /// Create a tile state
    #[must_use]
    pub const fn new(value: char, position: Point) -> Self {
        Self { value, position }
    }
}

/// Snapshot of a bounding box and the tiles laid out inside it
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    bounding_rect: BoundingBox,
    tile_states: Vec<TileState>,
}

impl Layout {
    /// Create a layout
    #[must_use]
    pub fn new(bounding_rect: BoundingBox, tile_states: Vec<TileState>) -> Self {
        Self {
            bounding_rect,
            tile_states,
        }
    }

    /// A layout with no tiles
    #[must_use]
    pub fn empty(bounding_rect: BoundingBox) -> Self {
        Self::new(bounding_rect, Vec::new())
    }

    /// Box the tile positions are valid for
    #[must_use]
    pub fn bounding_rect(&self) -> BoundingBox {
        self.bounding_rect
    }

    /// Tile states in priority order
    #[must_use]
    pub fn tile_states(&self) -> &[TileState] {
        &self.tile_states
    }

    /// Number of tiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.tile_states.len()
    }

    /// Whether the layout has no tiles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tile_states.is_empty()
    }

    /// Letters of the layout in tile order
    #[must_use]
    pub fn letters(&self) -> String {
        self.tile_states.iter().map(|s| s.value).collect()
    }
}

/// Errors encoding or decoding a [`Snapshot`]
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot could not be serialized
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// The input was not a valid snapshot
    #[error("Failed to decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

/// JSON-serializable state that recreates the current phrase and its tiles
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Phrase shown in the companion text field
    pub phrase: String,
    /// Tile arrangement
    pub layout: Layout,
}

impl Snapshot {
    /// Create a snapshot
    #[must_use]
    pub fn new(phrase: impl Into<String>, layout: Layout) -> Self {
        Self {
            phrase: phrase.into(),
            layout,
        }
    }

    /// Encode as JSON
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Encode)
    }

    /// Decode from JSON
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Decode`] if `json` is not a snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(SnapshotError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Layout {
        Layout::new(
            BoundingBox::new(0, 0, 480, 360),
            vec![
                TileState::new('c', Point::new(0, 0)),
                TileState::new('a', Point::new(120, 0)),
                TileState::new('t', Point::new(240, 0)),
            ],
        )
    }

    #[test]
    fn test_layout_accessors() {
        let layout = sample();
        assert_eq!(layout.len(), 3);
        assert!(!layout.is_empty());
        assert_eq!(layout.letters(), "cat");
        assert!(Layout::empty(BoundingBox::default()).is_empty());
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = Snapshot::new("cat", sample());
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"phrase\":\"cat\""));
        assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_snapshot_rejects_garbage() {
        let err = Snapshot::from_json("{\"phrase\": 3}").unwrap_err();
        assert!(matches!(err, SnapshotError::Decode(_)));
    }
}
