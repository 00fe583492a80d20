//! Coordinate System
//!
//! Converts between document-absolute points and a container-relative frame.
//!
//! The container is allowed to move or resize at any time, so nothing here
//! caches geometry: every conversion re-reads the container's current
//! bounding box. Layout math must tolerate the box changing between two calls
//! that belong to the same logical operation.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A point in whole pixels
///
/// Container-relative unless it was explicitly converted with
/// [`Coords::to_absolute`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset
    pub x: i32,
    /// Vertical offset
    pub y: i32,
}

impl Point {
    /// Create a point
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Absolute document coordinates of a container
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub left: i32,
    /// Right edge
    pub right: i32,
    /// Top edge
    pub top: i32,
    /// Bottom edge
    pub bottom: i32,
}

impl BoundingBox {
    /// Create a box from its edges
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Create a box from an origin and a size
    #[must_use]
    pub const fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    /// Width of the box
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height of the box
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Whether a container-relative point lies inside this box
    #[must_use]
    pub const fn contains_relative(&self, pt: Point) -> bool {
        pt.x >= 0 && pt.y >= 0 && pt.x < self.width() && pt.y < self.height()
    }
}

/// Something with a live bounding box
///
/// Implementations must report the *current* geometry on every call.
pub trait Container: Send + Sync {
    /// Current absolute bounding box
    fn bounding_box(&self) -> BoundingBox;
}

/// A container whose geometry can be changed by its owner
///
/// Clones share the same underlying box, so a presentation adapter can move
/// or resize the frame while the core holds a [`Coords`] over it.
#[derive(Clone, Debug, Default)]
pub struct ContainerFrame {
    rect: Arc<RwLock<BoundingBox>>,
}

impl ContainerFrame {
    /// Create a frame with the given box
    #[must_use]
    pub fn new(rect: BoundingBox) -> Self {
        Self {
            rect: Arc::new(RwLock::new(rect)),
        }
    }

    /// Move the frame, keeping its size
    pub fn move_to(&self, left: i32, top: i32) {
        let mut rect = self.rect.write();
        let (width, height) = (rect.width(), rect.height());
        *rect = BoundingBox::from_origin_size(left, top, width, height);
    }

    /// Replace the frame's box
    pub fn set_rect(&self, rect: BoundingBox) {
        *self.rect.write() = rect;
    }
}

impl Container for ContainerFrame {
    fn bounding_box(&self) -> BoundingBox {
        *self.rect.read()
    }
}

/// Live converter between absolute and container-relative points
#[derive(Clone)]
pub struct Coords {
    container: Arc<dyn Container>,
}

impl Coords {
    /// Create a coordinate system over a container
    #[must_use]
    pub fn new(container: impl Container + 'static) -> Self {
        Self {
            container: Arc::new(container),
        }
    }

    /// Create a coordinate system over a shared container
    #[must_use]
    pub fn from_shared(container: Arc<dyn Container>) -> Self {
        Self { container }
    }

    /// The container's current bounding box
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        self.container.bounding_box()
    }

    /// Convert a container-relative point to document coordinates
    #[must_use]
    pub fn to_absolute(&self, pt: Point) -> Point {
        let rect = self.bounding_box();
        Point::new(pt.x + rect.left, pt.y + rect.top)
    }

    /// Convert a document point to container-relative coordinates
    #[must_use]
    pub fn to_relative(&self, pt: Point) -> Point {
        let rect = self.bounding_box();
        Point::new(pt.x - rect.left, pt.y - rect.top)
    }
}

impl fmt::Debug for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coords")
            .field("bounding_box", &self.bounding_box())
            .finish()
    }
}
