//! Anchors and even subdivision of drawing surfaces.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use serde::{Deserialize, Serialize};

/// A position expressed as a fraction of a surface's extent.
///
/// `(0.0, 0.0)` is the top-left corner, `(1.0, 1.0)` the bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FractionalPoint {
    pub x: f32,
    pub y: f32,
}

impl FractionalPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Maps a fractional position plus a pixel offset onto a concrete surface.
///
/// # Examples
/// ```ignore
/// let anchor = Anchor::CENTER.with_offset(Point::new(0, -4));
/// let point = anchor.resolve(Size::new(320, 240)); // (160, 116)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anchor {
    pub fraction: FractionalPoint,
    #[serde(with = "point_serde")]
    pub offset: Point,
}

impl Anchor {
    pub const TOP_LEFT: Anchor = Anchor::new(0.0, 0.0);
    pub const TOP_CENTER: Anchor = Anchor::new(0.5, 0.0);
    pub const TOP_RIGHT: Anchor = Anchor::new(1.0, 0.0);
    pub const CENTER_LEFT: Anchor = Anchor::new(0.0, 0.5);
    pub const CENTER: Anchor = Anchor::new(0.5, 0.5);
    pub const CENTER_RIGHT: Anchor = Anchor::new(1.0, 0.5);
    pub const BOTTOM_LEFT: Anchor = Anchor::new(0.0, 1.0);
    pub const BOTTOM_CENTER: Anchor = Anchor::new(0.5, 1.0);
    pub const BOTTOM_RIGHT: Anchor = Anchor::new(1.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            fraction: FractionalPoint::new(x, y),
            offset: Point::zero(),
        }
    }

    pub const fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    /// Resolve to an absolute pixel position on a surface of the given size.
    ///
    /// Fractional pixels are truncated toward zero.
    pub fn resolve(&self, size: Size) -> Point {
        Point::new(
            (self.fraction.x * size.width as f32) as i32 + self.offset.x,
            (self.fraction.y * size.height as f32) as i32 + self.offset.y,
        )
    }
}

/// Split axis for [`band`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Bands sit side by side, left to right
    Horizontal,
    /// Bands are stacked, top to bottom
    Vertical,
}

/// Rectangle of the `index`-th of `count` equal bands of a surface.
///
/// Every band is `extent / count` pixels wide (integer division) and starts at
/// `index * (extent / count)`. The `extent % count` remainder pixels past the
/// last band are left unassigned.
///
/// Returns `None` when `count` is zero or `index` is out of range.
pub fn band(size: Size, axis: Axis, count: usize, index: usize) -> Option<Rectangle> {
    if count == 0 || index >= count {
        return None;
    }

    let count = count as u32;
    let index = index as u32;

    let rect = match axis {
        Axis::Horizontal => {
            let width = size.width / count;
            Rectangle::new(
                Point::new((index * width) as i32, 0),
                Size::new(width, size.height),
            )
        }
        Axis::Vertical => {
            let height = size.height / count;
            Rectangle::new(
                Point::new(0, (index * height) as i32),
                Size::new(size.width, height),
            )
        }
    };

    Some(rect)
}

mod point_serde {
    use embedded_graphics::prelude::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(point: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        (point.x, point.y).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point, D::Error> {
        let (x, y) = <(i32, i32)>::deserialize(deserializer)?;
        Ok(Point::new(x, y))
    }
}
