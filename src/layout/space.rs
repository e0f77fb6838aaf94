//! Canvas bounds and the saturating clamp applied to every position write

use super::types::{Point, Size};

/// The bounded surface entities are placed on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSpace {
    width: f64,
    height: f64,
}

impl CoordinateSpace {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(size.width, size.height)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Project a top-left anchor into the range where an entity of `size`
    /// stays fully on the canvas.
    ///
    /// An entity larger than the canvas collapses to `0` on that axis.
    /// NaN coordinates also land on `0`.
    pub fn clamp(&self, position: Point, size: Size) -> Point {
        Point::new(
            clamp_axis(position.x, self.width - size.width),
            clamp_axis(position.y, self.height - size.height),
        )
    }

    /// Whether `position` is already inside the valid range for `size`
    pub fn is_within(&self, position: Point, size: Size) -> bool {
        self.clamp(position, size) == position
    }
}

fn clamp_axis(value: f64, upper: f64) -> f64 {
    // f64::min/max ignore NaN operands, which would pin NaN to the upper bound
    if value.is_nan() || upper.is_nan() {
        return 0.0;
    }
    value.min(upper).max(0.0)
}
