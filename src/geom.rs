//! Geometric primitives used by the plotting pipeline.
//!
//! [`Point`] and [`PlotRect`] live in plot space where Y grows upward.
//! [`DevicePoint`], [`DeviceSize`] and [`DeviceRect`] are integer pixel
//! coordinates where Y grows downward.

use serde::{Deserialize, Serialize};

/// A point in plot space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X value in plot coordinates.
    pub x: f64,
    /// Y value in plot coordinates.
    pub y: f64,
}

impl Point {
    /// Create a new plot point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A rectangle in plot space.
///
/// `y` is the lower edge. A rectangle with `width <= 0` or `height <= 0`
/// carries no usable bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlotRect {
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl PlotRect {
    /// Create a new plot rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create the rectangle spanned by two corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Lower-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Same size, moved so that `center` is the middle.
    pub fn with_center(&self, center: Point) -> Self {
        Self::new(
            center.x - self.width / 2.0,
            center.y - self.height / 2.0,
            self.width,
            self.height,
        )
    }

    /// Scale the extent about the centre.
    pub fn scale(&self, factor: f64) -> Self {
        let scaled = Self::new(self.x, self.y, self.width * factor, self.height * factor);
        scaled.with_center(self.center())
    }

    /// Shrink by `dx` on the left and right and `dy` on the top and bottom.
    ///
    /// Negative values grow the rectangle.
    pub fn inset(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Self) -> Self {
        let left = self.left().min(other.left());
        let bottom = self.bottom().min(other.bottom());
        let right = self.right().max(other.right());
        let top = self.top().max(other.top());
        Self::new(left, bottom, right - left, top - bottom)
    }

    /// Overlapping part, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.left().max(other.left());
        let bottom = self.bottom().max(other.bottom());
        let right = self.right().min(other.right());
        let top = self.top().min(other.top());
        (left <= right && bottom <= top).then(|| Self::new(left, bottom, right - left, top - bottom))
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    /// Edges are inclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.bottom()
            && point.y <= self.top()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Check whether both extents are positive.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A point in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DevicePoint {
    pub x: i32,
    pub y: i32,
}

impl DevicePoint {
    /// Create a new device point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Size of a device surface or sub-window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceSize {
    pub width: i32,
    pub height: i32,
}

impl DeviceSize {
    /// Create a new device size.
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Check whether both extents are positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A rectangle in device pixels.
///
/// `right()` and `bottom()` are the last covered pixel, so a rectangle of
/// width 1 has `right() == x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DeviceRect {
    /// Create a new device rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    pub fn from_size(size: DeviceSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn size(&self) -> DeviceSize {
        DeviceSize::new(self.width, self.height)
    }

    pub fn top_left(&self) -> DevicePoint {
        DevicePoint::new(self.x, self.y)
    }

    /// True when either extent is zero or negative.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, point: DevicePoint) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Flip negative extents so the rectangle runs from upper-left to lower-right.
    ///
    /// Drag rectangles keep the press point as `(x, y)` and may have negative
    /// size while the pointer is above or left of it.
    pub fn normalized(&self) -> Self {
        let mut rect = *self;
        if rect.width < 0 {
            rect.x += rect.width;
            rect.width = -rect.width;
        }
        if rect.height < 0 {
            rect.y += rect.height;
            rect.height = -rect.height;
        }
        rect
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom.
    pub fn inflate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x - dx,
            self.y - dy,
            self.width + 2 * dx,
            self.height + 2 * dy,
        )
    }

    /// Overlapping part, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        (left < right && top < bottom).then(|| Self::new(left, top, right - left, bottom - top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_rect_edges_and_union() {
        let a = PlotRect::new(0.0, 0.0, 2.0, 1.0);
        let b = PlotRect::new(1.0, -1.0, 3.0, 1.0);
        assert_eq!(a.top(), 1.0);
        assert_eq!(a.right(), 2.0);
        assert_eq!(a.union(&b), PlotRect::new(0.0, -1.0, 4.0, 2.0));
        assert_eq!(a.intersection(&b), Some(PlotRect::new(1.0, 0.0, 1.0, 0.0)));
        assert!(a.contains(Point::new(2.0, 1.0)));
        assert!(!a.contains(Point::new(2.1, 1.0)));
    }

    #[test]
    fn plot_rect_scale_keeps_center() {
        let rect = PlotRect::new(0.0, 0.0, 10.0, 4.0);
        let scaled = rect.scale(0.5);
        assert_eq!(scaled.center(), rect.center());
        assert_eq!(scaled.width, 5.0);
        assert_eq!(rect.inset(-1.0, -1.0), PlotRect::new(-1.0, -1.0, 12.0, 6.0));
    }

    #[test]
    fn device_rect_normalizes_negative_drag() {
        let drag = DeviceRect::new(50, 40, -20, -10);
        assert_eq!(drag.normalized(), DeviceRect::new(30, 30, 20, 10));
        let rect = DeviceRect::new(0, 0, 10, 10);
        assert_eq!(rect.right(), 9);
        assert!(rect.contains(DevicePoint::new(9, 9)));
        assert!(!rect.contains(DevicePoint::new(10, 9)));
        assert_eq!(
            rect.intersection(&DeviceRect::new(5, 5, 10, 10)),
            Some(DeviceRect::new(5, 5, 5, 5))
        );
        assert_eq!(rect.intersection(&DeviceRect::new(10, 0, 5, 5)), None);
    }
}
