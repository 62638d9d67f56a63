//! Plot annotations drawn over the curves.

use crate::geom::{DeviceSize, PlotRect, Point};
use crate::render::{Brush, Pen};

/// Shape of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerKind {
    /// Not drawn.
    #[default]
    None,
    /// Single pixel at the rect origin.
    Point,
    /// Line between the rect corners.
    Line,
    HorizLine,
    VertLine,
    /// Full width and full height lines through the rect origin.
    Cross,
    /// The rect itself, outlined by the pen and filled by the brush.
    Rect,
    /// Fixed pixel-size ellipse centred on the rect origin.
    Ellipse,
}

/// A marker positioned in plot space.
///
/// A negative `rect.width` stretches the marker over the full visible width
/// and a negative `rect.height` over the full visible height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotMarker {
    pub kind: MarkerKind,
    pub rect: PlotRect,
    /// Pixel size for ellipse markers.
    pub size: DeviceSize,
    pub pen: Option<Pen>,
    pub brush: Option<Brush>,
}

impl PlotMarker {
    pub fn new(kind: MarkerKind, rect: PlotRect, size: DeviceSize, pen: Option<Pen>, brush: Option<Brush>) -> Self {
        Self {
            kind,
            rect,
            size,
            pen,
            brush,
        }
    }

    pub fn point(at: Point, pen: Pen) -> Self {
        Self::new(MarkerKind::Point, PlotRect::new(at.x, at.y, 0.0, 0.0), DeviceSize::default(), Some(pen), None)
    }

    /// Line from the lower-left to the upper-right corner of `rect`.
    pub fn line(rect: PlotRect, pen: Pen) -> Self {
        Self::new(MarkerKind::Line, rect, DeviceSize::default(), Some(pen), None)
    }

    pub fn horiz_line(y: f64, pen: Pen) -> Self {
        Self::new(MarkerKind::HorizLine, PlotRect::new(0.0, y, -1.0, 0.0), DeviceSize::default(), Some(pen), None)
    }

    pub fn vert_line(x: f64, pen: Pen) -> Self {
        Self::new(MarkerKind::VertLine, PlotRect::new(x, 0.0, 0.0, -1.0), DeviceSize::default(), Some(pen), None)
    }

    pub fn cross(at: Point, pen: Pen) -> Self {
        Self::new(MarkerKind::Cross, PlotRect::new(at.x, at.y, -1.0, -1.0), DeviceSize::default(), Some(pen), None)
    }

    pub fn rect(rect: PlotRect, pen: Option<Pen>, brush: Option<Brush>) -> Self {
        Self::new(MarkerKind::Rect, rect, DeviceSize::default(), pen, brush)
    }

    pub fn ellipse(at: Point, size: DeviceSize, pen: Option<Pen>, brush: Option<Brush>) -> Self {
        Self::new(MarkerKind::Ellipse, PlotRect::new(at.x, at.y, 0.0, 0.0), size, pen, brush)
    }

    pub fn spans_width(&self) -> bool {
        self.rect.width < 0.0
    }

    pub fn spans_height(&self) -> bool {
        self.rect.height < 0.0
    }
}
