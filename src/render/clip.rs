//! Line clipping against an axis-aligned rectangle.
//!
//! A Cohen–Sutherland variant that moves each endpoint in at most one bounded
//! pass instead of looping until both out-codes are clear.

use std::ops::{BitOr, BitOrAssign};

use crate::geom::{PlotRect, Point};

/// Which endpoints a clip moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClipStatus(u16);

impl ClipStatus {
    /// Both endpoints were already inside.
    pub const NEITHER: Self = Self(0x0000);
    pub const FIRST_X: Self = Self(0x0001);
    pub const FIRST_Y: Self = Self(0x0002);
    /// First endpoint moved.
    pub const FIRST: Self = Self(0x0003);
    pub const SECOND_X: Self = Self(0x0010);
    pub const SECOND_Y: Self = Self(0x0020);
    /// Second endpoint moved.
    pub const SECOND: Self = Self(0x0030);
    pub const BOTH: Self = Self(0x0033);
    /// The segment misses the rectangle; draw nothing.
    pub const OUT: Self = Self(0x0100);

    pub fn bits(self) -> u16 {
        self.0
    }

    /// Check whether any bit of `other` is set.
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_out(self) -> bool {
        self == Self::OUT
    }

    /// True when the first endpoint was moved on either axis.
    pub fn first_clipped(self) -> bool {
        self.intersects(Self::FIRST)
    }

    /// True when the second endpoint was moved on either axis.
    pub fn second_clipped(self) -> bool {
        self.intersects(Self::SECOND)
    }
}

impl BitOr for ClipStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ClipStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A clipped segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clipped {
    pub p0: Point,
    pub p1: Point,
    pub status: ClipStatus,
}

impl Clipped {
    /// Check whether anything is left to draw.
    pub fn is_visible(&self) -> bool {
        !self.status.is_out()
    }
}

const INSIDE: u8 = 0;
const BELOW_MIN_X: u8 = 1;
const ABOVE_MAX_X: u8 = 2;
const BELOW_MIN_Y: u8 = 4;
const ABOVE_MAX_Y: u8 = 8;

fn region_code(x: f64, y: f64, rect: &PlotRect) -> u8 {
    let mut code = INSIDE;
    if x < rect.left() {
        code |= BELOW_MIN_X;
    } else if x > rect.right() {
        code |= ABOVE_MAX_X;
    }
    if y < rect.bottom() {
        code |= BELOW_MIN_Y;
    } else if y > rect.top() {
        code |= ABOVE_MAX_Y;
    }
    code
}

/// Clip the segment `p0`–`p1` to `rect`.
///
/// Non-finite input and segments that miss `rect` are reported as
/// [`ClipStatus::OUT`]. Vertical and horizontal segments only clamp the
/// varying coordinate.
pub fn clip_line_to_rect(p0: Point, p1: Point, rect: &PlotRect) -> Clipped {
    let out = Clipped {
        p0,
        p1,
        status: ClipStatus::OUT,
    };
    if !p0.is_finite() || !p1.is_finite() {
        return out;
    }

    let (mut x0, mut y0) = (p0.x, p0.y);
    let (mut x1, mut y1) = (p1.x, p1.y);
    let out0 = region_code(x0, y0, rect);
    let out1 = region_code(x1, y1, rect);

    if out0 & out1 != INSIDE {
        return out;
    }
    if out0 | out1 == INSIDE {
        return Clipped {
            p0,
            p1,
            status: ClipStatus::NEITHER,
        };
    }

    let mut status = ClipStatus::NEITHER;

    if x0 == x1 {
        if out0 & BELOW_MIN_Y != 0 {
            y0 = rect.bottom();
            status |= ClipStatus::FIRST_Y;
        } else if out0 & ABOVE_MAX_Y != 0 {
            y0 = rect.top();
            status |= ClipStatus::FIRST_Y;
        }
        if out1 & BELOW_MIN_Y != 0 {
            y1 = rect.bottom();
            status |= ClipStatus::SECOND_Y;
        } else if out1 & ABOVE_MAX_Y != 0 {
            y1 = rect.top();
            status |= ClipStatus::SECOND_Y;
        }
        return Clipped {
            p0: Point::new(x0, y0),
            p1: Point::new(x1, y1),
            status,
        };
    }
    if y0 == y1 {
        if out0 & BELOW_MIN_X != 0 {
            x0 = rect.left();
            status |= ClipStatus::FIRST_X;
        } else if out0 & ABOVE_MAX_X != 0 {
            x0 = rect.right();
            status |= ClipStatus::FIRST_X;
        }
        if out1 & BELOW_MIN_X != 0 {
            x1 = rect.left();
            status |= ClipStatus::SECOND_X;
        } else if out1 & ABOVE_MAX_X != 0 {
            x1 = rect.right();
            status |= ClipStatus::SECOND_X;
        }
        return Clipped {
            p0: Point::new(x0, y0),
            p1: Point::new(x1, y1),
            status,
        };
    }

    let first_outside = out0 != INSIDE;
    let passes = if first_outside && out1 != INSIDE { 2 } else { 1 };
    let mut code = if first_outside { out0 } else { out1 };

    for pass in 0..passes {
        let (mut x, mut y) = if pass == 0 && first_outside { (x0, y0) } else { (x1, y1) };

        let clip_y = |code: &mut u8, x: &mut f64, y: &mut f64| {
            let edge = if *code & BELOW_MIN_Y != 0 {
                Some(rect.bottom())
            } else if *code & ABOVE_MAX_Y != 0 {
                Some(rect.top())
            } else {
                None
            };
            if let Some(edge) = edge {
                *y = edge;
                *x = x0 + (x1 - x0) * (edge - y0) / (y1 - y0);
                *code = region_code(*x, *y, rect);
            }
        };

        clip_y(&mut code, &mut x, &mut y);
        let edge = if code & ABOVE_MAX_X != 0 {
            Some(rect.right())
        } else if code & BELOW_MIN_X != 0 {
            Some(rect.left())
        } else {
            None
        };
        if let Some(edge) = edge {
            x = edge;
            y = y0 + (y1 - y0) * (edge - x0) / (x1 - x0);
            code = region_code(x, y, rect);
        }
        clip_y(&mut code, &mut x, &mut y);

        if !x.is_finite() || !y.is_finite() || code != INSIDE {
            return out;
        }

        if pass == 0 && first_outside {
            x0 = x;
            y0 = y;
            status |= ClipStatus::FIRST;
            code = out1;
        } else {
            x1 = x;
            y1 = y;
            status |= ClipStatus::SECOND;
            break;
        }
    }

    Clipped {
        p0: Point::new(x0, y0),
        p1: Point::new(x1, y1),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> PlotRect {
        PlotRect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn inside_segment_is_unchanged() {
        let clipped = clip_line_to_rect(Point::new(2.0, 2.0), Point::new(8.0, 8.0), &rect());
        assert_eq!(clipped.status, ClipStatus::NEITHER);
        assert_eq!(clipped.p0, Point::new(2.0, 2.0));
        assert_eq!(clipped.p1, Point::new(8.0, 8.0));
    }

    #[test]
    fn segment_on_one_outer_side_is_rejected() {
        let clipped = clip_line_to_rect(Point::new(-5.0, 1.0), Point::new(-1.0, 9.0), &rect());
        assert!(!clipped.is_visible());
        let clipped = clip_line_to_rect(Point::new(1.0, 11.0), Point::new(9.0, 20.0), &rect());
        assert!(clipped.status.is_out());
    }

    #[test]
    fn crossing_one_edge_moves_one_endpoint_onto_it() {
        let clipped = clip_line_to_rect(Point::new(5.0, 5.0), Point::new(15.0, 7.0), &rect());
        assert_eq!(clipped.status, ClipStatus::SECOND);
        assert_eq!(clipped.p0, Point::new(5.0, 5.0));
        assert!((clipped.p1.x - 10.0).abs() < 1e-12);
        assert!((clipped.p1.y - 6.0).abs() < 1e-12);

        let clipped = clip_line_to_rect(Point::new(5.0, -5.0), Point::new(7.0, 5.0), &rect());
        assert_eq!(clipped.status, ClipStatus::FIRST);
        assert!((clipped.p0.y - 0.0).abs() < 1e-12);
        assert!((clipped.p0.x - 6.0).abs() < 1e-12);
    }

    #[test]
    fn crossing_through_clips_both_ends() {
        let clipped = clip_line_to_rect(Point::new(-10.0, 5.0), Point::new(20.0, 8.0), &rect());
        assert_eq!(clipped.status, ClipStatus::BOTH);
        assert!((clipped.p0.x - 0.0).abs() < 1e-12);
        assert!((clipped.p1.x - 10.0).abs() < 1e-12);
        assert!((clipped.p0.y - 6.0).abs() < 1e-12);
        assert!((clipped.p1.y - 7.0).abs() < 1e-12);
    }

    #[test]
    fn corner_crossing_needs_second_axis() {
        let clipped = clip_line_to_rect(Point::new(-5.0, -1.0), Point::new(5.0, 5.0), &rect());
        assert!(clipped.status.first_clipped());
        assert!(rect().contains(clipped.p0));
    }

    #[test]
    fn axis_aligned_segments_only_clamp() {
        let vertical = clip_line_to_rect(Point::new(3.0, -100.0), Point::new(3.0, 100.0), &rect());
        assert_eq!(vertical.status, ClipStatus::FIRST_Y | ClipStatus::SECOND_Y);
        assert_eq!(vertical.p0, Point::new(3.0, 0.0));
        assert_eq!(vertical.p1, Point::new(3.0, 10.0));

        let horizontal = clip_line_to_rect(Point::new(1e300, 4.0), Point::new(2.0, 4.0), &rect());
        assert_eq!(horizontal.status, ClipStatus::FIRST_X);
        assert_eq!(horizontal.p0, Point::new(10.0, 4.0));
    }

    #[test]
    fn segment_passing_outside_a_corner_is_out() {
        let clipped = clip_line_to_rect(Point::new(-5.0, 8.0), Point::new(2.0, 20.0), &rect());
        assert!(clipped.status.is_out());
        let clipped = clip_line_to_rect(Point::new(2.0, 20.0), Point::new(-5.0, 8.0), &rect());
        assert!(clipped.status.is_out());
        let clipped = clip_line_to_rect(Point::new(8.0, -3.0), Point::new(13.0, 4.0), &rect());
        assert!(clipped.status.is_out());
    }

    #[test]
    fn non_finite_input_is_out() {
        let clipped = clip_line_to_rect(Point::new(f64::NAN, 0.0), Point::new(1.0, 1.0), &rect());
        assert!(clipped.status.is_out());
        let clipped = clip_line_to_rect(Point::new(f64::INFINITY, 1.0), Point::new(1.0, 1.0), &rect());
        assert!(clipped.status.is_out());
    }
}
