//! Smooth curve rendering by iterative Bézier subdivision.
//!
//! Coordinates are device pixels held as `f64`. Each quadratic-like span
//! between successive midpoints is split on an explicit stack until it is
//! flat to within a few pixels, then emitted as clipped straight segments.

use crate::geom::{DevicePoint, PlotRect, Point};
use crate::range::RangeSelection;
use crate::render::clip::clip_line_to_rect;

/// Maximum number of pending spans.
pub const SPLINE_STACK_DEPTH: usize = 20;
/// Spans whose control points lie within this many pixels are drawn straight.
pub const SPLINE_FLATNESS: f64 = 4.0;

#[derive(Debug, Clone, Copy)]
struct Span([Point; 4]);

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

fn to_device(point: Point) -> DevicePoint {
    DevicePoint::new(point.x as i32, point.y as i32)
}

/// Incremental spline renderer.
///
/// Create it with the first two points, feed every following point to
/// [`SplineDrawer::add_point`] and close with [`SplineDrawer::finish`].
/// Segments are reported as `(from, to, selected)` where `selected` tells
/// whether the segment's midpoint X falls in the selection.
#[derive(Debug)]
pub struct SplineDrawer<'a> {
    rect: PlotRect,
    selection: Option<&'a RangeSelection<f64>>,
    stack: Vec<Span>,
    c1: Point,
    c2: Point,
    p2: Point,
    last: Point,
}

impl<'a> SplineDrawer<'a> {
    /// Start a spline through `first` and `second`, clipped to `rect`.
    pub fn new(
        rect: PlotRect,
        selection: Option<&'a RangeSelection<f64>>,
        first: Point,
        second: Point,
    ) -> Self {
        let c1 = midpoint(first, second);
        Self {
            rect,
            selection,
            stack: Vec::with_capacity(SPLINE_STACK_DEPTH),
            c1,
            c2: midpoint(c1, second),
            p2: second,
            last: first,
        }
    }

    /// Extend the spline to `point`.
    pub fn add_point<F>(&mut self, point: Point, emit: &mut F)
    where
        F: FnMut(DevicePoint, DevicePoint, bool),
    {
        let p1 = self.p2;
        self.p2 = point;
        let c4 = midpoint(p1, self.p2);
        let c3 = midpoint(p1, c4);

        let mut selected = false;
        self.stack.clear();
        self.stack.push(Span([self.c1, self.c2, c3, c4]));

        while let Some(Span([a, b, c, d])) = self.stack.pop() {
            let mid = midpoint(b, c);
            let flat = (a.x - mid.x).abs() < SPLINE_FLATNESS
                && (a.y - mid.y).abs() < SPLINE_FLATNESS
                && (mid.x - d.x).abs() < SPLINE_FLATNESS
                && (mid.y - d.y).abs() < SPLINE_FLATNESS;

            if flat {
                self.emit_segment(self.last, a, &mut selected, emit);
                self.emit_segment(a, mid, &mut selected, emit);
                self.last = mid;
            } else if self.stack.len() < SPLINE_STACK_DEPTH - 2 {
                self.stack
                    .push(Span([mid, midpoint(mid, c), midpoint(c, d), d]));
                self.stack
                    .push(Span([a, midpoint(a, b), midpoint(b, mid), mid]));
            } else {
                log::error!("spline stack overflow");
                return;
            }
        }

        self.c1 = c4;
        self.c2 = midpoint(self.c1, self.p2);
    }

    /// Draw the final span up to the last point.
    pub fn finish<F>(self, emit: &mut F)
    where
        F: FnMut(DevicePoint, DevicePoint, bool),
    {
        let clipped = clip_line_to_rect(self.c1, self.p2, &self.rect);
        if clipped.is_visible() {
            emit(to_device(clipped.p0), to_device(clipped.p1), false);
        }
    }

    fn emit_segment<F>(&self, from: Point, to: Point, selected: &mut bool, emit: &mut F)
    where
        F: FnMut(DevicePoint, DevicePoint, bool),
    {
        let clipped = clip_line_to_rect(from, to, &self.rect);
        if !clipped.is_visible() {
            return;
        }
        if let Some(selection) = self.selection {
            *selected = selection.contains((from.x + to.x) / 2.0);
        }
        emit(to_device(clipped.p0), to_device(clipped.p1), *selected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::RangeDouble;

    fn collect(points: &[Point], selection: Option<&RangeSelection<f64>>) -> Vec<(DevicePoint, DevicePoint, bool)> {
        let rect = PlotRect::new(0.0, 0.0, 200.0, 200.0);
        let mut out = Vec::new();
        let mut emit = |a: DevicePoint, b: DevicePoint, s: bool| out.push((a, b, s));
        let mut drawer = SplineDrawer::new(rect, selection, points[0], points[1]);
        for point in &points[2..] {
            drawer.add_point(*point, &mut emit);
        }
        drawer.finish(&mut emit);
        out
    }

    #[test]
    fn subdivides_into_short_segments() {
        let points = [
            Point::new(10.0, 100.0),
            Point::new(60.0, 20.0),
            Point::new(110.0, 180.0),
            Point::new(160.0, 100.0),
        ];
        let segments = collect(&points, None);
        assert!(segments.len() > 8);
        assert!(segments.iter().all(|(_, _, selected)| !selected));
        // The first and last segments join the end points to the first and last midpoints.
        for (a, b, _) in &segments[1..segments.len() - 1] {
            assert!((a.x - b.x).abs() <= 2 * SPLINE_FLATNESS as i32);
            assert!((a.y - b.y).abs() <= 2 * SPLINE_FLATNESS as i32);
        }
        let last = segments.last().expect("segments");
        assert_eq!(last.1, DevicePoint::new(160, 100));
    }

    #[test]
    fn stays_inside_rect() {
        let points = [
            Point::new(-50.0, 100.0),
            Point::new(100.0, 400.0),
            Point::new(250.0, 100.0),
        ];
        for (a, b, _) in collect(&points, None) {
            for p in [a, b] {
                assert!((0..=200).contains(&p.x) && (0..=200).contains(&p.y), "{p:?}");
            }
        }
    }

    #[test]
    fn selection_marks_segments_by_midpoint() {
        let mut selection = RangeSelection::new();
        selection.select_range(RangeDouble::new(80.0, 120.0));
        let points = [
            Point::new(0.0, 50.0),
            Point::new(50.0, 60.0),
            Point::new(100.0, 50.0),
            Point::new(150.0, 60.0),
            Point::new(199.0, 50.0),
        ];
        let segments = collect(&points, Some(&selection));
        assert!(segments.iter().any(|(_, _, s)| *s));
        for (a, b, s) in &segments[..segments.len() - 1] {
            let mid = f64::from(a.x + b.x) / 2.0;
            if *s {
                assert!((78.0..=122.0).contains(&mid), "selected at {mid}");
            }
        }
    }
}
