//! View history and the combined curve bounds used for "fit" zooming.

use crate::geom::PlotRect;

/// Number of views remembered by [`ViewHistory`].
pub const HISTORY_CAPACITY: usize = 5;

/// Bounded list of previously committed view rectangles.
///
/// The cursor points at the current entry. Stepping back and forward moves
/// the cursor without removing entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewHistory {
    views: Vec<PlotRect>,
    index: Option<usize>,
    capacity: usize,
}

impl Default for ViewHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl ViewHistory {
    /// Create an empty history holding at most `capacity` views.
    pub fn new(capacity: usize) -> Self {
        Self {
            views: Vec::with_capacity(capacity),
            index: None,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Position of the current entry.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn views(&self) -> &[PlotRect] {
        &self.views
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<PlotRect> {
        self.index.and_then(|index| self.views.get(index).copied())
    }

    /// Remember `view`.
    ///
    /// Non-finite rectangles and repeats of the current entry are ignored.
    /// When full, a push from the middle of the history replaces the current
    /// entry; a push from the end drops the oldest.
    pub fn push(&mut self, view: PlotRect) {
        if !view.is_finite() {
            return;
        }
        if self.current() == Some(view) {
            return;
        }
        if self.views.len() >= self.capacity {
            match self.index {
                Some(index) if index + 1 < self.views.len() => self.views[index] = view,
                _ => {
                    self.views.remove(0);
                    self.views.push(view);
                    self.index = Some(self.views.len() - 1);
                }
            }
        } else {
            self.views.push(view);
            self.index = Some(self.index.map_or(0, |index| index + 1));
        }
    }

    /// Step forward; returns the new current view.
    pub fn forward(&mut self) -> Option<PlotRect> {
        let index = self.index?;
        if index + 1 < self.views.len() {
            self.index = Some(index + 1);
            self.current()
        } else {
            None
        }
    }

    /// Step back; returns `None` when already at the oldest entry.
    pub fn back(&mut self) -> Option<PlotRect> {
        let index = self.index?;
        if index > 0 {
            self.index = Some(index - 1);
            self.current()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.views.clear();
        self.index = None;
    }
}

/// Combined bounds of several curves, padded so edge points stay visible.
///
/// Rectangles with positive width and height are unioned; non-finite ones
/// and ones with negative extent carry no bounds and are skipped. Only when
/// no curve spreads on both axes are the flat ones (a single point or a
/// constant value) used. An axis with zero extent is given the extent of
/// `default`, centred on the curve, and is not padded. Other axes grow by
/// 1/50 of their extent on each side. With no usable rectangle the result
/// is `default`.
pub fn curve_bounding_rect<I>(bounds: I, default: PlotRect) -> PlotRect
where
    I: IntoIterator<Item = PlotRect>,
{
    let mut combined: Option<PlotRect> = None;
    let mut flat: Option<PlotRect> = None;
    for rect in bounds {
        if !rect.is_finite() || rect.width < 0.0 || rect.height < 0.0 {
            continue;
        }
        let slot = if rect.has_area() { &mut combined } else { &mut flat };
        let next = match *slot {
            Some(current) => current.union(&rect),
            None => rect,
        };
        if next.is_finite() {
            *slot = Some(next);
        }
    }

    let Some(mut rect) = combined.or(flat) else {
        return default;
    };

    let zero_width = rect.width == 0.0;
    let zero_height = rect.height == 0.0;
    if zero_width {
        rect.x -= default.width / 2.0;
        rect.width = default.width;
    }
    if zero_height {
        rect.y -= default.height / 2.0;
        rect.height = default.height;
    }

    let dx = if zero_width { 0.0 } else { rect.width / 50.0 };
    let dy = if zero_height { 0.0 } else { rect.height / 50.0 };
    rect.inset(-dx, -dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;

    fn rect(x: f64) -> PlotRect {
        PlotRect::new(x, 0.0, 1.0, 1.0)
    }

    #[test]
    fn history_steps_back_and_forward() {
        let mut history = ViewHistory::default();
        history.push(rect(0.0));
        history.push(rect(1.0));
        history.push(rect(1.0));
        history.push(rect(2.0));
        assert_eq!(history.len(), 3);
        assert_eq!(history.back(), Some(rect(1.0)));
        assert_eq!(history.back(), Some(rect(0.0)));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), Some(rect(1.0)));
        assert_eq!(history.current(), Some(rect(1.0)));
    }

    #[test]
    fn full_history_drops_oldest_or_replaces_current() {
        let mut history = ViewHistory::new(3);
        for x in 0..4 {
            history.push(rect(f64::from(x)));
        }
        assert_eq!(history.views(), &[rect(1.0), rect(2.0), rect(3.0)]);
        assert_eq!(history.index(), Some(2));

        history.back();
        history.push(rect(9.0));
        assert_eq!(history.views(), &[rect(1.0), rect(9.0), rect(3.0)]);
    }

    #[test]
    fn non_finite_views_are_ignored() {
        let mut history = ViewHistory::default();
        history.push(PlotRect::new(f64::NAN, 0.0, 1.0, 1.0));
        assert!(history.is_empty());
        assert_eq!(history.current(), None);
    }

    #[test]
    fn bounds_are_padded() {
        let default = PlotRect::new(-10.0, -10.0, 20.0, 20.0);
        let fit = curve_bounding_rect([PlotRect::new(0.0, 0.0, 10.0, 10.0)], default);
        assert!((fit.x - -0.2).abs() < 1e-12);
        assert!((fit.width - 10.4).abs() < 1e-12);
    }

    #[test]
    fn degenerate_axes_use_default_extent() {
        let default = PlotRect::new(-10.0, -10.0, 20.0, 20.0);
        let fit = curve_bounding_rect([PlotRect::new(3.0, 0.0, 0.0, 50.0)], default);
        assert_eq!(fit.x, -7.0);
        assert_eq!(fit.width, 20.0);
        assert!((fit.y - -1.0).abs() < 1e-12);
        assert!((fit.height - 52.0).abs() < 1e-12);

        assert_eq!(curve_bounding_rect([], default), default);
        assert_eq!(
            curve_bounding_rect([PlotRect::new(f64::INFINITY, 0.0, 1.0, 1.0)], default),
            default
        );
    }

    #[test]
    fn flat_curve_is_centred_on_its_value() {
        let default = PlotRect::new(-10.0, -10.0, 20.0, 20.0);
        let fit = curve_bounding_rect([PlotRect::new(0.0, 500.0, 2.0, 0.0)], default);
        assert!(fit.contains(Point::new(1.0, 500.0)));
        assert_eq!(fit.y, 490.0);
        assert_eq!(fit.height, 20.0);

        let point = curve_bounding_rect([PlotRect::new(4.0, -3.0, 0.0, 0.0)], default);
        assert_eq!(point.center(), Point::new(4.0, -3.0));
    }

    #[test]
    fn unknown_and_flat_bounds_do_not_widen_the_fit() {
        let default = PlotRect::new(-10.0, -10.0, 20.0, 20.0);
        let curve = PlotRect::new(100.0, 100.0, 10.0, 10.0);
        let unknown = PlotRect::new(0.0, 0.0, -1.0, -1.0);
        let fit = curve_bounding_rect([unknown, curve, PlotRect::new(0.0, 0.0, 0.0, 0.0)], default);
        assert!((fit.x - 99.8).abs() < 1e-12);
        assert!((fit.y - 99.8).abs() < 1e-12);
        assert!((fit.width - 10.4).abs() < 1e-12);
    }

    #[test]
    fn bounds_union_several_curves() {
        let default = PlotRect::new(-10.0, -10.0, 20.0, 20.0);
        let fit = curve_bounding_rect(
            [PlotRect::new(0.0, 0.0, 5.0, 5.0), PlotRect::new(5.0, 5.0, 45.0, 45.0)],
            default,
        );
        assert!((fit.x - -1.0).abs() < 1e-12);
        assert!((fit.right() - 51.0).abs() < 1e-12);
    }
}
