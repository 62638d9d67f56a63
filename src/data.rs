//! Curve storage.
//!
//! A [`PlotData`] is a cheap, shareable handle to a curve's point arrays.
//! Cloning shares the buffer; the first mutation through a shared handle
//! copies it, so other holders never observe the change. Call
//! [`PlotData::detach`] to get an independent copy up front.

use std::sync::Arc;

use crate::error::PlotError;
use crate::geom::{PlotRect, Point};
use crate::range::RangeInt;
use crate::render::Pen;
use crate::style::{CurveStyle, PenKind};

/// Largest curve accepted at creation time.
pub const MAX_CURVE_POINTS: usize = 10_000_000;

/// Which neighbour to pick when a value lies between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    /// Point nearest to the value.
    #[default]
    Closest,
    /// Nearest point below the value.
    Floor,
    /// Nearest point above the value.
    Ceil,
}

/// Point arrays, cached bounds and pens of one curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveData {
    xs: Vec<f64>,
    ys: Vec<f64>,
    bounds: PlotRect,
    name: String,
    style: CurveStyle,
}

impl CurveData {
    fn calc_bounds(&mut self) {
        self.bounds = bounds_of(&self.xs, &self.ys);
    }
}

/// Bounds with a negative extent, held by curves without a finite point.
const UNKNOWN_BOUNDS: PlotRect = PlotRect {
    x: 0.0,
    y: 0.0,
    width: -1.0,
    height: -1.0,
};

/// Bounds of all finite points, or [`UNKNOWN_BOUNDS`] when there are none.
fn bounds_of(xs: &[f64], ys: &[f64]) -> PlotRect {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for (&x, &y) in xs.iter().zip(ys) {
        if !x.is_finite() || !y.is_finite() {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, x, y, y),
            Some((x0, x1, y0, y1)) => (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
        });
    }
    match bounds {
        Some((x0, x1, y0, y1)) => PlotRect::new(x0, y0, x1 - x0, y1 - y0),
        None => UNKNOWN_BOUNDS,
    }
}

fn check_len(count: usize) -> Result<(), PlotError> {
    if count == 0 {
        return Err(PlotError::NoPoints);
    }
    if count > MAX_CURVE_POINTS {
        return Err(PlotError::TooManyPoints {
            count,
            max: MAX_CURVE_POINTS,
        });
    }
    Ok(())
}

/// Shared handle to a curve.
#[derive(Debug, Clone)]
pub struct PlotData {
    inner: Arc<CurveData>,
}

impl PlotData {
    fn from_parts(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, PlotError> {
        if xs.len() != ys.len() {
            return Err(PlotError::LengthMismatch {
                x: xs.len(),
                y: ys.len(),
            });
        }
        check_len(xs.len())?;
        let mut data = CurveData {
            xs,
            ys,
            bounds: PlotRect::default(),
            name: String::new(),
            style: CurveStyle::default(),
        };
        data.calc_bounds();
        Ok(Self {
            inner: Arc::new(data),
        })
    }

    /// Create a curve of `count` points at the origin.
    pub fn zeroed(count: usize) -> Result<Self, PlotError> {
        check_len(count)?;
        Self::from_parts(vec![0.0; count], vec![0.0; count])
    }

    /// Create a curve taking ownership of parallel X and Y arrays.
    pub fn from_vecs(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, PlotError> {
        Self::from_parts(xs, ys)
    }

    /// Create a curve from points.
    pub fn from_points<I>(points: I) -> Result<Self, PlotError>
    where
        I: IntoIterator<Item = Point>,
    {
        let (xs, ys) = points.into_iter().map(|p| (p.x, p.y)).unzip();
        Self::from_parts(xs, ys)
    }

    /// Use the pens of `style`.
    pub fn with_style(mut self, style: &CurveStyle) -> Self {
        self.make_unique().style = *style;
        self
    }

    /// Set the name shown in the key.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.make_unique().name = name.into();
        self
    }

    /// Give this handle its own buffer if it is shared, then borrow it.
    ///
    /// Every mutator goes through here.
    pub fn make_unique(&mut self) -> &mut CurveData {
        Arc::make_mut(&mut self.inner)
    }

    /// Independent copy that shares nothing with `self`.
    pub fn detach(&self) -> Self {
        Self {
            inner: Arc::new((*self.inner).clone()),
        }
    }

    /// Check whether both handles refer to the same buffer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Check whether another handle shares this buffer.
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.inner) > 1
    }

    pub fn len(&self) -> usize {
        self.inner.xs.len()
    }

    /// Always false for a constructed curve.
    pub fn is_empty(&self) -> bool {
        self.inner.xs.is_empty()
    }

    pub fn x(&self, index: usize) -> Option<f64> {
        self.inner.xs.get(index).copied()
    }

    pub fn y(&self, index: usize) -> Option<f64> {
        self.inner.ys.get(index).copied()
    }

    pub fn point(&self, index: usize) -> Option<Point> {
        Some(Point::new(self.x(index)?, self.y(index)?))
    }

    pub fn xs(&self) -> &[f64] {
        &self.inner.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.inner.ys
    }

    /// Iterate the points in order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.inner
            .xs
            .iter()
            .zip(&self.inner.ys)
            .map(|(&x, &y)| Point::new(x, y))
    }

    /// Cached bounds of the finite points. Zero width or height means
    /// the points do not spread on that axis; a negative extent means no
    /// point is finite.
    pub fn bounding_rect(&self) -> PlotRect {
        self.inner.bounds
    }

    /// Check whether X never decreases.
    pub fn is_x_ordered(&self) -> bool {
        self.inner.xs.windows(2).all(|pair| pair[0] <= pair[1])
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.make_unique().name = name.into();
    }

    pub fn style(&self) -> &CurveStyle {
        &self.inner.style
    }

    pub fn pen(&self, kind: PenKind) -> Pen {
        self.inner.style.pen(kind)
    }

    pub fn set_pen(&mut self, kind: PenKind, pen: Pen) {
        self.make_unique().style.set_pen(kind, pen);
    }

    fn check_index(&self, index: usize) -> Result<(), PlotError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(PlotError::InvalidDataIndex {
                index,
                len: self.len(),
            })
        }
    }

    fn check_range(&self, range: &RangeInt) -> Result<(), PlotError> {
        if range.is_empty() {
            return Err(PlotError::EmptyRange);
        }
        self.check_index(range.max)
    }

    pub fn set_x(&mut self, index: usize, x: f64) -> Result<(), PlotError> {
        self.check_index(index)?;
        let data = self.make_unique();
        data.xs[index] = x;
        data.calc_bounds();
        Ok(())
    }

    pub fn set_y(&mut self, index: usize, y: f64) -> Result<(), PlotError> {
        self.check_index(index)?;
        let data = self.make_unique();
        data.ys[index] = y;
        data.calc_bounds();
        Ok(())
    }

    pub fn set_point(&mut self, index: usize, point: Point) -> Result<(), PlotError> {
        self.check_index(index)?;
        let data = self.make_unique();
        data.xs[index] = point.x;
        data.ys[index] = point.y;
        data.calc_bounds();
        Ok(())
    }

    /// Replace every X value. `xs` must have one value per point.
    pub fn set_x_values(&mut self, xs: &[f64]) -> Result<(), PlotError> {
        if xs.len() != self.len() {
            return Err(PlotError::LengthMismatch {
                x: xs.len(),
                y: self.len(),
            });
        }
        let data = self.make_unique();
        data.xs.copy_from_slice(xs);
        data.calc_bounds();
        Ok(())
    }

    /// Replace every Y value. `ys` must have one value per point.
    pub fn set_y_values(&mut self, ys: &[f64]) -> Result<(), PlotError> {
        if ys.len() != self.len() {
            return Err(PlotError::LengthMismatch {
                x: self.len(),
                y: ys.len(),
            });
        }
        let data = self.make_unique();
        data.ys.copy_from_slice(ys);
        data.calc_bounds();
        Ok(())
    }

    /// Set X to `start + i * step`.
    pub fn set_x_step_values(&mut self, start: f64, step: f64) {
        let data = self.make_unique();
        for (i, x) in data.xs.iter_mut().enumerate() {
            *x = start + step * i as f64;
        }
        data.calc_bounds();
    }

    /// Set Y to `start + i * step`.
    pub fn set_y_step_values(&mut self, start: f64, step: f64) {
        let data = self.make_unique();
        for (i, y) in data.ys.iter_mut().enumerate() {
            *y = start + step * i as f64;
        }
        data.calc_bounds();
    }

    /// Grow with zeros or truncate to `count` points.
    pub fn resize(&mut self, count: usize) -> Result<(), PlotError> {
        check_len(count)?;
        let data = self.make_unique();
        data.xs.resize(count, 0.0);
        data.ys.resize(count, 0.0);
        data.calc_bounds();
        Ok(())
    }

    /// Append the points of `other`.
    pub fn append(&mut self, other: &PlotData) -> Result<(), PlotError> {
        self.insert(self.len(), other)
    }

    /// Insert the points of `other` before `index`.
    pub fn insert(&mut self, index: usize, other: &PlotData) -> Result<(), PlotError> {
        if index > self.len() {
            return Err(PlotError::InvalidDataIndex {
                index,
                len: self.len(),
            });
        }
        check_len(self.len() + other.len())?;
        let (xs, ys) = (other.xs().to_vec(), other.ys().to_vec());
        let data = self.make_unique();
        data.xs.splice(index..index, xs);
        data.ys.splice(index..index, ys);
        data.calc_bounds();
        Ok(())
    }

    /// Remove the points in `range`. At least one point must remain.
    pub fn remove(&mut self, range: RangeInt) -> Result<(), PlotError> {
        self.check_range(&range)?;
        if range.count() >= self.len() {
            return Err(PlotError::NoPoints);
        }
        let data = self.make_unique();
        data.xs.drain(range.min..=range.max);
        data.ys.drain(range.min..=range.max);
        data.calc_bounds();
        Ok(())
    }

    /// New curve holding a copy of the points in `range` and the same pens.
    pub fn sub_data(&self, range: RangeInt) -> Result<PlotData, PlotError> {
        self.check_range(&range)?;
        let xs = self.inner.xs[range.min..=range.max].to_vec();
        let ys = self.inner.ys[range.min..=range.max].to_vec();
        Ok(Self::from_parts(xs, ys)?.with_style(self.style()))
    }

    /// Raw X values. Call [`PlotData::calc_bounding_rect`] after editing.
    pub fn xs_mut(&mut self) -> &mut [f64] {
        &mut self.make_unique().xs
    }

    /// Raw Y values. Call [`PlotData::calc_bounding_rect`] after editing.
    pub fn ys_mut(&mut self) -> &mut [f64] {
        &mut self.make_unique().ys
    }

    /// Recompute the cached bounds.
    pub fn calc_bounding_rect(&mut self) {
        self.make_unique().calc_bounds();
    }

    /// Index of the point whose X is nearest to `x`.
    ///
    /// `Floor` and `Ceil` pick the nearest point below or above `x`. Values
    /// outside the curve's X bounds always give the closest point.
    pub fn index_from_x(&self, x: f64, kind: IndexType) -> usize {
        let bounds = self.bounding_rect();
        index_from_value(self.xs(), x, bounds.left(), bounds.right(), kind)
    }

    /// Index of the point whose Y is nearest to `y`; see [`PlotData::index_from_x`].
    pub fn index_from_y(&self, y: f64, kind: IndexType) -> usize {
        let bounds = self.bounding_rect();
        index_from_value(self.ys(), y, bounds.bottom(), bounds.top(), kind)
    }

    /// Index of the point nearest to `(x, y)`.
    ///
    /// With a positive `x_range` only points within `x ± x_range` are
    /// considered after the first.
    pub fn index_from_xy(&self, x: f64, y: f64, x_range: f64) -> usize {
        let distance = |i: usize| {
            let dx = self.inner.xs[i] - x;
            let dy = self.inner.ys[i] - y;
            dx * dx + dy * dy
        };
        let mut index = 0;
        let mut best = distance(0);
        for i in 1..self.len() {
            let xi = self.inner.xs[i];
            if x_range > 0.0 && (xi < x - x_range || xi > x + x_range) {
                continue;
            }
            let d = distance(i);
            if d < best || best.is_nan() {
                best = d;
                index = i;
            }
        }
        index
    }

    /// Y at `x`, interpolated linearly between the neighbouring points.
    pub fn y_at(&self, x: f64) -> f64 {
        let xs = self.xs();
        let ys = self.ys();
        let i = self.index_from_x(x, IndexType::Floor);
        if xs[i] == x || i + 1 >= self.len() {
            return ys[i];
        }
        let j = self.index_from_x(x, IndexType::Ceil);
        let (x0, y0, x1, y1) = (xs[i], ys[i], xs[j], ys[j]);
        if y0 == y1 || x0 == x1 {
            return y0;
        }
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

impl PartialEq for PlotData {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner == other.inner
    }
}

fn index_from_value(values: &[f64], value: f64, low: f64, high: f64, kind: IndexType) -> usize {
    let mut closest = (0, f64::INFINITY);
    let mut lower: Option<(usize, f64)> = None;
    let mut higher: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v == value {
            return i;
        }
        let d = (value - v).abs();
        if d < closest.1 {
            closest = (i, d);
        }
        if v < value && lower.is_none_or(|(_, best)| d < best) {
            lower = Some((i, d));
        } else if v > value && higher.is_none_or(|(_, best)| d < best) {
            higher = Some((i, d));
        }
    }
    if value < low || value > high {
        return closest.0;
    }
    match kind {
        IndexType::Closest => closest.0,
        IndexType::Floor => lower.map_or(closest.0, |(i, _)| i),
        IndexType::Ceil => higher.map_or(closest.0, |(i, _)| i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Color;

    fn triangle() -> PlotData {
        PlotData::from_points([Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)])
            .expect("valid curve")
    }

    #[test]
    fn bounds_skip_non_finite_points() {
        let data = PlotData::from_vecs(vec![0.0, f64::NAN, 4.0], vec![1.0, 2.0, f64::INFINITY])
            .expect("valid curve");
        assert_eq!(data.bounding_rect(), PlotRect::new(0.0, 1.0, 0.0, 0.0));
        let none = PlotData::from_vecs(vec![f64::NAN], vec![1.0]).expect("valid curve");
        assert!(none.bounding_rect().width < 0.0);
        assert!(!none.bounding_rect().has_area());
        assert_eq!(triangle().bounding_rect(), PlotRect::new(0.0, 0.0, 2.0, 1.0));
    }

    #[test]
    fn creation_limits() {
        assert!(matches!(PlotData::zeroed(0), Err(PlotError::NoPoints)));
        assert!(matches!(
            PlotData::zeroed(MAX_CURVE_POINTS + 1),
            Err(PlotError::TooManyPoints { .. })
        ));
        assert!(matches!(
            PlotData::from_vecs(vec![1.0], vec![1.0, 2.0]),
            Err(PlotError::LengthMismatch { x: 1, y: 2 })
        ));
    }

    #[test]
    fn clones_share_until_written() {
        let a = triangle();
        let mut b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(a.is_shared());
        b.set_y(1, 5.0).expect("in range");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.y(1), Some(1.0));
        assert_eq!(b.y(1), Some(5.0));
        assert_eq!(b.bounding_rect().top(), 5.0);

        let c = a.detach();
        assert!(!c.ptr_eq(&a));
        assert_eq!(c, a);
    }

    #[test]
    fn single_point_edits_recompute_bounds() {
        let mut data = triangle();
        data.set_point(2, Point::new(-3.0, -1.0)).expect("in range");
        assert_eq!(data.bounding_rect(), PlotRect::new(-3.0, -1.0, 4.0, 2.0));
        data.set_point(2, Point::new(0.5, 0.5)).expect("in range");
        assert_eq!(data.bounding_rect(), PlotRect::new(0.0, 0.0, 1.0, 1.0));
        assert!(matches!(
            data.set_x(3, 0.0),
            Err(PlotError::InvalidDataIndex { index: 3, len: 3 })
        ));
    }

    #[test]
    fn raw_edits_need_explicit_recalc() {
        let mut data = triangle();
        data.ys_mut()[1] = 10.0;
        assert_eq!(data.bounding_rect().height, 1.0);
        data.calc_bounding_rect();
        assert_eq!(data.bounding_rect().height, 10.0);
    }

    #[test]
    fn index_lookup() {
        let data = PlotData::from_vecs(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 10.0, 20.0, 30.0])
            .expect("valid curve");
        assert_eq!(data.index_from_x(1.4, IndexType::Closest), 1);
        assert_eq!(data.index_from_x(1.6, IndexType::Closest), 2);
        assert_eq!(data.index_from_x(1.6, IndexType::Floor), 1);
        assert_eq!(data.index_from_x(1.4, IndexType::Ceil), 2);
        assert_eq!(data.index_from_x(2.0, IndexType::Floor), 2);
        assert_eq!(data.index_from_x(-5.0, IndexType::Ceil), 0);
        assert_eq!(data.index_from_x(9.0, IndexType::Floor), 3);
        assert_eq!(data.index_from_y(19.0, IndexType::Floor), 1);
        assert_eq!(data.index_from_xy(2.9, 29.0, 0.0), 3);
        assert_eq!(data.index_from_xy(0.0, 30.0, 0.5), 0);
    }

    #[test]
    fn interpolates_y() {
        let data = triangle();
        assert_eq!(data.y_at(0.5), 0.5);
        assert_eq!(data.y_at(1.0), 1.0);
        assert_eq!(data.y_at(1.75), 0.25);
        assert_eq!(data.y_at(5.0), 0.0);
    }

    #[test]
    fn resize_insert_remove() {
        let mut data = triangle();
        data.resize(5).expect("resize");
        assert_eq!(data.len(), 5);
        data.set_x_step_values(10.0, 2.0);
        assert_eq!(data.xs(), &[10.0, 12.0, 14.0, 16.0, 18.0]);
        assert!(data.is_x_ordered());

        let extra = PlotData::from_points([Point::new(0.0, 7.0)]).expect("valid curve");
        data.insert(1, &extra).expect("insert");
        assert_eq!(data.point(1), Some(Point::new(0.0, 7.0)));
        assert!(!data.is_x_ordered());

        data.remove(RangeInt::new(0, 1)).expect("remove");
        assert_eq!(data.len(), 4);
        assert!(matches!(data.remove(RangeInt::new(0, 3)), Err(PlotError::NoPoints)));

        data.append(&extra).expect("append");
        assert_eq!(data.len(), 5);
        let sub = data.sub_data(RangeInt::new(3, 4)).expect("sub");
        assert_eq!(sub.ys(), &[0.0, 7.0]);
    }

    #[test]
    fn style_and_name() {
        let style = CurveStyle {
            normal: Pen::new(Color::GREEN, 2),
            ..CurveStyle::default()
        };
        let mut data = triangle().with_style(&style).with_name("tri");
        assert_eq!(data.pen(PenKind::Normal), Pen::new(Color::GREEN, 2));
        assert_eq!(data.name(), "tri");
        data.set_pen(PenKind::Selected, Pen::new(Color::BLACK, 3));
        assert_eq!(data.style().selected.width, 3);
    }
}
