//! Mergeable intervals and ordered interval sets.
//!
//! [`RangeSelection`] keeps its intervals sorted by `min`, non-overlapping and,
//! for integer bounds, separated by at least one unselected value. Curves use
//! a `RangeSelection<usize>` to track selected point indices.

use std::cmp::Ordering;
use std::fmt;

/// Bound type of an [`Interval`].
///
/// The step functions define what "touching" means: integer intervals merge
/// when adjacent, floating-point intervals only when they overlap.
pub trait RangeBound: Copy + PartialOrd + fmt::Debug {
    /// Smallest representable bound.
    const LOWEST: Self;
    /// Largest representable bound.
    const HIGHEST: Self;

    /// Next value above `self` (saturating).
    fn step_up(self) -> Self;

    /// Next value below `self` (saturating).
    fn step_down(self) -> Self;
}

impl RangeBound for usize {
    const LOWEST: Self = 0;
    const HIGHEST: Self = usize::MAX;

    fn step_up(self) -> Self {
        self.saturating_add(1)
    }

    fn step_down(self) -> Self {
        self.saturating_sub(1)
    }
}

impl RangeBound for f64 {
    const LOWEST: Self = f64::NEG_INFINITY;
    const HIGHEST: Self = f64::INFINITY;

    fn step_up(self) -> Self {
        self
    }

    fn step_down(self) -> Self {
        self
    }
}

/// Inclusive interval `[min, max]`. Empty when `min > max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval<T> {
    /// Lower bound.
    pub min: T,
    /// Upper bound.
    pub max: T,
}

/// Interval of point indices.
pub type RangeInt = Interval<usize>;
/// Interval of real values.
pub type RangeDouble = Interval<f64>;

/// Outcome of [`Interval::delete`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deletion<T> {
    /// Nothing was removed.
    None,
    /// The interval was shortened or emptied.
    Trimmed,
    /// The removed range was strictly inside; `self` keeps the left part.
    Split {
        /// Remainder to the right of the removed range.
        right: Interval<T>,
    },
}

impl<T: RangeBound> Interval<T> {
    /// Create an interval. Bounds are not reordered.
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Interval holding exactly one value.
    pub fn point(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// The canonical empty interval.
    pub fn empty() -> Self {
        Self {
            min: T::HIGHEST,
            max: T::LOWEST,
        }
    }

    /// True when `min > max` (or the bounds are unordered).
    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }

    /// Check whether a value lies inside.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Check whether `other` lies entirely inside.
    pub fn contains_range(&self, other: &Self) -> bool {
        !other.is_empty() && self.min <= other.min && other.max <= self.max
    }

    /// Where a value falls relative to this interval.
    pub fn position(&self, value: T) -> Ordering {
        if value < self.min {
            Ordering::Less
        } else if value > self.max {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Overlapping or, for integer bounds, adjacent.
    pub fn touches(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.step_down() <= other.max
            && self.max.step_up() >= other.min
    }

    /// Share at least one value.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_empty() && !other.is_empty() && self.min <= other.max && self.max >= other.min
    }

    /// Common part of two intervals.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        let min = if self.min > other.min { self.min } else { other.min };
        let max = if self.max < other.max { self.max } else { other.max };
        Some(Self { min, max })
    }

    /// Grow to include a value. Returns whether the bounds changed.
    pub fn combine_value(&mut self, value: T) -> bool {
        if self.is_empty() {
            *self = Self::point(value);
            return true;
        }
        if value < self.min {
            self.min = value;
            true
        } else if value > self.max {
            self.max = value;
            true
        } else {
            false
        }
    }

    /// Grow to cover `other`.
    ///
    /// With `only_if_touching` the union is skipped unless the intervals touch.
    /// Returns whether the bounds changed.
    pub fn combine(&mut self, other: &Self, only_if_touching: bool) -> bool {
        if other.is_empty() {
            return false;
        }
        if self.is_empty() {
            *self = *other;
            return true;
        }
        if only_if_touching && !self.touches(other) {
            return false;
        }
        let mut changed = false;
        if other.min < self.min {
            self.min = other.min;
            changed = true;
        }
        if other.max > self.max {
            self.max = other.max;
            changed = true;
        }
        changed
    }

    /// Remove `other` from this interval.
    pub fn delete(&mut self, other: &Self) -> Deletion<T> {
        if !self.intersects(other) {
            return Deletion::None;
        }
        let before = *self;
        if other.min <= self.min {
            if other.max >= self.max {
                *self = Self::empty();
            } else {
                self.min = other.max.step_up();
            }
        } else if other.max >= self.max {
            self.max = other.min.step_down();
        } else {
            let right = Self::new(other.max.step_up(), self.max);
            self.max = other.min.step_down();
            return Deletion::Split { right };
        }
        if *self == before {
            Deletion::None
        } else {
            Deletion::Trimmed
        }
    }
}

impl Interval<usize> {
    /// Number of indices covered.
    pub fn count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.max - self.min + 1
        }
    }

    /// Move both bounds, saturating at the index limits.
    pub fn shift(&mut self, delta: isize) {
        self.min = self.min.saturating_add_signed(delta);
        self.max = self.max.saturating_add_signed(delta);
    }
}

impl Interval<f64> {
    /// Distance between the bounds.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Move both bounds.
    pub fn shift(&mut self, delta: f64) {
        self.min += delta;
        self.max += delta;
    }
}

/// Result of [`RangeSelection::nearest_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearestRange {
    /// Below every stored interval, or the set is empty.
    Before,
    /// Inside interval `i`, or in the gap directly after it.
    At(usize),
    /// Above every stored interval.
    After,
}

/// Ordered, auto-merging set of intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSelection<T> {
    ranges: Vec<Interval<T>>,
}

impl<T> Default for RangeSelection<T> {
    fn default() -> Self {
        Self { ranges: Vec::new() }
    }
}

impl<T: RangeBound> RangeSelection<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored intervals in ascending order.
    pub fn ranges(&self) -> &[Interval<T>] {
        &self.ranges
    }

    /// Number of stored intervals.
    pub fn count(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Interval at `index`.
    pub fn get(&self, index: usize) -> Option<&Interval<T>> {
        self.ranges.get(index)
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Index of the interval containing `value`. O(log n).
    pub fn index_of(&self, value: T) -> Option<usize> {
        self.ranges
            .binary_search_by(|range| range.position(value).reverse())
            .ok()
    }

    /// Index of the interval that fully contains `range`.
    pub fn index_of_range(&self, range: &Interval<T>) -> Option<usize> {
        let index = self.index_of(range.min)?;
        self.ranges[index].contains_range(range).then_some(index)
    }

    /// Check whether `value` is selected.
    pub fn contains(&self, value: T) -> bool {
        self.index_of(value).is_some()
    }

    /// Locate `value` relative to the stored intervals.
    pub fn nearest_index(&self, value: T) -> NearestRange {
        let (Some(first), Some(last)) = (self.ranges.first(), self.ranges.last()) else {
            return NearestRange::Before;
        };
        if value < first.min {
            return NearestRange::Before;
        }
        if value > last.max {
            return NearestRange::After;
        }
        let index = self.ranges.partition_point(|range| range.max < value);
        if self.ranges[index].contains(value) {
            NearestRange::At(index)
        } else {
            NearestRange::At(index - 1)
        }
    }

    /// Smallest interval covering every stored interval.
    pub fn bounding_range(&self) -> Option<Interval<T>> {
        let first = self.ranges.first()?;
        let last = self.ranges.last()?;
        Some(Interval::new(first.min, last.max))
    }

    /// Add `range`, merging with touching neighbours.
    ///
    /// Returns whether any value became selected.
    pub fn select_range(&mut self, range: Interval<T>) -> bool {
        if range.is_empty() {
            log::error!("select_range called with empty range {range:?}");
            return false;
        }
        let start = self
            .ranges
            .partition_point(|existing| existing.max.step_up() < range.min);
        let mut end = start;
        while end < self.ranges.len() && self.ranges[end].min.step_down() <= range.max {
            end += 1;
        }
        if end == start + 1 && self.ranges[start].contains_range(&range) {
            return false;
        }
        let mut merged = range;
        for existing in &self.ranges[start..end] {
            merged.combine(existing, false);
        }
        self.ranges.splice(start..end, [merged]);
        true
    }

    /// Remove `range`, trimming or splitting stored intervals.
    ///
    /// Returns whether any value became deselected.
    pub fn deselect_range(&mut self, range: Interval<T>) -> bool {
        if range.is_empty() {
            log::error!("deselect_range called with empty range {range:?}");
            return false;
        }
        let mut done = false;
        let mut index = self.ranges.partition_point(|existing| existing.max < range.min);
        while index < self.ranges.len() && self.ranges[index].min <= range.max {
            match self.ranges[index].delete(&range) {
                Deletion::None => index += 1,
                Deletion::Trimmed => {
                    done = true;
                    if self.ranges[index].is_empty() {
                        self.ranges.remove(index);
                    } else {
                        index += 1;
                    }
                }
                Deletion::Split { right } => {
                    done = true;
                    self.ranges.insert(index + 1, right);
                    index += 2;
                }
            }
        }
        done
    }

    /// Clip every stored interval to `range`, dropping those fully outside.
    pub fn bound_ranges(&mut self, range: Interval<T>) -> bool {
        if range.is_empty() {
            log::error!("bound_ranges called with empty range {range:?}");
            return false;
        }
        let before = self.ranges.len();
        self.ranges.retain(|existing| existing.intersects(&range));
        let mut changed = before != self.ranges.len();
        for existing in &mut self.ranges {
            if existing.min < range.min {
                existing.min = range.min;
                changed = true;
            }
            if existing.max > range.max {
                existing.max = range.max;
                changed = true;
            }
        }
        changed
    }
}

impl RangeSelection<usize> {
    /// Total number of selected indices.
    pub fn item_count(&self) -> usize {
        self.ranges.iter().map(Interval::count).sum()
    }
}
