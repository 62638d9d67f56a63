//! The plot controller.
//!
//! [`PlotCtrl`] owns the curves, their selections, the cursor, markers and
//! the view. Every state change marks the affected sub-windows dirty; the
//! host asks [`PlotCtrl::dirty`] what to repaint and calls
//! [`PlotCtrl::paint`] for each sub-window. Changes the host may refuse are
//! sent to the [`PlotListener`] first.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::axis::{
    AxisConfig, AxisKind, AxisTicks, auto_calc_ticks, corrected_axis, tick_positions,
};
use crate::data::{IndexType, PlotData};
use crate::draw::{
    AreaDrawer, AxisDrawer, CurveDrawer, DrawContext, Drawer, GridMode, KeyDrawer, MarkerDrawer,
    draw_drag_marker,
};
use crate::error::PlotError;
use crate::event::{Accepted, ChangeRequest, NullListener, PlotEvent, PlotListener};
use crate::geom::{DevicePoint, DeviceRect, DeviceSize, PlotRect, Point};
use crate::interaction::{
    AutoScrollTimer, DragMarker, DragState, Key, KeyAction, Modifiers, MouseCapture, MouseEvent,
    MouseEventKind, MouseFunction, autoscroll_delta, key_action,
};
use crate::marker::PlotMarker;
use crate::range::{RangeInt, RangeSelection};
use crate::redraw::{DirtyRegions, RedrawNeed, SubWindow};
use crate::render::{DeviceSurface, Pen};
use crate::style::{PlotConfig, SelectionType};
use crate::transform::{
    ViewTransform, Zoom, fix_aspect_ratio, origin_for_centered_zoom, view_for_zoom, zoom_for_view,
};
use crate::view::{ViewHistory, curve_bounding_rect};

/// Click tolerance for hitting a data point, in pixels.
const HIT_TOLERANCE: f64 = 2.0;
/// Share of the view scrolled by one wheel notch.
const WHEEL_FRACTION: f64 = 0.25;
/// Margin added around the active curve by the End key, as a share of its extent.
const FIT_MARGIN_DIVISOR: f64 = 80.0;
/// Pixels kept between the cursor and the view edge when scrolling it into view.
const CURSOR_SCROLL_MARGIN: f64 = 4.0;

/// The data cursor: a point of one curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub curve: usize,
    pub index: usize,
    pub point: Point,
}

/// Placement of the sub-windows inside the control, in control pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlotLayout {
    pub area: DeviceRect,
    pub x_axis: DeviceRect,
    pub y_axis: DeviceRect,
    /// Gap between the axis window edges and the plot area.
    pub area_border: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DrawFlags {
    symbols: bool,
    lines: bool,
    spline: bool,
    grid: bool,
    ticks: bool,
    key: bool,
}

/// Points a selection call applies to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SelectRegion {
    X { min: f64, max: f64 },
    Y { min: f64, max: f64 },
    Rect(PlotRect),
}

impl SelectRegion {
    /// A rectangle with no height is an X range and one with no width a Y range.
    fn from_rect(rect: PlotRect) -> Self {
        if rect.height <= 0.0 {
            Self::X {
                min: rect.left(),
                max: rect.right(),
            }
        } else if rect.width <= 0.0 {
            Self::Y {
                min: rect.bottom(),
                max: rect.top(),
            }
        } else {
            Self::Rect(rect)
        }
    }

    fn contains(&self, point: Point) -> bool {
        match *self {
            Self::X { min, max } => point.x >= min && point.x <= max,
            Self::Y { min, max } => point.y >= min && point.y <= max,
            Self::Rect(rect) => rect.contains(point),
        }
    }

    fn x_span(&self) -> (f64, f64) {
        match *self {
            Self::X { min, max } => (min, max),
            Self::Y { .. } => (f64::NEG_INFINITY, f64::INFINITY),
            Self::Rect(rect) => (rect.left(), rect.right()),
        }
    }

    /// Name of the first non-finite bound, if any.
    fn non_finite(&self) -> Option<&'static str> {
        match *self {
            Self::X { min, max } => (!(min.is_finite() && max.is_finite())).then_some("selection x range"),
            Self::Y { min, max } => (!(min.is_finite() && max.is_finite())).then_some("selection y range"),
            Self::Rect(rect) => (!rect.is_finite()).then_some("selection rectangle"),
        }
    }

    fn is_empty(&self) -> bool {
        match *self {
            Self::X { min, max } | Self::Y { min, max } => min > max,
            Self::Rect(rect) => rect.width <= 0.0 && rect.height <= 0.0,
        }
    }
}

/// Interactive x/y plot.
pub struct PlotCtrl {
    config: Arc<PlotConfig>,
    listener: Box<dyn PlotListener + Send>,
    curves: Vec<PlotData>,
    selections: Vec<RangeSelection<usize>>,
    active: Option<usize>,
    cursor: Option<(usize, usize)>,
    markers: Vec<PlotMarker>,
    view: PlotRect,
    zoom: Zoom,
    layout: PlotLayout,
    default_rect: PlotRect,
    curve_bounds: PlotRect,
    aspect_ratio: Option<f64>,
    history: ViewHistory,
    x_ticks: AxisTicks,
    y_ticks: AxisTicks,
    x_axis: AxisConfig,
    y_axis: AxisConfig,
    correct_ticks: bool,
    selection_type: SelectionType,
    flags: DrawFlags,
    mouse_function: MouseFunction,
    drag_marker: DragMarker,
    key_string: String,
    batch_depth: usize,
    queued: Vec<PlotEvent>,
    deferred: RedrawNeed,
    dirty: DirtyRegions,
    capture: MouseCapture,
    timer: AutoScrollTimer,
    drag: DragState,
    area_mouse: DevicePoint,
    axis_mouse: DevicePoint,
}

impl fmt::Debug for PlotCtrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotCtrl")
            .field("curves", &self.curves.len())
            .field("active", &self.active)
            .field("view", &self.view)
            .field("zoom", &self.zoom)
            .field("batch_depth", &self.batch_depth)
            .finish_non_exhaustive()
    }
}

impl PlotCtrl {
    /// Create an empty plot showing the configured default rectangle.
    pub fn new(config: Arc<PlotConfig>) -> Self {
        let area = config.area_min_size;
        let view = config.default_plot_rect;
        let mut plot = Self {
            listener: Box::new(NullListener),
            curves: Vec::new(),
            selections: Vec::new(),
            active: None,
            cursor: None,
            markers: Vec::new(),
            view,
            zoom: zoom_for_view(area, &view),
            layout: PlotLayout {
                area: DeviceRect::from_size(area),
                ..PlotLayout::default()
            },
            default_rect: view,
            curve_bounds: view,
            aspect_ratio: None,
            history: ViewHistory::new(config.history_capacity),
            x_ticks: AxisTicks::default(),
            y_ticks: AxisTicks::default(),
            x_axis: AxisConfig::new().with_visible(config.show_x_axis),
            y_axis: AxisConfig::new().with_visible(config.show_y_axis),
            correct_ticks: config.correct_ticks,
            selection_type: config.selection_type,
            flags: DrawFlags {
                symbols: config.draw_symbols,
                lines: config.draw_lines,
                spline: config.draw_spline,
                grid: config.draw_grid,
                ticks: config.draw_ticks,
                key: config.show_key,
            },
            mouse_function: config.mouse_function,
            drag_marker: config.drag_marker,
            key_string: String::new(),
            batch_depth: 0,
            queued: Vec::new(),
            deferred: RedrawNeed::NONE,
            dirty: DirtyRegions::new(),
            capture: MouseCapture::default(),
            timer: AutoScrollTimer::new(Duration::from_millis(config.autoscroll_interval_ms)),
            drag: DragState::default(),
            area_mouse: DevicePoint::default(),
            axis_mouse: DevicePoint::default(),
            config,
        };
        plot.redraw(RedrawNeed::ALL);
        plot
    }

    /// Route requests and notifications to `listener`.
    pub fn with_listener(mut self, listener: impl PlotListener + Send + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn set_listener(&mut self, listener: Box<dyn PlotListener + Send>) {
        self.listener = listener;
    }

    /// Access the configuration the plot was built with.
    pub fn config(&self) -> &Arc<PlotConfig> {
        &self.config
    }

    // ------------------------------------------------------------------
    // Events

    fn notify(&mut self, event: PlotEvent) {
        if self.batch_depth > 0 {
            self.queued.push(event);
        } else {
            self.listener.notify(&event);
        }
    }

    fn request(&mut self, request: ChangeRequest) -> bool {
        match self.listener.request_change(&request) {
            Ok(Accepted) => true,
            Err(_) => {
                log::debug!("change vetoed: {request:?}");
                false
            }
        }
    }

    fn check_finite(&mut self, value: f64, what: &'static str) -> bool {
        if value.is_finite() {
            return true;
        }
        self.reject_non_finite(what);
        false
    }

    fn reject_non_finite(&mut self, what: &'static str) {
        log::warn!("{what} is not finite, update ignored");
        self.notify(PlotEvent::Error(PlotError::non_finite(what)));
    }

    fn check_curve_index(&self, index: usize) -> bool {
        if index < self.curves.len() {
            return true;
        }
        log::error!(
            "{}",
            PlotError::InvalidCurveIndex {
                index,
                count: self.curves.len(),
            }
        );
        false
    }

    // ------------------------------------------------------------------
    // Curves

    /// Add a curve, optionally making it active. Returns its index.
    pub fn add_curve(&mut self, curve: PlotData, make_active: bool) -> usize {
        let index = self.curves.len();
        log::debug!("adding curve {index} with {} points", curve.len());
        self.curves.push(curve);
        self.selections.push(RangeSelection::new());
        self.calc_curve_bounds();
        self.update_key_string();
        self.notify(PlotEvent::CurveAdded { index });

        if make_active {
            self.set_active_index(Some(index));
        }
        if !(self.config.fit_on_new_curve && self.set_zoom(-1.0, -1.0, 0.0, 0.0)) {
            self.redraw(RedrawNeed::AREA);
        }
        index
    }

    /// Delete the curve at `index`, or every curve with `None`.
    pub fn delete_curve(&mut self, index: Option<usize>) -> bool {
        if let Some(index) = index
            && !self.check_curve_index(index)
        {
            return false;
        }
        if !self.request(ChangeRequest::DeleteCurve { index }) {
            return false;
        }

        self.begin_batch();
        match index {
            None => {
                self.invalidate_cursor();
                self.clear_selected_ranges(None);
                self.selections.clear();
                self.curves.clear();
            }
            Some(index) => {
                match self.cursor {
                    Some((curve, _)) if curve == index => self.invalidate_cursor(),
                    Some((curve, point)) if curve > index => self.cursor = Some((curve - 1, point)),
                    _ => {}
                }
                self.clear_selected_ranges(Some(index));
                self.selections.remove(index);
                self.curves.remove(index);
            }
        }

        let count = self.curves.len();
        let active = match (self.active, index) {
            (None, _) | (_, None) => None,
            (Some(active), Some(index)) if active > index => Some(active - 1),
            (Some(active), Some(_)) => Some(active.min(count.saturating_sub(1))).filter(|_| count > 0),
        };
        if active != self.active {
            self.active = active;
            self.notify(PlotEvent::ActiveCurveChanged { index: active });
        }
        self.end_batch(false);

        log::debug!("deleted curve {index:?}, {count} left");
        self.calc_curve_bounds();
        self.update_key_string();
        self.redraw(RedrawNeed::AREA);
        self.notify(PlotEvent::CurveDeleted { index });
        true
    }

    pub fn curve(&self, index: usize) -> Option<&PlotData> {
        self.curves.get(index)
    }

    /// Mutable access to a curve.
    ///
    /// Call [`PlotCtrl::curves_changed`] after editing points so bounds,
    /// selections and the cursor follow.
    pub fn curve_mut(&mut self, index: usize) -> Option<&mut PlotData> {
        self.curves.get_mut(index)
    }

    pub fn curves(&self) -> &[PlotData] {
        &self.curves
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    /// Re-read every curve after direct edits.
    pub fn curves_changed(&mut self) {
        for (curve, selection) in self.curves.iter().zip(&mut self.selections) {
            if curve.is_empty() {
                selection.clear();
            } else if !selection.is_empty() {
                selection.bound_ranges(RangeInt::new(0, curve.len() - 1));
            }
        }
        if let Some((curve, index)) = self.cursor
            && self.curves.get(curve).is_none_or(|data| index >= data.len())
        {
            self.invalidate_cursor();
        }
        self.calc_curve_bounds();
        self.update_key_string();
        self.redraw(RedrawNeed::AREA);
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_curve(&self) -> Option<&PlotData> {
        self.active.and_then(|index| self.curves.get(index))
    }

    /// Make the curve at `index` active, or none.
    ///
    /// Returns false for an invalid index, an unchanged value or a veto.
    pub fn set_active_index(&mut self, index: Option<usize>) -> bool {
        if let Some(index) = index
            && !self.check_curve_index(index)
        {
            return false;
        }
        if index == self.active {
            return false;
        }
        if !self.request(ChangeRequest::ActiveCurve {
            from: self.active,
            to: index,
        }) {
            return false;
        }
        self.active = index;
        self.notify(PlotEvent::ActiveCurveChanged { index });
        self.redraw(RedrawNeed::AREA);
        true
    }

    fn calc_curve_bounds(&mut self) {
        self.curve_bounds = curve_bounding_rect(
            self.curves.iter().map(PlotData::bounding_rect),
            self.default_rect,
        );
    }

    fn update_key_string(&mut self) {
        let names: Vec<String> = self
            .curves
            .iter()
            .enumerate()
            .map(|(index, curve)| match curve.name() {
                "" => format!("Curve {index}"),
                name => name.to_string(),
            })
            .collect();
        self.key_string = names.join("\n");
    }

    /// One curve name per line, as drawn in the key.
    pub fn key_string(&self) -> &str {
        &self.key_string
    }

    // ------------------------------------------------------------------
    // Layout

    /// Lay out the axes and plot area inside a control of `client` size.
    ///
    /// `axis_font` is the character cell of the axis font. Sizes below
    /// 2×2 are ignored and the current layout is returned.
    pub fn layout(&mut self, client: DeviceSize, axis_font: DeviceSize) -> PlotLayout {
        if client.width < 2 || client.height < 2 {
            return self.layout;
        }
        let area_border = axis_font.height / 2;
        let left_width = if self.y_axis.is_visible() {
            self.config.left_axis_text_width
        } else {
            1
        };
        let bottom_height = if self.x_axis.is_visible() {
            axis_font.height
        } else {
            area_border
        };
        let area_width = client.width - left_width - 2 * area_border;
        let area_height = client.height - bottom_height - area_border;

        let y_axis = DeviceRect::new(0, 0, left_width, area_height + 2 * area_border);
        let x_axis = DeviceRect::new(
            y_axis.right() + 1,
            y_axis.bottom() - area_border + 1,
            area_width + 2 * area_border,
            bottom_height,
        );
        let min = self.config.area_min_size;
        let area = DeviceRect::new(
            y_axis.right() + 1 + area_border,
            area_border,
            area_width.max(min.width),
            area_height.max(min.height),
        );

        let layout = PlotLayout {
            area,
            x_axis,
            y_axis,
            area_border,
        };
        if layout == self.layout {
            return layout;
        }
        self.layout = layout;
        self.set_area_size(area.size());
        self.layout
    }

    /// Current sub-window placement.
    pub fn plot_layout(&self) -> PlotLayout {
        self.layout
    }

    /// Resize the plot area, keeping the view rectangle.
    pub fn set_area_size(&mut self, size: DeviceSize) {
        let min = self.config.area_min_size;
        let size = DeviceSize::new(size.width.max(min.width), size.height.max(min.height));
        self.layout.area.width = size.width;
        self.layout.area.height = size.height;

        self.zoom = zoom_for_view(size, &self.view);
        if let Some(ratio) = self.aspect_ratio {
            let (zoom, origin) = fix_aspect_ratio(size, self.zoom, self.view.origin(), ratio);
            self.zoom = zoom;
            self.view = view_for_zoom(size, zoom, origin);
        }
        log::debug!("plot area resized to {}x{}", size.width, size.height);
        self.notify(PlotEvent::ViewChanged { view: self.view });
        self.redraw(RedrawNeed::ALL);
    }

    pub fn area_size(&self) -> DeviceSize {
        self.layout.area.size()
    }

    // ------------------------------------------------------------------
    // View

    pub fn view_rect(&self) -> PlotRect {
        self.view
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    /// Snapshot of the plot-to-device mapping for the plot area.
    pub fn transform(&self) -> ViewTransform {
        ViewTransform::from_parts(self.view, self.zoom, self.area_size())
    }

    pub fn plot_to_device_x(&self, x: f64) -> i32 {
        self.transform().plot_to_device_x(x)
    }

    pub fn plot_to_device_y(&self, y: f64) -> i32 {
        self.transform().plot_to_device_y(y)
    }

    pub fn device_to_plot_x(&self, x: f64) -> f64 {
        self.transform().device_to_plot_x(x)
    }

    pub fn device_to_plot_y(&self, y: f64) -> f64 {
        self.transform().device_to_plot_y(y)
    }

    /// Set zoom and lower-left origin.
    ///
    /// A zoom of zero or less fits that axis to the curves. Non-finite
    /// results are reported as [`PlotEvent::Error`] and leave the view
    /// unchanged. Returns false if the view did not change, or if the
    /// update was rejected or vetoed.
    pub fn set_zoom(&mut self, zoom_x: f64, zoom_y: f64, origin_x: f64, origin_y: f64) -> bool {
        let area = self.area_size();
        let mut zoom = Zoom::new(zoom_x, zoom_y);
        let mut origin = Point::new(origin_x, origin_y);
        if zoom.x <= 0.0 {
            zoom.x = f64::from(area.width) / self.curve_bounds.width;
            origin.x = self.curve_bounds.x;
        }
        if zoom.y <= 0.0 {
            zoom.y = f64::from(area.height) / self.curve_bounds.height;
            origin.y = self.curve_bounds.y;
        }
        if let Some(ratio) = self.aspect_ratio {
            (zoom, origin) = fix_aspect_ratio(area, zoom, origin, ratio);
        }
        let view = view_for_zoom(area, zoom, origin);

        let checks = [
            (zoom.x, "x zoom"),
            (zoom.y, "y zoom"),
            (origin.x, "x origin"),
            (origin.y, "y origin"),
            (view.width, "view width"),
            (view.height, "view height"),
        ];
        for (value, what) in checks {
            if !self.check_finite(value, what) {
                return false;
            }
        }

        let x_changed = self.view.x != origin.x || self.zoom.x != zoom.x;
        let y_changed = self.view.y != origin.y || self.zoom.y != zoom.y;
        if !(x_changed || y_changed) {
            return false;
        }
        if !self.request(ChangeRequest::View {
            from: self.view,
            to: view,
        }) {
            return false;
        }
        self.zoom = zoom;
        self.view = view;

        let mut need = RedrawNeed::AREA;
        if x_changed {
            need |= RedrawNeed::X_AXIS;
        }
        if y_changed {
            need |= RedrawNeed::Y_AXIS;
        }
        self.redraw(need);

        log::debug!("view changed to {:?}", self.view);
        self.notify(PlotEvent::ViewChanged { view: self.view });
        true
    }

    /// Zoom into a rectangle of the plot area and remember the result.
    pub fn set_zoom_rect(&mut self, rect: DeviceRect) -> bool {
        if rect.width < 1 || rect.height < 1 {
            return false;
        }
        let area = self.area_size();
        let transform = self.transform();
        let origin_x = transform.device_to_plot_x(f64::from(rect.x));
        let origin_y = transform.device_to_plot_y(f64::from(rect.y + rect.height));
        let zoom_x = self.zoom.x * f64::from(area.width) / f64::from(rect.width);
        let zoom_y = self.zoom.y * f64::from(area.height) / f64::from(rect.height);

        let applied = self.set_zoom(zoom_x, zoom_y, origin_x, origin_y);
        if applied {
            self.history.push(self.view);
        }
        applied
    }

    /// Change the zoom keeping the view centre in place.
    pub fn set_zoom_centered(&mut self, zoom: Zoom) -> bool {
        if zoom.x > 0.0 && zoom.y > 0.0 {
            let origin = origin_for_centered_zoom(&self.view, self.zoom, zoom);
            self.set_zoom(zoom.x, zoom.y, origin.x, origin.y)
        } else {
            self.set_zoom(zoom.x, zoom.y, self.view.x, self.view.y)
        }
    }

    /// Move the lower-left corner of the view.
    pub fn set_origin(&mut self, x: f64, y: f64) -> bool {
        self.set_zoom(self.zoom.x, self.zoom.y, x, y)
    }

    /// Show exactly `view`.
    pub fn set_view_rect(&mut self, view: PlotRect) -> bool {
        let area = self.area_size();
        self.set_zoom(
            f64::from(area.width) / view.width,
            f64::from(area.height) / view.height,
            view.x,
            view.y,
        )
    }

    /// Fit the view to one curve, or to every curve with `None`.
    pub fn make_curve_visible(&mut self, index: Option<usize>) -> bool {
        let Some(index) = index else {
            return self.set_zoom(-1.0, -1.0, 0.0, 0.0);
        };
        if !self.check_curve_index(index) {
            return false;
        }
        let bounds = curve_bounding_rect(
            std::iter::once(self.curves[index].bounding_rect()),
            self.default_rect,
        );
        self.set_view_rect(bounds)
    }

    /// Step through the zoom history; stepping back past the start fits all curves.
    pub fn next_history_view(&mut self, forward: bool) -> bool {
        if let Some(current) = self.history.current()
            && current != self.view
        {
            self.set_view_rect(current);
        }
        if forward {
            match self.history.forward() {
                Some(view) => self.set_view_rect(view),
                None => false,
            }
        } else {
            match self.history.back() {
                Some(view) => self.set_view_rect(view),
                None => self.set_zoom(-1.0, -1.0, 0.0, 0.0),
            }
        }
    }

    pub fn history(&self) -> &ViewHistory {
        &self.history
    }

    /// Lock `zoom.x / zoom.y` to `ratio`, or unlock with `None`.
    pub fn set_fixed_aspect_ratio(&mut self, ratio: Option<f64>) {
        if let Some(ratio) = ratio
            && !(ratio.is_finite() && ratio > 0.0)
        {
            log::error!("invalid aspect ratio {ratio}");
            return;
        }
        self.aspect_ratio = ratio;
        if ratio.is_some() {
            self.set_zoom(self.zoom.x, self.zoom.y, self.view.x, self.view.y);
        }
    }

    pub fn fixed_aspect_ratio(&self) -> Option<f64> {
        self.aspect_ratio
    }

    /// Rectangle shown when no curve has usable bounds; also shows it now.
    pub fn set_default_bounding_rect(&mut self, rect: PlotRect) -> bool {
        if !rect.is_finite() || !rect.has_area() {
            log::error!("invalid default plot rect {rect:?}");
            return false;
        }
        self.default_rect = rect;
        self.calc_curve_bounds();
        let area = self.area_size();
        self.set_zoom(
            f64::from(area.width) / rect.width,
            f64::from(area.height) / rect.height,
            rect.x,
            rect.y,
        )
    }

    pub fn default_bounding_rect(&self) -> PlotRect {
        self.default_rect
    }

    /// Padded union of all curve bounds.
    pub fn curve_bounding_rect(&self) -> PlotRect {
        self.curve_bounds
    }

    // ------------------------------------------------------------------
    // Axes

    pub fn x_ticks(&self) -> &AxisTicks {
        &self.x_ticks
    }

    pub fn y_ticks(&self) -> &AxisTicks {
        &self.y_ticks
    }

    pub fn x_axis(&self) -> &AxisConfig {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &AxisConfig {
        &self.y_axis
    }

    pub fn set_x_axis(&mut self, axis: AxisConfig) {
        self.x_axis = axis;
        self.redraw(RedrawNeed::ALL);
    }

    pub fn set_y_axis(&mut self, axis: AxisConfig) {
        self.y_axis = axis;
        self.redraw(RedrawNeed::ALL);
    }

    pub fn correct_ticks(&self) -> bool {
        self.correct_ticks
    }

    /// Snap the first tick onto a whole pixel after view changes.
    pub fn set_correct_ticks(&mut self, correct: bool) {
        self.correct_ticks = correct;
        self.redraw(RedrawNeed::ALL);
    }

    fn update_ticks(&mut self, need: RedrawNeed) {
        if need.includes(SubWindow::XAxis) {
            self.x_ticks = self.calc_axis_ticks(AxisKind::X);
        }
        if need.includes(SubWindow::YAxis) {
            self.y_ticks = self.calc_axis_ticks(AxisKind::Y);
        }
    }

    fn calc_axis_ticks(&mut self, kind: AxisKind) -> AxisTicks {
        let area = self.area_size();
        let (start, end, window) = match kind {
            AxisKind::X => (self.view.left(), self.view.right(), area.width),
            AxisKind::Y => (self.view.bottom(), self.view.top(), area.height),
        };
        let mut ticks = auto_calc_ticks(
            kind,
            start,
            end,
            window,
            self.config.axis_font_size,
            self.config.min_exponential,
        );

        if self.correct_ticks && ticks.count > 0 {
            match corrected_axis(kind, &ticks, &self.transform()) {
                Some((zoom, origin)) if zoom.is_finite() && zoom > 0.0 && origin.is_finite() => {
                    match kind {
                        AxisKind::X => {
                            self.zoom.x = zoom;
                            self.view.x = origin;
                            self.view.width = f64::from(area.width) / zoom;
                        }
                        AxisKind::Y => {
                            self.zoom.y = zoom;
                            self.view.y = origin;
                            self.view.height = f64::from(area.height) / zoom;
                        }
                    }
                }
                _ => {
                    log::debug!("{kind:?} tick correction failed, hiding ticks");
                    ticks.count = 0;
                }
            }
        }

        let formatter = match kind {
            AxisKind::X => self.x_axis.formatter().clone(),
            AxisKind::Y => self.y_axis.formatter().clone(),
        };
        tick_positions(kind, &mut ticks, &self.transform(), &formatter);
        ticks
    }

    // ------------------------------------------------------------------
    // Selection

    pub fn selection_type(&self) -> SelectionType {
        self.selection_type
    }

    /// Change the selection policy; existing selections are cleared.
    pub fn set_selection_type(&mut self, selection_type: SelectionType) {
        if selection_type != self.selection_type {
            self.clear_selected_ranges(None);
        }
        self.selection_type = selection_type;
    }

    pub fn selected_ranges(&self, curve: usize) -> Option<&RangeSelection<usize>> {
        self.selections.get(curve)
    }

    pub fn selected_range_count(&self, curve: usize) -> usize {
        if !self.check_curve_index(curve) {
            return 0;
        }
        self.selections[curve].count()
    }

    /// Check whether one curve, or any curve with `None`, has selected points.
    pub fn has_selection(&self, curve: Option<usize>) -> bool {
        match curve {
            None => self.selections.iter().any(|selection| !selection.is_empty()),
            Some(curve) => self.check_curve_index(curve) && !self.selections[curve].is_empty(),
        }
    }

    /// Clear selections that conflict with selecting in `curve`.
    fn enforce_selection_policy(&mut self, curve: usize) -> bool {
        match self.selection_type {
            SelectionType::None | SelectionType::Multiple => false,
            SelectionType::Single => self.has_selection(None) && self.clear_selected_ranges(None),
            SelectionType::SingleCurve => {
                let mut done = false;
                for other in 0..self.curves.len() {
                    if other != curve && !self.selections[other].is_empty() {
                        done |= self.clear_selected_ranges(Some(other));
                    }
                }
                done
            }
            SelectionType::SinglePerCurve => {
                !self.selections[curve].is_empty() && self.clear_selected_ranges(Some(curve))
            }
        }
    }

    fn select_data(&mut self, curve: usize, range: RangeInt, select: bool) -> bool {
        if !self.check_curve_index(curve) {
            return false;
        }
        if range.is_empty() {
            log::error!("{}", PlotError::EmptyRange);
            return false;
        }
        if self.selection_type == SelectionType::None {
            return false;
        }
        let len = self.curves[curve].len();
        if range.max >= len {
            log::error!("{}", PlotError::InvalidDataIndex { index: range.max, len });
            return false;
        }

        // Policy clears and the new selection reach listeners together.
        self.begin_batch();
        if select {
            self.enforce_selection_policy(curve);
        }
        let selection = &mut self.selections[curve];
        let done = if select {
            selection.select_range(range)
        } else {
            selection.deselect_range(range)
        };
        if done {
            self.notify(PlotEvent::RangeSelectionChanged {
                curve,
                range,
                selected: select,
            });
            self.redraw(RedrawNeed::AREA);
        }
        self.end_batch(false);
        done
    }

    fn select_region(&mut self, curve: Option<usize>, region: SelectRegion, select: bool) -> bool {
        if let Some(curve) = curve
            && !self.check_curve_index(curve)
        {
            return false;
        }
        if region.is_empty() {
            log::error!("{}", PlotError::EmptyRange);
            return false;
        }
        if self.selection_type == SelectionType::None {
            return false;
        }
        if let Some(what) = region.non_finite() {
            self.reject_non_finite(what);
            return false;
        }

        self.begin_batch();
        let done = match curve {
            Some(curve) => {
                if select {
                    self.enforce_selection_policy(curve);
                }
                self.commit_region(curve, region, select)
            }
            None => {
                let mut done = false;
                for curve in 0..self.curves.len() {
                    if select {
                        self.enforce_selection_policy(curve);
                    }
                    done |= self.commit_region(curve, region, select);
                }
                done
            }
        };
        self.end_batch(false);
        done
    }

    /// Apply `region` to the selection of `curve`, notifying the changed span.
    fn commit_region(&mut self, curve: usize, region: SelectRegion, select: bool) -> bool {
        let data = &self.curves[curve];
        let bounds = data.bounding_rect();
        let (x_min, x_max) = region.x_span();
        if x_max < bounds.left() || x_min > bounds.right() {
            return false;
        }

        let selection = &mut self.selections[curve];
        let mut changed: Option<RangeInt> = None;
        for (index, point) in data.points().enumerate() {
            if !region.contains(point) {
                continue;
            }
            let range = RangeInt::point(index);
            let done = if select {
                selection.select_range(range)
            } else {
                selection.deselect_range(range)
            };
            if done {
                changed = Some(match changed {
                    Some(mut span) => {
                        span.max = index;
                        span
                    }
                    None => range,
                });
            }
        }

        let Some(range) = changed else {
            return false;
        };
        self.notify(PlotEvent::RangeSelectionChanged {
            curve,
            range,
            selected: select,
        });
        self.redraw(RedrawNeed::AREA);
        true
    }

    /// Select the points `range` of `curve`.
    pub fn select_data_range(&mut self, curve: usize, range: RangeInt) -> bool {
        self.select_data(curve, range, true)
    }

    pub fn deselect_data_range(&mut self, curve: usize, range: RangeInt) -> bool {
        self.select_data(curve, range, false)
    }

    /// Select the points inside `rect`.
    ///
    /// A rectangle without height selects by X only and one without width
    /// by Y only. `None` applies to every curve.
    pub fn select_rectangle(&mut self, curve: Option<usize>, rect: PlotRect) -> bool {
        self.select_region(curve, SelectRegion::from_rect(rect), true)
    }

    pub fn deselect_rectangle(&mut self, curve: Option<usize>, rect: PlotRect) -> bool {
        self.select_region(curve, SelectRegion::from_rect(rect), false)
    }

    pub fn select_x_range(&mut self, curve: Option<usize>, min: f64, max: f64) -> bool {
        self.select_region(curve, SelectRegion::X { min, max }, true)
    }

    pub fn deselect_x_range(&mut self, curve: Option<usize>, min: f64, max: f64) -> bool {
        self.select_region(curve, SelectRegion::X { min, max }, false)
    }

    pub fn select_y_range(&mut self, curve: Option<usize>, min: f64, max: f64) -> bool {
        self.select_region(curve, SelectRegion::Y { min, max }, true)
    }

    pub fn deselect_y_range(&mut self, curve: Option<usize>, min: f64, max: f64) -> bool {
        self.select_region(curve, SelectRegion::Y { min, max }, false)
    }

    /// Clear the selection of one curve, or of every curve with `None`.
    pub fn clear_selected_ranges(&mut self, curve: Option<usize>) -> bool {
        let Some(curve) = curve else {
            let mut done = false;
            for curve in 0..self.curves.len() {
                done |= self.clear_selected_ranges(Some(curve));
            }
            return done;
        };
        if !self.check_curve_index(curve) {
            return false;
        }
        if self.selections[curve].is_empty() {
            return false;
        }
        self.selections[curve].clear();
        let len = self.curves[curve].len();
        self.notify(PlotEvent::RangeSelectionChanged {
            curve,
            range: RangeInt::new(0, len.saturating_sub(1)),
            selected: false,
        });
        self.redraw(RedrawNeed::AREA);
        true
    }

    // ------------------------------------------------------------------
    // Cursor

    pub fn cursor(&self) -> Option<Cursor> {
        let (curve, index) = self.cursor?;
        let point = self.curves.get(curve)?.point(index)?;
        Some(Cursor {
            curve,
            index,
            point,
        })
    }

    pub fn cursor_point(&self) -> Option<Point> {
        self.cursor().map(|cursor| cursor.point)
    }

    pub fn is_cursor_valid(&self) -> bool {
        self.cursor().is_some()
    }

    /// Put the cursor on point `index` of `curve`.
    ///
    /// Returns false when the indices are invalid, the cursor is already
    /// there or the listener vetoes the move.
    pub fn set_cursor_data_index(&mut self, curve: usize, index: usize) -> bool {
        if !self.check_curve_index(curve) {
            return false;
        }
        let Some(point) = self.curves[curve].point(index) else {
            log::error!(
                "{}",
                PlotError::InvalidDataIndex {
                    index,
                    len: self.curves[curve].len(),
                }
            );
            return false;
        };
        if self.cursor == Some((curve, index)) {
            return false;
        }
        let to = Cursor {
            curve,
            index,
            point,
        };
        if !self.request(ChangeRequest::Cursor {
            from: self.cursor(),
            to: Some(to),
        }) {
            return false;
        }
        self.cursor = Some((curve, index));
        self.notify(PlotEvent::CursorChanged { cursor: Some(to) });
        self.redraw(RedrawNeed::AREA);
        true
    }

    /// Put the cursor on the point of `curve` nearest to `x`.
    pub fn set_cursor_x_point(&mut self, curve: usize, x: f64) -> bool {
        if !self.check_curve_index(curve) {
            return false;
        }
        let index = self.curves[curve].index_from_x(x, IndexType::Closest);
        self.set_cursor_data_index(curve, index)
    }

    pub fn invalidate_cursor(&mut self) {
        let was_valid = self.is_cursor_valid();
        self.cursor = None;
        if was_valid {
            self.notify(PlotEvent::CursorChanged { cursor: None });
            self.redraw(RedrawNeed::AREA);
        }
    }

    /// Scroll so the cursor is visible, or centre the view on it.
    pub fn make_cursor_visible(&mut self, center: bool) -> bool {
        let Some(point) = self.cursor_point() else {
            log::error!("make_cursor_visible without a valid cursor");
            return false;
        };
        let view = self.view;
        if center {
            return self.set_origin(point.x - view.width / 2.0, point.y - view.height / 2.0);
        }
        if view.contains(point) {
            return false;
        }

        let dx = CURSOR_SCROLL_MARGIN / self.zoom.x;
        let dy = CURSOR_SCROLL_MARGIN / self.zoom.y;
        let x = if point.x < view.left() {
            point.x - dx
        } else if point.x > view.right() {
            view.x + (point.x - view.right()) + dx
        } else {
            view.x
        };
        let y = if point.y < view.bottom() {
            point.y - dy
        } else if point.y > view.top() {
            view.y + (point.y - view.top()) + dy
        } else {
            view.y
        };
        self.set_origin(x, y)
    }

    // ------------------------------------------------------------------
    // Markers

    /// Add a marker, returning its index.
    pub fn add_marker(&mut self, marker: PlotMarker) -> usize {
        self.markers.push(marker);
        self.redraw(RedrawNeed::AREA);
        self.markers.len() - 1
    }

    pub fn remove_marker(&mut self, index: usize) -> Option<PlotMarker> {
        if index >= self.markers.len() {
            log::error!("invalid marker index {index}");
            return None;
        }
        self.redraw(RedrawNeed::AREA);
        Some(self.markers.remove(index))
    }

    pub fn markers(&self) -> &[PlotMarker] {
        &self.markers
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
        self.redraw(RedrawNeed::AREA);
    }

    // ------------------------------------------------------------------
    // Draw flags

    pub fn draw_symbols(&self) -> bool {
        self.flags.symbols
    }

    pub fn set_draw_symbols(&mut self, draw: bool) {
        self.flags.symbols = draw;
        self.redraw(RedrawNeed::AREA);
    }

    pub fn draw_lines(&self) -> bool {
        self.flags.lines
    }

    pub fn set_draw_lines(&mut self, draw: bool) {
        self.flags.lines = draw;
        self.redraw(RedrawNeed::AREA);
    }

    pub fn draw_spline(&self) -> bool {
        self.flags.spline
    }

    pub fn set_draw_spline(&mut self, draw: bool) {
        self.flags.spline = draw;
        self.redraw(RedrawNeed::AREA);
    }

    pub fn draw_grid(&self) -> bool {
        self.flags.grid
    }

    pub fn set_draw_grid(&mut self, draw: bool) {
        self.flags.grid = draw;
        self.redraw(RedrawNeed::AREA);
    }

    pub fn draw_ticks(&self) -> bool {
        self.flags.ticks
    }

    /// Draw short tick marks when the grid is off.
    pub fn set_draw_ticks(&mut self, draw: bool) {
        self.flags.ticks = draw;
        self.redraw(RedrawNeed::AREA);
    }

    pub fn show_key(&self) -> bool {
        self.flags.key
    }

    pub fn set_show_key(&mut self, show: bool) {
        self.flags.key = show;
        self.redraw(RedrawNeed::AREA);
    }

    // ------------------------------------------------------------------
    // Batching and redraw

    /// Hold back repaints and notifications until the matching [`PlotCtrl::end_batch`].
    ///
    /// Batches nest. Change requests are still answered immediately.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
        if self.batch_depth == 1 {
            self.dirty.suppress();
        }
    }

    /// Close a batch. The outermost close releases held repaints, forced
    /// to every sub-window with `force_redraw`, then delivers queued
    /// notifications in order.
    pub fn end_batch(&mut self, force_redraw: bool) {
        if self.batch_depth == 0 {
            log::error!("end_batch without begin_batch");
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }

        let mut need = std::mem::take(&mut self.deferred);
        if force_redraw {
            need = RedrawNeed::ALL;
        }
        self.dirty.release(force_redraw);
        self.update_ticks(need);

        for event in std::mem::take(&mut self.queued) {
            self.listener.notify(&event);
        }
    }

    pub fn is_batched(&self) -> bool {
        self.batch_depth > 0
    }

    /// Mark sub-windows for repaint, recalculating ticks for the axes in `need`.
    pub fn redraw(&mut self, need: RedrawNeed) {
        if self.batch_depth > 0 {
            self.deferred |= need;
            self.dirty.invalidate(need);
            return;
        }
        self.update_ticks(need);
        self.dirty.invalidate(need);
    }

    /// Sub-windows waiting for a repaint.
    pub fn dirty(&self) -> RedrawNeed {
        self.dirty.dirty()
    }

    pub fn dirty_regions(&self) -> &DirtyRegions {
        &self.dirty
    }

    /// Repaint `window` onto `surface` in the window's own coordinates.
    ///
    /// Returns false while a batch holds repaints back.
    pub fn paint(&mut self, window: SubWindow, surface: &mut dyn DeviceSurface) -> bool {
        if !self.dirty.begin_paint(window) {
            return false;
        }
        self.draw_window(window, surface);
        self.dirty.end_paint(window);
        true
    }

    /// Draw `window` without touching the repaint state.
    pub fn draw_window(&self, window: SubWindow, surface: &mut dyn DeviceSurface) {
        let transform = self.transform();
        match window {
            SubWindow::Area => self.draw_area(surface, &DrawContext::for_area(transform)),
            SubWindow::XAxis => {
                if !self.x_axis.is_visible() {
                    return;
                }
                let ctx = DrawContext::for_area(transform).with_rect(DeviceRect::from_size(self.layout.x_axis.size()));
                Drawer::XAxis(self.axis_drawer(AxisKind::X)).draw(surface, &ctx);
            }
            SubWindow::YAxis => {
                if !self.y_axis.is_visible() {
                    return;
                }
                let ctx = DrawContext::for_area(transform).with_rect(DeviceRect::from_size(self.layout.y_axis.size()));
                Drawer::YAxis(self.axis_drawer(AxisKind::Y)).draw(surface, &ctx);
            }
        }
    }

    fn axis_drawer(&self, kind: AxisKind) -> AxisDrawer<'_> {
        let (ticks, axis) = match kind {
            AxisKind::X => (&self.x_ticks, &self.x_axis),
            AxisKind::Y => (&self.y_ticks, &self.y_axis),
        };
        AxisDrawer {
            kind,
            ticks,
            title: axis.title(),
            offset: self.layout.area_border,
            font: self.config.axis_font,
            color: self.config.colors.axis_text,
            background: self.config.colors.background,
        }
    }

    fn draw_area(&self, surface: &mut dyn DeviceSurface, ctx: &DrawContext) {
        let colors = &self.config.colors;
        let border = Pen::new(colors.border, self.config.area_border_width.max(1) as u32);
        let grid = if self.flags.grid {
            GridMode::Grid
        } else if self.flags.ticks {
            GridMode::Ticks
        } else {
            GridMode::None
        };
        Drawer::Area(AreaDrawer {
            background: Some(colors.background),
            border,
            grid,
            grid_pen: Pen::new(colors.grid, 1),
            x_ticks: &self.x_ticks.positions,
            y_ticks: &self.y_ticks.positions,
        })
        .draw(surface, ctx);

        if !self.markers.is_empty() {
            Drawer::Marker(MarkerDrawer {
                markers: &self.markers,
            })
            .draw(surface, ctx);
        }

        let order = (0..self.curves.len())
            .filter(|index| Some(*index) != self.active)
            .chain(self.active);
        for index in order {
            Drawer::DataCurve(CurveDrawer {
                curve: &self.curves[index],
                selection: &self.selections[index],
                active: Some(index) == self.active,
                lines: self.flags.lines,
                symbols: self.flags.symbols,
                spline: self.flags.spline,
            })
            .draw(surface, ctx);
        }

        if let Some(cursor) = self.cursor() {
            let style = self.config.cursor;
            let marker = [PlotMarker::ellipse(
                cursor.point,
                DeviceSize::new(2 * style.size, 2 * style.size),
                Some(Pen::new(style.color, 1)),
                None,
            )];
            Drawer::Marker(MarkerDrawer { markers: &marker }).draw(surface, ctx);
        }

        if self.flags.key && !self.key_string.is_empty() {
            Drawer::Key(KeyDrawer {
                text: &self.key_string,
                curves: &self.curves,
                config: &self.config.key,
                font: self.config.key_font,
                color: colors.key_text,
            })
            .draw(surface, ctx);
        }

        surface.draw_rect(ctx.transform.area_rect(), Some(&border.scaled(ctx.pen_scale)), None);

        if let Some(rect) = self.drag.rect {
            draw_drag_marker(
                surface,
                self.drag_marker,
                rect.normalized(),
                self.area_size(),
                &Pen::new(colors.drag_marker, 1),
            );
        }
    }

    // ------------------------------------------------------------------
    // Input

    pub fn mouse_function(&self) -> MouseFunction {
        self.mouse_function
    }

    /// Change what a left drag in the plot area does.
    pub fn set_mouse_function(&mut self, function: MouseFunction) -> bool {
        if function == self.mouse_function {
            return false;
        }
        if !self.request(ChangeRequest::MouseFunction {
            from: self.mouse_function,
            to: function,
        }) {
            return false;
        }
        self.mouse_function = function;
        if let Some(marker) = function.default_marker() {
            self.drag_marker = marker;
        }
        self.notify(PlotEvent::MouseFunctionChanged { function });
        true
    }

    pub fn drag_marker(&self) -> DragMarker {
        self.drag_marker
    }

    pub fn set_drag_marker(&mut self, marker: DragMarker) {
        if marker != self.drag_marker {
            self.drag_marker = marker;
            self.redraw(RedrawNeed::AREA);
        }
    }

    /// Sub-window holding the pointer capture.
    pub fn capture(&self) -> Option<SubWindow> {
        self.capture.owner()
    }

    pub fn timer(&self) -> &AutoScrollTimer {
        &self.timer
    }

    /// Open drag rectangle in plot-area pixels.
    pub fn drag_rect(&self) -> Option<DeviceRect> {
        self.drag.rect
    }

    /// Pick the mouse function for the held modifier keys.
    pub fn on_modifiers_changed(&mut self, modifiers: Modifiers) {
        self.set_mouse_function(MouseFunction::from_modifiers(modifiers));
    }

    /// Find a data point within `tolerance` of `point`, trying the active curve first.
    fn find_curve(&self, point: Point, tolerance: Point) -> Option<(usize, usize)> {
        let order = self
            .active
            .into_iter()
            .chain((0..self.curves.len()).filter(|index| Some(*index) != self.active));
        for curve in order {
            let data = &self.curves[curve];
            if !data
                .bounding_rect()
                .inset(-tolerance.x, -tolerance.y)
                .contains(point)
            {
                continue;
            }
            let index = data.index_from_xy(point.x, point.y, tolerance.x);
            if let Some(hit) = data.point(index)
                && (hit.x - point.x).abs() <= tolerance.x
                && (hit.y - point.y).abs() <= tolerance.y
            {
                return Some((curve, index));
            }
        }
        None
    }

    /// Handle a pointer event in plot-area coordinates.
    pub fn on_area_mouse(&mut self, event: MouseEvent) {
        let pos = event.pos;
        let last = self.area_mouse;
        let transform = self.transform();
        let point = transform.device_to_plot(pos);
        if pos != last {
            self.area_mouse = pos;
            self.notify(PlotEvent::MouseMotion { pos: point });
        }

        match event.kind {
            MouseEventKind::Move => {}
            MouseEventKind::Wheel(delta) => {
                if delta != 0 {
                    let dy = WHEEL_FRACTION * self.view.height * f64::from(delta.signum());
                    self.set_origin(self.view.x, self.view.y + dy);
                }
            }
            MouseEventKind::Down | MouseEventKind::DoubleClick => {
                let double = event.kind == MouseEventKind::DoubleClick;
                self.notify(if double {
                    PlotEvent::DoubleClicked { pos: point }
                } else {
                    PlotEvent::Clicked { pos: point }
                });
                if !double {
                    self.drag.begin(pos);
                }

                let tolerance = Point::new(HIT_TOLERANCE / self.zoom.x, HIT_TOLERANCE / self.zoom.y);
                let Some((curve, index)) = self.find_curve(point, tolerance) else {
                    return;
                };
                let hit = self.curves[curve].point(index).unwrap_or(point);
                self.notify(if double {
                    PlotEvent::PointDoubleClicked {
                        curve,
                        index,
                        point: hit,
                    }
                } else {
                    PlotEvent::PointClicked {
                        curve,
                        index,
                        point: hit,
                    }
                });
                if self.active != Some(curve) {
                    self.set_active_index(Some(curve));
                }
                match (self.mouse_function, double) {
                    (MouseFunction::Select, false) => {
                        self.select_data_range(curve, RangeInt::point(index));
                    }
                    (MouseFunction::Deselect, false) => {
                        self.deselect_data_range(curve, RangeInt::point(index));
                    }
                    _ => {
                        self.set_cursor_data_index(curve, index);
                    }
                }
            }
            MouseEventKind::Drag => {
                if !self.capture.is_captured_by(SubWindow::Area) {
                    self.capture.set(SubWindow::Area);
                }
                if self.mouse_function == MouseFunction::Pan {
                    if !transform.area_rect().contains(pos) {
                        self.timer.start(SubWindow::Area);
                    }
                    self.drag.clear();
                    let dx = f64::from(pos.x - last.x);
                    let dy = f64::from(pos.y - last.y);
                    self.set_origin(self.view.x - dx / self.zoom.x, self.view.y + dy / self.zoom.y);
                    return;
                }
                let creating = self.drag.rect.is_none_or(|rect| rect.width == 0 && rect.height == 0);
                self.drag.update(pos);
                if let Some(rect) = self.drag.rect {
                    let rect = transform.plot_rect_from_device_rect(&rect.normalized());
                    self.notify(if creating {
                        PlotEvent::AreaSelectionCreating { rect }
                    } else {
                        PlotEvent::AreaSelectionChanging { rect }
                    });
                }
                self.redraw(RedrawNeed::AREA);
            }
            MouseEventKind::Up => {
                self.capture.release();
                self.timer.stop();
                let Some(rect) = self.drag.finish() else {
                    return;
                };
                self.redraw(RedrawNeed::AREA);
                if rect.width == 0 && rect.height == 0 {
                    return;
                }
                self.notify(PlotEvent::AreaSelectionCreated {
                    rect: transform.plot_rect_from_device_rect(&rect),
                });
                self.finish_area_drag(rect, &transform);
            }
        }
    }

    fn finish_area_drag(&mut self, rect: DeviceRect, transform: &ViewTransform) {
        let area = self.area_size();
        let min = self.config.min_zoom_drag;
        match self.mouse_function {
            MouseFunction::Zoom => {
                let zoom_rect = match self.drag_marker {
                    DragMarker::Rect if rect.width > min && rect.height > min => Some(rect),
                    DragMarker::Vert if rect.width > min => {
                        Some(DeviceRect::new(rect.x, 0, rect.width, area.height))
                    }
                    DragMarker::Horiz if rect.height > min => {
                        Some(DeviceRect::new(0, rect.y, area.width, rect.height))
                    }
                    _ => None,
                };
                if let Some(zoom_rect) = zoom_rect {
                    self.set_zoom_rect(zoom_rect);
                }
            }
            MouseFunction::Select | MouseFunction::Deselect => {
                let Some(active) = self.active else {
                    return;
                };
                let select = self.mouse_function == MouseFunction::Select;
                let plot = transform.plot_rect_from_device_rect(&rect);
                let region = match self.drag_marker {
                    DragMarker::Vert if rect.width > 0 => SelectRegion::X {
                        min: plot.left(),
                        max: plot.right(),
                    },
                    DragMarker::Horiz if rect.height > 0 => SelectRegion::Y {
                        min: plot.bottom(),
                        max: plot.top(),
                    },
                    _ => SelectRegion::Rect(plot),
                };
                self.begin_batch();
                self.select_region(Some(active), region, select);
                self.end_batch(false);
            }
            MouseFunction::Nothing | MouseFunction::Pan => {}
        }
    }

    /// Handle a pointer event in the coordinates of one axis window.
    ///
    /// Dragging an axis pans the view along it; the wheel scrolls by a
    /// quarter of the visible extent.
    pub fn on_axis_mouse(&mut self, axis: AxisKind, event: MouseEvent) {
        let window = match axis {
            AxisKind::X => SubWindow::XAxis,
            AxisKind::Y => SubWindow::YAxis,
        };
        let pos = event.pos;

        match event.kind {
            MouseEventKind::Move => return,
            MouseEventKind::Wheel(delta) => {
                if delta == 0 {
                    return;
                }
                let sign = f64::from(delta.signum());
                match axis {
                    AxisKind::X => self.set_origin(self.view.x + sign * WHEEL_FRACTION * self.view.width, self.view.y),
                    AxisKind::Y => self.set_origin(self.view.x, self.view.y + sign * WHEEL_FRACTION * self.view.height),
                };
                return;
            }
            MouseEventKind::Down | MouseEventKind::DoubleClick if !self.capture.is_captured_by(window) => {
                self.capture.set(window);
                self.axis_mouse = pos;
                return;
            }
            _ => {}
        }

        if !self.capture.is_captured_by(window) {
            return;
        }
        if event.left_is_down() {
            let rect = match axis {
                AxisKind::X => self.layout.x_axis,
                AxisKind::Y => self.layout.y_axis,
            };
            if !DeviceRect::from_size(rect.size()).contains(pos) {
                self.timer.start(window);
            }
        } else {
            self.capture.release();
            self.timer.stop();
        }

        let last = self.axis_mouse;
        self.axis_mouse = pos;
        match axis {
            AxisKind::X => {
                let x = self.view.x + f64::from(pos.x - last.x) / self.zoom.x;
                self.set_origin(x, self.view.y);
            }
            AxisKind::Y => {
                let y = self.view.y + f64::from(last.y - pos.y) / self.zoom.y;
                self.set_origin(self.view.x, y);
            }
        }
    }

    /// Advance auto-scrolling. The host calls this every
    /// [`AutoScrollTimer::interval`] while the timer runs.
    ///
    /// Returns false once the timer has stopped.
    pub fn on_timer(&mut self) -> bool {
        let Some(owner) = self.timer.owner() else {
            return false;
        };
        let (dx, dy) = match owner {
            SubWindow::Area => autoscroll_delta(self.area_mouse, self.area_size(), self.zoom),
            SubWindow::XAxis => {
                let (dx, _) = autoscroll_delta(self.axis_mouse, self.layout.x_axis.size(), self.zoom);
                (dx, 0.0)
            }
            SubWindow::YAxis => {
                let (_, dy) = autoscroll_delta(self.axis_mouse, self.layout.y_axis.size(), self.zoom);
                (0.0, dy)
            }
        };
        if (dx == 0.0 && dy == 0.0) || !self.set_origin(self.view.x + dx, self.view.y + dy) {
            self.timer.stop();
            return false;
        }
        true
    }

    /// Handle a key press. Returns true if the key was bound to an action.
    pub fn on_key(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let Some(action) = key_action(key, modifiers) else {
            return false;
        };
        log::debug!("key {key:?} -> {action:?}");
        match action {
            KeyAction::SelectCursorPoint { select } => {
                if let Some(cursor) = self.cursor() {
                    let range = RangeInt::point(cursor.index);
                    if select {
                        self.select_data_range(cursor.curve, range);
                    } else {
                        self.deselect_data_range(cursor.curve, range);
                    }
                }
            }
            KeyAction::CycleActiveCurve => {
                let count = self.curves.len();
                if count < 1 || (count == 1 && self.active == Some(0)) {
                    return true;
                }
                let next = self.active.map_or(0, |active| (active + 1) % count);
                self.set_active_index(Some(next));
            }
            KeyAction::Pan { dx, dy } => {
                self.set_origin(self.view.x + dx * self.view.width, self.view.y + dy * self.view.height);
            }
            KeyAction::CenterOnCursor => {
                if self.is_cursor_valid() {
                    self.make_cursor_visible(true);
                } else {
                    self.set_origin(-self.view.width / 2.0, -self.view.height / 2.0);
                }
            }
            KeyAction::FitActiveCurveBounds => {
                if let Some(curve) = self.active_curve() {
                    let bounds = curve.bounding_rect();
                    let view = bounds.inset(-bounds.width / FIT_MARGIN_DIVISOR, -bounds.height / FIT_MARGIN_DIVISOR);
                    if view.has_area() {
                        self.set_view_rect(view);
                    }
                }
            }
            KeyAction::Zoom { x, y } => {
                self.set_zoom_centered(Zoom::new(self.zoom.x * x, self.zoom.y * y));
            }
            KeyAction::ScaleViewAtMouse(factor) => {
                let center = self.transform().device_to_plot(self.area_mouse);
                self.set_view_rect(self.view.scale(factor).with_center(center));
            }
            KeyAction::MakeActiveVisible => {
                self.make_curve_visible(self.active);
            }
            KeyAction::CursorPrev => self.step_cursor(false),
            KeyAction::CursorNext => self.step_cursor(true),
            KeyAction::HistoryBack => {
                self.next_history_view(false);
            }
            KeyAction::HistoryForward => {
                self.next_history_view(true);
            }
            KeyAction::DeleteActiveCurve => {
                if let Some(active) = self.active {
                    self.delete_curve(Some(active));
                }
            }
            KeyAction::Escape => self.escape(),
        }
        true
    }

    fn step_cursor(&mut self, forward: bool) {
        let cursor = self.cursor();
        let Some(curve) = cursor.map(|cursor| cursor.curve).or(self.active) else {
            return;
        };
        let index = match cursor {
            Some(cursor) if forward => cursor.index + 1,
            Some(cursor) => match cursor.index.checked_sub(1) {
                Some(index) => index,
                None => return,
            },
            None => {
                let (px, kind) = if forward {
                    (0.0, IndexType::Ceil)
                } else {
                    (f64::from(self.area_size().width - 1), IndexType::Floor)
                };
                let x = self.device_to_plot_x(px);
                self.curves[curve].index_from_x(x, kind)
            }
        };
        if index < self.curves[curve].len() && self.set_cursor_data_index(curve, index) {
            self.make_cursor_visible(false);
        }
    }

    /// Clear the active curve's selection, else any selection, else the
    /// cursor, else the active curve.
    fn escape(&mut self) {
        self.begin_batch();
        if let Some(active) = self.active
            && self.has_selection(Some(active))
        {
            self.clear_selected_ranges(Some(active));
        } else if let Some(curve) = (0..self.curves.len()).find(|curve| !self.selections[*curve].is_empty()) {
            self.clear_selected_ranges(Some(curve));
        } else if self.is_cursor_valid() {
            self.invalidate_cursor();
        } else {
            self.set_active_index(None);
        }
        self.end_batch(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderList;

    fn plot() -> PlotCtrl {
        let config = PlotConfig {
            correct_ticks: false,
            ..PlotConfig::default()
        };
        let mut plot = PlotCtrl::new(Arc::new(config));
        plot.set_area_size(DeviceSize::new(100, 100));
        plot
    }

    fn line(n: usize) -> PlotData {
        PlotData::from_points((0..n).map(|i| Point::new(i as f64, i as f64))).expect("valid curve")
    }

    #[test]
    fn layout_places_axes_around_area() {
        let mut plot = plot();
        let layout = plot.layout(DeviceSize::new(400, 300), DeviceSize::new(6, 12));
        assert_eq!(layout.area_border, 6);
        assert_eq!(layout.y_axis, DeviceRect::new(0, 0, 60, 300 - 12 - 6 + 12));
        assert_eq!(layout.area, DeviceRect::new(66, 6, 400 - 60 - 12, 300 - 12 - 6));
        assert_eq!(layout.x_axis.x, 60);
        assert_eq!(layout.x_axis.width, layout.area.width + 12);
        assert_eq!(plot.area_size(), layout.area.size());
        assert_eq!(plot.dirty(), RedrawNeed::ALL);
    }

    #[test]
    fn non_finite_zoom_leaves_view_alone() {
        let mut plot = plot();
        let before = plot.view_rect();
        assert!(!plot.set_zoom(f64::INFINITY, 1.0, 0.0, 0.0));
        assert!(!plot.set_origin(f64::NAN, 0.0));
        assert_eq!(plot.view_rect(), before);
    }

    #[test]
    fn zoom_rect_pushes_history() {
        let mut plot = plot();
        plot.add_curve(line(11), true);
        let fitted = plot.view_rect();
        assert!(plot.set_zoom_rect(DeviceRect::new(0, 50, 50, 50)));
        let zoomed = plot.view_rect();
        assert!((zoomed.width - fitted.width / 2.0).abs() < 1e-9);
        assert!((zoomed.x - fitted.x).abs() < 1e-9);
        assert!((zoomed.y - fitted.y).abs() < 1e-9);
        assert_eq!(plot.history().current(), Some(zoomed));

        assert!(plot.next_history_view(false));
        let fit = plot.curve_bounding_rect();
        assert!((plot.view_rect().width - fit.width).abs() < 1e-9);
        assert!((plot.view_rect().x - fit.x).abs() < 1e-9);
    }

    #[test]
    fn aspect_ratio_lock_is_stable() {
        let mut plot = plot();
        plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 20.0));
        plot.set_fixed_aspect_ratio(Some(1.0));
        let zoom = plot.zoom();
        assert!((zoom.x - zoom.y).abs() < 1e-9);
        let view = plot.view_rect();
        plot.set_view_rect(view);
        assert_eq!(plot.zoom(), zoom);
    }

    #[test]
    fn batch_defers_dirty_state() {
        let mut plot = plot();
        for window in SubWindow::ALL {
            let mut list = RenderList::new();
            assert!(plot.paint(window, &mut list));
        }
        assert_eq!(plot.dirty(), RedrawNeed::NONE);

        plot.begin_batch();
        plot.set_draw_grid(false);
        assert!(!plot.paint(SubWindow::Area, &mut RenderList::new()));
        plot.end_batch(false);
        assert_eq!(plot.dirty(), RedrawNeed::AREA);
    }

    #[test]
    fn delete_shifts_active_and_cursor() {
        let mut plot = plot();
        plot.add_curve(line(3), false);
        plot.add_curve(line(4), false);
        plot.add_curve(line(5), true);
        assert!(plot.set_cursor_data_index(2, 4));
        assert!(plot.delete_curve(Some(0)));
        assert_eq!(plot.active_index(), Some(1));
        assert_eq!(plot.cursor().map(|cursor| (cursor.curve, cursor.index)), Some((1, 4)));
        assert!(plot.delete_curve(Some(1)));
        assert_eq!(plot.active_index(), Some(0));
        assert!(!plot.is_cursor_valid());
        assert!(!plot.delete_curve(Some(5)));
    }

    #[test]
    fn click_on_point_moves_cursor() {
        let mut plot = plot();
        plot.add_curve(line(11), false);
        plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 10.0));
        plot.on_area_mouse(MouseEvent::new(DevicePoint::new(31, 69), MouseEventKind::Down, Modifiers::NONE));
        assert_eq!(plot.active_index(), Some(0));
        assert_eq!(plot.cursor().map(|cursor| cursor.index), Some(3));
        plot.on_area_mouse(MouseEvent::new(DevicePoint::new(31, 69), MouseEventKind::Up, Modifiers::NONE));
        assert_eq!(plot.drag_rect(), None);
    }

    #[test]
    fn pan_drag_moves_origin() {
        let mut plot = plot();
        plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 10.0));
        plot.set_mouse_function(MouseFunction::Pan);
        assert_eq!(plot.drag_marker(), DragMarker::None);
        plot.on_area_mouse(MouseEvent::new(DevicePoint::new(50, 50), MouseEventKind::Down, Modifiers::NONE));
        plot.on_area_mouse(MouseEvent::new(DevicePoint::new(60, 40), MouseEventKind::Drag, Modifiers::NONE));
        let view = plot.view_rect();
        assert!((view.x + 1.0).abs() < 1e-9);
        assert!((view.y + 1.0).abs() < 1e-9);
        assert_eq!(plot.capture(), Some(SubWindow::Area));

        plot.on_area_mouse(MouseEvent::new(DevicePoint::new(120, 40), MouseEventKind::Drag, Modifiers::NONE));
        assert!(plot.timer().is_running());
        assert!(plot.on_timer());
        plot.on_area_mouse(MouseEvent::new(DevicePoint::new(120, 40), MouseEventKind::Up, Modifiers::NONE));
        assert!(!plot.timer().is_running());
        assert_eq!(plot.capture(), None);
    }

    #[test]
    fn axis_drag_pans_along_axis() {
        let mut plot = plot();
        plot.layout(DeviceSize::new(172, 118), DeviceSize::new(6, 12));
        plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 10.0));
        plot.on_axis_mouse(AxisKind::X, MouseEvent::new(DevicePoint::new(10, 5), MouseEventKind::Down, Modifiers::NONE));
        assert_eq!(plot.capture(), Some(SubWindow::XAxis));
        plot.on_axis_mouse(AxisKind::X, MouseEvent::new(DevicePoint::new(30, 5), MouseEventKind::Drag, Modifiers::NONE));
        assert!((plot.view_rect().x - 2.0).abs() < 1e-9);
        plot.on_axis_mouse(AxisKind::X, MouseEvent::new(DevicePoint::new(30, 5), MouseEventKind::Up, Modifiers::NONE));
        assert_eq!(plot.capture(), None);
    }

    #[test]
    fn paint_draws_active_curve_last() {
        let mut plot = plot();
        plot.add_curve(line(3), false);
        plot.add_curve(line(3), false);
        plot.set_active_index(Some(0));
        let mut list = RenderList::new();
        plot.paint(SubWindow::Area, &mut list);
        let active = plot.curves()[0].pen(crate::style::PenKind::Active);
        let last_line = list.lines().last().map(|(_, _, pen)| pen);
        assert_eq!(last_line, Some(active));
    }
}
