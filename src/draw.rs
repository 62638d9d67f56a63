//! Drawers for each visual part of the plot.
//!
//! A [`Drawer`] borrows the data it paints and keeps no state between calls.
//! Every drawer works in the device coordinates of the sub-window it paints
//! into, described by a [`DrawContext`].

use crate::axis::{AxisKind, AxisTicks};
use crate::data::PlotData;
use crate::geom::{DevicePoint, DeviceRect, DeviceSize, PlotRect, Point};
use crate::interaction::DragMarker;
use crate::marker::{MarkerKind, PlotMarker};
use crate::range::{Interval, RangeDouble, RangeSelection};
use crate::render::clip::clip_line_to_rect;
use crate::render::spline::SplineDrawer;
use crate::render::{Brush, Color, DeviceSurface, Font, Pen};
use crate::style::{KeyConfig, PenKind};
use crate::transform::ViewTransform;

/// Symbol size for data points.
const SYMBOL_SIZE: i32 = 2;
/// Length of tick marks when the grid is off.
const TICK_LENGTH: i32 = 8;
/// Key text never starts left of this column.
const KEY_LEFT_MARGIN: i32 = 30;
/// Key sample lines are at least this wide.
const KEY_MIN_PEN_WIDTH: u32 = 3;

/// Where and how a drawer paints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawContext {
    /// Region to repaint, in sub-window pixels.
    pub dc_rect: DeviceRect,
    /// Mapping for the plot area.
    pub transform: ViewTransform,
    /// Multiplier for pen widths, such as for printing.
    pub pen_scale: f64,
    /// Multiplier for font sizes.
    pub font_scale: f64,
}

impl DrawContext {
    /// Context painting the whole plot area at unit scale.
    pub fn for_area(transform: ViewTransform) -> Self {
        Self {
            dc_rect: transform.area_rect(),
            transform,
            pen_scale: 1.0,
            font_scale: 1.0,
        }
    }

    /// Same context painting into `rect`.
    pub fn with_rect(&self, rect: DeviceRect) -> Self {
        Self {
            dc_rect: rect,
            ..*self
        }
    }

    /// Plot rectangle visible inside `dc_rect`.
    pub fn visible_plot_rect(&self) -> PlotRect {
        self.transform.plot_rect_from_device_rect(&self.dc_rect)
    }
}

/// Ticks drawn into the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    None,
    /// Lines across the whole area.
    Grid,
    /// Short marks along the left and bottom edges.
    Ticks,
}

/// Background, border and grid of the plot area.
#[derive(Debug, Clone, Copy)]
pub struct AreaDrawer<'a> {
    pub background: Option<Color>,
    pub border: Pen,
    pub grid: GridMode,
    pub grid_pen: Pen,
    pub x_ticks: &'a [i32],
    pub y_ticks: &'a [i32],
}

/// Tick labels for one axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisDrawer<'a> {
    pub kind: AxisKind,
    pub ticks: &'a AxisTicks,
    pub title: Option<&'a str>,
    /// Distance from the axis window edge to the plot area edge.
    pub offset: i32,
    pub font: Font,
    pub color: Color,
    pub background: Color,
}

/// Curve names with a sample of each curve's pen.
#[derive(Debug, Clone, Copy)]
pub struct KeyDrawer<'a> {
    /// One name per line.
    pub text: &'a str,
    pub curves: &'a [PlotData],
    pub config: &'a KeyConfig,
    pub font: Font,
    pub color: Color,
}

/// One data curve with its selected points.
#[derive(Debug, Clone, Copy)]
pub struct CurveDrawer<'a> {
    pub curve: &'a PlotData,
    pub selection: &'a RangeSelection<usize>,
    pub active: bool,
    pub lines: bool,
    pub symbols: bool,
    pub spline: bool,
}

/// Annotations positioned in plot space.
#[derive(Debug, Clone, Copy)]
pub struct MarkerDrawer<'a> {
    pub markers: &'a [PlotMarker],
}

/// Closed set of drawers.
#[derive(Debug, Clone, Copy)]
pub enum Drawer<'a> {
    Area(AreaDrawer<'a>),
    XAxis(AxisDrawer<'a>),
    YAxis(AxisDrawer<'a>),
    Key(KeyDrawer<'a>),
    DataCurve(CurveDrawer<'a>),
    Marker(MarkerDrawer<'a>),
}

impl Drawer<'_> {
    /// Paint onto `surface`.
    pub fn draw(&self, surface: &mut dyn DeviceSurface, ctx: &DrawContext) {
        match self {
            Self::Area(area) => area.draw(surface, ctx),
            Self::XAxis(axis) | Self::YAxis(axis) => axis.draw(surface, ctx),
            Self::Key(key) => key.draw(surface, ctx),
            Self::DataCurve(curve) => curve.draw(surface, ctx),
            Self::Marker(markers) => markers.draw(surface, ctx),
        }
    }
}

impl AreaDrawer<'_> {
    fn draw(&self, surface: &mut dyn DeviceSurface, ctx: &DrawContext) {
        let client = ctx.transform.area_rect();
        let Some(refresh) = ctx.dc_rect.intersection(&client) else {
            return;
        };
        let border = self.border.scaled(ctx.pen_scale);
        let background = self.background.map(Brush::new);

        surface.set_clip(Some(refresh));
        surface.draw_rect(client, Some(&border), background.as_ref());

        let pen = self.grid_pen.scaled(ctx.pen_scale);
        let (x_len, y_len) = match self.grid {
            GridMode::None => (0, 0),
            GridMode::Grid => (client.height, client.width),
            GridMode::Ticks => (TICK_LENGTH, TICK_LENGTH),
        };
        if self.grid != GridMode::None {
            for &x in self.x_ticks {
                if x < refresh.x || x > refresh.right() {
                    continue;
                }
                surface.draw_line(
                    DevicePoint::new(x, client.height),
                    DevicePoint::new(x, client.height - x_len),
                    &pen,
                );
            }
            for &y in self.y_ticks {
                if y < refresh.y || y > refresh.bottom() {
                    continue;
                }
                surface.draw_line(DevicePoint::new(0, y), DevicePoint::new(y_len, y), &pen);
            }
        }
        surface.set_clip(None);
    }
}

impl AxisDrawer<'_> {
    fn draw(&self, surface: &mut dyn DeviceSurface, ctx: &DrawContext) {
        let rect = ctx.dc_rect;
        surface.draw_rect(rect, None, Some(&Brush::new(self.background)));
        let font = self.font.scaled(ctx.font_scale);

        let digit = surface.text_extent("5", &font);
        for (&pos, label) in self.ticks.positions.iter().zip(&self.ticks.labels) {
            let extent = surface.text_extent(label, &font);
            let at = match self.kind {
                AxisKind::X => DevicePoint::new(
                    rect.x + self.offset + pos - extent.width / 2,
                    rect.y + (rect.height - digit.height) / 2 + 2,
                ),
                AxisKind::Y => DevicePoint::new(
                    rect.x + 2,
                    rect.y + self.offset + pos - extent.height / 2,
                ),
            };
            surface.draw_text(label, at, &font, self.color);
        }

        if let Some(title) = self.title.filter(|title| !title.is_empty()) {
            let extent = surface.text_extent(title, &font);
            let at = match self.kind {
                AxisKind::X => DevicePoint::new(rect.right() - extent.width - 2, rect.y + 2),
                AxisKind::Y => DevicePoint::new(rect.x + 2, rect.y),
            };
            surface.draw_text(title, at, &font, self.color);
        }
    }
}

impl KeyDrawer<'_> {
    fn draw(&self, surface: &mut dyn DeviceSurface, ctx: &DrawContext) {
        if self.text.is_empty() {
            return;
        }
        let font = self.font.scaled(ctx.font_scale);
        let lines: Vec<&str> = self
            .text
            .lines()
            .map(str::trim)
            .take_while(|line| !line.is_empty())
            .collect();
        let line_height = surface.text_extent("Ay", &font).height;
        let key_size = DeviceSize::new(
            lines
                .iter()
                .map(|line| surface.text_extent(line, &font).width)
                .max()
                .unwrap_or(0),
            line_height * lines.len() as i32,
        );

        let area = ctx.dc_rect.size();
        let line_width = (f64::from(self.config.line_width) * ctx.pen_scale).round() as i32;
        let line_margin = (f64::from(self.config.margin) * ctx.pen_scale).round() as i32;
        let [px, py] = self.config.position;
        let mut x = KEY_LEFT_MARGIN + (px * 0.01 * f64::from(area.width)) as i32;
        let mut y = area.height - (py * 0.01 * f64::from(area.height)) as i32;
        if self.config.inside {
            x = x
                .max(KEY_LEFT_MARGIN)
                .min(area.width - key_size.width - self.config.border);
            y = y
                .max(self.config.border)
                .min(area.height - key_size.height - self.config.border);
        }
        x += ctx.dc_rect.x;
        y += ctx.dc_rect.y;

        for (i, line) in lines.iter().enumerate() {
            let top = y + line_height * i as i32;
            if let Some(curve) = self.curves.get(i) {
                let pen = curve
                    .pen(PenKind::Normal)
                    .scaled(ctx.pen_scale)
                    .with_min_width(KEY_MIN_PEN_WIDTH);
                let mid = top + line_height / 2;
                surface.draw_line(
                    DevicePoint::new(x - (line_width + line_margin), mid),
                    DevicePoint::new(x - line_margin, mid),
                    &pen,
                );
            }
            surface.draw_text(line, DevicePoint::new(x, top), &font, self.color);
        }
    }
}

fn symbol_rect(center: DevicePoint, size: DeviceSize) -> DeviceRect {
    DeviceRect::new(
        center.x - size.width / 2,
        center.y - size.height / 2,
        size.width,
        size.height,
    )
}

impl CurveDrawer<'_> {
    fn draw(&self, surface: &mut dyn DeviceSurface, ctx: &DrawContext) {
        let transform = &ctx.transform;
        let view = transform.view;
        let sub_view = ctx.visible_plot_rect();
        if !self.curve.bounding_rect().intersects(&sub_view) {
            return;
        }

        let normal = self
            .curve
            .pen(if self.active { PenKind::Active } else { PenKind::Normal })
            .scaled(ctx.pen_scale);
        let selected = self.curve.pen(PenKind::Selected).scaled(ctx.pen_scale);
        let ranges = self.selection.ranges();

        let mut next_range = 0;
        let (mut min_sel, mut max_sel) = match ranges.first() {
            Some(range) => (Some(range.min), Some(range.max)),
            None => (None, None),
        };
        let mut pen = normal;

        let straight_lines = self.lines && !(self.spline && self.curve.len() > 1);
        let symbol = DeviceSize::new(SYMBOL_SIZE, SYMBOL_SIZE);
        let mut points = self.curve.points().enumerate();
        let Some((_, mut prev)) = points.next() else {
            return;
        };

        for (n, point) in std::iter::once((0, prev)).chain(points) {
            let clipped = clip_line_to_rect(prev, point, &view);
            if clipped.is_visible() {
                let d0 = transform.plot_to_device(clipped.p0);
                let d1 = transform.plot_to_device(clipped.p1);
                if straight_lines && d0 != d1 {
                    surface.draw_line(d0, d1, &pen);
                }
                if Some(n) == min_sel {
                    pen = selected;
                }
                if self.symbols
                    && !clipped.status.second_clipped()
                    && (d0 != d1 || Some(n) == min_sel || n == 0)
                {
                    surface.draw_ellipse(symbol_rect(d1, symbol), Some(&pen), None);
                }
            } else if Some(n) == min_sel {
                pen = selected;
            }

            if Some(n) == max_sel {
                pen = normal;
                next_range += 1;
                if let Some(range) = ranges.get(next_range) {
                    min_sel = Some(range.min);
                    max_sel = Some(range.max);
                }
            }
            prev = point;
        }

        if self.lines && !straight_lines {
            self.draw_spline(surface, ctx, normal, selected);
        }
    }

    fn draw_spline(&self, surface: &mut dyn DeviceSurface, ctx: &DrawContext, normal: Pen, selected: Pen) {
        let transform = &ctx.transform;
        let view = transform.view;
        let to_device = |p: Point| {
            let d = transform.plot_to_device(p);
            Point::new(f64::from(d.x), f64::from(d.y))
        };

        let view_range = RangeDouble::new(view.left(), view.right());
        let mut device_selection = RangeSelection::new();
        for range in self.selection.ranges() {
            let (Some(a), Some(b)) = (self.curve.x(range.min), self.curve.x(range.max)) else {
                continue;
            };
            let plot_range = Interval::new(a.min(b), a.max(b));
            if view_range.intersects(&plot_range) {
                let x0 = f64::from(transform.plot_to_device_x(plot_range.min));
                let x1 = f64::from(transform.plot_to_device_x(plot_range.max));
                device_selection.select_range(RangeDouble::new(x0, x1));
            }
        }

        let rect = ctx.dc_rect;
        let bounds = PlotRect::new(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        );
        let mut points = self.curve.points().map(to_device);
        let (Some(first), Some(second)) = (points.next(), points.next()) else {
            return;
        };
        let selection = (!device_selection.is_empty()).then_some(&device_selection);
        let mut emit = |from: DevicePoint, to: DevicePoint, in_selection: bool| {
            let pen = if in_selection { &selected } else { &normal };
            surface.draw_line(from, to, pen);
        };
        let mut spline = SplineDrawer::new(bounds, selection, first, second);
        for point in points {
            spline.add_point(point, &mut emit);
        }
        spline.finish(&mut emit);
    }
}

impl MarkerDrawer<'_> {
    fn draw(&self, surface: &mut dyn DeviceSurface, ctx: &DrawContext) {
        let sub_view = ctx.visible_plot_rect();
        for marker in self.markers {
            draw_marker(surface, ctx, &sub_view, marker);
        }
    }
}

/// Span from `start` covering `extent` with a full extent of slack on each side.
fn full_span(start: f64, extent: f64) -> (f64, f64) {
    (start - extent, start + 2.0 * extent)
}

fn draw_clipped_line(surface: &mut dyn DeviceSurface, ctx: &DrawContext, sub_view: &PlotRect, a: Point, b: Point, pen: &Pen) {
    let clipped = clip_line_to_rect(a, b, sub_view);
    if clipped.is_visible() {
        let d0 = ctx.transform.plot_to_device(clipped.p0);
        let d1 = ctx.transform.plot_to_device(clipped.p1);
        surface.draw_line(d0, d1, pen);
    }
}

fn draw_marker(surface: &mut dyn DeviceSurface, ctx: &DrawContext, sub_view: &PlotRect, marker: &PlotMarker) {
    let r = marker.rect;
    let pen = marker.pen.unwrap_or_default().scaled(ctx.pen_scale);
    let (x0, x1) = if marker.spans_width() {
        full_span(sub_view.left(), sub_view.width)
    } else {
        (r.left(), r.right())
    };
    let (y0, y1) = if marker.spans_height() {
        full_span(sub_view.bottom(), sub_view.height)
    } else {
        (r.bottom(), r.top())
    };

    match marker.kind {
        MarkerKind::None => {}
        MarkerKind::Point => {
            let at = Point::new(r.x, r.y);
            if sub_view.contains(at) {
                let d = ctx.transform.plot_to_device(at);
                surface.draw_rect(DeviceRect::new(d.x, d.y, 1, 1), None, Some(&Brush::new(pen.color)));
            }
        }
        MarkerKind::Line => {
            draw_clipped_line(surface, ctx, sub_view, r.origin(), Point::new(r.right(), r.top()), &pen);
        }
        MarkerKind::HorizLine => {
            draw_clipped_line(surface, ctx, sub_view, Point::new(x0, r.y), Point::new(x1, r.y), &pen);
        }
        MarkerKind::VertLine => {
            draw_clipped_line(surface, ctx, sub_view, Point::new(r.x, y0), Point::new(r.x, y1), &pen);
        }
        MarkerKind::Cross => {
            let (hx0, hx1) = full_span(sub_view.left(), sub_view.width);
            let (vy0, vy1) = full_span(sub_view.bottom(), sub_view.height);
            draw_clipped_line(surface, ctx, sub_view, Point::new(hx0, r.y), Point::new(hx1, r.y), &pen);
            draw_clipped_line(surface, ctx, sub_view, Point::new(r.x, vy0), Point::new(r.x, vy1), &pen);
        }
        MarkerKind::Rect => {
            let full = PlotRect::new(x0, y0, x1 - x0, y1 - y0);
            let Some(clipped) = full.intersection(sub_view) else {
                return;
            };
            let slack = pen.width as i32 + 2;
            let t = &ctx.transform;
            let mut left = t.plot_to_device_x(clipped.left());
            let mut right = t.plot_to_device_x(clipped.right());
            let mut top = t.plot_to_device_y(clipped.top());
            let mut bottom = t.plot_to_device_y(clipped.bottom());
            if full.left() < sub_view.left() {
                left -= slack;
            }
            if full.right() > sub_view.right() {
                right += slack;
            }
            if full.top() > sub_view.top() {
                top -= slack;
            }
            if full.bottom() < sub_view.bottom() {
                bottom += slack;
            }
            surface.set_clip(Some(ctx.dc_rect));
            surface.draw_rect(
                DeviceRect::new(left, top, right - left + 1, bottom - top + 1),
                marker.pen.map(|_| pen).as_ref(),
                marker.brush.as_ref(),
            );
            surface.set_clip(None);
        }
        MarkerKind::Ellipse => {
            let at = r.origin();
            if marker.size.is_valid() && sub_view.contains(at) {
                let center = ctx.transform.plot_to_device(at);
                surface.draw_ellipse(
                    symbol_rect(center, marker.size),
                    marker.pen.map(|_| pen).as_ref(),
                    marker.brush.as_ref(),
                );
            }
        }
    }
}

/// Outline of an in-progress drag in the plot area.
///
/// `rect` is normalized. Band markers run across the whole `area`.
pub fn draw_drag_marker(surface: &mut dyn DeviceSurface, marker: DragMarker, rect: DeviceRect, area: DeviceSize, pen: &Pen) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    match marker {
        DragMarker::None => {}
        DragMarker::Rect => surface.draw_rect(rect, Some(pen), None),
        DragMarker::Vert => {
            for x in [rect.x, rect.right() + 1] {
                surface.draw_line(DevicePoint::new(x, 1), DevicePoint::new(x, area.height - 2), pen);
            }
        }
        DragMarker::Horiz => {
            for y in [rect.y, rect.bottom() + 1] {
                surface.draw_line(DevicePoint::new(1, y), DevicePoint::new(area.width - 2, y), pen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::RangeInt;
    use crate::render::{DrawCommand, RenderList};

    fn ctx() -> DrawContext {
        DrawContext::for_area(ViewTransform::new(
            PlotRect::new(0.0, 0.0, 10.0, 10.0),
            DeviceSize::new(100, 100),
        ))
    }

    fn curve() -> PlotData {
        PlotData::from_vecs(vec![1.0, 3.0, 5.0, 7.0, 9.0], vec![1.0, 9.0, 1.0, 9.0, 1.0]).expect("valid curve")
    }

    #[test]
    fn curve_switches_pen_inside_selection() {
        let data = curve();
        let mut selection = RangeSelection::new();
        selection.select_range(RangeInt::new(2, 3));
        let mut list = RenderList::new();
        Drawer::DataCurve(CurveDrawer {
            curve: &data,
            selection: &selection,
            active: false,
            lines: true,
            symbols: true,
            spline: false,
        })
        .draw(&mut list, &ctx());

        let lines: Vec<_> = list.lines().collect();
        assert_eq!(lines.len(), 4);
        let normal = data.pen(PenKind::Normal);
        let selected = data.pen(PenKind::Selected);
        assert_eq!(lines[0].2, normal);
        assert_eq!(lines[1].2, normal);
        // Only the segment from point 2 to point 3 lies inside the selection.
        assert_eq!(lines[2].2, selected);
        assert_eq!(lines[3].2, normal);
        assert_eq!(lines[0].0, DevicePoint::new(10, 90));
        assert_eq!(list.ellipses().count(), 5);
    }

    #[test]
    fn clipped_endpoints_get_no_symbol() {
        let data = PlotData::from_vecs(vec![5.0, 50.0], vec![5.0, 5.0]).expect("valid curve");
        let selection = RangeSelection::new();
        let mut list = RenderList::new();
        Drawer::DataCurve(CurveDrawer {
            curve: &data,
            selection: &selection,
            active: true,
            lines: true,
            symbols: true,
            spline: false,
        })
        .draw(&mut list, &ctx());
        let lines: Vec<_> = list.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].1, DevicePoint::new(100, 50));
        assert_eq!(lines[0].2, data.pen(PenKind::Active));
        assert_eq!(list.ellipses().count(), 1);
    }

    #[test]
    fn spline_mode_replaces_straight_lines() {
        let data = curve();
        let selection = RangeSelection::new();
        let mut list = RenderList::new();
        Drawer::DataCurve(CurveDrawer {
            curve: &data,
            selection: &selection,
            active: false,
            lines: true,
            symbols: false,
            spline: true,
        })
        .draw(&mut list, &ctx());
        assert!(list.lines().count() > 4);
        let inside = |p: DevicePoint| (0..=100).contains(&p.x) && (0..=100).contains(&p.y);
        assert!(list.lines().all(|(a, b, _)| inside(a) && inside(b)));
    }

    #[test]
    fn area_draws_grid_inside_refresh_rect() {
        let mut list = RenderList::new();
        let x_ticks = [0, 50, 100];
        let y_ticks = [20, 80];
        Drawer::Area(AreaDrawer {
            background: Some(Color::WHITE),
            border: Pen::default(),
            grid: GridMode::Grid,
            grid_pen: Pen::new(Color::GREY, 1),
            x_ticks: &x_ticks,
            y_ticks: &y_ticks,
        })
        .draw(&mut list, &ctx().with_rect(DeviceRect::new(0, 0, 60, 100)));
        let lines: Vec<_> = list.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].0, DevicePoint::new(50, 100));
        assert_eq!(lines[1].1, DevicePoint::new(50, 0));
        assert_eq!(lines[2].1, DevicePoint::new(100, 20));
        assert!(matches!(list.commands().first(), Some(DrawCommand::Clip(Some(_)))));
    }

    #[test]
    fn axis_centers_labels_on_ticks() {
        let ticks = AxisTicks {
            positions: vec![0, 50],
            labels: vec!["0".to_string(), "5".to_string()],
            ..AxisTicks::default()
        };
        let font = Font::new(12.0);
        let mut list = RenderList::new();
        let drawer = AxisDrawer {
            kind: AxisKind::X,
            ticks: &ticks,
            title: None,
            offset: 6,
            font,
            color: Color::BLACK,
            background: Color::WHITE,
        };
        Drawer::XAxis(drawer).draw(&mut list, &ctx().with_rect(DeviceRect::new(0, 0, 112, 12)));
        let texts: Vec<_> = list.texts().collect();
        assert_eq!(texts, vec![("0", DevicePoint::new(3, 2)), ("5", DevicePoint::new(53, 2))]);
    }

    #[test]
    fn key_sits_in_upper_right_by_default() {
        let curves = vec![curve().with_name("alpha"), curve().with_name("beta")];
        let config = KeyConfig::default();
        let mut list = RenderList::new();
        Drawer::Key(KeyDrawer {
            text: "alpha\nbeta",
            curves: &curves,
            config: &config,
            font: Font::new(10.0),
            color: Color::BLACK,
        })
        .draw(&mut list, &ctx());
        let texts: Vec<_> = list.texts().collect();
        // "alpha" is 25 px wide at 10 px, so the key starts at 100 - 25 - 5.
        assert_eq!(texts[0], ("alpha", DevicePoint::new(70, 5)));
        assert_eq!(texts[1], ("beta", DevicePoint::new(70, 15)));
        let lines: Vec<_> = list.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, DevicePoint::new(45, 10));
        assert_eq!(lines[0].2.width, 3);
    }

    #[test]
    fn markers_span_and_clip() {
        let pen = Pen::new(Color::RED, 1);
        let markers = [
            PlotMarker::horiz_line(5.0, pen),
            PlotMarker::vert_line(20.0, pen),
            PlotMarker::rect(PlotRect::new(2.0, 2.0, 2.0, 2.0), Some(pen), None),
            PlotMarker::ellipse(Point::new(5.0, 5.0), DeviceSize::new(4, 4), Some(pen), None),
        ];
        let mut list = RenderList::new();
        Drawer::Marker(MarkerDrawer { markers: &markers }).draw(&mut list, &ctx());
        let lines: Vec<_> = list.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, DevicePoint::new(0, 50));
        assert_eq!(lines[0].1, DevicePoint::new(100, 50));
        let rects: Vec<_> = list
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(rects, vec![DeviceRect::new(20, 60, 21, 21)]);
        assert_eq!(list.ellipses().next(), Some(DeviceRect::new(48, 48, 4, 4)));
    }

    #[test]
    fn drag_marker_shapes() {
        let mut list = RenderList::new();
        let area = DeviceSize::new(100, 80);
        let pen = Pen::default();
        draw_drag_marker(&mut list, DragMarker::Vert, DeviceRect::new(10, 10, 20, 5), area, &pen);
        let lines: Vec<_> = list.lines().collect();
        assert_eq!(lines[0].0, DevicePoint::new(10, 1));
        assert_eq!(lines[1].0, DevicePoint::new(30, 1));
        assert_eq!(lines[1].1, DevicePoint::new(30, 78));
        list.clear();
        draw_drag_marker(&mut list, DragMarker::Rect, DeviceRect::new(10, 10, 0, 5), area, &pen);
        assert!(list.is_empty());
    }
}
