//! Coordinate transforms between plot space and device pixels.
//!
//! Device X grows to the right from the left edge of the plot area. Device Y
//! grows downward from the top edge, so plot Y is flipped against the area
//! height.

use crate::geom::{DevicePoint, DeviceRect, DeviceSize, PlotRect, Point};

/// Pixels per plot unit on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    pub x: f64,
    pub y: f64,
}

impl Zoom {
    /// Create a new zoom.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Snapshot of the plot-to-device mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Visible plot rectangle.
    pub view: PlotRect,
    /// Pixels per plot unit.
    pub zoom: Zoom,
    /// Size of the plot area in pixels.
    pub area: DeviceSize,
}

impl ViewTransform {
    /// Create a transform whose zoom maps `view` exactly onto `area`.
    pub fn new(view: PlotRect, area: DeviceSize) -> Self {
        Self {
            view,
            zoom: zoom_for_view(area, &view),
            area,
        }
    }

    /// Create a transform from explicit parts.
    pub fn from_parts(view: PlotRect, zoom: Zoom, area: DeviceSize) -> Self {
        Self { view, zoom, area }
    }

    /// Device column of a plot X value, saturating at the `i32` range.
    pub fn plot_to_device_x(&self, x: f64) -> i32 {
        to_pixel(self.zoom.x * (x - self.view.x))
    }

    /// Device row of a plot Y value, saturating at the `i32` range.
    pub fn plot_to_device_y(&self, y: f64) -> i32 {
        to_pixel(f64::from(self.area.height) - self.zoom.y * (y - self.view.y))
    }

    pub fn plot_to_device(&self, point: Point) -> DevicePoint {
        DevicePoint::new(self.plot_to_device_x(point.x), self.plot_to_device_y(point.y))
    }

    pub fn device_to_plot_x(&self, px: f64) -> f64 {
        px / self.zoom.x + self.view.x
    }

    pub fn device_to_plot_y(&self, py: f64) -> f64 {
        (f64::from(self.area.height) - py) / self.zoom.y + self.view.y
    }

    pub fn device_to_plot(&self, point: DevicePoint) -> Point {
        Point::new(
            self.device_to_plot_x(f64::from(point.x)),
            self.device_to_plot_y(f64::from(point.y)),
        )
    }

    /// Plot rectangle covered by a device rectangle.
    pub fn plot_rect_from_device_rect(&self, rect: &DeviceRect) -> PlotRect {
        let left = self.device_to_plot_x(f64::from(rect.x));
        let right = self.device_to_plot_x(f64::from(rect.x) + f64::from(rect.width));
        let top = self.device_to_plot_y(f64::from(rect.y));
        let bottom = self.device_to_plot_y(f64::from(rect.y) + f64::from(rect.height));
        PlotRect::from_corners(Point::new(left, bottom), Point::new(right, top))
    }

    /// Device rectangle covering a plot rectangle.
    pub fn device_rect_from_plot_rect(&self, rect: &PlotRect) -> DeviceRect {
        let left = self.plot_to_device_x(rect.left());
        let right = self.plot_to_device_x(rect.right());
        let top = self.plot_to_device_y(rect.top());
        let bottom = self.plot_to_device_y(rect.bottom());
        DeviceRect::new(
            left,
            top,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        )
    }

    /// Visible rectangle as a device rectangle at the origin.
    pub fn area_rect(&self) -> DeviceRect {
        DeviceRect::from_size(self.area)
    }
}

/// Round to the nearest pixel, saturating instead of overflowing.
pub(crate) fn to_pixel(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Zoom that maps `view` onto `area`.
pub fn zoom_for_view(area: DeviceSize, view: &PlotRect) -> Zoom {
    Zoom::new(
        f64::from(area.width) / view.width,
        f64::from(area.height) / view.height,
    )
}

/// Visible rectangle for a zoom and lower-left origin.
pub fn view_for_zoom(area: DeviceSize, zoom: Zoom, origin: Point) -> PlotRect {
    PlotRect::new(
        origin.x,
        origin.y,
        f64::from(area.width) / zoom.x,
        f64::from(area.height) / zoom.y,
    )
}

/// Origin that keeps the centre of `view` fixed when zooming from `old` to `new`.
pub fn origin_for_centered_zoom(view: &PlotRect, old: Zoom, new: Zoom) -> Point {
    let center = view.center();
    Point::new(
        center.x - (view.width / 2.0) * old.x / new.x,
        center.y - (view.height / 2.0) * old.y / new.y,
    )
}

/// Force `zoom.x / zoom.y == ratio`, keeping the view centre.
///
/// The larger of the two zooms is reduced. Applying the result again yields
/// the same zoom and origin.
pub fn fix_aspect_ratio(area: DeviceSize, zoom: Zoom, origin: Point, ratio: f64) -> (Zoom, Point) {
    let before = view_for_zoom(area, zoom, origin);
    let center = before.center();

    let fixed = if zoom.x * ratio > zoom.y {
        Zoom::new(zoom.y * ratio, zoom.y)
    } else {
        Zoom::new(zoom.x, zoom.x / ratio)
    };

    let after = view_for_zoom(area, fixed, origin).with_center(center);
    (fixed, after.origin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> ViewTransform {
        ViewTransform::new(
            PlotRect::new(-5.0, 10.0, 20.0, 40.0),
            DeviceSize::new(200, 100),
        )
    }

    #[test]
    fn zoom_follows_area_and_view() {
        let t = transform();
        assert_eq!(t.zoom, Zoom::new(10.0, 2.5));
        assert_eq!(t.plot_to_device_x(-5.0), 0);
        assert_eq!(t.plot_to_device_x(15.0), 200);
        assert_eq!(t.plot_to_device_y(10.0), 100);
        assert_eq!(t.plot_to_device_y(50.0), 0);
    }

    #[test]
    fn roundtrip_within_a_pixel() {
        let t = transform();
        for i in 0..50 {
            let x = -5.0 + 0.4 * f64::from(i);
            let y = 10.0 + 0.8 * f64::from(i);
            let device = t.plot_to_device(Point::new(x, y));
            let back = t.device_to_plot(device);
            assert!((back.x - x).abs() <= 1.0 / t.zoom.x, "x {x} -> {}", back.x);
            assert!((back.y - y).abs() <= 1.0 / t.zoom.y, "y {y} -> {}", back.y);
        }
    }

    #[test]
    fn huge_coordinates_saturate() {
        let t = transform();
        assert_eq!(t.plot_to_device_x(1e300), i32::MAX);
        assert_eq!(t.plot_to_device_x(-1e300), i32::MIN);
        assert_eq!(t.plot_to_device_y(-1e300), i32::MAX);
        assert_eq!(to_pixel(f64::NAN), 0);
    }

    #[test]
    fn device_rect_maps_to_plot_rect() {
        let t = transform();
        let rect = t.plot_rect_from_device_rect(&DeviceRect::new(0, 0, 100, 50));
        assert!((rect.x - -5.0).abs() < 1e-12);
        assert!((rect.width - 10.0).abs() < 1e-12);
        assert!((rect.y - 30.0).abs() < 1e-12);
        assert!((rect.height - 20.0).abs() < 1e-12);
        assert_eq!(t.device_rect_from_plot_rect(&rect), DeviceRect::new(0, 0, 100, 50));
    }

    #[test]
    fn centered_zoom_keeps_center() {
        let view = PlotRect::new(0.0, 0.0, 10.0, 10.0);
        let origin = origin_for_centered_zoom(&view, Zoom::new(10.0, 10.0), Zoom::new(20.0, 20.0));
        assert_eq!(origin, Point::new(2.5, 2.5));
    }

    #[test]
    fn aspect_ratio_is_idempotent() {
        let area = DeviceSize::new(300, 100);
        let (zoom, origin) = fix_aspect_ratio(area, Zoom::new(30.0, 5.0), Point::new(0.0, 0.0), 1.0);
        assert!((zoom.x / zoom.y - 1.0).abs() < 1e-12);
        let center_before = view_for_zoom(area, Zoom::new(30.0, 5.0), Point::new(0.0, 0.0)).center();
        let center_after = view_for_zoom(area, zoom, origin).center();
        assert!((center_before.x - center_after.x).abs() < 1e-9);
        assert!((center_before.y - center_after.y).abs() < 1e-9);

        let (again, origin_again) = fix_aspect_ratio(area, zoom, origin, 1.0);
        assert!((again.x - zoom.x).abs() < 1e-9 && (again.y - zoom.y).abs() < 1e-9);
        assert!((origin_again.x - origin.x).abs() < 1e-9);
        assert!((origin_again.y - origin.y).abs() < 1e-9);
    }
}
