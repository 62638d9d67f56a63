use gpui::{
    App, BorderStyle, Bounds, ContentMask, Corners, Edges, PathBuilder, Pixels, Point, Window,
    point, px, quad, size,
};

use crate::geom::{DevicePoint, DeviceRect, DeviceSize};
use crate::render::{Brush, Color, DeviceSurface, Font, Pen};

use super::text::{measure, shape};

/// [`DeviceSurface`] that paints straight into a GPUI window.
///
/// Device coordinates are relative to `origin`, the top-left corner of the
/// sub-window being painted.
pub(crate) struct GpuiSurface<'a> {
    window: &'a mut Window,
    cx: &'a mut App,
    origin: Point<Pixels>,
    clip: Option<ContentMask<Pixels>>,
}

impl<'a> GpuiSurface<'a> {
    pub(crate) fn new(window: &'a mut Window, cx: &'a mut App, origin: Point<Pixels>) -> Self {
        Self {
            window,
            cx,
            origin,
            clip: None,
        }
    }

    fn to_point(&self, pos: DevicePoint) -> Point<Pixels> {
        point(
            self.origin.x + px(pos.x as f32),
            self.origin.y + px(pos.y as f32),
        )
    }

    fn to_bounds(&self, rect: DeviceRect) -> Bounds<Pixels> {
        let rect = rect.normalized();
        Bounds::new(
            self.to_point(rect.top_left()),
            size(px(rect.width as f32), px(rect.height as f32)),
        )
    }

    fn with_clip(&mut self, f: impl FnOnce(&mut Window, &mut App)) {
        let cx = &mut *self.cx;
        match self.clip.clone() {
            Some(mask) => self.window.with_content_mask(Some(mask), |window| f(window, cx)),
            None => f(&mut *self.window, cx),
        }
    }

    fn paint_box(&mut self, rect: DeviceRect, radius: f32, pen: Option<&Pen>, brush: Option<&Brush>) {
        let bounds = self.to_bounds(rect);
        let background = brush.map_or_else(gpui::transparent_black, |brush| to_hsla(brush.color));
        let (border_width, border_color) = match pen {
            Some(pen) => (pen.width as f32, to_hsla(pen.color)),
            None => (0.0, gpui::transparent_black()),
        };
        self.with_clip(|window, _| {
            window.paint_quad(quad(
                bounds,
                Corners::all(px(radius)),
                background,
                Edges::all(px(border_width)),
                border_color,
                BorderStyle::default(),
            ));
        });
    }
}

impl DeviceSurface for GpuiSurface<'_> {
    fn draw_line(&mut self, from: DevicePoint, to: DevicePoint, pen: &Pen) {
        let start = self.to_point(from);
        let end = self.to_point(to);
        let width = (pen.width as f32).max(1.0);
        let color = to_rgba(pen.color);
        self.with_clip(|window, _| {
            let mut builder = PathBuilder::stroke(px(width));
            builder.move_to(start);
            builder.line_to(end);
            if let Ok(path) = builder.build() {
                window.paint_path(path, color);
            }
        });
    }

    fn draw_ellipse(&mut self, rect: DeviceRect, pen: Option<&Pen>, brush: Option<&Brush>) {
        let rect = rect.normalized();
        let radius = rect.width.min(rect.height) as f32 * 0.5;
        self.paint_box(rect, radius, pen, brush);
    }

    fn draw_rect(&mut self, rect: DeviceRect, pen: Option<&Pen>, brush: Option<&Brush>) {
        self.paint_box(rect, 0.0, pen, brush);
    }

    fn draw_text(&mut self, text: &str, pos: DevicePoint, font: &Font, color: Color) {
        if text.is_empty() {
            return;
        }
        let origin = self.to_point(pos);
        let shaped = shape(&*self.window, text, font, to_hsla(color));
        let line_height = shaped.ascent + shaped.descent;
        self.with_clip(|window, cx| {
            let _ = shaped.paint(origin, line_height, window, cx);
        });
    }

    fn set_clip(&mut self, rect: Option<DeviceRect>) {
        self.clip = rect.map(|rect| ContentMask {
            bounds: self.to_bounds(rect),
        });
    }

    fn text_extent(&self, text: &str, font: &Font) -> DeviceSize {
        measure(&*self.window, text, font)
    }
}

fn to_rgba(color: Color) -> gpui::Rgba {
    let [r, g, b, a] = color.to_f32();
    gpui::Rgba { r, g, b, a }
}

pub(crate) fn to_hsla(color: Color) -> gpui::Hsla {
    gpui::Hsla::from(to_rgba(color))
}
