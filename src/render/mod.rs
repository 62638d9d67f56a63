//! Rendering primitives and the device surface abstraction.
//!
//! Drawers never talk to a window system directly. They issue calls on a
//! [`DeviceSurface`] in integer device pixels. [`RenderList`] is a surface
//! that records the calls so a backend (such as the GPUI backend) can replay
//! them, and so tests can inspect what was drawn.

pub mod clip;
pub mod spline;

use serde::{Deserialize, Serialize};

use crate::geom::{DevicePoint, DeviceRect, DeviceSize};

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a colour with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const GREY: Self = Self::rgb(192, 192, 192);

    /// Channels as `0.0..=1.0` floats.
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

/// Stroke used for lines and outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pen {
    pub color: Color,
    /// Stroke width in pixels.
    pub width: u32,
}

impl Pen {
    /// Create a new pen.
    pub const fn new(color: Color, width: u32) -> Self {
        Self { color, width }
    }

    /// Same pen with the width multiplied by `scale`, never below one pixel.
    pub fn scaled(&self, scale: f64) -> Self {
        if scale == 1.0 {
            return *self;
        }
        let width = (f64::from(self.width) * scale).round().max(1.0) as u32;
        Self::new(self.color, width)
    }

    /// Same pen at least `min` pixels wide.
    pub fn with_min_width(&self, min: u32) -> Self {
        Self::new(self.color, self.width.max(min))
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(Color::BLACK, 1)
    }
}

/// Solid fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Brush {
    pub color: Color,
}

impl Brush {
    /// Create a new brush.
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

/// Text font; only the pixel size matters to layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Line height in pixels.
    pub size: f32,
}

impl Font {
    /// Create a font of the given pixel size.
    pub const fn new(size: f32) -> Self {
        Self { size }
    }

    /// Font scaled for printing or high-DPI output, never below 2 px.
    pub fn scaled(&self, scale: f64) -> Self {
        if scale == 1.0 {
            return *self;
        }
        Self::new(((f64::from(self.size) * scale).round() as f32).max(2.0))
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(12.0)
    }
}

/// Rough text size when no text system is available.
///
/// Glyphs are assumed to be half as wide as the line is tall.
pub fn estimate_text_extent(text: &str, font: &Font) -> DeviceSize {
    let chars = text.chars().count() as f32;
    DeviceSize::new(
        (chars * font.size * 0.5).round() as i32,
        font.size.round() as i32,
    )
}

/// Immediate-mode drawing target in device pixels.
pub trait DeviceSurface {
    /// Stroke a straight line.
    fn draw_line(&mut self, from: DevicePoint, to: DevicePoint, pen: &Pen);

    /// Draw an ellipse inscribed in `rect`.
    fn draw_ellipse(&mut self, rect: DeviceRect, pen: Option<&Pen>, brush: Option<&Brush>);

    /// Draw a rectangle; `None` skips the outline or the fill.
    fn draw_rect(&mut self, rect: DeviceRect, pen: Option<&Pen>, brush: Option<&Brush>);

    /// Draw a single line of text with its top-left corner at `pos`.
    fn draw_text(&mut self, text: &str, pos: DevicePoint, font: &Font, color: Color);

    /// Restrict drawing to `rect`, or lift the restriction with `None`.
    fn set_clip(&mut self, rect: Option<DeviceRect>);

    /// Size of `text` when drawn with `font`.
    fn text_extent(&self, text: &str, font: &Font) -> DeviceSize {
        estimate_text_extent(text, font)
    }
}

/// A recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        from: DevicePoint,
        to: DevicePoint,
        pen: Pen,
    },
    Ellipse {
        rect: DeviceRect,
        pen: Option<Pen>,
        brush: Option<Brush>,
    },
    Rect {
        rect: DeviceRect,
        pen: Option<Pen>,
        brush: Option<Brush>,
    },
    Text {
        text: String,
        pos: DevicePoint,
        font: Font,
        color: Color,
    },
    Clip(Option<DeviceRect>),
}

/// Surface that records every call.
#[derive(Debug, Default, Clone)]
pub struct RenderList {
    commands: Vec<DrawCommand>,
}

impl RenderList {
    /// Create an empty render list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Access all recorded commands.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Recorded lines as `(from, to, pen)`.
    pub fn lines(&self) -> impl Iterator<Item = (DevicePoint, DevicePoint, Pen)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line { from, to, pen } => Some((*from, *to, *pen)),
            _ => None,
        })
    }

    /// Recorded ellipses.
    pub fn ellipses(&self) -> impl Iterator<Item = DeviceRect> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Ellipse { rect, .. } => Some(*rect),
            _ => None,
        })
    }

    /// Recorded text strings with their positions.
    pub fn texts(&self) -> impl Iterator<Item = (&str, DevicePoint)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, pos, .. } => Some((text.as_str(), *pos)),
            _ => None,
        })
    }

    /// Play the recorded calls onto another surface.
    pub fn replay(&self, surface: &mut dyn DeviceSurface) {
        for command in &self.commands {
            match command {
                DrawCommand::Line { from, to, pen } => surface.draw_line(*from, *to, pen),
                DrawCommand::Ellipse { rect, pen, brush } => {
                    surface.draw_ellipse(*rect, pen.as_ref(), brush.as_ref())
                }
                DrawCommand::Rect { rect, pen, brush } => {
                    surface.draw_rect(*rect, pen.as_ref(), brush.as_ref())
                }
                DrawCommand::Text {
                    text,
                    pos,
                    font,
                    color,
                } => surface.draw_text(text, *pos, font, *color),
                DrawCommand::Clip(rect) => surface.set_clip(*rect),
            }
        }
    }
}

impl DeviceSurface for RenderList {
    fn draw_line(&mut self, from: DevicePoint, to: DevicePoint, pen: &Pen) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            pen: *pen,
        });
    }

    fn draw_ellipse(&mut self, rect: DeviceRect, pen: Option<&Pen>, brush: Option<&Brush>) {
        self.commands.push(DrawCommand::Ellipse {
            rect,
            pen: pen.copied(),
            brush: brush.copied(),
        });
    }

    fn draw_rect(&mut self, rect: DeviceRect, pen: Option<&Pen>, brush: Option<&Brush>) {
        self.commands.push(DrawCommand::Rect {
            rect,
            pen: pen.copied(),
            brush: brush.copied(),
        });
    }

    fn draw_text(&mut self, text: &str, pos: DevicePoint, font: &Font, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            font: *font,
            color,
        });
    }

    fn set_clip(&mut self, rect: Option<DeviceRect>) {
        self.commands.push(DrawCommand::Clip(rect));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pen_scaling_keeps_one_pixel() {
        let pen = Pen::new(Color::RED, 1);
        assert_eq!(pen.scaled(0.2).width, 1);
        assert_eq!(pen.scaled(3.0).width, 3);
        assert_eq!(pen.with_min_width(3).width, 3);
        assert_eq!(Font::new(12.0).scaled(0.1).size, 2.0);
    }

    #[test]
    fn render_list_records_and_replays() {
        let mut list = RenderList::new();
        list.draw_line(DevicePoint::new(0, 0), DevicePoint::new(5, 5), &Pen::default());
        list.draw_text("1.0", DevicePoint::new(2, 3), &Font::default(), Color::BLACK);
        list.draw_ellipse(DeviceRect::new(0, 0, 2, 2), None, Some(&Brush::new(Color::GREEN)));
        assert_eq!(list.lines().count(), 1);
        assert_eq!(list.texts().next(), Some(("1.0", DevicePoint::new(2, 3))));

        let mut copy = RenderList::new();
        list.replay(&mut copy);
        assert_eq!(copy.commands(), list.commands());
    }

    #[test]
    fn estimated_extent_scales_with_length() {
        let font = Font::new(12.0);
        assert_eq!(estimate_text_extent("12345", &font), DeviceSize::new(30, 12));
        assert_eq!(Color::BLUE.to_f32(), [0.0, 0.0, 1.0, 1.0]);
    }
}
