use gpui::{Hsla, ShapedLine, TextRun, Window, font, px};

use crate::geom::DeviceSize;
use crate::render::Font;

pub(crate) fn shape(window: &Window, text: &str, plot_font: &Font, color: Hsla) -> ShapedLine {
    let run = TextRun {
        len: text.len(),
        font: font(".SystemUIFont"),
        color,
        background_color: None,
        underline: None,
        strikethrough: None,
    };
    window
        .text_system()
        .shape_line(text.to_string().into(), px(plot_font.size), &[run], None)
}

/// Pixel size of a single line of text.
pub(crate) fn measure(window: &Window, text: &str, plot_font: &Font) -> DeviceSize {
    let line_height = plot_font.size.ceil() as i32;
    if text.is_empty() {
        return DeviceSize::new(0, line_height);
    }
    let shaped = shape(window, text, plot_font, gpui::black());
    let width = f32::from(shaped.width).ceil() as i32;
    let height = f32::from(shaped.ascent + shaped.descent).ceil() as i32;
    DeviceSize::new(width, height.max(line_height))
}
