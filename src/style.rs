//! Plot configuration and curve styling.
//!
//! A [`PlotConfig`] is built once, either from defaults or from JSON, and
//! shared by reference with the controller and with curve creation. Nothing
//! in it changes after construction; runtime toggles live on the controller.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PlotError;
use crate::geom::{DeviceSize, PlotRect};
use crate::interaction::{AUTOSCROLL_INTERVAL, DragMarker, MIN_ZOOM_DRAG, MouseFunction};
use crate::render::{Color, Font, Pen};
use crate::view::HISTORY_CAPACITY;

/// How new selections interact with existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionType {
    /// Selecting is disabled.
    None,
    /// One range in one curve at a time.
    Single,
    /// Ranges in one curve at a time.
    SingleCurve,
    /// One range in each curve.
    SinglePerCurve,
    /// Anything goes.
    #[default]
    Multiple,
}

/// Which of a curve's pens to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PenKind {
    Normal,
    /// The curve is the active one.
    Active,
    /// Points inside a selected range.
    Selected,
}

/// Pens used to draw a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveStyle {
    pub normal: Pen,
    pub active: Pen,
    pub selected: Pen,
}

impl CurveStyle {
    pub fn pen(&self, kind: PenKind) -> Pen {
        match kind {
            PenKind::Normal => self.normal,
            PenKind::Active => self.active,
            PenKind::Selected => self.selected,
        }
    }

    pub fn set_pen(&mut self, kind: PenKind, pen: Pen) {
        match kind {
            PenKind::Normal => self.normal = pen,
            PenKind::Active => self.active = pen,
            PenKind::Selected => self.selected = pen,
        }
    }
}

impl Default for CurveStyle {
    fn default() -> Self {
        Self {
            normal: Pen::new(Color::BLACK, 1),
            active: Pen::new(Color::BLUE, 1),
            selected: Pen::new(Color::RED, 1),
        }
    }
}

/// Placement of the curve key (legend).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Position as a percentage of the area, measured from the lower left.
    pub position: [f64; 2],
    /// Clamp the key so it stays inside the area.
    pub inside: bool,
    /// Distance from the area edge when clamped.
    pub border: i32,
    /// Length of the sample line drawn before each name.
    pub line_width: i32,
    /// Gap between the sample line and the name.
    pub margin: i32,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            position: [100.0, 100.0],
            inside: true,
            border: 5,
            line_width: 20,
            margin: 5,
        }
    }
}

/// Look of the data cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorStyle {
    pub color: Color,
    /// Radius of the cursor ellipse in pixels.
    pub size: i32,
}

impl Default for CursorStyle {
    fn default() -> Self {
        Self {
            color: Color::GREEN,
            size: 2,
        }
    }
}

/// Colours of the non-curve parts of the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotColors {
    pub background: Color,
    pub grid: Color,
    pub border: Color,
    pub axis_text: Color,
    pub key_text: Color,
    pub drag_marker: Color,
}

impl Default for PlotColors {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            grid: Color::GREY,
            border: Color::BLACK,
            axis_text: Color::BLACK,
            key_text: Color::BLACK,
            drag_marker: Color::rgb(128, 128, 128),
        }
    }
}

/// Immutable controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub selection_type: SelectionType,
    /// View used when no curve has usable bounds.
    pub default_plot_rect: PlotRect,
    /// Smallest plot area the layout will produce.
    pub area_min_size: DeviceSize,
    /// Snap the first tick onto a whole pixel after every view change.
    pub correct_ticks: bool,
    /// Labels switch to exponential notation at this magnitude and below its reciprocal.
    pub min_exponential: f64,
    /// Character cell of the axis font.
    pub axis_font_size: DeviceSize,
    /// Width reserved for Y axis labels.
    pub left_axis_text_width: i32,
    pub border: i32,
    pub area_border_width: i32,
    pub draw_symbols: bool,
    pub draw_lines: bool,
    pub draw_spline: bool,
    pub draw_grid: bool,
    pub draw_ticks: bool,
    pub show_key: bool,
    pub show_x_axis: bool,
    pub show_y_axis: bool,
    /// Fit the view to all curves whenever one is added.
    pub fit_on_new_curve: bool,
    pub mouse_function: MouseFunction,
    pub drag_marker: DragMarker,
    pub cursor: CursorStyle,
    pub history_capacity: usize,
    pub key: KeyConfig,
    pub curve: CurveStyle,
    pub colors: PlotColors,
    pub axis_font: Font,
    pub key_font: Font,
    pub autoscroll_interval_ms: u64,
    pub min_zoom_drag: i32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            selection_type: SelectionType::Multiple,
            default_plot_rect: PlotRect::new(-10.0, -10.0, 20.0, 20.0),
            area_min_size: DeviceSize::new(10, 10),
            correct_ticks: true,
            min_exponential: 1000.0,
            axis_font_size: DeviceSize::new(6, 12),
            left_axis_text_width: 60,
            border: 4,
            area_border_width: 1,
            draw_symbols: true,
            draw_lines: true,
            draw_spline: false,
            draw_grid: true,
            draw_ticks: false,
            show_key: false,
            show_x_axis: true,
            show_y_axis: true,
            fit_on_new_curve: true,
            mouse_function: MouseFunction::Zoom,
            drag_marker: DragMarker::Rect,
            cursor: CursorStyle::default(),
            history_capacity: HISTORY_CAPACITY,
            key: KeyConfig::default(),
            curve: CurveStyle::default(),
            colors: PlotColors::default(),
            axis_font: Font::default(),
            key_font: Font::default(),
            autoscroll_interval_ms: AUTOSCROLL_INTERVAL.as_millis() as u64,
            min_zoom_drag: MIN_ZOOM_DRAG,
        }
    }
}

impl PlotConfig {
    /// Parse a configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, PlotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, PlotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PlotError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)?;
        log::debug!("loaded plot config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PlotError> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        log::debug!("saved plot config to {}", path.display());
        Ok(())
    }
}
