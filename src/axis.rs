//! Axis configuration, tick layout and label formatting.
//!
//! Tick steps are chosen from `{1, 2, 5} x 10^k` so that the labels fit the
//! available pixels. An optional correction pass nudges zoom and origin so
//! the first tick lands on a whole pixel and on a value that prints exactly.

use std::sync::Arc;

use crate::geom::DeviceSize;
use crate::transform::ViewTransform;

/// Multipliers tried for each decade of tick step.
const STEP_MULTIPLIERS: [f64; 3] = [0.1, 0.2, 0.5];
/// Decades searched above the range magnitude.
const STEP_DECADES: usize = 4;
/// Upper limit on label decimals.
const MAX_PRECISION: usize = 9;
/// Narrower windows get no ticks.
const MIN_TICK_WINDOW: i32 = 5;

/// Which axis a tick layout belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    /// Horizontal axis below the plot area.
    X,
    /// Vertical axis left of the plot area.
    Y,
}

/// printf-style label format: `%.{precision}f` or `%.{precision}e`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickFormat {
    pub exponential: bool,
    pub precision: usize,
}

impl TickFormat {
    /// Format a value for display.
    pub fn format(&self, value: f64) -> String {
        // Avoid printing "-0".
        let value = if value == 0.0 { 0.0 } else { value };
        if self.exponential {
            format_exponential(value, self.precision)
        } else {
            format!("{value:.*}", self.precision)
        }
    }

    /// The value as it reads back after formatting.
    pub fn quantize(&self, value: f64) -> Option<f64> {
        self.format(value).parse().ok()
    }
}

/// C-style exponent (`1.50e+03`) from Rust's `1.50e3`.
fn format_exponential(value: f64, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Tick step, count, format and the resulting pixel positions for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTicks {
    /// Distance between ticks in plot units.
    pub step: f64,
    /// Ticks to generate starting from the first multiple of `step` in view.
    pub count: usize,
    pub format: TickFormat,
    /// Pixel offsets along the axis.
    pub positions: Vec<i32>,
    /// One label per position.
    pub labels: Vec<String>,
}

impl Default for AxisTicks {
    fn default() -> Self {
        Self {
            step: 1.0,
            count: 4,
            format: TickFormat::default(),
            positions: Vec::new(),
            labels: Vec::new(),
        }
    }
}

impl AxisTicks {
    /// Ticks that draw nothing.
    pub fn none() -> Self {
        Self {
            count: 0,
            ..Self::default()
        }
    }

    /// First tick value at or above `start`.
    pub fn first_tick(&self, start: f64) -> f64 {
        (start / self.step).ceil() * self.step
    }
}

/// Choose a step, count and label format for the range `[start, end]`.
///
/// `window` is the axis length in pixels and `font` the character cell of
/// the axis font. Values whose magnitude is at least `min_exponential`, or
/// below its reciprocal, use exponential labels. The returned ticks have no
/// positions yet; see [`tick_positions`].
pub fn auto_calc_ticks(
    kind: AxisKind,
    start: f64,
    end: f64,
    window: i32,
    font: DeviceSize,
    min_exponential: f64,
) -> AxisTicks {
    let char_width = f64::from(font.width.max(1));
    let char_height = f64::from(font.height.max(1));
    let window_px = f64::from(window);

    let mut count = match kind {
        AxisKind::X => (window_px / (char_width * 10.0)).floor(),
        AxisKind::Y => {
            let scale = if window_px / (char_height * 2.0) > 2.0 { 2.0 } else { 1.5 };
            (window_px / (char_height * scale) + 0.5).floor()
        }
    };

    if window < MIN_TICK_WINDOW || !start.is_finite() || !end.is_finite() {
        return AxisTicks::none();
    }

    let range = end - start;
    let max = start.abs().max(end.abs());
    let min = start.abs().min(end.abs());
    if !range.is_finite() || range <= 0.0 {
        return AxisTicks::none();
    }

    let exponential = min >= min_exponential || max < 1.0 / min_exponential;
    let places = if exponential {
        1.0
    } else {
        max.log10().abs().floor()
    };

    let mut step = 10f64.powi(range.log10().trunc() as i32);
    let mut step10 = step / 10.0;
    let mut precision = 0.0;

    'decades: for _ in 0..STEP_DECADES {
        for multiplier in STEP_MULTIPLIERS {
            step = step10 * multiplier;
            precision = if exponential {
                (max.log10().trunc() - step.log10().trunc()).abs()
            } else if step >= 1.0 {
                0.0
            } else {
                (-step.log10()).ceil()
            };
            if !precision.is_finite() {
                precision = 0.0;
            }
            if kind == AxisKind::X {
                let fraction = if precision > 0.0 { 1.0 + precision } else { 0.0 };
                let digits = 1.0 + places + fraction + if exponential { 4.0 } else { 0.0 };
                count = (window_px / ((digits + 3.0) * char_width) + 0.5).floor();
            }
            if range / step <= count {
                break 'decades;
            }
        }
        step10 *= 10.0;
    }

    AxisTicks {
        step,
        count: (range / step).ceil() as usize + 1,
        format: TickFormat {
            exponential,
            precision: (precision as usize).min(MAX_PRECISION),
        },
        positions: Vec::new(),
        labels: Vec::new(),
    }
}

/// Zoom and origin on `kind`'s axis that put the first tick on a whole pixel.
///
/// Returns `None` when the first tick does not survive formatting. The
/// caller validates the result before applying it.
pub fn corrected_axis(kind: AxisKind, ticks: &AxisTicks, transform: &ViewTransform) -> Option<(f64, f64)> {
    let start = match kind {
        AxisKind::X => ticks.first_tick(transform.view.x),
        AxisKind::Y => ticks.first_tick(transform.view.y),
    };
    let start = ticks.format.quantize(start)?;
    match kind {
        AxisKind::X => {
            let x = f64::from(transform.plot_to_device_x(start));
            let next = f64::from(transform.plot_to_device_x(start + ticks.step));
            let zoom = (next - x) / ticks.step;
            Some((zoom, start - x / zoom))
        }
        AxisKind::Y => {
            let y = f64::from(transform.plot_to_device_y(start));
            let next = f64::from(transform.plot_to_device_y(start + ticks.step));
            let zoom = (y - next) / ticks.step;
            let height = f64::from(transform.area.height);
            Some((zoom, start - (height - y) / zoom))
        }
    }
}

/// Fill `ticks.positions` and `ticks.labels` for the current view.
///
/// Positions outside `[-1, window + 2)` are dropped.
pub fn tick_positions(
    kind: AxisKind,
    ticks: &mut AxisTicks,
    transform: &ViewTransform,
    formatter: &AxisFormatter,
) {
    ticks.positions.clear();
    ticks.labels.clear();
    let (mut current, window) = match kind {
        AxisKind::X => (ticks.first_tick(transform.view.x), transform.area.width),
        AxisKind::Y => (ticks.first_tick(transform.view.y), transform.area.height),
    };
    for _ in 0..ticks.count {
        if !current.is_finite() {
            log::warn!("axis tick value is not finite");
            return;
        }
        let position = match kind {
            AxisKind::X => transform.plot_to_device_x(current),
            AxisKind::Y => transform.plot_to_device_y(current),
        };
        if position >= -1 && position < window.saturating_add(2) {
            ticks.positions.push(position);
            ticks.labels.push(formatter.format(current, &ticks.format));
        }
        current += ticks.step;
    }
}

/// Formatter for axis tick labels.
#[derive(Clone, Default)]
pub enum AxisFormatter {
    /// Format chosen by the tick layout.
    #[default]
    Default,
    /// Custom formatter callback.
    Custom(Arc<dyn Fn(f64) -> String + Send + Sync>),
}

impl AxisFormatter {
    /// Format a tick value for display.
    pub fn format(&self, value: f64, format: &TickFormat) -> String {
        match self {
            Self::Default => format.format(value),
            Self::Custom(formatter) => formatter(value),
        }
    }
}

impl std::fmt::Debug for AxisFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "AxisFormatter::Default"),
            Self::Custom(_) => write!(f, "AxisFormatter::Custom(..)"),
        }
    }
}

/// Per-axis display options.
#[derive(Debug, Clone)]
pub struct AxisConfig {
    title: Option<String>,
    formatter: AxisFormatter,
    visible: bool,
}

impl AxisConfig {
    /// Create a visible axis with default labels.
    pub fn new() -> Self {
        Self {
            title: None,
            formatter: AxisFormatter::default(),
            visible: true,
        }
    }

    /// Set the axis title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the label formatter.
    pub fn with_formatter(mut self, formatter: AxisFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Show or hide the axis.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn formatter(&self) -> &AxisFormatter {
        &self.formatter
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::new()
    }
}
