//! Input vocabulary and interaction state for the plot controller.
//!
//! The host window system translates its events into [`MouseEvent`] and
//! [`Key`] values. Pure helpers here map them to mouse functions, keyboard
//! actions and auto-scroll steps; the controller applies the results.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geom::{DevicePoint, DeviceRect, DeviceSize};
use crate::redraw::SubWindow;
use crate::transform::Zoom;

/// Interval between auto-scroll ticks.
pub const AUTOSCROLL_INTERVAL: Duration = Duration::from_millis(200);
/// Pixels scrolled per auto-scroll tick.
pub const AUTOSCROLL_STEP: f64 = 20.0;
/// Smallest drag, in pixels, that commits a zoom.
pub const MIN_ZOOM_DRAG: i32 = 10;

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };
}

/// What a left-button drag in the plot area does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseFunction {
    Nothing,
    #[default]
    Zoom,
    Select,
    Deselect,
    Pan,
}

impl MouseFunction {
    /// Shift selects, Ctrl deselects, Shift+Ctrl+Alt pans, anything else zooms.
    pub fn from_modifiers(modifiers: Modifiers) -> Self {
        match (modifiers.shift, modifiers.ctrl, modifiers.alt) {
            (true, false, false) => Self::Select,
            (false, true, false) => Self::Deselect,
            (true, true, true) => Self::Pan,
            _ => Self::Zoom,
        }
    }

    /// Drag marker used when switching to this function.
    ///
    /// `None` means keep whatever marker is current.
    pub fn default_marker(self) -> Option<DragMarker> {
        match self {
            Self::Nothing | Self::Pan => Some(DragMarker::None),
            Self::Zoom | Self::Select | Self::Deselect => None,
        }
    }
}

/// Shape drawn while dragging in the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragMarker {
    None,
    #[default]
    Rect,
    /// Full-height band between two X positions.
    Vert,
    /// Full-width band between two Y positions.
    Horiz,
}

/// Kind of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    /// Left button pressed.
    Down,
    /// Left button double click.
    DoubleClick,
    /// Pointer moved with the left button held.
    Drag,
    /// Left button released.
    Up,
    /// Pointer moved with no button held.
    Move,
    /// Wheel turned; positive is away from the user.
    Wheel(i32),
}

/// Pointer event in the local coordinates of the receiving sub-window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub pos: DevicePoint,
    pub kind: MouseEventKind,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Create a new mouse event.
    pub fn new(pos: DevicePoint, kind: MouseEventKind, modifiers: Modifiers) -> Self {
        Self {
            pos,
            kind,
            modifiers,
        }
    }

    /// Check whether the left button is held during this event.
    pub fn left_is_down(&self) -> bool {
        matches!(
            self.kind,
            MouseEventKind::Down | MouseEventKind::DoubleClick | MouseEventKind::Drag
        )
    }
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Delete,
    Escape,
    Space,
    Char(char),
}

/// Controller action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    /// Select (or deselect) the point under the cursor.
    SelectCursorPoint { select: bool },
    /// Make the next curve active, wrapping around.
    CycleActiveCurve,
    /// Shift the origin by fractions of the view width and height.
    Pan { dx: f64, dy: f64 },
    /// Centre on the cursor, or on the plot origin without one.
    CenterOnCursor,
    /// Show the whole active curve with a small margin.
    FitActiveCurveBounds,
    /// Multiply the zoom about the view centre.
    Zoom { x: f64, y: f64 },
    /// Scale the view about the last mouse position.
    ScaleViewAtMouse(f64),
    /// Fit the active curve (or all curves without one).
    MakeActiveVisible,
    CursorPrev,
    CursorNext,
    HistoryBack,
    HistoryForward,
    DeleteActiveCurve,
    /// Clear a selection, then the cursor, then the active curve.
    Escape,
}

/// Look up the action for a key press.
pub fn key_action(key: Key, modifiers: Modifiers) -> Option<KeyAction> {
    if key == Key::Space {
        return Some(if modifiers.shift || modifiers.ctrl {
            KeyAction::SelectCursorPoint {
                select: !modifiers.ctrl,
            }
        } else {
            KeyAction::CycleActiveCurve
        });
    }
    if modifiers.ctrl || modifiers.alt {
        return None;
    }
    let action = match key {
        Key::Left => KeyAction::Pan { dx: -0.1, dy: 0.0 },
        Key::Right => KeyAction::Pan { dx: 0.1, dy: 0.0 },
        Key::Up => KeyAction::Pan { dx: 0.0, dy: 0.1 },
        Key::Down => KeyAction::Pan { dx: 0.0, dy: -0.1 },
        Key::PageUp => KeyAction::Pan { dx: 0.0, dy: 0.5 },
        Key::PageDown => KeyAction::Pan { dx: 0.0, dy: -0.5 },
        Key::Home => KeyAction::CenterOnCursor,
        Key::End => KeyAction::FitActiveCurveBounds,
        Key::Delete => KeyAction::DeleteActiveCurve,
        Key::Escape => KeyAction::Escape,
        Key::Char(c) => match c {
            'a' => KeyAction::Zoom { x: 1.0 / 1.5, y: 1.0 },
            'd' => KeyAction::Zoom { x: 1.5, y: 1.0 },
            'w' => KeyAction::Zoom { x: 1.0, y: 1.5 },
            'x' => KeyAction::Zoom { x: 1.0, y: 1.0 / 1.5 },
            'q' => KeyAction::Zoom { x: 1.0 / 1.5, y: 1.5 },
            'e' => KeyAction::Zoom { x: 1.5, y: 1.5 },
            'z' => KeyAction::Zoom { x: 1.0 / 1.5, y: 1.0 / 1.5 },
            'c' => KeyAction::Zoom { x: 1.5, y: 1.0 / 1.5 },
            '=' => KeyAction::ScaleViewAtMouse(0.67),
            '-' => KeyAction::ScaleViewAtMouse(1.5),
            's' => KeyAction::MakeActiveVisible,
            '<' | ',' => KeyAction::CursorPrev,
            '>' | '.' => KeyAction::CursorNext,
            '[' => KeyAction::HistoryBack,
            ']' => KeyAction::HistoryForward,
            _ => return None,
        },
        Key::Space => return None,
    };
    Some(action)
}

/// Single exclusive pointer capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseCapture {
    owner: Option<SubWindow>,
}

impl MouseCapture {
    /// Give capture to `owner`, returning the previous holder.
    pub fn set(&mut self, owner: SubWindow) -> Option<SubWindow> {
        self.owner.replace(owner)
    }

    /// Release capture, returning the previous holder.
    pub fn release(&mut self) -> Option<SubWindow> {
        self.owner.take()
    }

    pub fn owner(&self) -> Option<SubWindow> {
        self.owner
    }

    pub fn is_captured_by(&self, window: SubWindow) -> bool {
        self.owner == Some(window)
    }
}

/// One-shot auto-scroll timer, re-armed after every tick.
///
/// The host polls [`AutoScrollTimer::is_running`] and calls the controller's
/// `on_timer` after [`AutoScrollTimer::interval`] elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoScrollTimer {
    owner: Option<SubWindow>,
    interval: Duration,
}

impl Default for AutoScrollTimer {
    fn default() -> Self {
        Self::new(AUTOSCROLL_INTERVAL)
    }
}

impl AutoScrollTimer {
    /// Create a stopped timer.
    pub fn new(interval: Duration) -> Self {
        Self {
            owner: None,
            interval,
        }
    }

    /// Arm the timer for `owner`. Returns false if it was already running.
    pub fn start(&mut self, owner: SubWindow) -> bool {
        let started = self.owner.is_none();
        self.owner = Some(owner);
        started
    }

    pub fn stop(&mut self) {
        self.owner = None;
    }

    pub fn is_running(&self) -> bool {
        self.owner.is_some()
    }

    /// Sub-window that armed the timer.
    pub fn owner(&self) -> Option<SubWindow> {
        self.owner
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Plot-space scroll step while the pointer is outside the plot area.
///
/// Returns `(dx, dy)` in plot units; both are zero when the pointer is inside.
pub fn autoscroll_delta(pos: DevicePoint, area: DeviceSize, zoom: Zoom) -> (f64, f64) {
    let dx = if pos.x < 0 {
        -AUTOSCROLL_STEP
    } else if pos.x > area.width {
        AUTOSCROLL_STEP
    } else {
        0.0
    };
    let dy = if pos.y < 0 {
        AUTOSCROLL_STEP
    } else if pos.y > area.height {
        -AUTOSCROLL_STEP
    } else {
        0.0
    };
    (dx / zoom.x, dy / zoom.y)
}

/// Drag rectangle while the left button is held in the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragState {
    /// Press point with signed extent to the current pointer.
    pub rect: Option<DeviceRect>,
}

impl DragState {
    /// Start a drag at `pos`.
    pub fn begin(&mut self, pos: DevicePoint) {
        self.rect = Some(DeviceRect::new(pos.x, pos.y, 0, 0));
    }

    /// Stretch the rectangle to `pos`, starting one if none is open.
    pub fn update(&mut self, pos: DevicePoint) {
        let mut rect = self
            .rect
            .unwrap_or_else(|| DeviceRect::new(pos.x, pos.y, 1, 1));
        rect.width = pos.x - rect.x;
        rect.height = pos.y - rect.y;
        self.rect = Some(rect);
    }

    /// Finish the drag, returning the normalized rectangle.
    pub fn finish(&mut self) -> Option<DeviceRect> {
        self.rect.take().map(|rect| rect.normalized())
    }

    pub fn clear(&mut self) {
        self.rect = None;
    }
}
