use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use gpui::prelude::*;
use gpui::{
    App, FocusHandle, KeyDownEvent, MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent,
    Pixels, Point, ScrollWheelEvent, Window, canvas, div, point, px,
};

use crate::axis::AxisKind;
use crate::geom::{DevicePoint, DeviceSize};
use crate::interaction::{Key, Modifiers, MouseEvent, MouseEventKind};
use crate::plot::{PlotCtrl, PlotLayout};
use crate::redraw::SubWindow;

use super::paint::{GpuiSurface, to_hsla};
use super::text::measure;

#[derive(Debug, Default)]
struct ViewState {
    /// Window position of the control's top-left corner.
    origin: (f32, f32),
    layout: PlotLayout,
    modifiers: Modifiers,
    last_tick: Option<Instant>,
}

/// A GPUI view that hosts a [`PlotCtrl`].
///
/// The view lays out the plot area and both axes inside its bounds, paints
/// them every frame and forwards pointer, wheel and key input to the
/// controller.
#[derive(Clone)]
pub struct PlotCtrlView {
    plot: Arc<RwLock<PlotCtrl>>,
    state: Arc<RwLock<ViewState>>,
    focus_handle: FocusHandle,
}

impl PlotCtrlView {
    pub fn new(plot: PlotCtrl, cx: &mut App) -> Self {
        Self {
            plot: Arc::new(RwLock::new(plot)),
            state: Arc::new(RwLock::new(ViewState::default())),
            focus_handle: cx.focus_handle(),
        }
    }

    /// Get a handle for driving the controller from elsewhere.
    pub fn plot_handle(&self) -> PlotCtrlHandle {
        PlotCtrlHandle {
            plot: Arc::clone(&self.plot),
        }
    }

    /// Map a window position to the sub-window under it.
    ///
    /// While a sub-window holds the pointer capture every position is
    /// routed to it.
    fn route(&self, plot: &PlotCtrl, pos: Point<Pixels>) -> Option<(SubWindow, DevicePoint)> {
        let state = read(&self.state);
        let local = DevicePoint::new(
            (f32::from(pos.x) - state.origin.0).round() as i32,
            (f32::from(pos.y) - state.origin.1).round() as i32,
        );
        let rect_of = |window| match window {
            SubWindow::Area => state.layout.area,
            SubWindow::XAxis => state.layout.x_axis,
            SubWindow::YAxis => state.layout.y_axis,
        };
        let window = plot
            .capture()
            .or_else(|| SubWindow::ALL.into_iter().find(|window| rect_of(*window).contains(local)))?;
        let rect = rect_of(window);
        Some((window, DevicePoint::new(local.x - rect.x, local.y - rect.y)))
    }

    fn sync_modifiers(&self, plot: &mut PlotCtrl, modifiers: Modifiers) {
        let mut state = write(&self.state);
        if state.modifiers != modifiers {
            state.modifiers = modifiers;
            plot.on_modifiers_changed(modifiers);
        }
    }

    fn dispatch(
        &mut self,
        pos: Point<Pixels>,
        kind: MouseEventKind,
        modifiers: &gpui::Modifiers,
        cx: &mut Context<Self>,
    ) {
        let modifiers = to_modifiers(modifiers);
        let mut plot = write(&self.plot);
        self.sync_modifiers(&mut plot, modifiers);
        let Some((window, local)) = self.route(&plot, pos) else {
            return;
        };
        let event = MouseEvent::new(local, kind, modifiers);
        match window {
            SubWindow::Area => plot.on_area_mouse(event),
            SubWindow::XAxis => plot.on_axis_mouse(AxisKind::X, event),
            SubWindow::YAxis => plot.on_axis_mouse(AxisKind::Y, event),
        }
        cx.notify();
    }

    fn on_mouse_down(&mut self, ev: &MouseDownEvent, cx: &mut Context<Self>) {
        let kind = if ev.click_count >= 2 {
            MouseEventKind::DoubleClick
        } else {
            MouseEventKind::Down
        };
        self.dispatch(ev.position, kind, &ev.modifiers, cx);
    }

    fn on_mouse_move(&mut self, ev: &MouseMoveEvent, cx: &mut Context<Self>) {
        let kind = if ev.pressed_button == Some(MouseButton::Left) {
            MouseEventKind::Drag
        } else {
            MouseEventKind::Move
        };
        self.dispatch(ev.position, kind, &ev.modifiers, cx);
    }

    fn on_mouse_up(&mut self, ev: &MouseUpEvent, cx: &mut Context<Self>) {
        self.dispatch(ev.position, MouseEventKind::Up, &ev.modifiers, cx);
    }

    fn on_scroll(&mut self, ev: &ScrollWheelEvent, cx: &mut Context<Self>) {
        let delta = ev.delta.pixel_delta(px(16.0));
        let dy = f32::from(delta.y);
        if dy.abs() < 0.01 {
            return;
        }
        let notches = if dy > 0.0 { 1 } else { -1 };
        self.dispatch(ev.position, MouseEventKind::Wheel(notches), &ev.modifiers, cx);
    }

    fn on_key_down(&mut self, ev: &KeyDownEvent, cx: &mut Context<Self>) {
        let modifiers = to_modifiers(&ev.keystroke.modifiers);
        let mut plot = write(&self.plot);
        self.sync_modifiers(&mut plot, modifiers);
        let Some(key) = to_key(&ev.keystroke.key) else {
            return;
        };
        if plot.on_key(key, modifiers) {
            cx.notify();
        }
    }
}

impl Render for PlotCtrlView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let layout_plot = Arc::clone(&self.plot);
        let paint_plot = Arc::clone(&self.plot);
        let state = Arc::clone(&self.state);
        let background = to_hsla(read(&self.plot).config().colors.background);

        div()
            .track_focus(&self.focus_handle)
            .size_full()
            .bg(background)
            .child(
                canvas(
                    move |bounds, window, _| {
                        let mut plot = write(&layout_plot);
                        let mut state = write(&state);
                        let cell = measure(window, "5", &plot.config().axis_font);
                        let client = DeviceSize::new(
                            f32::from(bounds.size.width) as i32,
                            f32::from(bounds.size.height) as i32,
                        );
                        state.layout = plot.layout(client, cell);
                        state.origin = (f32::from(bounds.origin.x), f32::from(bounds.origin.y));

                        if plot.timer().is_running() {
                            let now = Instant::now();
                            let interval = plot.timer().interval();
                            if state
                                .last_tick
                                .is_none_or(|tick| now.duration_since(tick) >= interval)
                            {
                                state.last_tick = Some(now);
                                plot.on_timer();
                            }
                            window.request_animation_frame();
                        } else {
                            state.last_tick = None;
                        }
                        state.layout
                    },
                    move |bounds, layout, window, cx| {
                        let mut plot = write(&paint_plot);
                        let windows = [
                            (SubWindow::Area, layout.area),
                            (SubWindow::XAxis, layout.x_axis),
                            (SubWindow::YAxis, layout.y_axis),
                        ];
                        for (sub_window, rect) in windows {
                            let origin = point(
                                bounds.origin.x + px(rect.x as f32),
                                bounds.origin.y + px(rect.y as f32),
                            );
                            let mut surface = GpuiSurface::new(window, cx, origin);
                            if !plot.paint(sub_window, &mut surface) {
                                plot.draw_window(sub_window, &mut surface);
                            }
                        }
                    },
                )
                .size_full(),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, ev, window, cx| {
                    window.focus(&this.focus_handle);
                    this.on_mouse_down(ev, cx);
                }),
            )
            .on_mouse_move(cx.listener(|this, ev, _, cx| {
                this.on_mouse_move(ev, cx);
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_up(ev, cx);
                }),
            )
            .on_scroll_wheel(cx.listener(|this, ev, _, cx| {
                this.on_scroll(ev, cx);
            }))
            .on_key_down(cx.listener(|this, ev, _, cx| {
                this.on_key_down(ev, cx);
            }))
    }
}

/// A handle for driving a [`PlotCtrl`] held inside a [`PlotCtrlView`].
///
/// The handle clones cheaply. Call `cx.notify()` on the view after changes
/// made through it.
#[derive(Clone)]
pub struct PlotCtrlHandle {
    plot: Arc<RwLock<PlotCtrl>>,
}

impl PlotCtrlHandle {
    /// Read the controller; it stays locked for the duration of the callback.
    pub fn read<R>(&self, f: impl FnOnce(&PlotCtrl) -> R) -> R {
        f(&read(&self.plot))
    }

    /// Mutate the controller; it stays locked for the duration of the callback.
    pub fn write<R>(&self, f: impl FnOnce(&mut PlotCtrl) -> R) -> R {
        f(&mut write(&self.plot))
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn to_modifiers(modifiers: &gpui::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift,
        ctrl: modifiers.control,
        alt: modifiers.alt,
    }
}

fn to_key(key: &str) -> Option<Key> {
    let key = match key {
        "left" => Key::Left,
        "right" => Key::Right,
        "up" => Key::Up,
        "down" => Key::Down,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "home" => Key::Home,
        "end" => Key::End,
        "delete" => Key::Delete,
        "escape" => Key::Escape,
        "space" => Key::Space,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return None,
            }
        }
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_map_to_keys() {
        assert_eq!(to_key("pagedown"), Some(Key::PageDown));
        assert_eq!(to_key("]"), Some(Key::Char(']')));
        assert_eq!(to_key("f5"), None);
    }
}
