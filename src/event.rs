//! Notifications and vetoable change requests sent to the host.
//!
//! State changes the host may refuse go through
//! [`PlotListener::request_change`] before they are applied. Everything
//! else is reported after the fact with [`PlotListener::notify`].

use crate::error::PlotError;
use crate::geom::{PlotRect, Point};
use crate::interaction::MouseFunction;
use crate::plot::Cursor;
use crate::range::RangeInt;

/// Something that happened inside the controller.
#[derive(Debug)]
pub enum PlotEvent {
    CurveAdded { index: usize },
    /// The curve that was at `index` is gone; `None` means all curves.
    CurveDeleted { index: Option<usize> },
    ActiveCurveChanged { index: Option<usize> },
    /// Pointer moved over the plot area.
    MouseMotion { pos: Point },
    Clicked { pos: Point },
    DoubleClicked { pos: Point },
    /// A click landed on a data point.
    PointClicked { curve: usize, index: usize, point: Point },
    PointDoubleClicked { curve: usize, index: usize, point: Point },
    /// A drag started in the plot area.
    AreaSelectionCreating { rect: PlotRect },
    AreaSelectionChanging { rect: PlotRect },
    /// The drag ended.
    AreaSelectionCreated { rect: PlotRect },
    ViewChanged { view: PlotRect },
    CursorChanged { cursor: Option<Cursor> },
    MouseFunctionChanged { function: MouseFunction },
    /// Points of `curve` in `range` were selected or deselected.
    RangeSelectionChanged {
        curve: usize,
        range: RangeInt,
        selected: bool,
    },
    /// A requested update was rejected and nothing changed.
    Error(PlotError),
}

/// A change that waits for the host's approval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeRequest {
    /// `None` deletes every curve.
    DeleteCurve { index: Option<usize> },
    ActiveCurve { from: Option<usize>, to: Option<usize> },
    View { from: PlotRect, to: PlotRect },
    Cursor { from: Option<Cursor>, to: Option<Cursor> },
    MouseFunction { from: MouseFunction, to: MouseFunction },
}

/// The host allows a requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted;

/// The host refuses a requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vetoed;

/// Receives the controller's requests and notifications.
pub trait PlotListener {
    /// Approve or refuse a change. Accepts everything by default.
    fn request_change(&mut self, request: &ChangeRequest) -> Result<Accepted, Vetoed> {
        let _ = request;
        Ok(Accepted)
    }

    /// Observe an applied change.
    fn notify(&mut self, event: &PlotEvent) {
        let _ = event;
    }
}

/// Listener that accepts every change and ignores notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl PlotListener for NullListener {}
