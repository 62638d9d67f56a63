//! GPUI integration for plotctrl.
//!
//! [`PlotCtrlView`] hosts a [`PlotCtrl`](crate::plot::PlotCtrl), paints its
//! plot area and axes with GPUI primitives and forwards pointer, wheel and
//! key input to it.

mod paint;
mod text;
mod view;

pub use view::{PlotCtrlHandle, PlotCtrlView};
