//! plotctrl is an interactive x/y curve plotting control.
//!
//! The core is toolkit independent: [`PlotCtrl`] owns curves, selections,
//! the data cursor and the view, and draws through the [`DeviceSurface`]
//! trait. Enable the `gpui` feature for a ready-made GPUI view.

#![forbid(unsafe_code)]

pub mod axis;
pub mod data;
pub mod draw;
pub mod error;
pub mod event;
pub mod geom;
#[cfg(feature = "gpui")]
pub mod gpui_backend;
pub mod interaction;
pub mod loader;
pub mod marker;
pub mod plot;
pub mod range;
pub mod redraw;
pub mod render;
pub mod style;
pub mod transform;
pub mod view;

pub use axis::{AxisConfig, AxisFormatter, AxisKind, AxisTicks};
pub use data::{IndexType, PlotData};
pub use error::{LoadError, PlotError};
pub use event::{Accepted, ChangeRequest, NullListener, PlotEvent, PlotListener, Vetoed};
pub use geom::{DevicePoint, DeviceRect, DeviceSize, PlotRect, Point};
pub use interaction::{DragMarker, Key, Modifiers, MouseEvent, MouseEventKind, MouseFunction};
pub use loader::{LoadOptions, LoadedCurve, load_file, parse_delimited, save_file};
pub use marker::{MarkerKind, PlotMarker};
pub use plot::{Cursor, PlotCtrl, PlotLayout};
pub use range::{RangeDouble, RangeInt, RangeSelection};
pub use redraw::{RedrawNeed, SubWindow};
pub use render::{Brush, Color, DeviceSurface, Font, Pen, RenderList};
pub use style::{PenKind, PlotConfig, SelectionType};
pub use transform::{ViewTransform, Zoom};
