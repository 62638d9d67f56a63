//! Error types shared by the plotting core.

/// Errors raised by curve creation, view updates and configuration I/O.
///
/// Controller operations report these through [`PlotEvent::Error`](crate::event::PlotEvent)
/// instead of returning them, so a rejected update never leaves partial state behind.
#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    /// A computed zoom, origin, view size or selection bound was NaN or infinite.
    #[error("{what} is not finite")]
    NonFinite {
        /// Which quantity failed the check.
        what: &'static str,
    },
    /// A curve index outside `0..count`.
    #[error("invalid curve index {index} (curve count {count})")]
    InvalidCurveIndex { index: usize, count: usize },
    /// A point index outside the curve.
    #[error("invalid data index {index} (curve length {len})")]
    InvalidDataIndex { index: usize, len: usize },
    /// An interval with `min > max` was passed where a real range is needed.
    #[error("empty range")]
    EmptyRange,
    /// Curves are capped at [`MAX_CURVE_POINTS`](crate::data::MAX_CURVE_POINTS).
    #[error("curve of {count} points exceeds the limit of {max}")]
    TooManyPoints { count: usize, max: usize },
    /// A curve needs at least one point.
    #[error("curve has no points")]
    NoPoints,
    /// X and Y arrays of different length.
    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlotError {
    pub(crate) fn non_finite(what: &'static str) -> Self {
        Self::NonFinite { what }
    }
}

/// Errors raised while importing a curve from delimited text.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// No numeric rows were found.
    #[error("no data rows found")]
    NoData,
    /// A row had fewer columns than the requested x or y column.
    #[error("line {line}: missing column {column}")]
    MissingColumn { line: usize, column: usize },
    /// The parsed rows could not form a curve.
    #[error(transparent)]
    Curve(#[from] PlotError),
}
