//! Dirty-region tracking for the three sub-windows of a plot.
//!
//! Each sub-window moves through `Clean -> Dirty -> Repainting -> Clean`.
//! While a batch is open every sub-window is `Suppressed` and remembers
//! whether a repaint was requested in the meantime.

use std::ops::{BitOr, BitOrAssign};

/// Independently repainted parts of the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubWindow {
    /// Plot area with curves, grid, markers and key.
    Area,
    /// Tick labels below the area.
    XAxis,
    /// Tick labels left of the area.
    YAxis,
}

impl SubWindow {
    pub const ALL: [Self; 3] = [Self::Area, Self::XAxis, Self::YAxis];

    fn bit(self) -> u8 {
        match self {
            Self::Area => 0x1,
            Self::XAxis => 0x2,
            Self::YAxis => 0x4,
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Area => 0,
            Self::XAxis => 1,
            Self::YAxis => 2,
        }
    }
}

/// Set of sub-windows that need repainting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RedrawNeed(u8);

impl RedrawNeed {
    pub const NONE: Self = Self(0);
    pub const AREA: Self = Self(0x1);
    pub const X_AXIS: Self = Self(0x2);
    pub const Y_AXIS: Self = Self(0x4);
    pub const ALL: Self = Self(0x7);

    /// Check whether `window` is part of the set.
    pub fn includes(self, window: SubWindow) -> bool {
        self.0 & window.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Sub-windows in the set, in painting order.
    pub fn windows(self) -> impl Iterator<Item = SubWindow> {
        SubWindow::ALL
            .into_iter()
            .filter(move |window| self.includes(*window))
    }
}

impl From<SubWindow> for RedrawNeed {
    fn from(window: SubWindow) -> Self {
        Self(window.bit())
    }
}

impl BitOr for RedrawNeed {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RedrawNeed {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Repaint state of one sub-window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepaintState {
    #[default]
    Clean,
    Dirty,
    /// A paint is in progress; `invalidated` records a request made during it.
    Repainting { invalidated: bool },
    /// Repaints are held back until the batch ends.
    Suppressed { pending: bool },
}

/// Repaint state for all three sub-windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyRegions {
    states: [RepaintState; 3],
}

impl DirtyRegions {
    /// Create with every sub-window clean.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, window: SubWindow) -> RepaintState {
        self.states[window.slot()]
    }

    /// Request a repaint of every sub-window in `need`.
    pub fn invalidate(&mut self, need: RedrawNeed) {
        for window in need.windows() {
            let state = &mut self.states[window.slot()];
            *state = match *state {
                RepaintState::Clean | RepaintState::Dirty => RepaintState::Dirty,
                RepaintState::Repainting { .. } => RepaintState::Repainting { invalidated: true },
                RepaintState::Suppressed { .. } => RepaintState::Suppressed { pending: true },
            };
        }
    }

    /// Hold back repaints; outstanding requests are kept as pending.
    pub fn suppress(&mut self) {
        for state in &mut self.states {
            let pending = match *state {
                RepaintState::Clean => false,
                RepaintState::Dirty => true,
                RepaintState::Repainting { invalidated } => invalidated,
                RepaintState::Suppressed { pending } => pending,
            };
            *state = RepaintState::Suppressed { pending };
        }
    }

    /// End suppression and return the sub-windows that are now dirty.
    ///
    /// With `force` every sub-window becomes dirty.
    pub fn release(&mut self, force: bool) -> RedrawNeed {
        let mut need = RedrawNeed::NONE;
        for window in SubWindow::ALL {
            let state = &mut self.states[window.slot()];
            if let RepaintState::Suppressed { pending } = *state {
                *state = if pending || force {
                    RepaintState::Dirty
                } else {
                    RepaintState::Clean
                };
            } else if force {
                *state = RepaintState::Dirty;
            }
            if *state == RepaintState::Dirty {
                need |= window.into();
            }
        }
        need
    }

    pub fn is_suppressed(&self) -> bool {
        self.states
            .iter()
            .any(|state| matches!(state, RepaintState::Suppressed { .. }))
    }

    /// Enter `Repainting`. Returns false while suppressed.
    pub fn begin_paint(&mut self, window: SubWindow) -> bool {
        let state = &mut self.states[window.slot()];
        if matches!(state, RepaintState::Suppressed { .. }) {
            return false;
        }
        *state = RepaintState::Repainting { invalidated: false };
        true
    }

    /// Leave `Repainting`; requests made during the paint leave it dirty.
    pub fn end_paint(&mut self, window: SubWindow) {
        let state = &mut self.states[window.slot()];
        if let RepaintState::Repainting { invalidated } = *state {
            *state = if invalidated {
                RepaintState::Dirty
            } else {
                RepaintState::Clean
            };
        }
    }

    pub fn is_dirty(&self, window: SubWindow) -> bool {
        matches!(
            self.state(window),
            RepaintState::Dirty | RepaintState::Suppressed { pending: true }
        )
    }

    /// Sub-windows waiting for a repaint.
    pub fn dirty(&self) -> RedrawNeed {
        SubWindow::ALL
            .into_iter()
            .filter(|window| self.is_dirty(*window))
            .fold(RedrawNeed::NONE, |need, window| need | window.into())
    }
}
