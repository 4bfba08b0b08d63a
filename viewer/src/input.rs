//! Input model: modifier keys, keys, wheel deltas, and the drag state machine.
//!
//! `Modifiers` and `WheelDelta` capture the raw event context the host passes
//! in. `DragState` is the gesture tracked between pointer-down and pointer-up;
//! it carries the anchor offset needed to reproduce smooth dragging on every
//! subsequent pointer move.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::transform::{Point, ViewTransform};

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Whether the explicit zoom modifier is held.
    ///
    /// Ctrl is the zoom modifier; trackpad pinch gestures also arrive with
    /// Ctrl set. Plain scrolling is left to the page.
    #[must_use]
    pub fn zoom(self) -> bool {
        self.ctrl
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, Default)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Drag gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No drag in progress; pointer moves are ignored.
    #[default]
    Idle,
    /// The user is panning the graphic.
    Dragging {
        /// Pointer position minus translation at drag start.
        anchor_offset: Point,
    },
}

impl DragState {
    /// Start a drag at `pointer` against the current transform.
    #[must_use]
    pub fn begin(pointer: Point, transform: &ViewTransform) -> Self {
        Self::Dragging {
            anchor_offset: Point::new(pointer.x - transform.translate_x, pointer.y - transform.translate_y),
        }
    }

    /// Translation that places the graphic under `pointer`, or `None` when idle.
    #[must_use]
    pub fn translation_at(&self, pointer: Point) -> Option<Point> {
        match self {
            Self::Idle => None,
            Self::Dragging { anchor_offset } => {
                Some(Point::new(pointer.x - anchor_offset.x, pointer.y - anchor_offset.y))
            }
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}
