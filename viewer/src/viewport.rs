//! Pan/zoom controller for one display surface.
//!
//! Owns the [`ViewTransform`] and [`DragState`] for a single rendered graphic.
//! Every scale change is clamped to the surface's [`SurfaceBounds`], so the
//! scale invariant holds after any sequence of operations.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::config::SurfaceBounds;
use crate::consts::{
    CURSOR_GRAB, CURSOR_GRABBING, TRANSFORM_ORIGIN, TRANSITION_EASED, TRANSITION_NONE, WHEEL_ZOOM_STEP, ZOOM_STEP,
};
use crate::input::{DragState, Modifiers, WheelDelta};
use crate::sink::GraphicId;
use crate::transform::{Point, ViewTransform};

/// Style the host applies to the transformed graphic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceStyle {
    pub transform: String,
    pub transform_origin: &'static str,
    pub transition: &'static str,
    pub cursor: &'static str,
}

/// Transform and drag state for one surface.
#[derive(Debug, Clone)]
pub struct ViewportController {
    transform: ViewTransform,
    drag: DragState,
    bounds: SurfaceBounds,
    graphic: Option<GraphicId>,
}

impl ViewportController {
    #[must_use]
    pub fn new(bounds: SurfaceBounds) -> Self {
        Self { transform: ViewTransform::default(), drag: DragState::Idle, bounds, graphic: None }
    }

    // --- Queries ---

    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    #[must_use]
    pub fn drag(&self) -> DragState {
        self.drag
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    #[must_use]
    pub fn bounds(&self) -> SurfaceBounds {
        self.bounds
    }

    /// The graphic this controller is currently bound to.
    #[must_use]
    pub fn graphic(&self) -> Option<GraphicId> {
        self.graphic
    }

    /// Style for the transformed graphic. Interpolation is off mid-drag.
    #[must_use]
    pub fn surface_style(&self) -> SurfaceStyle {
        let dragging = self.is_dragging();
        SurfaceStyle {
            transform: self.transform.css(),
            transform_origin: TRANSFORM_ORIGIN,
            transition: if dragging { TRANSITION_NONE } else { TRANSITION_EASED },
            cursor: if dragging { CURSOR_GRABBING } else { CURSOR_GRAB },
        }
    }

    // --- Lifecycle ---

    /// Bind to `graphic`, resetting when it differs from the bound one.
    ///
    /// Returns `true` when the reset fired.
    pub fn bind(&mut self, graphic: GraphicId) -> bool {
        if self.graphic == Some(graphic) {
            return false;
        }
        tracing::debug!(?graphic, "viewport bound to new graphic; resetting");
        self.graphic = Some(graphic);
        self.reset();
        true
    }

    /// Forget the bound graphic (render failed or is pending).
    pub fn unbind(&mut self) {
        self.graphic = None;
        self.drag = DragState::Idle;
    }

    // --- Discrete zoom ---

    pub fn zoom_in(&mut self) {
        self.transform.scale = (self.transform.scale + ZOOM_STEP).min(self.bounds.max_scale);
    }

    pub fn zoom_out(&mut self) {
        self.transform.scale = (self.transform.scale - ZOOM_STEP).max(self.bounds.min_scale);
    }

    /// Back to scale 1, no translation. Also ends any drag.
    pub fn reset(&mut self) {
        self.transform = ViewTransform::default();
        self.drag = DragState::Idle;
    }

    // --- Gestures ---

    pub fn begin_drag(&mut self, pointer: Point) {
        self.drag = DragState::begin(pointer, &self.transform);
    }

    /// Follow the pointer while dragging. Returns whether the transform moved.
    pub fn continue_drag(&mut self, pointer: Point) -> bool {
        let Some(translation) = self.drag.translation_at(pointer) else {
            return false;
        };
        self.transform.translate_x = translation.x;
        self.transform.translate_y = translation.y;
        true
    }

    /// End the drag. Also used on pointer-leave.
    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Zoom by wheel, only when the zoom modifier is held.
    ///
    /// Returns whether the event was consumed.
    pub fn wheel_zoom(&mut self, delta: WheelDelta, modifiers: Modifiers) -> bool {
        if !modifiers.zoom() {
            return false;
        }
        let step = if delta.dy > 0.0 { -WHEEL_ZOOM_STEP } else { WHEEL_ZOOM_STEP };
        self.transform.scale =
            (self.transform.scale + step).clamp(self.bounds.wheel_min_scale, self.bounds.max_scale);
        true
    }
}
