//! Shared numeric and string constants for the viewer crate.

// ── Zoom ────────────────────────────────────────────────────────

/// Scale change applied by the zoom-in / zoom-out buttons.
pub const ZOOM_STEP: f64 = 0.2;

/// Scale change applied per modified wheel event.
pub const WHEEL_ZOOM_STEP: f64 = 0.1;

/// Lowest scale reachable with the zoom-out button.
pub const MIN_SCALE: f64 = 0.5;

/// Lowest scale reachable with the wheel.
pub const WHEEL_MIN_SCALE: f64 = 1.0;

/// Default zoom ceiling for the inline surface.
pub const INLINE_MAX_SCALE: f64 = 10.0;

/// Default zoom ceiling for the fullscreen surface.
pub const FULLSCREEN_MAX_SCALE: f64 = 10.0;

// ── Surface styling ─────────────────────────────────────────────

/// Transition applied to transform changes outside of a drag.
pub const TRANSITION_EASED: &str = "transform 0.1s ease-out";

/// Transition applied while dragging, so the graphic tracks the pointer.
pub const TRANSITION_NONE: &str = "none";

/// The transform is applied about the geometric center of the surface.
pub const TRANSFORM_ORIGIN: &str = "center center";

pub const CURSOR_GRAB: &str = "grab";
pub const CURSOR_GRABBING: &str = "grabbing";

// ── Rendering ───────────────────────────────────────────────────

/// Seconds a render may stay pending before it is failed with a timeout.
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 10;

/// Message shown when the engine rejects a diagram without a diagnostic.
pub const FALLBACK_RENDER_MESSAGE: &str = "Syntax error in diagram definition";

/// Message shown when no rendering engine is loaded.
pub const ENGINE_UNAVAILABLE_MESSAGE: &str = "engine not available";

/// Prefix for per-viewer engine ids.
pub const VIEWER_ID_PREFIX: &str = "mermaid-";

/// Number of base-36 characters after [`VIEWER_ID_PREFIX`].
pub const VIEWER_ID_SUFFIX_LEN: usize = 9;

// ── Keyboard ────────────────────────────────────────────────────

/// Key name that dismisses the fullscreen overlay.
pub const DISMISS_KEY: &str = "Escape";
