//! Interactive diagram viewer core for the documentation browser.
//!
//! This crate owns everything between a diagram description and the pixels a
//! user pans and zooms: submitting text to an injected rendering engine,
//! tracking the render lifecycle, maintaining the pan/zoom transform and the
//! drag gesture, and switching between the inline and fullscreen surfaces.
//! The host is responsible only for wiring input events to the viewer and
//! supplying a [`sink::RenderSink`] that mounts the resulting markup.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`viewer`] | Top-level [`viewer::DiagramViewer`] composing the pieces below |
//! | [`pipeline`] | Render lifecycle and the latest-source-wins race rule |
//! | [`engine`] | Injected rendering capability and its configuration |
//! | [`sink`] | Trusted markup and the sink that mounts it |
//! | [`viewport`] | Pan/zoom controller and drag handling |
//! | [`fullscreen`] | Presentation mode and keyboard dismissal |
//! | [`toolbar`] | Stateless toolbar presentation |
//! | [`transform`] | View transform and coordinate conversions |
//! | [`input`] | Input event types and the drag state machine |
//! | [`config`] | Viewer configuration and surface zoom bounds |
//! | [`error`] | Render error taxonomy |
//! | [`consts`] | Shared numeric and string constants |

pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod fullscreen;
pub mod input;
pub mod pipeline;
pub mod sink;
pub mod toolbar;
pub mod transform;
pub mod viewer;
pub mod viewport;
